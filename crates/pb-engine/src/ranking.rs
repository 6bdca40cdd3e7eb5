//! # Ranking Engine
//!
//! Sort order, search, and category filtering for the discussion list.
//!
//! When the remote store is active it ranks and filters server-side and
//! these functions are not re-applied; they exist so cache mode produces
//! the same ordering for the same inputs. Ties break on item id descending
//! so repeated calls over a fixed snapshot yield one total order.

use chrono::{DateTime, Utc};

use pb_core::{Discussion, DiscussionPage, SortOrder};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Trending score: engagement with an active age decay, so a fixed-window
/// "trending" behavior emerges without a scheduled decay job.
pub fn trending_score(d: &Discussion, now: DateTime<Utc>) -> f64 {
    let age_days = (now - d.created_at).num_seconds() as f64 / SECONDS_PER_DAY;
    d.net_score() as f64 * 2.0 + f64::from(d.reply_count) * 1.5 + d.views as f64 * 0.1 - age_days
}

/// Lifetime-popularity score: no age term, deliberately distinct from
/// [`trending_score`].
pub fn popular_score(d: &Discussion) -> f64 {
    d.net_score() as f64 * 3.0 + f64::from(d.reply_count) * 2.0 + d.views as f64 * 0.2
}

/// Sorts `discussions` in place under the named strategy.
pub fn sort_discussions(discussions: &mut [Discussion], order: SortOrder, now: DateTime<Utc>) {
    match order {
        SortOrder::Recent => discussions.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        }),
        SortOrder::Trending => discussions.sort_by(|a, b| {
            trending_score(b, now)
                .total_cmp(&trending_score(a, now))
                .then_with(|| b.id.cmp(&a.id))
        }),
        SortOrder::Popular => discussions.sort_by(|a, b| {
            popular_score(b)
                .total_cmp(&popular_score(a))
                .then_with(|| b.id.cmp(&a.id))
        }),
    }
}

/// Search and category filtering, matching the remote store's behavior:
/// case-insensitive substring over title, content, and tags; category must
/// be in the selected set when one is given.
pub fn filter_discussions(
    discussions: Vec<Discussion>,
    search: Option<&str>,
    categories: &[String],
) -> Vec<Discussion> {
    let needle = search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    discussions
        .into_iter()
        .filter(|d| categories.is_empty() || categories.contains(&d.category))
        .filter(|d| match &needle {
            Some(q) => {
                d.title.to_lowercase().contains(q)
                    || d.content.to_lowercase().contains(q)
                    || d.tags.iter().any(|t| t.to_lowercase().contains(q))
            }
            None => true,
        })
        .collect()
}

/// Slices an already-ordered collection into the page shape the remote
/// store returns. `page` is 1-based.
pub fn paginate(discussions: Vec<Discussion>, page: u32, limit: u32) -> DiscussionPage {
    let limit = limit.max(1);
    let total = discussions.len() as u64;
    let total_pages = total.div_ceil(u64::from(limit)) as u32;
    let start = (page.saturating_sub(1) as usize) * limit as usize;

    let slice = discussions
        .into_iter()
        .skip(start)
        .take(limit as usize)
        .collect();

    DiscussionPage {
        discussions: slice,
        total_discussions: total,
        total_pages,
        current_page: page,
    }
}
