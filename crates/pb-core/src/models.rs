//! # Domain Models
//!
//! These structs represent the core entities of the discussion subsystem.
//! Item identifiers are opaque strings: the remote store assigns its own ids,
//! while cache-created entities get a UUID v4.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The identity attached to discussions, replies, and reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    pub name: String,
    /// Avatar URL; may be empty.
    pub avatar: String,
}

/// A top-level community post with voting, tags, and a reply thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discussion {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: Author,
    /// Free-text category label (e.g., "Reviews", "Comparisons").
    pub category: String,
    pub tags: Vec<String>,
    /// Encoded image attachments, carried opaquely.
    pub images: Vec<String>,
    pub upvotes: u32,
    pub downvotes: u32,
    /// Identities that currently hold an upvote. Counts must equal the
    /// cardinality of these sets; a caller's own vote state is derived from
    /// membership, never from client-held state.
    pub upvoters: Vec<String>,
    pub downvoters: Vec<String>,
    pub reply_count: u32,
    pub views: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Discussion {
    /// A fresh discussion with zeroed engagement, as the stores create them.
    pub fn new(
        author: Author,
        title: String,
        content: String,
        category: String,
        tags: Vec<String>,
        images: Vec<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            content,
            author,
            category,
            tags,
            images,
            upvotes: 0,
            downvotes: 0,
            upvoters: Vec::new(),
            downvoters: Vec::new(),
            reply_count: 0,
            views: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Upvotes minus downvotes. May be negative.
    pub fn net_score(&self) -> i64 {
        i64::from(self.upvotes) - i64::from(self.downvotes)
    }
}

/// A threaded response to a Discussion or to another Reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub id: String,
    pub discussion_id: String,
    pub content: String,
    pub author: Author,
    pub images: Vec<String>,
    pub upvotes: u32,
    pub downvotes: u32,
    pub upvoters: Vec<String>,
    pub downvoters: Vec<String>,
    /// `None` marks a top-level reply. When present, the parent must belong
    /// to the same discussion and already exist at creation time, so cycles
    /// cannot form.
    pub parent_reply_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reply {
    pub fn new(
        discussion_id: String,
        author: Author,
        content: String,
        images: Vec<String>,
        parent_reply_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            discussion_id,
            content,
            author,
            images,
            upvotes: 0,
            downvotes: 0,
            upvoters: Vec::new(),
            downvoters: Vec::new(),
            parent_reply_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Upvotes minus downvotes. May be negative.
    pub fn net_score(&self) -> i64 {
        i64::from(self.upvotes) - i64::from(self.downvotes)
    }
}

/// The direction of a cast vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

/// A voter's current state for one item: `None` means no vote held.
pub type VoteState = Option<VoteDirection>;

/// What kind of item a report targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Discussion,
    Reply,
}

/// Enumerated reason codes; the report form offers exactly these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportReason {
    Spam,
    Harassment,
    Inappropriate,
    Misinformation,
    Other,
}

/// A moderation report. Append-only: created once, never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub item_id: String,
    pub item_kind: ReportKind,
    pub reason: ReportReason,
    pub details: Option<String>,
    pub reported_by: String,
    pub created_at: DateTime<Utc>,
}

/// Named sort strategies for the discussion list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Recent,
    Trending,
    Popular,
}

impl SortOrder {
    /// The query-parameter spelling the remote store expects.
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Recent => "recent",
            SortOrder::Trending => "trending",
            SortOrder::Popular => "popular",
        }
    }
}

/// Parameters for a discussion-list read.
#[derive(Debug, Clone)]
pub struct DiscussionQuery {
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
    pub sort: SortOrder,
    /// Case-insensitive substring matched against title, content, and tags.
    pub search: Option<String>,
    /// When non-empty, only discussions in one of these categories.
    pub categories: Vec<String>,
}

impl Default for DiscussionQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 20,
            sort: SortOrder::Trending,
            search: None,
            categories: Vec::new(),
        }
    }
}

/// One page of the discussion list, in the shape the remote store returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscussionPage {
    pub discussions: Vec<Discussion>,
    pub total_discussions: u64,
    pub total_pages: u32,
    pub current_page: u32,
}

/// A discussion draft as submitted by its author.
#[derive(Debug, Clone, Serialize)]
pub struct NewDiscussion {
    pub title: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub images: Vec<String>,
}

/// A reply draft as submitted by its author.
#[derive(Debug, Clone, Serialize)]
pub struct NewReply {
    pub content: String,
    pub images: Vec<String>,
    /// Reply-to-reply threading; `None` posts at top level.
    pub parent_reply_id: Option<String>,
}
