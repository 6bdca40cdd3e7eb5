//! # Phoneboard Binary
//!
//! The entry point that assembles the engagement engine from its plugins:
//! HTTP remote store, JSON-file cache, environment-backed identity. Lists
//! the community discussions under a chosen sort, falling back to the local
//! cache when the remote store is unreachable.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use pb_auth_env::EnvIdentityProvider;
use pb_cache_json::JsonFileCacheStore;
use pb_core::{DiscussionQuery, SortOrder};
use pb_engine::SyncCoordinator;
use pb_remote_http::HttpRemoteStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // 1. Remote store
    let api_url = std::env::var("PHONEBOARD_API_URL")
        .unwrap_or_else(|_| "http://localhost:5001/api/discussions".into());
    let remote = HttpRemoteStore::new(api_url);

    // 2. Local cache
    let cache_dir: PathBuf = std::env::var("PHONEBOARD_CACHE_DIR")
        .unwrap_or_else(|_| "./data/cache".into())
        .into();
    let cache = JsonFileCacheStore::new(cache_dir);

    // 3. Session identity
    let identity = EnvIdentityProvider::from_env();

    let coordinator = SyncCoordinator::new(Arc::new(remote), Arc::new(cache), Arc::new(identity));

    // Usage: phoneboard [recent|trending|popular] [search terms...]
    let mut args = std::env::args().skip(1);
    let sort = match args.next().as_deref() {
        Some("recent") => SortOrder::Recent,
        Some("popular") => SortOrder::Popular,
        _ => SortOrder::Trending,
    };
    let search: Vec<String> = args.collect();

    let query = DiscussionQuery {
        sort,
        search: (!search.is_empty()).then(|| search.join(" ")),
        ..Default::default()
    };

    let page = coordinator
        .list_discussions(&query)
        .await
        .context("listing discussions")?;

    if coordinator.is_degraded() {
        tracing::info!("serving from the local cache for the rest of this session");
    }

    println!(
        "{} discussions ({} total, page {}/{})",
        page.discussions.len(),
        page.total_discussions,
        page.current_page,
        page.total_pages.max(1)
    );
    for d in &page.discussions {
        let score = d.net_score();
        let sign = if score > 0 { "+" } else { "" };
        println!(
            "{sign}{score:>4}  {:<60}  {} replies, {} views  [{}]",
            d.title, d.reply_count, d.views, d.category
        );
    }

    Ok(())
}
