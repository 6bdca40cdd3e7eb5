//! phoneboard/crates/pb-engine/src/lib.rs
//!
//! The discussion engagement engine: vote ledger, reply tree builder,
//! ranking engine, cache repository, and the sync coordinator that ties
//! them to the remote/cache ports.

pub mod cache;
pub mod coordinator;
pub mod ranking;
pub mod tree;
pub mod votes;

pub use cache::{CacheRepo, ReportFlags, VoteMap};
pub use coordinator::SyncCoordinator;
pub use ranking::{filter_discussions, paginate, popular_score, sort_discussions, trending_score};
pub use tree::ReplyTree;
pub use votes::{apply_vote, vote_state_of, Votable};
