//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the coordinator.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    Author, Discussion, DiscussionPage, DiscussionQuery, NewDiscussion, NewReply, Reply,
    VoteDirection,
};

/// The authoritative remote store, consumed over its REST surface.
///
/// Mutations carry a bearer token obtained from the identity provider at
/// call time. Read operations are unauthenticated.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    // Discussion operations
    async fn list_discussions(&self, query: &DiscussionQuery) -> Result<DiscussionPage>;
    /// `Ok(None)` on a 404; any other failure is `Error::Remote`.
    async fn get_discussion(&self, id: &str) -> Result<Option<Discussion>>;
    async fn create_discussion(&self, draft: &NewDiscussion, token: &str) -> Result<Discussion>;
    /// Returns the updated discussion; the caller derives its own vote state
    /// from the returned voter sets.
    async fn vote_discussion(
        &self,
        id: &str,
        direction: VoteDirection,
        token: &str,
    ) -> Result<Discussion>;
    async fn delete_discussion(&self, id: &str, token: &str) -> Result<()>;

    // Reply operations
    async fn list_replies(&self, discussion_id: &str) -> Result<Vec<Reply>>;
    async fn create_reply(
        &self,
        discussion_id: &str,
        draft: &NewReply,
        token: &str,
    ) -> Result<Reply>;
    async fn vote_reply(&self, id: &str, direction: VoteDirection, token: &str) -> Result<Reply>;
    async fn delete_reply(&self, id: &str, token: &str) -> Result<()>;
}

/// The named cache collections. Each is one whole JSON document under a
/// well-known key; there are no partial or keyed writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Discussions,
    Replies,
    DiscussionVotes,
    ReplyVotes,
    Reports,
    ReportFlags,
}

impl Collection {
    /// The storage key for this collection.
    pub fn key(self) -> &'static str {
        match self {
            Collection::Discussions => "discussions",
            Collection::Replies => "discussionReplies",
            Collection::DiscussionVotes => "discussionVotes",
            Collection::ReplyVotes => "replyVotes",
            Collection::Reports => "reports",
            Collection::ReportFlags => "userReports",
        }
    }
}

/// Local offline cache contract: whole-document reads and writes.
///
/// Every write replaces the entire collection atomically from the caller's
/// point of view. A collection that has never been written reads back as
/// `Ok(None)`.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn read(&self, collection: Collection) -> Result<Option<serde_json::Value>>;
    async fn write(&self, collection: Collection, data: serde_json::Value) -> Result<()>;
}

/// Session identity contract, backed by an external identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The signed-in identity, or `None` for an anonymous session.
    fn current_identity(&self) -> Option<Author>;

    /// A bearer token for a mutating remote call, fetched at call time
    /// (never cached by the engine). `Error::Unauthorized` when anonymous.
    async fn bearer_token(&self) -> Result<String>;
}
