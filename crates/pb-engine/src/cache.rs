//! # Cache Repository
//!
//! Typed whole-collection access over the injected [`CacheStore`] port.
//! Each collection is one JSON document; reads of a never-written
//! collection yield the empty collection, and every write replaces the
//! document wholesale.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use pb_core::{CacheStore, Collection, Discussion, Error, Reply, Report, Result, VoteState};

/// Per-item vote state for the session's identity, keyed by item id.
pub type VoteMap = HashMap<String, VoteState>;

/// Item ids the session's identity has already reported.
pub type ReportFlags = HashMap<String, bool>;

/// Serde-aware wrapper around a [`CacheStore`].
#[derive(Clone)]
pub struct CacheRepo {
    store: Arc<dyn CacheStore>,
}

impl CacheRepo {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    async fn read_as<T>(&self, collection: Collection) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        match self.store.read(collection).await? {
            Some(doc) => serde_json::from_value(doc).map_err(|e| {
                Error::Cache(format!("corrupt {} document: {e}", collection.key()))
            }),
            None => Ok(T::default()),
        }
    }

    async fn write_as<T: Serialize>(&self, collection: Collection, value: &T) -> Result<()> {
        let doc = serde_json::to_value(value)
            .map_err(|e| Error::Cache(format!("encoding {} document: {e}", collection.key())))?;
        self.store.write(collection, doc).await
    }

    pub async fn discussions(&self) -> Result<Vec<Discussion>> {
        self.read_as(Collection::Discussions).await
    }

    pub async fn save_discussions(&self, discussions: &[Discussion]) -> Result<()> {
        self.write_as(Collection::Discussions, &discussions).await
    }

    pub async fn replies(&self) -> Result<Vec<Reply>> {
        self.read_as(Collection::Replies).await
    }

    pub async fn save_replies(&self, replies: &[Reply]) -> Result<()> {
        self.write_as(Collection::Replies, &replies).await
    }

    pub async fn discussion_votes(&self) -> Result<VoteMap> {
        self.read_as(Collection::DiscussionVotes).await
    }

    pub async fn save_discussion_votes(&self, votes: &VoteMap) -> Result<()> {
        self.write_as(Collection::DiscussionVotes, votes).await
    }

    pub async fn reply_votes(&self) -> Result<VoteMap> {
        self.read_as(Collection::ReplyVotes).await
    }

    pub async fn save_reply_votes(&self, votes: &VoteMap) -> Result<()> {
        self.write_as(Collection::ReplyVotes, votes).await
    }

    pub async fn reports(&self) -> Result<Vec<Report>> {
        self.read_as(Collection::Reports).await
    }

    pub async fn save_reports(&self, reports: &[Report]) -> Result<()> {
        self.write_as(Collection::Reports, &reports).await
    }

    pub async fn report_flags(&self) -> Result<ReportFlags> {
        self.read_as(Collection::ReportFlags).await
    }

    pub async fn save_report_flags(&self, flags: &ReportFlags) -> Result<()> {
        self.write_as(Collection::ReportFlags, flags).await
    }
}
