//! # Sync Coordinator
//!
//! Owns the `remote-active` / `cache-active` state and exposes uniform
//! read/write operations; callers never see the branching. Every operation
//! attempts the remote store first. A transport or server failure on a read
//! degrades the session to cache mode, where the semantically-equivalent
//! operation runs against the cached aggregates and the full collection is
//! persisted back. Degradation is sticky: there is no automatic probe back
//! to the remote (a caller can check [`SyncCoordinator::is_degraded`] and
//! rebuild the session if it wants recovery).
//!
//! A 404 on a single-discussion load is a genuine not-found, surfaced as
//! [`Error::NotFound`] without degrading. Write failures while the remote
//! is active surface to the caller and are not retried or replayed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use pb_core::{
    Author, CacheStore, Discussion, DiscussionPage, DiscussionQuery, Error, IdentityProvider,
    NewDiscussion, NewReply, RemoteStore, Reply, Report, ReportKind, ReportReason, Result,
    VoteDirection, VoteState,
};

use crate::cache::CacheRepo;
use crate::ranking::{filter_discussions, paginate, sort_discussions};
use crate::votes::{apply_vote, vote_state_of};

/// Attachment cap enforced before submission, matching the upload form.
const MAX_IMAGES: usize = 4;

pub struct SyncCoordinator {
    remote: Arc<dyn RemoteStore>,
    cache: CacheRepo,
    identity: Arc<dyn IdentityProvider>,
    degraded: AtomicBool,
}

impl SyncCoordinator {
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        cache: Arc<dyn CacheStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            remote,
            cache: CacheRepo::new(cache),
            identity,
            degraded: AtomicBool::new(false),
        }
    }

    /// Whether the session has fallen back to the local cache.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Relaxed)
    }

    fn degrade(&self, cause: &Error) {
        if !self.degraded.swap(true, Ordering::Relaxed) {
            warn!(%cause, "remote store unavailable, falling back to local cache for this session");
        }
    }

    fn require_identity(&self, action: &str) -> Result<Author> {
        self.identity
            .current_identity()
            .ok_or_else(|| Error::Unauthorized(format!("sign in to {action}")))
    }

    // ── Discussions ─────────────────────────────────────────────────────────

    /// Lists discussions. Remote-active: ranking, search, and filtering are
    /// delegated to the remote. Cache-active: the same query runs locally
    /// over the cached collection.
    pub async fn list_discussions(&self, query: &DiscussionQuery) -> Result<DiscussionPage> {
        if !self.is_degraded() {
            match self.remote.list_discussions(query).await {
                Ok(page) => return Ok(page),
                Err(e @ Error::Remote(_)) => self.degrade(&e),
                Err(other) => return Err(other),
            }
        }

        debug!(sort = query.sort.as_str(), "listing discussions from cache");
        let all = self.cache.discussions().await?;
        let mut filtered = filter_discussions(all, query.search.as_deref(), &query.categories);
        sort_discussions(&mut filtered, query.sort, Utc::now());
        Ok(paginate(filtered, query.page, query.limit))
    }

    /// Loads one discussion and its full reply list.
    ///
    /// The remote increments its own view count server-side on fetch, so the
    /// local increment happens only in cache mode.
    pub async fn load_discussion(&self, id: &str) -> Result<(Discussion, Vec<Reply>)> {
        if !self.is_degraded() {
            match self.remote.get_discussion(id).await {
                Ok(Some(discussion)) => match self.remote.list_replies(id).await {
                    Ok(replies) => return Ok((discussion, replies)),
                    Err(e @ Error::Remote(_)) => self.degrade(&e),
                    Err(other) => return Err(other),
                },
                // A deleted discussion is not a store failure.
                Ok(None) => return Err(Error::NotFound("discussion", id.to_string())),
                Err(e @ Error::Remote(_)) => self.degrade(&e),
                Err(other) => return Err(other),
            }
        }

        let mut discussions = self.cache.discussions().await?;
        let idx = discussions
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| Error::NotFound("discussion", id.to_string()))?;

        discussions[idx].views += 1;
        self.cache.save_discussions(&discussions).await?;
        let discussion = discussions.swap_remove(idx);

        let replies: Vec<Reply> = self
            .cache
            .replies()
            .await?
            .into_iter()
            .filter(|r| r.discussion_id == id)
            .collect();

        Ok((discussion, replies))
    }

    pub async fn create_discussion(&self, draft: NewDiscussion) -> Result<Discussion> {
        if draft.title.trim().is_empty() || draft.content.trim().is_empty() {
            return Err(Error::Validation(
                "discussion title and content are required".into(),
            ));
        }
        if draft.images.len() > MAX_IMAGES {
            return Err(Error::Validation(format!(
                "at most {MAX_IMAGES} images per discussion"
            )));
        }
        let author = self.require_identity("create a discussion")?;

        if !self.is_degraded() {
            let token = self.identity.bearer_token().await?;
            let created = self.remote.create_discussion(&draft, &token).await?;
            info!(id = %created.id, "discussion created");
            return Ok(created);
        }

        let discussion = Discussion::new(
            author,
            draft.title,
            draft.content,
            draft.category,
            draft.tags,
            draft.images,
            Utc::now(),
        );

        let mut discussions = self.cache.discussions().await?;
        discussions.insert(0, discussion.clone());
        self.cache.save_discussions(&discussions).await?;
        info!(id = %discussion.id, "discussion created in cache");
        Ok(discussion)
    }

    /// Applies a vote with toggle semantics and returns the updated
    /// discussion plus the voter's new state, recomputed from the
    /// authoritative voter sets.
    pub async fn vote_discussion(
        &self,
        id: &str,
        direction: VoteDirection,
    ) -> Result<(Discussion, VoteState)> {
        let voter = self.require_identity("vote")?;

        if !self.is_degraded() {
            let token = self.identity.bearer_token().await?;
            let updated = self.remote.vote_discussion(id, direction, &token).await?;
            let state = vote_state_of(&updated, &voter.id);
            return Ok((updated, state));
        }

        let mut discussions = self.cache.discussions().await?;
        let target = discussions
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| Error::NotFound("discussion", id.to_string()))?;

        let state = apply_vote(target, &voter.id, direction);
        target.updated_at = Utc::now();
        let updated = target.clone();
        self.cache.save_discussions(&discussions).await?;

        let mut votes = self.cache.discussion_votes().await?;
        votes.insert(id.to_string(), state);
        self.cache.save_discussion_votes(&votes).await?;

        debug!(id, ?state, "discussion vote applied in cache");
        Ok((updated, state))
    }

    /// Deletes a discussion. Author-only, enforced by the remote; delete is
    /// a remote-only capability and fails cleanly while degraded.
    pub async fn delete_discussion(&self, id: &str) -> Result<()> {
        self.require_identity("delete a discussion")?;
        if self.is_degraded() {
            return Err(Error::Unavailable("delete requires the remote store".into()));
        }
        let token = self.identity.bearer_token().await?;
        self.remote.delete_discussion(id, &token).await?;
        info!(id, "discussion deleted");
        Ok(())
    }

    // ── Replies ─────────────────────────────────────────────────────────────

    pub async fn create_reply(&self, discussion_id: &str, draft: NewReply) -> Result<Reply> {
        if draft.content.trim().is_empty() {
            return Err(Error::Validation("reply text is required".into()));
        }
        if draft.images.len() > MAX_IMAGES {
            return Err(Error::Validation(format!(
                "at most {MAX_IMAGES} images per reply"
            )));
        }
        let author = self.require_identity("reply")?;

        if !self.is_degraded() {
            let token = self.identity.bearer_token().await?;
            let created = self.remote.create_reply(discussion_id, &draft, &token).await?;
            info!(id = %created.id, discussion_id, "reply created");
            return Ok(created);
        }

        let mut discussions = self.cache.discussions().await?;
        let parent_discussion = discussions
            .iter_mut()
            .find(|d| d.id == discussion_id)
            .ok_or_else(|| Error::NotFound("discussion", discussion_id.to_string()))?;

        let mut replies = self.cache.replies().await?;

        // The parent reply must already exist and belong to this discussion.
        if let Some(parent_id) = &draft.parent_reply_id {
            let ok = replies
                .iter()
                .any(|r| &r.id == parent_id && r.discussion_id == discussion_id);
            if !ok {
                return Err(Error::Validation(format!(
                    "parent reply {parent_id} does not exist in this discussion"
                )));
            }
        }

        let reply = Reply::new(
            discussion_id.to_string(),
            author,
            draft.content,
            draft.images,
            draft.parent_reply_id,
            Utc::now(),
        );

        replies.push(reply.clone());
        self.cache.save_replies(&replies).await?;

        parent_discussion.reply_count += 1;
        parent_discussion.updated_at = Utc::now();
        self.cache.save_discussions(&discussions).await?;

        info!(id = %reply.id, discussion_id, "reply created in cache");
        Ok(reply)
    }

    pub async fn vote_reply(
        &self,
        id: &str,
        direction: VoteDirection,
    ) -> Result<(Reply, VoteState)> {
        let voter = self.require_identity("vote")?;

        if !self.is_degraded() {
            let token = self.identity.bearer_token().await?;
            let updated = self.remote.vote_reply(id, direction, &token).await?;
            let state = vote_state_of(&updated, &voter.id);
            return Ok((updated, state));
        }

        let mut replies = self.cache.replies().await?;
        let target = replies
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::NotFound("reply", id.to_string()))?;

        let state = apply_vote(target, &voter.id, direction);
        target.updated_at = Utc::now();
        let updated = target.clone();
        self.cache.save_replies(&replies).await?;

        let mut votes = self.cache.reply_votes().await?;
        votes.insert(id.to_string(), state);
        self.cache.save_reply_votes(&votes).await?;

        debug!(id, ?state, "reply vote applied in cache");
        Ok((updated, state))
    }

    pub async fn delete_reply(&self, id: &str) -> Result<()> {
        self.require_identity("delete a reply")?;
        if self.is_degraded() {
            return Err(Error::Unavailable("delete requires the remote store".into()));
        }
        let token = self.identity.bearer_token().await?;
        self.remote.delete_reply(id, &token).await?;
        info!(id, "reply deleted");
        Ok(())
    }

    // ── Reports ─────────────────────────────────────────────────────────────

    /// Records a moderation report. Reports are cache-backed regardless of
    /// coordinator state (they are not wired to the remote store), and the
    /// report log is append-only.
    pub async fn submit_report(
        &self,
        item_id: &str,
        item_kind: ReportKind,
        reason: ReportReason,
        details: Option<String>,
    ) -> Result<Report> {
        let reported_by = self
            .identity
            .current_identity()
            .map(|a| a.name)
            .unwrap_or_else(|| "anonymous".to_string());

        let report = Report {
            id: Uuid::new_v4().to_string(),
            item_id: item_id.to_string(),
            item_kind,
            reason,
            details: details.map(|d| d.trim().to_string()).filter(|d| !d.is_empty()),
            reported_by,
            created_at: Utc::now(),
        };

        let mut reports = self.cache.reports().await?;
        reports.push(report.clone());
        self.cache.save_reports(&reports).await?;

        let mut flags = self.cache.report_flags().await?;
        flags.insert(item_id.to_string(), true);
        self.cache.save_report_flags(&flags).await?;

        info!(item_id, ?item_kind, ?reason, "report recorded");
        Ok(report)
    }

    /// Whether this session already reported `item_id`. Call-site guard for
    /// disabling the report control; the log itself stays append-only.
    pub async fn has_reported(&self, item_id: &str) -> Result<bool> {
        Ok(self
            .cache
            .report_flags()
            .await?
            .get(item_id)
            .copied()
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration;
    use pb_cache_json::MemoryCacheStore;
    use pb_core::SortOrder;
    use std::sync::Mutex;

    #[derive(Clone, Copy, PartialEq)]
    enum RemoteMode {
        /// Every call fails with a transport error.
        Down,
        /// Serves and mutates in-memory data, applying the same ledger the
        /// real backend does.
        Healthy,
        /// Panics on contact, to prove an operation never reached the wire.
        Unreachable,
    }

    struct FakeRemote {
        mode: RemoteMode,
        discussions: Mutex<Vec<Discussion>>,
        replies: Mutex<Vec<Reply>>,
    }

    impl FakeRemote {
        fn new(mode: RemoteMode) -> Self {
            Self {
                mode,
                discussions: Mutex::new(Vec::new()),
                replies: Mutex::new(Vec::new()),
            }
        }

        fn with_discussions(mode: RemoteMode, discussions: Vec<Discussion>) -> Self {
            let remote = Self::new(mode);
            *remote.discussions.lock().unwrap() = discussions;
            remote
        }

        fn gate(&self) -> Result<()> {
            match self.mode {
                RemoteMode::Down => Err(Error::Remote("connection refused".into())),
                RemoteMode::Healthy => Ok(()),
                RemoteMode::Unreachable => panic!("remote store should not have been contacted"),
            }
        }
    }

    #[async_trait]
    impl RemoteStore for FakeRemote {
        async fn list_discussions(&self, query: &DiscussionQuery) -> Result<DiscussionPage> {
            self.gate()?;
            let discussions = self.discussions.lock().unwrap().clone();
            let total = discussions.len() as u64;
            Ok(DiscussionPage {
                discussions,
                total_discussions: total,
                total_pages: 1,
                current_page: query.page,
            })
        }

        async fn get_discussion(&self, id: &str) -> Result<Option<Discussion>> {
            self.gate()?;
            Ok(self
                .discussions
                .lock()
                .unwrap()
                .iter()
                .find(|d| d.id == id)
                .cloned())
        }

        async fn create_discussion(
            &self,
            draft: &NewDiscussion,
            _token: &str,
        ) -> Result<Discussion> {
            self.gate()?;
            let d = Discussion::new(
                remote_author(),
                draft.title.clone(),
                draft.content.clone(),
                draft.category.clone(),
                draft.tags.clone(),
                draft.images.clone(),
                Utc::now(),
            );
            self.discussions.lock().unwrap().insert(0, d.clone());
            Ok(d)
        }

        async fn vote_discussion(
            &self,
            id: &str,
            direction: VoteDirection,
            _token: &str,
        ) -> Result<Discussion> {
            self.gate()?;
            let mut discussions = self.discussions.lock().unwrap();
            let target = discussions
                .iter_mut()
                .find(|d| d.id == id)
                .ok_or_else(|| Error::NotFound("discussion", id.to_string()))?;
            apply_vote(target, "remote-caller", direction);
            Ok(target.clone())
        }

        async fn delete_discussion(&self, id: &str, _token: &str) -> Result<()> {
            self.gate()?;
            self.discussions.lock().unwrap().retain(|d| d.id != id);
            Ok(())
        }

        async fn list_replies(&self, discussion_id: &str) -> Result<Vec<Reply>> {
            self.gate()?;
            Ok(self
                .replies
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.discussion_id == discussion_id)
                .cloned()
                .collect())
        }

        async fn create_reply(
            &self,
            discussion_id: &str,
            draft: &NewReply,
            _token: &str,
        ) -> Result<Reply> {
            self.gate()?;
            let r = Reply::new(
                discussion_id.to_string(),
                remote_author(),
                draft.content.clone(),
                draft.images.clone(),
                draft.parent_reply_id.clone(),
                Utc::now(),
            );
            self.replies.lock().unwrap().push(r.clone());
            Ok(r)
        }

        async fn vote_reply(
            &self,
            id: &str,
            direction: VoteDirection,
            _token: &str,
        ) -> Result<Reply> {
            self.gate()?;
            let mut replies = self.replies.lock().unwrap();
            let target = replies
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| Error::NotFound("reply", id.to_string()))?;
            apply_vote(target, "remote-caller", direction);
            Ok(target.clone())
        }

        async fn delete_reply(&self, id: &str, _token: &str) -> Result<()> {
            self.gate()?;
            self.replies.lock().unwrap().retain(|r| r.id != id);
            Ok(())
        }
    }

    struct FakeIdentity {
        user: Option<Author>,
    }

    #[async_trait]
    impl IdentityProvider for FakeIdentity {
        fn current_identity(&self) -> Option<Author> {
            self.user.clone()
        }

        async fn bearer_token(&self) -> Result<String> {
            match &self.user {
                Some(_) => Ok("test-token".into()),
                None => Err(Error::Unauthorized("no session".into())),
            }
        }
    }

    fn remote_author() -> Author {
        Author {
            id: "remote-caller".into(),
            name: "Remote Caller".into(),
            avatar: String::new(),
        }
    }

    fn signed_in() -> Arc<FakeIdentity> {
        Arc::new(FakeIdentity {
            user: Some(Author {
                id: "session-user".into(),
                name: "Session User".into(),
                avatar: String::new(),
            }),
        })
    }

    fn anonymous() -> Arc<FakeIdentity> {
        Arc::new(FakeIdentity { user: None })
    }

    fn discussion(id: &str, up: u32, down: u32, replies: u32, views: u64, days_old: i64) -> Discussion {
        let mut d = Discussion::new(
            remote_author(),
            format!("Discussion {id}"),
            "Body".into(),
            "Discussion".into(),
            vec![],
            vec![],
            Utc::now() - Duration::days(days_old),
        );
        d.id = id.to_string();
        d.upvotes = up;
        d.upvoters = (0..up).map(|i| format!("up{i}")).collect();
        d.downvotes = down;
        d.downvoters = (0..down).map(|i| format!("down{i}")).collect();
        d.reply_count = replies;
        d.views = views;
        d
    }

    fn coordinator(
        remote: FakeRemote,
        identity: Arc<FakeIdentity>,
    ) -> (SyncCoordinator, Arc<MemoryCacheStore>) {
        let cache = Arc::new(MemoryCacheStore::default());
        let coordinator = SyncCoordinator::new(Arc::new(remote), cache.clone(), identity);
        (coordinator, cache)
    }

    async fn seed_discussions(cache: &Arc<MemoryCacheStore>, discussions: &[Discussion]) {
        CacheRepo::new(cache.clone() as Arc<dyn CacheStore>)
            .save_discussions(discussions)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_remote_list_is_passed_through_untouched() {
        let remote = FakeRemote::with_discussions(
            RemoteMode::Healthy,
            vec![discussion("a", 1, 0, 0, 0, 0), discussion("b", 9, 0, 0, 0, 0)],
        );
        let (coordinator, _) = coordinator(remote, signed_in());

        let page = coordinator
            .list_discussions(&DiscussionQuery::default())
            .await
            .unwrap();

        // The remote already ranked; the engine must not re-sort.
        let ids: Vec<&str> = page.discussions.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(!coordinator.is_degraded());
    }

    #[tokio::test]
    async fn test_list_failure_degrades_and_ranks_locally() {
        // Scenario E: remote list throws, coordinator switches to cache mode
        // and trending uses the local scoring formula.
        let (coordinator, cache) = coordinator(FakeRemote::new(RemoteMode::Down), signed_in());
        seed_discussions(
            &cache,
            &[
                discussion("stale", 50, 0, 10, 500, 300),
                discussion("hot", 30, 2, 8, 200, 0),
                discussion("quiet", 1, 0, 0, 5, 1),
            ],
        )
        .await;

        let query = DiscussionQuery {
            sort: SortOrder::Trending,
            ..Default::default()
        };
        let page = coordinator.list_discussions(&query).await.unwrap();

        assert!(coordinator.is_degraded());
        let ids: Vec<&str> = page.discussions.iter().map(|d| d.id.as_str()).collect();
        // hot: 56+12+20-0 = 88; stale: 100+15+50-300 = -135; quiet: 2+0.5-1 = 1.5
        assert_eq!(ids, vec!["hot", "quiet", "stale"]);
        assert_eq!(page.total_discussions, 3);
    }

    #[tokio::test]
    async fn test_not_found_on_detail_load_does_not_degrade() {
        let remote =
            FakeRemote::with_discussions(RemoteMode::Healthy, vec![discussion("a", 0, 0, 0, 0, 0)]);
        let (coordinator, _) = coordinator(remote, signed_in());

        let err = coordinator.load_discussion("missing").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_, _)));
        assert!(!coordinator.is_degraded());

        // The session still works against the remote afterwards.
        let (d, _) = coordinator.load_discussion("a").await.unwrap();
        assert_eq!(d.id, "a");
    }

    #[tokio::test]
    async fn test_view_count_increments_only_in_cache_mode() {
        let (coordinator, cache) = coordinator(FakeRemote::new(RemoteMode::Down), signed_in());
        seed_discussions(&cache, &[discussion("a", 0, 0, 0, 7, 0)]).await;

        let (first, _) = coordinator.load_discussion("a").await.unwrap();
        assert_eq!(first.views, 8);
        let (second, _) = coordinator.load_discussion("a").await.unwrap();
        assert_eq!(second.views, 9);
    }

    #[tokio::test]
    async fn test_cache_vote_keeps_counts_and_sets_in_step() {
        let (coordinator, cache) = coordinator(FakeRemote::new(RemoteMode::Down), signed_in());
        seed_discussions(&cache, &[discussion("a", 2, 0, 0, 0, 0)]).await;

        // Force degradation first.
        coordinator
            .list_discussions(&DiscussionQuery::default())
            .await
            .unwrap();

        let (d, state) = coordinator
            .vote_discussion("a", VoteDirection::Up)
            .await
            .unwrap();
        assert_eq!(state, Some(VoteDirection::Up));
        assert_eq!(d.upvotes, 3);
        assert!(d.upvoters.contains(&"session-user".to_string()));

        // Same direction again retracts, and the vote map follows.
        let (d, state) = coordinator
            .vote_discussion("a", VoteDirection::Up)
            .await
            .unwrap();
        assert_eq!(state, None);
        assert_eq!(d.upvotes, 2);
        assert!(!d.upvoters.contains(&"session-user".to_string()));

        let votes = CacheRepo::new(cache as Arc<dyn CacheStore>)
            .discussion_votes()
            .await
            .unwrap();
        assert_eq!(votes.get("a"), Some(&None));
    }

    #[tokio::test]
    async fn test_anonymous_vote_rejected_before_any_network_call() {
        let (coordinator, _) = coordinator(FakeRemote::new(RemoteMode::Unreachable), anonymous());
        let err = coordinator
            .vote_discussion("a", VoteDirection::Up)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_create_discussion_validation() {
        let (coordinator, _) = coordinator(FakeRemote::new(RemoteMode::Unreachable), signed_in());

        let err = coordinator
            .create_discussion(NewDiscussion {
                title: "   ".into(),
                content: "body".into(),
                category: "Discussion".into(),
                tags: vec![],
                images: vec![],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = coordinator
            .create_discussion(NewDiscussion {
                title: "t".into(),
                content: "c".into(),
                category: "Discussion".into(),
                tags: vec![],
                images: vec!["i".into(); 5],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_cache_reply_bumps_count_and_checks_parent() {
        let (coordinator, _) = coordinator(FakeRemote::new(RemoteMode::Down), signed_in());
        // Degrade, then create the discussion in cache mode.
        coordinator
            .list_discussions(&DiscussionQuery::default())
            .await
            .unwrap();
        let d = coordinator
            .create_discussion(NewDiscussion {
                title: "Battery life".into(),
                content: "Which phone lasts longest?".into(),
                category: "Testing".into(),
                tags: vec![],
                images: vec![],
            })
            .await
            .unwrap();

        let top = coordinator
            .create_reply(
                &d.id,
                NewReply {
                    content: "ROG Phone 8 easily".into(),
                    images: vec![],
                    parent_reply_id: None,
                },
            )
            .await
            .unwrap();

        let nested = coordinator
            .create_reply(
                &d.id,
                NewReply {
                    content: "Seconded".into(),
                    images: vec![],
                    parent_reply_id: Some(top.id.clone()),
                },
            )
            .await
            .unwrap();
        assert_eq!(nested.parent_reply_id.as_ref(), Some(&top.id));

        // A nested reply bumps the count too, matching the remote.
        let (loaded, replies) = coordinator.load_discussion(&d.id).await.unwrap();
        assert_eq!(loaded.reply_count, 2);
        assert_eq!(replies.len(), 2);

        let err = coordinator
            .create_reply(
                &d.id,
                NewReply {
                    content: "dangling".into(),
                    images: vec![],
                    parent_reply_id: Some("no-such-reply".into()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_is_remote_only() {
        let (coordinator, cache) = coordinator(FakeRemote::new(RemoteMode::Down), signed_in());
        seed_discussions(&cache, &[discussion("a", 0, 0, 0, 0, 0)]).await;
        coordinator
            .list_discussions(&DiscussionQuery::default())
            .await
            .unwrap();

        let err = coordinator.delete_discussion("a").await.unwrap_err();
        assert!(matches!(err, Error::Unavailable(_)));
        let err = coordinator.delete_reply("r").await.unwrap_err();
        assert!(matches!(err, Error::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_remote_vote_returns_state_from_voter_sets() {
        let mut seeded = discussion("a", 0, 0, 0, 0, 0);
        // The remote fake votes as "remote-caller"; pre-mark the session user
        // so the derived state comes from the returned sets, not from any
        // client-held state.
        seeded.upvoters.push("session-user".into());
        seeded.upvotes += 1;
        let remote = FakeRemote::with_discussions(RemoteMode::Healthy, vec![seeded]);
        let (coordinator, _) = coordinator(remote, signed_in());

        let (d, state) = coordinator
            .vote_discussion("a", VoteDirection::Up)
            .await
            .unwrap();
        assert_eq!(state, Some(VoteDirection::Up));
        assert_eq!(d.upvotes, 2);
    }

    #[tokio::test]
    async fn test_write_failure_surfaces_without_fallback() {
        let (coordinator, cache) = coordinator(FakeRemote::new(RemoteMode::Down), signed_in());
        seed_discussions(&cache, &[discussion("a", 5, 0, 0, 0, 0)]).await;

        // Still remote-active: the failed write surfaces and does not flip
        // the session into cache mode by itself.
        let err = coordinator
            .vote_discussion("a", VoteDirection::Up)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Remote(_)));
        assert!(!coordinator.is_degraded());
    }

    #[tokio::test]
    async fn test_report_flow() {
        let (coordinator, cache) = coordinator(FakeRemote::new(RemoteMode::Unreachable), signed_in());

        assert!(!coordinator.has_reported("d1").await.unwrap());
        let report = coordinator
            .submit_report(
                "d1",
                ReportKind::Discussion,
                ReportReason::Spam,
                Some("  ".into()),
            )
            .await
            .unwrap();
        assert_eq!(report.details, None);
        assert_eq!(report.reported_by, "Session User");
        assert!(coordinator.has_reported("d1").await.unwrap());
        assert!(!coordinator.has_reported("d2").await.unwrap());

        // Append-only: a second report on the same item is recorded too;
        // suppression is the call site's job via has_reported.
        coordinator
            .submit_report(
                "d1",
                ReportKind::Discussion,
                ReportReason::Other,
                Some("duplicate".into()),
            )
            .await
            .unwrap();
        let reports = CacheRepo::new(cache as Arc<dyn CacheStore>).reports().await.unwrap();
        assert_eq!(reports.len(), 2);
    }
}
