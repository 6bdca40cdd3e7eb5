//! phoneboard/crates/pb-core/src/lib.rs
//!
//! The central domain logic and interface definitions for Phoneboard's
//! discussion engagement engine.

pub mod error;
pub mod models;
pub mod traits;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use traits::*;

#[cfg(test)]
mod tests {
    use super::models::*;
    use super::traits::Collection;
    use chrono::Utc;

    #[test]
    fn test_net_score_can_be_negative() {
        let mut d = Discussion::new(
            Author {
                id: "u1".into(),
                name: "Pat".into(),
                avatar: String::new(),
            },
            "Title".into(),
            "Body".into(),
            "Discussion".into(),
            vec![],
            vec![],
            Utc::now(),
        );
        d.upvotes = 2;
        d.downvotes = 5;
        assert_eq!(d.net_score(), -3);
    }

    #[test]
    fn test_collection_keys_are_stable() {
        // Cache documents live under these exact keys; renaming one would
        // orphan existing cached data.
        assert_eq!(Collection::Discussions.key(), "discussions");
        assert_eq!(Collection::Replies.key(), "discussionReplies");
        assert_eq!(Collection::DiscussionVotes.key(), "discussionVotes");
        assert_eq!(Collection::ReplyVotes.key(), "replyVotes");
        assert_eq!(Collection::Reports.key(), "reports");
        assert_eq!(Collection::ReportFlags.key(), "userReports");
    }
}
