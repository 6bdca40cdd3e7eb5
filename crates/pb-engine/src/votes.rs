//! # Vote Ledger
//!
//! Toggle semantics over an item's vote counters and voter sets:
//!
//! - same direction again → the vote is retracted;
//! - opposite direction → the vote flips;
//! - no prior vote → the vote is cast.
//!
//! Counters always equal the cardinality of the corresponding voter set, so
//! a voter's own state can be recomputed from the sets alone. Both the
//! remote store and the cache-mode emulation run this exact ledger.

use pb_core::{Discussion, Reply, VoteDirection, VoteState};

/// Mutable view over an item's vote fields.
pub struct VoteFields<'a> {
    pub upvotes: &'a mut u32,
    pub downvotes: &'a mut u32,
    pub upvoters: &'a mut Vec<String>,
    pub downvoters: &'a mut Vec<String>,
}

/// Anything that can be voted on. Implemented by [`Discussion`] and
/// [`Reply`]; the ledger itself never cares which.
pub trait Votable {
    fn voter_sets(&self) -> (&[String], &[String]);
    fn vote_fields(&mut self) -> VoteFields<'_>;
}

impl Votable for Discussion {
    fn voter_sets(&self) -> (&[String], &[String]) {
        (&self.upvoters, &self.downvoters)
    }

    fn vote_fields(&mut self) -> VoteFields<'_> {
        VoteFields {
            upvotes: &mut self.upvotes,
            downvotes: &mut self.downvotes,
            upvoters: &mut self.upvoters,
            downvoters: &mut self.downvoters,
        }
    }
}

impl Votable for Reply {
    fn voter_sets(&self) -> (&[String], &[String]) {
        (&self.upvoters, &self.downvoters)
    }

    fn vote_fields(&mut self) -> VoteFields<'_> {
        VoteFields {
            upvotes: &mut self.upvotes,
            downvotes: &mut self.downvotes,
            upvoters: &mut self.upvoters,
            downvoters: &mut self.downvoters,
        }
    }
}

/// The voter's current state for `item`, derived from voter-set membership.
pub fn vote_state_of<T: Votable + ?Sized>(item: &T, voter: &str) -> VoteState {
    let (upvoters, downvoters) = item.voter_sets();
    if upvoters.iter().any(|v| v == voter) {
        Some(VoteDirection::Up)
    } else if downvoters.iter().any(|v| v == voter) {
        Some(VoteDirection::Down)
    } else {
        None
    }
}

/// Applies one vote action and returns the voter's new state.
///
/// Decrements saturate at zero so a count can never underflow even if the
/// sets and counters have drifted in stored data.
pub fn apply_vote<T: Votable + ?Sized>(
    item: &mut T,
    voter: &str,
    direction: VoteDirection,
) -> VoteState {
    let current = vote_state_of(item, voter);
    let fields = item.vote_fields();

    let (requested_count, requested_set, opposite_count, opposite_set) = match direction {
        VoteDirection::Up => (
            fields.upvotes,
            fields.upvoters,
            fields.downvotes,
            fields.downvoters,
        ),
        VoteDirection::Down => (
            fields.downvotes,
            fields.downvoters,
            fields.upvotes,
            fields.upvoters,
        ),
    };

    if current == Some(direction) {
        // Retract
        requested_set.retain(|v| v != voter);
        *requested_count = requested_count.saturating_sub(1);
        None
    } else {
        if current.is_some() {
            // Flip: release the opposite vote first
            opposite_set.retain(|v| v != voter);
            *opposite_count = opposite_count.saturating_sub(1);
        }
        requested_set.push(voter.to_string());
        *requested_count += 1;
        Some(direction)
    }
}
