//! # Reply Tree Builder
//!
//! Reconstructs a forest of threaded replies from a flat list using parent
//! references. Pure data transform: rendering concerns (indentation, depth
//! caps) live elsewhere, and nesting depth is unbounded.

use std::collections::HashMap;
use std::collections::HashSet;

use pb_core::Reply;

/// Parent→children adjacency for one discussion's replies.
///
/// Top-level replies are ordered newest-first so fresh threads surface;
/// children of a parent are ordered oldest-first to preserve conversational
/// sequence. A reply whose declared parent is missing from the set (parent
/// deleted) is an orphan and surfaces at top level rather than being
/// dropped.
#[derive(Debug, Default)]
pub struct ReplyTree {
    top_level: Vec<Reply>,
    children: HashMap<String, Vec<Reply>>,
}

impl ReplyTree {
    /// Builds the tree from a flat, unordered reply list.
    pub fn build(replies: &[Reply]) -> Self {
        let known: HashSet<&str> = replies.iter().map(|r| r.id.as_str()).collect();

        let mut top_level = Vec::new();
        let mut children: HashMap<String, Vec<Reply>> = HashMap::new();

        for reply in replies {
            match reply
                .parent_reply_id
                .as_deref()
                .filter(|parent| known.contains(parent))
            {
                Some(parent) => children
                    .entry(parent.to_string())
                    .or_default()
                    .push(reply.clone()),
                // No parent, or an orphaned reference
                None => top_level.push(reply.clone()),
            }
        }

        top_level.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        for siblings in children.values_mut() {
            siblings.sort_by(|a, b| {
                a.created_at
                    .cmp(&b.created_at)
                    .then_with(|| a.id.cmp(&b.id))
            });
        }

        Self {
            top_level,
            children,
        }
    }

    /// Replies with no (resolvable) parent, newest-first.
    pub fn top_level(&self) -> &[Reply] {
        &self.top_level
    }

    /// Direct children of `parent_id`, oldest-first. Empty for leaves.
    pub fn children(&self, parent_id: &str) -> &[Reply] {
        self.children
            .get(parent_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total replies placed in the tree.
    pub fn len(&self) -> usize {
        self.top_level.len() + self.children.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.top_level.is_empty() && self.children.is_empty()
    }
}
