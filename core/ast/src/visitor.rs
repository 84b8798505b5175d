//! Generic pre/post-order tree walk.
//!
//! Semantic passes implement [`Visitor`] and drive it with [`walk`]. A visit
//! can request either outcome a pass needs mid-traversal:
//!
//! - [`Action::SkipChildren`] from `enter` — don't descend into this node's
//!   children (used once a subtree is known dead).
//! - Replacing a node in `leave` and returning [`Action::Replaced`] — the
//!   walk continues from the replacement's parent without revisiting the
//!   subtree that was just swapped out, matching the constant folder's need
//!   to fold bottom-up without re-folding what it just produced.

use crate::arena::Arena;
use crate::node::NodeId;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    /// Continue the walk normally.
    Continue,
    /// Don't descend into this node's children.
    SkipChildren,
    /// The node was replaced; don't descend into either the old or the new
    /// subtree.
    Replaced,
}

pub trait Visitor {
    /// Called before a node's children are visited.
    fn enter(&mut self, _arena: &Arena, _id: NodeId) -> Action {
        Action::Continue
    }

    /// Called after a node's children have been visited (unless `enter`
    /// returned [`Action::SkipChildren`]).
    fn leave(&mut self, _arena: &mut Arena, _id: NodeId) -> Action {
        Action::Continue
    }
}

/// Walks `id` and its descendants, depth-first, calling `visitor`'s `enter`
/// before and `leave` after each node's children.
pub fn walk<V: Visitor>(arena: &mut Arena, id: NodeId, visitor: &mut V) {
    let enter_action = visitor.enter(arena, id);
    if enter_action == Action::SkipChildren || enter_action == Action::Replaced {
        return;
    }

    let children: Vec<NodeId> = arena.children(id).to_vec();
    for child in children {
        walk(arena, child, visitor);
    }

    visitor.leave(arena, id);
}

/// Walks every root-reachable node in `arena`, starting from its root.
pub fn walk_from_root<V: Visitor>(arena: &mut Arena, visitor: &mut V) {
    if let Some(root) = arena.root() {
        walk(arena, root, visitor);
    }
}
