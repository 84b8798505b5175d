//! The AST arena.
//!
//! Rust doesn't let safe code build a tree of owned nodes that also point
//! back at their parent, so the tree is split in two: [`Node`] payloads live
//! in a flat table keyed by [`NodeId`], and a separate [`Link`] table records
//! parent/slot/children. Mutating the tree — replacing a node, detaching a
//! subtree during dead-code pruning — only ever touches `Link` entries; the
//! payload a [`NodeId`] points at never moves.

use rustc_hash::FxHashMap;

use crate::node::{Node, NodeId, NodeKind};
use crate::location::Location;

/// One entry in the topology table.
#[derive(Clone, Debug, Default)]
struct Link {
    parent: Option<NodeId>,
    /// This node's index in its parent's child list, kept in sync by
    /// [`Arena::replace_node`] and [`Arena::detach`] so a node always knows
    /// where it sits without a linear scan.
    slot: usize,
    children: Vec<NodeId>,
}

/// Arena-allocated, handle-addressed AST.
///
/// `next_id` only ever increases; ids are never reused, even for detached
/// nodes, so a stale [`NodeId`] captured before a `replace_node` reliably
/// fails a lookup instead of silently resolving to unrelated data.
#[derive(Debug, Default)]
pub struct Arena {
    nodes: FxHashMap<NodeId, Node>,
    links: FxHashMap<NodeId, Link>,
    /// Allocation order, oldest first. Used for diagnostics that must walk
    /// every live node regardless of tree shape (e.g. the leak check in
    /// debug builds of the reference implementation this one is modeled on).
    order: Vec<NodeId>,
    next_id: NodeId,
    root: Option<NodeId>,
}

impl Arena {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: FxHashMap::default(),
            links: FxHashMap::default(),
            order: Vec::new(),
            next_id: 1,
            root: None,
        }
    }

    /// Allocates a new, parentless node and returns its id. Callers attach it
    /// into the tree with [`Arena::push_child`] or [`Arena::set_root`].
    pub fn alloc(&mut self, location: Location, kind: NodeKind) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        self.nodes.insert(id, Node::new(location, kind));
        self.links.insert(id, Link::default());
        self.order.push(id);
        id
    }

    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> &Node {
        self.nodes.get(&id).expect("dangling NodeId")
    }

    /// Appends `child` to `parent`'s child list. Panics if `child` already
    /// has a parent — detach it first.
    pub fn push_child(&mut self, parent: NodeId, child: NodeId) {
        assert!(
            self.links.get(&child).expect("dangling NodeId").parent.is_none(),
            "node {child} already has a parent"
        );
        let slot = self.links[&parent].children.len();
        self.links.get_mut(&parent).expect("dangling NodeId").children.push(child);
        let link = self.links.get_mut(&child).expect("dangling NodeId");
        link.parent = Some(parent);
        link.slot = slot;
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.links.get(&id).and_then(|l| l.parent)
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.links.get(&id).map_or(&[], |l| l.children.as_slice())
    }

    #[must_use]
    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).get(index).copied()
    }

    /// Every node in allocation order, not tree order. Stable across
    /// `replace_node` calls — a rewrite doesn't renumber earlier nodes.
    pub fn iter_all(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.order.iter().copied()
    }

    /// Removes `old` from its parent's child list, without freeing `old`'s
    /// own subtree — a pruning pass can still inspect it afterwards via its
    /// `NodeId`, it's just no longer reachable from the root.
    pub fn detach(&mut self, old: NodeId) {
        let Some(parent) = self.links[&old].parent else {
            return;
        };
        let siblings = &mut self.links.get_mut(&parent).expect("dangling NodeId").children;
        let pos = siblings.iter().position(|&c| c == old).expect("link table corrupt");
        siblings.remove(pos);
        for (new_slot, &sibling) in siblings.iter().enumerate().skip(pos) {
            self.links.get_mut(&sibling).expect("dangling NodeId").slot = new_slot;
        }
        let link = self.links.get_mut(&old).expect("dangling NodeId");
        link.parent = None;
        link.slot = 0;
    }

    /// Replaces `old` with `new` in `old`'s parent's child list, preserving
    /// `new`'s position. Used by constant folding to swap a foldable
    /// expression for its folded constant-expression wrapper in place,
    /// without the caller having to know or recompute the parent/slot.
    ///
    /// If `old` is the arena root, `new` becomes the new root instead.
    pub fn replace_node(&mut self, old: NodeId, new: NodeId) {
        assert!(
            self.links.get(&new).expect("dangling NodeId").parent.is_none(),
            "replacement node {new} already has a parent"
        );
        match self.links[&old].parent {
            Some(parent) => {
                let slot = self.links[&old].slot;
                self.links.get_mut(&parent).expect("dangling NodeId").children[slot] = new;
                let new_link = self.links.get_mut(&new).expect("dangling NodeId");
                new_link.parent = Some(parent);
                new_link.slot = slot;
            }
            None => {
                if self.root == Some(old) {
                    self.root = Some(new);
                }
            }
        }
        let old_link = self.links.get_mut(&old).expect("dangling NodeId");
        old_link.parent = None;
        old_link.slot = 0;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Declaration;
    use crate::value_type::ValueType;

    fn leaf(arena: &mut Arena, kind: NodeKind) -> NodeId {
        arena.alloc(Location::synthetic(), kind)
    }

    #[test]
    fn push_child_sets_parent_and_slot() {
        let mut arena = Arena::new();
        let parent = leaf(&mut arena, NodeKind::CompoundStatement);
        let a = leaf(&mut arena, NodeKind::ExpressionStatement);
        let b = leaf(&mut arena, NodeKind::ExpressionStatement);
        arena.push_child(parent, a);
        arena.push_child(parent, b);

        assert_eq!(arena.children(parent), &[a, b]);
        assert_eq!(arena.parent(a), Some(parent));
        assert_eq!(arena.parent(b), Some(parent));
    }

    #[test]
    fn detach_removes_from_parent_and_fixes_slots() {
        let mut arena = Arena::new();
        let parent = leaf(&mut arena, NodeKind::CompoundStatement);
        let a = leaf(&mut arena, NodeKind::ExpressionStatement);
        let b = leaf(&mut arena, NodeKind::ExpressionStatement);
        let c = leaf(&mut arena, NodeKind::ExpressionStatement);
        arena.push_child(parent, a);
        arena.push_child(parent, b);
        arena.push_child(parent, c);

        arena.detach(a);

        assert_eq!(arena.children(parent), &[b, c]);
        assert_eq!(arena.parent(a), None);
        assert_eq!(arena.parent(b), Some(parent));
        assert_eq!(arena.links[&b].slot, 0);
        assert_eq!(arena.links[&c].slot, 1);
    }

    #[test]
    fn replace_node_preserves_slot() {
        let mut arena = Arena::new();
        let parent = leaf(&mut arena, NodeKind::CompoundStatement);
        let a = leaf(&mut arena, NodeKind::ExpressionStatement);
        let b = leaf(&mut arena, NodeKind::ExpressionStatement);
        arena.push_child(parent, a);
        arena.push_child(parent, b);

        let folded = leaf(&mut arena, NodeKind::ConstantExpression);
        arena.replace_node(a, folded);

        assert_eq!(arena.children(parent), &[folded, b]);
        assert_eq!(arena.parent(folded), Some(parent));
        assert_eq!(arena.parent(a), None);
    }

    #[test]
    fn replace_root() {
        let mut arena = Arena::new();
        let decl = Declaration {
            name: "x".to_string(),
            declared_type: ValueType::Integer,
            has_initializer: false,
        };
        let root = leaf(&mut arena, NodeKind::GlobalVariable(decl));
        arena.set_root(root);

        let replacement = leaf(&mut arena, NodeKind::CompoundStatement);
        arena.replace_node(root, replacement);

        assert_eq!(arena.root(), Some(replacement));
    }

    #[test]
    #[should_panic(expected = "already has a parent")]
    fn push_child_twice_panics() {
        let mut arena = Arena::new();
        let parent_a = leaf(&mut arena, NodeKind::CompoundStatement);
        let parent_b = leaf(&mut arena, NodeKind::CompoundStatement);
        let child = leaf(&mut arena, NodeKind::ExpressionStatement);
        arena.push_child(parent_a, child);
        arena.push_child(parent_b, child);
    }

    /// For every non-root node N reachable from `root`, N.parent.children[N.slot] == N.
    fn assert_well_formed(arena: &Arena, root: NodeId) {
        fn walk(arena: &Arena, node: NodeId) {
            for &child in arena.children(node) {
                assert_eq!(arena.parent(child), Some(node));
                let slot = arena.links[&child].slot;
                assert_eq!(arena.children(node)[slot], child);
                walk(arena, child);
            }
        }
        walk(arena, root);
    }

    #[test]
    fn tree_is_well_formed_after_detach_and_replace() {
        let mut arena = Arena::new();
        let root = leaf(&mut arena, NodeKind::CompoundStatement);
        arena.set_root(root);
        let a = leaf(&mut arena, NodeKind::ExpressionStatement);
        let b = leaf(&mut arena, NodeKind::ExpressionStatement);
        let c = leaf(&mut arena, NodeKind::ExpressionStatement);
        arena.push_child(root, a);
        arena.push_child(root, b);
        arena.push_child(root, c);
        assert_well_formed(&arena, root);

        arena.detach(b);
        assert_well_formed(&arena, root);

        let replacement = leaf(&mut arena, NodeKind::ConstantExpression);
        arena.replace_node(c, replacement);
        assert_well_formed(&arena, root);
    }

    #[test]
    fn every_node_reachable_from_root_is_in_allocation_order() {
        let mut arena = Arena::new();
        let root = leaf(&mut arena, NodeKind::CompoundStatement);
        arena.set_root(root);
        let a = leaf(&mut arena, NodeKind::ExpressionStatement);
        let b = leaf(&mut arena, NodeKind::ExpressionStatement);
        arena.push_child(root, a);
        arena.push_child(a, b);

        fn reachable(arena: &Arena, node: NodeId, out: &mut Vec<NodeId>) {
            out.push(node);
            for &child in arena.children(node) {
                reachable(arena, child, out);
            }
        }
        let mut seen = Vec::new();
        reachable(&arena, root, &mut seen);

        let tracked: Vec<NodeId> = arena.iter_all().collect();
        for node in seen {
            assert!(tracked.contains(&node), "node {node} reachable from root but missing from iter_all()");
        }
    }
}
