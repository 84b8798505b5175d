//! Pass 3: builds the call graph dead-code pruning needs, now that symbol
//! collection has resolved every call site to a symbol.
//!
//! An edge `caller -> callee` is recorded for every function-call
//! expression inside `caller`'s body. Event handlers have no symbol of
//! their own (their names repeat across states), so rather than modeling
//! them as graph nodes, anything they reference is folded directly into
//! the root set: a function or global called from a handler the runtime
//! can invoke unprompted is reachable by definition.

use rustc_hash::FxHashMap;
use scriptlang_ast::{Arena, NodeId, NodeKind};

use crate::symbol_table::{SymbolId, SymbolTable};

/// Event names the runtime can deliver unprompted. A handler with one of
/// these names is always reachable, regardless of whether anything in the
/// script calls it.
pub(crate) const EVENT_HANDLER_NAMES: &[&str] = &[
    "state_entry",
    "state_exit",
    "touch_start",
    "touch",
    "touch_end",
    "timer",
    "listen",
    "on_rez",
    "collision_start",
    "collision",
    "collision_end",
    "changed",
    "attach",
    "moving_start",
    "moving_end",
    "no_sensor",
    "sensor",
    "at_target",
    "not_at_target",
    "at_rot_target",
    "not_at_rot_target",
    "money",
    "email",
    "run_time_permissions",
    "http_response",
    "link_message",
    "object_rez",
    "remote_data",
    "dataserver",
];

#[derive(Debug, Default)]
pub struct CallGraph {
    pub edges: FxHashMap<SymbolId, Vec<SymbolId>>,
    /// Functions and globals directly referenced from a reachable event
    /// handler or a global variable initializer.
    pub roots: Vec<SymbolId>,
}

impl CallGraph {
    #[must_use]
    pub fn build(arena: &Arena) -> Self {
        let mut graph = CallGraph::default();
        let Some(root) = arena.root() else { return graph };

        for child in arena.children(root).to_vec() {
            match &arena.get(child).kind {
                NodeKind::GlobalFunction(_) => {
                    if let Some(owner) = arena.get(child).symbol.get() {
                        collect_references(arena, child, &mut |sym| {
                            graph.edges.entry(owner).or_default().push(sym);
                        });
                    }
                }
                NodeKind::GlobalVariable(decl) if decl.has_initializer => {
                    if let Some(init) = arena.child(child, 0) {
                        collect_references(arena, init, &mut |sym| graph.roots.push(sym));
                    }
                }
                NodeKind::State(_) => {
                    for handler in arena.children(child).to_vec() {
                        let NodeKind::EventHandler(ev) = &arena.get(handler).kind else { continue };
                        if EVENT_HANDLER_NAMES.contains(&ev.name.as_str()) {
                            collect_references(arena, handler, &mut |sym| graph.roots.push(sym));
                        }
                    }
                }
                _ => {}
            }
        }

        graph.roots.sort_unstable();
        graph.roots.dedup();
        graph
    }

    /// The transitive closure of `roots` over `edges`: every symbol a live
    /// entry point can reach by direct or indirect call.
    #[must_use]
    pub fn reachable_from_roots(&self) -> std::collections::HashSet<SymbolId> {
        let mut seen: std::collections::HashSet<SymbolId> = self.roots.iter().copied().collect();
        let mut stack: Vec<SymbolId> = self.roots.clone();
        while let Some(id) = stack.pop() {
            if let Some(callees) = self.edges.get(&id) {
                for &callee in callees {
                    if seen.insert(callee) {
                        stack.push(callee);
                    }
                }
            }
        }
        seen
    }
}

/// Sets `has_jumps`/`has_unstructured_jumps` on every function and event
/// handler's symbol table entry.
///
/// A jump is structured only when both: its target label appears later in
/// the arena's allocation order than the jump itself (since nodes are
/// allocated in source order, that means the label lies textually forward
/// of the jump — the `break`-like case of jumping out of a loop to a label
/// just past it), and the jump itself sits inside at least one enclosing
/// loop at the point it appears. A jump to a label at or before its own
/// position is a backward jump and always counts as unstructured; a
/// forward jump with no enclosing loop at all (nothing to "break out of")
/// is unstructured too.
pub fn analyze_structural_jumps(arena: &Arena, symbols: &SymbolTable) {
    let Some(root) = arena.root() else { return };
    for child in arena.children(root).to_vec() {
        match &arena.get(child).kind {
            NodeKind::GlobalFunction(_) => {
                if let Some(owner) = arena.get(child).symbol.get() {
                    analyze_body_jumps(arena, child, owner, symbols);
                }
            }
            NodeKind::State(_) => {
                for handler in arena.children(child).to_vec() {
                    if matches!(arena.get(handler).kind, NodeKind::EventHandler(_)) {
                        // Event handlers have no symbol of their own; jump
                        // structure within one has nothing further to
                        // attribute it to, but we still want the analysis
                        // to visit it for completeness (a handler could in
                        // principle be extended to carry flags the same way
                        // a function does).
                        analyze_body_jumps_untracked(arena, handler);
                    }
                }
            }
            _ => {}
        }
    }
}

fn analyze_body_jumps(arena: &Arena, owner: NodeId, symbol: SymbolId, symbols: &SymbolTable) {
    let mut has_jumps = false;
    let mut has_unstructured = false;
    walk_jumps(arena, owner, 0, &mut |jump_id, label_symbol, loop_depth| {
        has_jumps = true;
        let label_node = symbols.symbol(label_symbol).node;
        if label_node <= jump_id || loop_depth == 0 {
            has_unstructured = true;
        }
    });
    symbols.symbol(symbol).set_jump_flags(has_jumps, has_unstructured);
}

fn analyze_body_jumps_untracked(arena: &Arena, owner: NodeId) {
    walk_jumps(arena, owner, 0, &mut |_, _, _| {});
}

/// Invokes `record(jump_node_id, label_symbol_id, loop_depth)` for every
/// resolved jump statement found in `owner`'s subtree, where `loop_depth`
/// is the number of `while`/`do-while`/`for` loops lexically enclosing the
/// jump at the point it appears.
fn walk_jumps(arena: &Arena, node: NodeId, loop_depth: usize, record: &mut dyn FnMut(NodeId, SymbolId, usize)) {
    if let NodeKind::JumpStatement { .. } = &arena.get(node).kind {
        if let Some(label_symbol) = arena.get(node).symbol.get() {
            record(node, label_symbol, loop_depth);
        }
    }
    let child_depth = if matches!(
        arena.get(node).kind,
        NodeKind::WhileStatement | NodeKind::DoWhileStatement | NodeKind::ForStatement(_)
    ) {
        loop_depth + 1
    } else {
        loop_depth
    };
    for child in arena.children(node) {
        walk_jumps(arena, *child, child_depth, record);
    }
}

/// Walks `node`'s subtree, invoking `record` with the symbol of every
/// resolved identifier occurrence and function call found.
fn collect_references(arena: &Arena, node: NodeId, record: &mut dyn FnMut(SymbolId)) {
    let n = arena.get(node);
    match &n.kind {
        NodeKind::FunctionCallExpression(_) | NodeKind::IdentifierExpression(_) => {
            if let Some(sym) = n.symbol.get() {
                record(sym);
            }
        }
        _ => {}
    }
    for child in arena.children(node) {
        collect_references(arena, *child, record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptlang_ast::{Location, NodeKind, ValueType};

    #[test]
    fn empty_arena_has_no_roots() {
        let arena = Arena::new();
        let graph = CallGraph::build(&arena);
        assert!(graph.roots.is_empty());
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn unreferenced_function_contributes_no_roots() {
        let mut arena = Arena::new();
        let script = arena.alloc(Location::synthetic(), NodeKind::Script);
        arena.set_root(script);
        let func = arena.alloc(
            Location::synthetic(),
            NodeKind::GlobalFunction(scriptlang_ast::GlobalFunction {
                name: "helper".to_string(),
                return_type: ValueType::Void,
            }),
        );
        arena.push_child(script, func);

        let graph = CallGraph::build(&arena);
        assert!(graph.roots.is_empty());
    }
}
