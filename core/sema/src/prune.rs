//! The three dead-code pruners the optimizer runs to a fixed point:
//! unreferenced locals, then unreferenced globals, then uncalled functions.
//! Each pass recomputes usage from the tree as it stands *now* rather than
//! trusting [`crate::symbol_table::Symbol::is_used`], since pruning one kind
//! of dead code routinely makes another kind dead (a global only read by a
//! function that itself just got pruned).

use rustc_hash::FxHashSet;
use scriptlang_ast::{Arena, NodeId, NodeKind};

use crate::codes;
use crate::diagnostics::DiagnosticLog;
use crate::passes::CallGraph;
use crate::symbol_table::SymbolId;

fn referenced_symbols(arena: &Arena, node: NodeId, out: &mut FxHashSet<SymbolId>) {
    let n = arena.get(node);
    if let NodeKind::IdentifierExpression(_) | NodeKind::FunctionCallExpression(_) = &n.kind {
        if let Some(sym) = n.symbol.get() {
            out.insert(sym);
        }
    }
    for child in arena.children(node) {
        referenced_symbols(arena, *child, out);
    }
}

/// Whether `node` or anything under it can have an observable side effect
/// (a call, or an assignment) — the cases a dead local's initializer must
/// be kept around for even once the local itself is unused.
fn has_side_effect(arena: &Arena, node: NodeId) -> bool {
    if matches!(
        arena.get(node).kind,
        NodeKind::FunctionCallExpression(_) | NodeKind::AssignmentExpression(_)
    ) {
        return true;
    }
    arena.children(node).iter().any(|&child| has_side_effect(arena, child))
}

/// Detaches every `LocalDeclaration` whose symbol is never referenced
/// elsewhere in its own function/event body. Returns how many were pruned.
pub fn prune_locals(arena: &mut Arena, diagnostics: &DiagnosticLog) -> usize {
    let Some(root) = arena.root() else { return 0 };
    let mut bodies = Vec::new();
    for child in arena.children(root).to_vec() {
        match &arena.get(child).kind {
            NodeKind::GlobalFunction(_) => bodies.push(child),
            NodeKind::State(_) => {
                for handler in arena.children(child).to_vec() {
                    if matches!(arena.get(handler).kind, NodeKind::EventHandler(_)) {
                        bodies.push(handler);
                    }
                }
            }
            _ => {}
        }
    }

    let mut pruned = 0;
    for body in bodies {
        let mut used = FxHashSet::default();
        referenced_symbols(arena, body, &mut used);

        let mut locals = Vec::new();
        collect_local_declarations(arena, body, &mut locals);
        for local in locals {
            let NodeKind::LocalDeclaration(decl) = &arena.get(local).kind else { continue };
            let Some(symbol) = arena.get(local).symbol.get() else { continue };
            if used.contains(&symbol) {
                continue;
            }
            diagnostics.warning(codes::UNUSED_LOCAL, arena.get(local).location, codes::unused_local(&decl.name));

            let initializer = decl.has_initializer.then(|| arena.child(local, 0)).flatten();
            match initializer {
                Some(init) if has_side_effect(arena, init) => {
                    let location = arena.get(local).location;
                    arena.detach(init);
                    let stmt = arena.alloc(location, NodeKind::ExpressionStatement);
                    arena.push_child(stmt, init);
                    arena.replace_node(local, stmt);
                }
                _ => arena.detach(local),
            }
            pruned += 1;
        }
    }
    pruned
}

fn collect_local_declarations(arena: &Arena, node: NodeId, out: &mut Vec<NodeId>) {
    if matches!(arena.get(node).kind, NodeKind::LocalDeclaration(_)) {
        out.push(node);
    }
    for child in arena.children(node) {
        collect_local_declarations(arena, *child, out);
    }
}

/// Detaches every `GlobalFunction` unreachable from a root event handler or
/// global initializer.
pub fn prune_functions(arena: &mut Arena, diagnostics: &DiagnosticLog) -> usize {
    let Some(root) = arena.root() else { return 0 };
    let graph = CallGraph::build(arena);
    let reachable = graph.reachable_from_roots();

    let mut pruned = 0;
    for child in arena.children(root).to_vec() {
        let NodeKind::GlobalFunction(func) = arena.get(child).kind.clone() else { continue };
        let Some(symbol) = arena.get(child).symbol.get() else { continue };
        if reachable.contains(&symbol) {
            continue;
        }
        diagnostics.warning(codes::UNUSED_FUNCTION, arena.get(child).location, codes::unused_function(&func.name));
        arena.detach(child);
        pruned += 1;
    }
    pruned
}

/// Detaches every `GlobalVariable` never referenced anywhere in the
/// remaining tree.
pub fn prune_globals(arena: &mut Arena, diagnostics: &DiagnosticLog) -> usize {
    let Some(root) = arena.root() else { return 0 };
    let mut used: FxHashSet<SymbolId> = FxHashSet::default();
    for child in arena.children(root).to_vec() {
        referenced_symbols(arena, child, &mut used);
    }

    let mut pruned = 0;
    for child in arena.children(root).to_vec() {
        let NodeKind::GlobalVariable(decl) = arena.get(child).kind.clone() else { continue };
        let Some(symbol) = arena.get(child).symbol.get() else { continue };
        if used.contains(&symbol) {
            continue;
        }
        diagnostics.warning(codes::UNUSED_GLOBAL, arena.get(child).location, codes::unused_global(&decl.name));
        arena.detach(child);
        pruned += 1;
    }
    pruned
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptlang_ast::{Declaration, GlobalFunction, Identifier, Location, ValueType};

    const GLOBAL_SYMBOL: SymbolId = 1;

    /// A global `g`, and a function whose only local reads `g` in its
    /// initializer but is itself never used. Pruning the dead local must
    /// remove `g`'s only reference, and a later `prune_globals` pass must
    /// then be able to remove `g` too — usage only ever shrinks across
    /// successive pruning passes, never grows.
    fn script_with_dead_local_referencing_global(arena: &mut Arena) -> (NodeId, NodeId) {
        let loc = Location::synthetic();
        let script = arena.alloc(loc, NodeKind::Script);
        arena.set_root(script);

        let global = arena.alloc(
            loc,
            NodeKind::GlobalVariable(Declaration { name: "g".to_string(), declared_type: ValueType::Integer, has_initializer: false }),
        );
        arena.get(global).symbol.set(Some(GLOBAL_SYMBOL));
        arena.push_child(script, global);

        let func = arena.alloc(
            loc,
            NodeKind::GlobalFunction(GlobalFunction { name: "f".to_string(), return_type: ValueType::Void }),
        );
        arena.push_child(script, func);

        let reference = arena.alloc(loc, NodeKind::IdentifierExpression(Identifier { name: "g".to_string() }));
        arena.get(reference).symbol.set(Some(GLOBAL_SYMBOL));
        let local = arena.alloc(
            loc,
            NodeKind::LocalDeclaration(Declaration { name: "unused".to_string(), declared_type: ValueType::Integer, has_initializer: true }),
        );
        arena.get(local).symbol.set(Some(2));
        arena.push_child(local, reference);
        arena.push_child(func, local);

        (global, func)
    }

    #[test]
    fn pruning_a_dead_local_never_adds_a_reference_and_unlocks_its_global() {
        let mut arena = Arena::new();
        let (global, _func) = script_with_dead_local_referencing_global(&mut arena);
        let diagnostics = DiagnosticLog::new();

        let mut before = FxHashSet::default();
        referenced_symbols(&arena, arena.root().unwrap(), &mut before);
        assert!(before.contains(&GLOBAL_SYMBOL));

        let locals_pruned = prune_locals(&mut arena, &diagnostics);
        assert_eq!(locals_pruned, 1);

        let mut after_locals = FxHashSet::default();
        referenced_symbols(&arena, arena.root().unwrap(), &mut after_locals);
        assert!(after_locals.is_subset(&before), "pruning introduced a reference that wasn't there before");
        assert!(!after_locals.contains(&GLOBAL_SYMBOL));

        let globals_pruned = prune_globals(&mut arena, &diagnostics);
        assert_eq!(globals_pruned, 1);
        assert!(arena.parent(global).is_none());
    }
}
