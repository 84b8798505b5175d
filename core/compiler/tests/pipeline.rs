//! End-to-end scenarios run through the full analysis pipeline, built by
//! hand against the arena API rather than through a parser (none is part
//! of this workspace).

use scriptlang_ast::{
    Arena, BinaryOperator, Constant, Declaration, EventHandler, GlobalFunction, Location, NodeKind,
    State, ValueType,
};
use scriptlang_compiler::{AnalysisPipeline, GlobalInitializerMode, OptimizationOptions};

fn default_state_with_handler(arena: &mut Arena, script: scriptlang_ast::NodeId, event: &str) {
    let state = arena.alloc(Location::synthetic(), NodeKind::State(State { name: None, is_default: true }));
    arena.push_child(script, state);
    let handler = arena.alloc(Location::synthetic(), NodeKind::EventHandler(EventHandler { name: event.to_string() }));
    arena.push_child(state, handler);
}

#[test]
fn empty_default_state_entry_analyzes_clean() {
    let mut arena = Arena::new();
    let script = arena.alloc(Location::synthetic(), NodeKind::Script);
    arena.set_root(script);
    default_state_with_handler(&mut arena, script, "state_entry");

    let pipeline = AnalysisPipeline::new(arena)
        .collect_symbols()
        .expect("symbol collection cannot fail on a non-empty arena")
        .determine_types()
        .analyze(GlobalInitializerMode::Strict)
        .expect("prerequisites are met");

    assert!(pipeline.diagnostics().is_empty());
    assert!(pipeline.arena().root().is_some());
}

#[test]
fn duplicate_global_declaration_reports_exact_format() {
    let mut arena = Arena::new();
    let script = arena.alloc(Location::synthetic(), NodeKind::Script);
    arena.set_root(script);

    let decl = |name: &str| Declaration { name: name.to_string(), declared_type: ValueType::Integer, has_initializer: false };
    let first = arena.alloc(Location::new(3, 9, 3, 9), NodeKind::GlobalVariable(decl("a")));
    arena.push_child(script, first);
    let second = arena.alloc(Location::new(5, 9, 5, 9), NodeKind::GlobalVariable(decl("a")));
    arena.push_child(script, second);

    let pipeline = AnalysisPipeline::new(arena)
        .collect_symbols()
        .expect("symbol collection cannot fail on a non-empty arena");
    let rendered: Vec<String> = pipeline.diagnostics().entries().iter().map(ToString::to_string).collect();

    assert_eq!(rendered, vec!["ERROR:: (  5,  9): [E10001] Duplicate declaration of `a'; previously declared at (3, 9).".to_string()]);
}

#[test]
fn constant_initializer_folds_to_seven() {
    let mut arena = Arena::new();
    let script = arena.alloc(Location::synthetic(), NodeKind::Script);
    arena.set_root(script);

    let loc = Location::synthetic();
    let one = arena.alloc(loc, NodeKind::Constant(Constant::Integer(1)));
    let two = arena.alloc(loc, NodeKind::Constant(Constant::Integer(2)));
    let three = arena.alloc(loc, NodeKind::Constant(Constant::Integer(3)));
    let mul = arena.alloc(loc, NodeKind::BinaryExpression(BinaryOperator::Mul));
    arena.push_child(mul, two);
    arena.push_child(mul, three);
    let add = arena.alloc(loc, NodeKind::BinaryExpression(BinaryOperator::Add));
    arena.push_child(add, one);
    arena.push_child(add, mul);

    let decl = Declaration { name: "x".to_string(), declared_type: ValueType::Integer, has_initializer: true };
    let global = arena.alloc(loc, NodeKind::GlobalVariable(decl));
    arena.push_child(global, add);
    arena.push_child(script, global);
    default_state_with_handler(&mut arena, script, "state_entry");

    let pipeline = AnalysisPipeline::new(arena)
        .collect_symbols()
        .expect("symbol collection cannot fail on a non-empty arena")
        .determine_types()
        .analyze(GlobalInitializerMode::Strict)
        .expect("prerequisites are met");

    let arena = pipeline.arena();
    let global = arena
        .children(arena.root().unwrap())
        .iter()
        .copied()
        .find(|&c| matches!(arena.get(c).kind, NodeKind::GlobalVariable(_)))
        .expect("global survives");
    let init = arena.child(global, 0).expect("initializer");
    assert!(matches!(arena.get(init).kind, NodeKind::ConstantExpression));
    let folded = arena.child(init, 0).expect("folded constant");
    assert!(matches!(arena.get(folded).kind, NodeKind::Constant(Constant::Integer(7))));
}

#[test]
fn unused_global_is_pruned() {
    let mut arena = Arena::new();
    let script = arena.alloc(Location::synthetic(), NodeKind::Script);
    arena.set_root(script);
    let decl = Declaration { name: "unused".to_string(), declared_type: ValueType::Integer, has_initializer: true };
    let global = arena.alloc(Location::synthetic(), NodeKind::GlobalVariable(decl));
    let five = arena.alloc(Location::synthetic(), NodeKind::Constant(Constant::Integer(5)));
    arena.push_child(global, five);
    arena.push_child(script, global);
    default_state_with_handler(&mut arena, script, "state_entry");

    let mut pipeline = AnalysisPipeline::new(arena)
        .collect_symbols()
        .expect("symbol collection cannot fail on a non-empty arena")
        .determine_types()
        .analyze(GlobalInitializerMode::Strict)
        .expect("prerequisites are met");

    let options = OptimizationOptions { prune_globals: true, ..OptimizationOptions::default() };
    pipeline.optimize(options).expect("prerequisites are met");

    let (arena, _, _) = pipeline.into_parts();
    let globals_left = arena
        .children(arena.root().unwrap())
        .iter()
        .filter(|&&c| matches!(arena.get(c).kind, NodeKind::GlobalVariable(_)))
        .count();
    assert_eq!(globals_left, 0);
}

#[test]
fn backward_jump_is_unstructured_forward_exit_is_structured() {
    use scriptlang_ast::NodeId;

    let mut arena = Arena::new();
    let script = arena.alloc(Location::synthetic(), NodeKind::Script);
    arena.set_root(script);

    // integer unstructured() { @top; jump top; }
    let unstructured = arena.alloc(
        Location::synthetic(),
        NodeKind::GlobalFunction(GlobalFunction { name: "unstructured".to_string(), return_type: ValueType::Void }),
    );
    arena.push_child(script, unstructured);
    let top_label = arena.alloc(Location::synthetic(), NodeKind::LabelStatement { name: "top".to_string() });
    arena.push_child(unstructured, top_label);
    let jump_top = arena.alloc(Location::synthetic(), NodeKind::JumpStatement { label: "top".to_string() });
    arena.push_child(unstructured, jump_top);

    // integer structured(integer c) { while(c) { jump done; } @done; }
    let structured = arena.alloc(
        Location::synthetic(),
        NodeKind::GlobalFunction(GlobalFunction { name: "structured".to_string(), return_type: ValueType::Void }),
    );
    arena.push_child(script, structured);
    let param = arena.alloc(
        Location::synthetic(),
        NodeKind::Parameter(Declaration { name: "c".to_string(), declared_type: ValueType::Integer, has_initializer: false }),
    );
    arena.push_child(structured, param);
    let while_stmt = arena.alloc(Location::synthetic(), NodeKind::WhileStatement);
    arena.push_child(structured, while_stmt);
    let cond = arena.alloc(
        Location::synthetic(),
        NodeKind::IdentifierExpression(scriptlang_ast::Identifier { name: "c".to_string() }),
    );
    arena.push_child(while_stmt, cond);
    let body: NodeId = arena.alloc(Location::synthetic(), NodeKind::CompoundStatement);
    arena.push_child(while_stmt, body);
    let jump_done = arena.alloc(Location::synthetic(), NodeKind::JumpStatement { label: "done".to_string() });
    arena.push_child(body, jump_done);
    let done_label = arena.alloc(Location::synthetic(), NodeKind::LabelStatement { name: "done".to_string() });
    arena.push_child(structured, done_label);

    let pipeline = AnalysisPipeline::new(arena)
        .collect_symbols()
        .expect("symbol collection cannot fail on a non-empty arena")
        .determine_types()
        .analyze(GlobalInitializerMode::Strict)
        .expect("prerequisites are met");

    let symbols = pipeline.symbols();
    let arena = pipeline.arena();
    let find_symbol = |name: &str| {
        arena
            .children(arena.root().unwrap())
            .iter()
            .copied()
            .find(|&c| matches!(&arena.get(c).kind, NodeKind::GlobalFunction(f) if f.name == name))
            .and_then(|c| arena.get(c).symbol.get())
            .expect("function symbol")
    };

    let unstructured_symbol = symbols.symbol(find_symbol("unstructured"));
    assert!(unstructured_symbol.has_jumps());
    assert!(unstructured_symbol.has_unstructured_jumps());

    let structured_symbol = symbols.symbol(find_symbol("structured"));
    assert!(structured_symbol.has_jumps());
    assert!(!structured_symbol.has_unstructured_jumps());
}

/// Running the same script through the pipeline twice (two independently
/// built but identical arenas) must produce the exact same diagnostics —
/// same codes, same lines, same order. Nothing in the pipeline may depend on
/// hash-map iteration order or other incidental state.
#[test]
fn diagnostics_are_stable_across_repeated_runs() {
    fn build_and_analyze() -> Vec<String> {
        let mut arena = Arena::new();
        let script = arena.alloc(Location::synthetic(), NodeKind::Script);
        arena.set_root(script);

        let decl = |name: &str| Declaration { name: name.to_string(), declared_type: ValueType::Integer, has_initializer: false };
        let first = arena.alloc(Location::new(3, 9, 3, 9), NodeKind::GlobalVariable(decl("a")));
        arena.push_child(script, first);
        let second = arena.alloc(Location::new(5, 9, 5, 9), NodeKind::GlobalVariable(decl("a")));
        arena.push_child(script, second);
        default_state_with_handler(&mut arena, script, "state_entry");

        let pipeline = AnalysisPipeline::new(arena)
            .collect_symbols()
            .expect("symbol collection cannot fail on a non-empty arena")
            .determine_types()
            .analyze(GlobalInitializerMode::Strict)
            .expect("prerequisites are met");

        pipeline.diagnostics().entries().iter().map(ToString::to_string).collect()
    }

    assert_eq!(build_and_analyze(), build_and_analyze());
}
