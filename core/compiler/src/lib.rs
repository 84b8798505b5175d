//! Thin orchestration over `scriptlang-ast` and `scriptlang-sema`.
//!
//! This crate owns no analysis logic of its own — it wires the two
//! lower-level crates together behind a typestate that makes "ran the
//! optimizer before symbol collection" a compile error rather than a
//! runtime one. Building the AST in the first place (lexing, parsing) and
//! turning the analyzed tree into bytecode are both out of scope here; a
//! caller hands this crate an already-built [`scriptlang_ast::Arena`] and
//! gets back a fully analyzed one plus its diagnostics.

pub mod pipeline;

pub use pipeline::{Analyzed, AnalysisPipeline, Initial, SymbolsCollected, TypesDetermined};
pub use scriptlang_sema::{
    dump_tree, AnalysisError, CallGraph, Diagnostic, DiagnosticLog, Expectation,
    GlobalInitializerMode, OptimizationOptions, OptimizerReport, PrettyPrintOpts, Severity,
    SymbolTable,
};

use scriptlang_ast::Arena;

/// Runs the full fixed pipeline — symbol collection, type determination,
/// analysis, and (if `optimize` is `Some`) the optimizer — and returns the
/// analyzed arena alongside its symbol table and diagnostics.
///
/// This is the one-call convenience path for a caller that doesn't need to
/// inspect intermediate pipeline states; anyone who does should build an
/// [`AnalysisPipeline`] directly instead.
pub fn analyze(
    arena: Arena,
    global_mode: GlobalInitializerMode,
    optimize: Option<OptimizationOptions>,
) -> Result<(Arena, SymbolTable, DiagnosticLog), AnalysisError> {
    let mut pipeline = AnalysisPipeline::new(arena)
        .collect_symbols()?
        .determine_types()
        .analyze(global_mode)?;

    if let Some(options) = optimize {
        let _ = pipeline.optimize(options);
    }

    Ok(pipeline.into_parts())
}
