//! Semantic analysis: symbols, scopes, diagnostics, the fixed pass
//! pipeline, and the optimizer built on top of it.
//!
//! This crate depends on `scriptlang-ast` but never the reverse — the AST
//! stays ignorant of symbols and diagnostics so a parser can build one
//! without linking analysis machinery. Orchestrating these passes in the
//! right order is `scriptlang-compiler`'s job, not this crate's; see that
//! crate's `pipeline` module for the typestate that enforces it.

pub mod builtins;
pub mod codes;
pub mod diagnostics;
pub mod dump;
pub mod errors;
pub mod mangler;
pub mod numeric;
pub mod optimizer;
pub mod passes;
pub mod prune;
pub mod symbol_table;

pub use builtins::declare_builtins;
pub use diagnostics::{Diagnostic, DiagnosticLog, Expectation, Severity};
pub use dump::{dump_tree, PrettyPrintOpts};
pub use errors::AnalysisError;
pub use mangler::{mangle_all, mangled_name};
pub use optimizer::{optimize, OptimizationOptions, OptimizerReport};
pub use passes::{
    analyze_structural_jumps, CallGraph, ConstantFolding, FinalCheck, GlobalInitializerMode,
    GlobalValidation, SymbolCollection, TypeDetermination,
};
pub use symbol_table::{DeclareOutcome, Scope, ScopeId, ScopeKind, Symbol, SymbolId, SymbolKind, SymbolTable};
