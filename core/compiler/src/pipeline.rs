//! Typestate-enforced orchestration of the semantic pipeline.
//!
//! Each state is a zero-sized marker; the methods available on
//! `AnalysisPipeline<S>` are exactly the ones legal to call having reached
//! state `S`, so `optimize()` simply doesn't exist as a method until the
//! pipeline has passed through `determine_types()` — the ordering
//! requirement is a compile error for a misordered caller, not a runtime
//! check they might not hit in testing.

use std::marker::PhantomData;

use scriptlang_ast::Arena;
use scriptlang_sema::{
    analyze_structural_jumps, optimize, AnalysisError, CallGraph, ConstantFolding, DiagnosticLog,
    FinalCheck, GlobalInitializerMode, GlobalValidation, OptimizationOptions, OptimizerReport,
    SymbolCollection, SymbolTable, TypeDetermination,
};

pub struct Initial;
pub struct SymbolsCollected;
pub struct TypesDetermined;
pub struct Analyzed;

pub struct AnalysisPipeline<S> {
    arena: Arena,
    symbols: SymbolTable,
    diagnostics: DiagnosticLog,
    call_graph: Option<CallGraph>,
    _state: PhantomData<S>,
}

impl AnalysisPipeline<Initial> {
    #[must_use]
    pub fn new(arena: Arena) -> Self {
        Self {
            arena,
            symbols: SymbolTable::new(),
            diagnostics: DiagnosticLog::new(),
            call_graph: None,
            _state: PhantomData,
        }
    }

    /// Declares every global, function, state, parameter, and local, and
    /// resolves every identifier occurrence and call to the symbol it
    /// names.
    pub fn collect_symbols(mut self) -> Result<AnalysisPipeline<SymbolsCollected>, AnalysisError> {
        SymbolCollection::run(&mut self.arena, &mut self.symbols, &self.diagnostics)?;
        Ok(self.into_state())
    }
}

impl AnalysisPipeline<SymbolsCollected> {
    /// Assigns `Node::value_type` to every expression, bottom-up.
    #[must_use]
    pub fn determine_types(mut self) -> AnalysisPipeline<TypesDetermined> {
        TypeDetermination::run(&mut self.arena, &self.symbols, &self.diagnostics);
        self.into_state()
    }
}

impl AnalysisPipeline<TypesDetermined> {
    /// Builds the call graph, folds constants once, runs the final
    /// function-level checks, then validates global initializers.
    pub fn analyze(mut self, global_mode: GlobalInitializerMode) -> Result<AnalysisPipeline<Analyzed>, AnalysisError> {
        self.call_graph = Some(CallGraph::build(&self.arena));
        analyze_structural_jumps(&self.arena, &self.symbols);
        ConstantFolding::run(&mut self.arena, &self.diagnostics);
        FinalCheck::run(&self.arena, &self.diagnostics);
        // Reaching `TypesDetermined` already proves type determination ran.
        GlobalValidation::run(&self.arena, &self.diagnostics, global_mode, true)?;
        Ok(self.into_state())
    }

    /// Runs the optimizer. Available from this state onward, since the
    /// optimizer's own ordering requirement (symbol collection and type
    /// determination must already have run) is exactly what reaching this
    /// state proves.
    pub fn optimize(&mut self, options: OptimizationOptions) -> Result<OptimizerReport, AnalysisError> {
        optimize(&mut self.arena, &self.diagnostics, options, true)
    }
}

impl AnalysisPipeline<Analyzed> {
    pub fn optimize(&mut self, options: OptimizationOptions) -> Result<OptimizerReport, AnalysisError> {
        optimize(&mut self.arena, &self.diagnostics, options, true)
    }

    #[must_use]
    pub fn into_parts(self) -> (Arena, SymbolTable, DiagnosticLog) {
        (self.arena, self.symbols, self.diagnostics)
    }
}

impl<S> AnalysisPipeline<S> {
    #[must_use]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    #[must_use]
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    #[must_use]
    pub fn diagnostics(&self) -> &DiagnosticLog {
        &self.diagnostics
    }

    #[must_use]
    pub fn call_graph(&self) -> Option<&CallGraph> {
        self.call_graph.as_ref()
    }

    fn into_state<T>(self) -> AnalysisPipeline<T> {
        AnalysisPipeline {
            arena: self.arena,
            symbols: self.symbols,
            diagnostics: self.diagnostics,
            call_graph: self.call_graph,
            _state: PhantomData,
        }
    }
}
