//! The optimizer driver: fold constants, then prune locals, globals, and
//! functions, repeating until a round changes nothing.
//!
//! Each prune pass can expose new folding opportunities (a pruned function
//! was the last reference keeping a global's initializer non-trivial) and
//! vice versa, so the driver loops rather than running each step once.

use scriptlang_ast::Arena;

use crate::diagnostics::DiagnosticLog;
use crate::errors::AnalysisError;
use crate::passes::ConstantFolding;
use crate::prune;

#[derive(Clone, Copy, Debug)]
pub struct OptimizationOptions {
    pub fold_constants: bool,
    pub prune_locals: bool,
    pub prune_globals: bool,
    pub prune_functions: bool,
    /// Safety valve against a pathological fixed-point loop; the reference
    /// pipeline never needs more than a handful of rounds.
    pub max_rounds: usize,
}

impl Default for OptimizationOptions {
    fn default() -> Self {
        Self {
            fold_constants: false,
            prune_locals: false,
            prune_globals: false,
            prune_functions: false,
            max_rounds: 64,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct OptimizerReport {
    pub rounds: usize,
    pub folded: bool,
    pub locals_pruned: usize,
    pub globals_pruned: usize,
    pub functions_pruned: usize,
}

/// Runs the optimizer. `prerequisites_met` must be `true` — set by a caller
/// that has already run symbol collection and type determination over this
/// same arena — or this returns
/// [`AnalysisError::OptimizerRanBeforePrerequisites`] without touching the
/// tree. The check is enforced again here, not just by the typestate a
/// caller might be using, because nothing stops a `scriptlang-sema`
/// consumer from calling straight into this crate.
pub fn optimize(
    arena: &mut Arena,
    diagnostics: &DiagnosticLog,
    options: OptimizationOptions,
    prerequisites_met: bool,
) -> Result<OptimizerReport, AnalysisError> {
    if !prerequisites_met {
        return Err(AnalysisError::OptimizerRanBeforePrerequisites { pass: "optimizer" });
    }

    let mut report = OptimizerReport::default();
    for _ in 0..options.max_rounds.max(1) {
        report.rounds += 1;
        let mut changed = false;

        if options.fold_constants && ConstantFolding::run(arena, diagnostics) {
            report.folded = true;
            changed = true;
        }
        if options.prune_locals {
            let n = prune::prune_locals(arena, diagnostics);
            report.locals_pruned += n;
            changed |= n > 0;
        }
        if options.prune_globals {
            let n = prune::prune_globals(arena, diagnostics);
            report.globals_pruned += n;
            changed |= n > 0;
        }
        if options.prune_functions {
            let n = prune::prune_functions(arena, diagnostics);
            report.functions_pruned += n;
            changed |= n > 0;
        }

        if !changed {
            break;
        }
    }
    Ok(report)
}
