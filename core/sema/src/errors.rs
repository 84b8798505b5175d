//! Hard errors: programmer mistakes in how the pipeline is driven, as
//! opposed to problems with the script being analyzed (those are
//! [`crate::diagnostics::Diagnostic`]s, not `Err`s).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("optimizer pass `{pass}` requires symbol collection and type determination to have run first")]
    OptimizerRanBeforePrerequisites { pass: &'static str },

    #[error("global validation requires type determination to have run first")]
    GlobalValidationRanBeforeTypeDetermination,

    #[error("arena has no root node")]
    EmptyArena,

    #[error("scope {0} has no parent")]
    ScopeHasNoParent(u32),
}
