//! Pass 6: requires global variable initializers to be constant
//! expressions. In strict mode (the default) this is a hard error; relaxed
//! mode downgrades it to a warning, for callers emulating runtimes that
//! tolerate non-constant globals by evaluating them at load time.

use scriptlang_ast::{Arena, NodeKind};

use crate::codes;
use crate::diagnostics::DiagnosticLog;
use crate::errors::AnalysisError;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GlobalInitializerMode {
    Strict,
    Relaxed,
}

pub struct GlobalValidation<'a> {
    pub diagnostics: &'a DiagnosticLog,
    pub mode: GlobalInitializerMode,
}

impl<'a> GlobalValidation<'a> {
    /// `prerequisites_met` must be `true` whenever this runs after type
    /// determination, the same contract [`crate::optimizer::optimize`] takes
    /// a bool for — a caller going through [`scriptlang_compiler`]'s
    /// typestate pipeline always satisfies it by construction; this check
    /// only fires for a caller driving the passes directly and skipping a
    /// prerequisite.
    pub fn run(
        arena: &Arena,
        diagnostics: &'a DiagnosticLog,
        mode: GlobalInitializerMode,
        prerequisites_met: bool,
    ) -> Result<(), AnalysisError> {
        if !prerequisites_met {
            return Err(AnalysisError::GlobalValidationRanBeforeTypeDetermination);
        }
        let root = arena.root().ok_or(AnalysisError::EmptyArena)?;
        let pass = GlobalValidation { diagnostics, mode };
        for child in arena.children(root) {
            let NodeKind::GlobalVariable(decl) = &arena.get(*child).kind else { continue };
            if !decl.has_initializer {
                continue;
            }
            let Some(init) = arena.child(*child, 0) else { continue };
            let is_constant = matches!(arena.get(init).kind, NodeKind::Constant(_) | NodeKind::ConstantExpression);
            if is_constant {
                continue;
            }
            let location = arena.get(*child).location;
            match pass.mode {
                GlobalInitializerMode::Strict => {
                    pass.diagnostics.error(
                        codes::GLOBAL_INITIALIZER_NOT_CONSTANT,
                        location,
                        codes::global_initializer_not_constant(&decl.name),
                    );
                }
                GlobalInitializerMode::Relaxed => {
                    pass.diagnostics.warning(
                        codes::GLOBAL_INITIALIZER_NOT_CONSTANT,
                        location,
                        codes::global_initializer_not_constant(&decl.name),
                    );
                }
            }
        }
        Ok(())
    }
}
