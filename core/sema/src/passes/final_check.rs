//! Pass 5: checks that survive whole-program type determination but don't
//! fit naturally into a single bottom-up walk — missing/unexpected return
//! values, and anything else that needs to know the enclosing function's
//! signature while visiting a statement deep inside it.

use scriptlang_ast::{Arena, NodeId, NodeKind, ValueType};

use crate::codes;
use crate::diagnostics::DiagnosticLog;

pub struct FinalCheck<'a> {
    pub diagnostics: &'a DiagnosticLog,
}

impl<'a> FinalCheck<'a> {
    pub fn run(arena: &Arena, diagnostics: &'a DiagnosticLog) {
        let Some(root) = arena.root() else { return };
        let pass = FinalCheck { diagnostics };
        for child in arena.children(root) {
            if let NodeKind::GlobalFunction(func) = &arena.get(*child).kind {
                pass.check_function(arena, *child, &func.name, func.return_type);
            }
            if let NodeKind::State(_) = &arena.get(*child).kind {
                for handler in arena.children(*child) {
                    if let NodeKind::EventHandler(ev) = &arena.get(*handler).kind {
                        pass.check_function(arena, *handler, &ev.name, ValueType::Void);
                    }
                }
            }
        }
    }

    fn check_function(&self, arena: &Arena, owner: NodeId, name: &str, return_type: ValueType) {
        for child in arena.children(owner) {
            self.check_statement(arena, *child, name, return_type);
        }
    }

    fn check_statement(&self, arena: &Arena, node: NodeId, function: &str, return_type: ValueType) {
        let n = arena.get(node);
        if let NodeKind::ReturnStatement { has_value } = &n.kind {
            match (*has_value, return_type) {
                (false, t) if t != ValueType::Void => {
                    self.diagnostics.error(
                        codes::MISSING_RETURN_VALUE,
                        n.location,
                        codes::missing_return_value(function, t.keyword()),
                    );
                }
                (true, ValueType::Void) => {
                    self.diagnostics.error(
                        codes::UNEXPECTED_RETURN_VALUE,
                        n.location,
                        codes::unexpected_return_value(function),
                    );
                }
                _ => {}
            }
        }
        for child in arena.children(node) {
            self.check_statement(arena, *child, function, return_type);
        }
    }
}
