//! Pass 1: declares every global, function, state, parameter, and local in
//! the symbol table, and resolves every identifier occurrence, function
//! call, and `state` target to the symbol it names.
//!
//! Runs in two sweeps over the top level so that a function can call
//! another function (or reference a global) declared later in the file:
//! the first sweep declares every global, function, and state without
//! descending into bodies; the second sweep walks each body, by which point
//! the full top-level symbol set already exists. Scopes are pushed for a
//! function/event body and for each nested compound statement; declaring a
//! name that already exists in the *same* scope is an error, declaring one
//! that only exists in an *ancestor* scope is a shadowing warning.

use scriptlang_ast::{Arena, Location, NodeId, NodeKind, ValueType};

use crate::builtins::declare_builtins;
use crate::codes;
use crate::diagnostics::DiagnosticLog;
use crate::errors::AnalysisError;
use crate::symbol_table::{DeclareOutcome, ScopeKind, SymbolKind, SymbolTable};

pub struct SymbolCollection<'a> {
    pub symbols: &'a mut SymbolTable,
    pub diagnostics: &'a DiagnosticLog,
}

impl<'a> SymbolCollection<'a> {
    pub fn run(arena: &mut Arena, symbols: &'a mut SymbolTable, diagnostics: &'a DiagnosticLog) -> Result<(), AnalysisError> {
        declare_builtins(arena, symbols);
        let root = arena.root().ok_or(AnalysisError::EmptyArena)?;
        let mut pass = SymbolCollection { symbols, diagnostics };
        pass.declare_top_level(arena, root);
        pass.visit_bodies(arena, root)
    }

    fn declare(
        &mut self,
        arena: &Arena,
        name: &str,
        kind: SymbolKind,
        value_type: ValueType,
        location: Location,
        node: NodeId,
    ) {
        match self.symbols.declare(name, kind, value_type, location, node) {
            DeclareOutcome::Declared(id) => {
                arena.get(node).symbol.set(Some(id));
            }
            DeclareOutcome::Duplicate { existing } => {
                let prev = self.symbols.symbol(existing).location;
                self.diagnostics.error(
                    codes::DUPLICATE_DECLARATION,
                    location,
                    codes::duplicate_declaration(name, prev.first_line, prev.first_column),
                );
            }
            DeclareOutcome::Shadows { existing, new } => {
                let prev = self.symbols.symbol(existing).location;
                self.diagnostics.warning(
                    codes::SHADOWED_DECLARATION,
                    location,
                    codes::shadowed_declaration(name, prev.first_line, prev.first_column),
                );
                arena.get(node).symbol.set(Some(new));
            }
        }
    }

    fn declare_top_level(&mut self, arena: &Arena, script: NodeId) {
        arena.get(script).scope.set(Some(self.symbols.root_scope()));
        for child in arena.children(script).to_vec() {
            let location = arena.get(child).location;
            match &arena.get(child).kind {
                NodeKind::GlobalVariable(decl) => {
                    let decl = decl.clone();
                    self.declare(arena, &decl.name, SymbolKind::GlobalVariable, decl.declared_type, location, child);
                }
                NodeKind::GlobalFunction(func) => {
                    let func = func.clone();
                    self.declare(arena, &func.name, SymbolKind::Function, func.return_type, location, child);
                }
                NodeKind::State(state) => {
                    let name = state.name.clone().unwrap_or_else(|| "default".to_string());
                    self.declare(arena, &name, SymbolKind::State, ValueType::Void, location, child);
                }
                _ => {}
            }
        }
    }

    fn visit_bodies(&mut self, arena: &mut Arena, script: NodeId) -> Result<(), AnalysisError> {
        for child in arena.children(script).to_vec() {
            match &arena.get(child).kind {
                NodeKind::GlobalFunction(_) => self.visit_function_body(arena, child, SymbolKind::Parameter)?,
                NodeKind::GlobalVariable(decl) if decl.has_initializer => {
                    self.resolve_expression(arena, arena.child(child, 0).expect("declared initializer is missing"));
                }
                NodeKind::State(_) => self.visit_state(arena, child)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn visit_state(&mut self, arena: &mut Arena, state: NodeId) -> Result<(), AnalysisError> {
        for handler in arena.children(state).to_vec() {
            let NodeKind::EventHandler(ev) = &arena.get(handler).kind else { continue };
            if !crate::passes::reference_data::EVENT_HANDLER_NAMES.contains(&ev.name.as_str()) {
                self.diagnostics.error(
                    codes::UNKNOWN_EVENT_HANDLER,
                    arena.get(handler).location,
                    codes::unknown_event_handler(&ev.name),
                );
            }
            self.visit_function_body(arena, handler, SymbolKind::EventParameter)?;
        }
        Ok(())
    }

    /// Walks one function or event-handler body, declaring its parameters
    /// (under `param_kind` — event handlers get `EventParameter`, ordinary
    /// functions get `Parameter`) and then every statement.
    fn visit_function_body(&mut self, arena: &mut Arena, owner: NodeId, param_kind: SymbolKind) -> Result<(), AnalysisError> {
        let scope = self.symbols.push_scope(ScopeKind::Function);
        arena.get(owner).scope.set(Some(scope));

        // Labels are visible for the whole function regardless of block
        // nesting, so declare all of them before walking statements — a
        // jump may legally target a label that appears later in the body.
        self.declare_labels(arena, owner);

        for child in arena.children(owner).to_vec() {
            if let NodeKind::Parameter(decl) = &arena.get(child).kind {
                let decl = decl.clone();
                let location = arena.get(child).location;
                self.declare(arena, &decl.name, param_kind, decl.declared_type, location, child);
            } else {
                self.visit_statement(arena, child)?;
            }
        }
        self.symbols.pop_scope()
    }

    /// Pre-declares every label in `owner`'s body, in the function's own
    /// scope (not the block it textually appears in — LSL labels ignore
    /// brace nesting).
    fn declare_labels(&mut self, arena: &Arena, owner: NodeId) {
        for child in arena.children(owner).to_vec() {
            self.declare_labels_in(arena, child);
        }
    }

    fn declare_labels_in(&mut self, arena: &Arena, node: NodeId) {
        let location = arena.get(node).location;
        if let NodeKind::LabelStatement { name } = &arena.get(node).kind {
            let name = name.clone();
            self.declare(arena, &name, SymbolKind::Label, ValueType::Void, location, node);
        }
        for child in arena.children(node).to_vec() {
            self.declare_labels_in(arena, child);
        }
    }

    fn visit_statement(&mut self, arena: &mut Arena, stmt: NodeId) -> Result<(), AnalysisError> {
        match &arena.get(stmt).kind {
            NodeKind::CompoundStatement => {
                let scope = self.symbols.push_scope(ScopeKind::Block);
                arena.get(stmt).scope.set(Some(scope));
                for child in arena.children(stmt).to_vec() {
                    self.visit_statement(arena, child)?;
                }
                self.symbols.pop_scope()?;
            }
            NodeKind::LocalDeclaration(decl) => {
                let decl = decl.clone();
                let location = arena.get(stmt).location;
                if decl.has_initializer {
                    self.resolve_expression(arena, arena.child(stmt, 0).expect("declared initializer is missing"));
                }
                self.declare(arena, &decl.name, SymbolKind::LocalVariable, decl.declared_type, location, stmt);
            }
            NodeKind::IfStatement
            | NodeKind::WhileStatement
            | NodeKind::DoWhileStatement
            | NodeKind::ForStatement(_) => {
                for child in arena.children(stmt).to_vec() {
                    self.visit_statement(arena, child)?;
                }
            }
            NodeKind::ExpressionStatement | NodeKind::ReturnStatement { .. } => {
                for child in arena.children(stmt).to_vec() {
                    self.resolve_expression(arena, child);
                }
            }
            NodeKind::StateChangeStatement { target } => {
                let target = target.clone();
                let location = arena.get(stmt).location;
                match self.symbols.lookup_from(self.symbols.root_scope(), &target) {
                    Some(symbol) if self.symbols.symbol(symbol).kind == SymbolKind::State => {
                        arena.get(stmt).symbol.set(Some(symbol));
                        self.symbols.symbol(symbol).mark_used();
                    }
                    _ => {
                        self.diagnostics.error(codes::UNKNOWN_STATE, location, codes::unknown_state(&target));
                    }
                }
            }
            NodeKind::JumpStatement { label } => {
                let label = label.clone();
                // Labels all live in the function's own scope, declared
                // up front by `declare_labels`, so this never needs to walk
                // outward past it.
                match self.symbols.lookup(&label) {
                    Some(symbol) if self.symbols.symbol(symbol).kind == SymbolKind::Label => {
                        arena.get(stmt).symbol.set(Some(symbol));
                        self.symbols.symbol(symbol).mark_used();
                    }
                    _ => {
                        let location = arena.get(stmt).location;
                        self.diagnostics.error(
                            codes::UNDECLARED_LABEL,
                            location,
                            codes::undeclared_label(&label),
                        );
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Resolves every `IdentifierExpression`/`FunctionCallExpression` in the
    /// subtree rooted at `node` against the scope active right now (locals
    /// are resolved strictly in declaration order; top-level names were all
    /// declared up front in [`Self::declare_top_level`], so forward
    /// references to a function or global defined later in the file still
    /// work).
    fn resolve_expression(&mut self, arena: &Arena, node: NodeId) {
        let n = arena.get(node);
        match &n.kind {
            NodeKind::IdentifierExpression(ident) => match self.symbols.lookup(&ident.name) {
                Some(symbol) => {
                    n.symbol.set(Some(symbol));
                    self.symbols.symbol(symbol).mark_used();
                }
                None => {
                    self.diagnostics.error(
                        codes::UNDECLARED_IDENTIFIER,
                        n.location,
                        codes::undeclared_identifier(&ident.name),
                    );
                }
            },
            NodeKind::FunctionCallExpression(call) => {
                match self.symbols.lookup(&call.name) {
                    Some(symbol) if self.symbols.symbol(symbol).kind == SymbolKind::Function => {
                        n.symbol.set(Some(symbol));
                        self.symbols.symbol(symbol).mark_used();
                    }
                    _ => {
                        self.diagnostics.error(
                            codes::UNDECLARED_FUNCTION,
                            n.location,
                            codes::undeclared_function(&call.name),
                        );
                    }
                }
            }
            NodeKind::AssignmentExpression(_) => {
                // Children[0] is the lvalue: resolve it here (rather than
                // falling through to the generic identifier case below) so
                // the binding counts as an assignment, not just a read.
                if let Some(lvalue) = arena.child(node, 0) {
                    self.resolve_lvalue(arena, lvalue);
                }
                if let Some(rvalue) = arena.child(node, 1) {
                    self.resolve_expression(arena, rvalue);
                }
                return;
            }
            _ => {}
        }
        for child in arena.children(node) {
            self.resolve_expression(arena, *child);
        }
    }

    /// Resolves the left-hand side of an assignment. A bare identifier or a
    /// member access on one (`pos.x = 1`) counts as an assignment to that
    /// symbol rather than a read.
    fn resolve_lvalue(&mut self, arena: &Arena, node: NodeId) {
        let n = arena.get(node);
        match &n.kind {
            NodeKind::IdentifierExpression(ident) => match self.symbols.lookup(&ident.name) {
                Some(symbol) => {
                    n.symbol.set(Some(symbol));
                    self.symbols.symbol(symbol).mark_assigned();
                }
                None => {
                    self.diagnostics.error(
                        codes::UNDECLARED_IDENTIFIER,
                        n.location,
                        codes::undeclared_identifier(&ident.name),
                    );
                }
            },
            NodeKind::MemberAccessExpression(_) => {
                if let Some(base) = arena.child(node, 0) {
                    self.resolve_lvalue(arena, base);
                }
            }
            _ => self.resolve_expression(arena, node),
        }
    }
}
