//! Symbols and lexical scopes.
//!
//! The scope tree is a flat table of [`Scope`]s addressed by [`ScopeId`],
//! mirroring the arena's own parent-pointer-by-id approach rather than an
//! `Rc<RefCell<_>>` tree — there's only ever one owner (the
//! [`SymbolTable`]) and no need for shared ownership here.

use std::cell::Cell;

use rustc_hash::FxHashMap;
use scriptlang_ast::{Location, NodeId, ValueType};

use crate::errors::AnalysisError;

pub type SymbolId = u32;
pub type ScopeId = u32;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SymbolKind {
    GlobalVariable,
    LocalVariable,
    Parameter,
    /// A parameter of an event handler rather than a user-declared
    /// function — its type comes from the fixed event signature table, not
    /// from source text the declaration could get wrong.
    EventParameter,
    Function,
    State,
    Label,
}

#[derive(Clone, Debug)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    pub kind: SymbolKind,
    pub value_type: ValueType,
    pub location: Location,
    /// The declaration site in the AST.
    pub node: NodeId,
    pub scope: ScopeId,
    reference_count: Cell<u32>,
    assignment_count: Cell<u32>,
    /// Set by reference-data analysis. Only meaningful for `Function`.
    has_jumps: Cell<bool>,
    /// Set by reference-data analysis. Only meaningful for `Function`.
    has_unstructured_jumps: Cell<bool>,
    /// Set by the mangler; `None` until a mangling pass runs.
    mangled_name: Cell<Option<u32>>,
    /// `true` for a symbol from the fixed built-in table rather than user
    /// source text — the mangler and unused-declaration pruners both skip
    /// these.
    pub is_builtin: bool,
}

impl Symbol {
    #[must_use]
    pub fn is_used(&self) -> bool {
        self.reference_count.get() > 0
    }

    #[must_use]
    pub fn reference_count(&self) -> u32 {
        self.reference_count.get()
    }

    #[must_use]
    pub fn assignment_count(&self) -> u32 {
        self.assignment_count.get()
    }

    pub fn mark_used(&self) {
        self.reference_count.set(self.reference_count.get() + 1);
    }

    pub fn mark_assigned(&self) {
        self.assignment_count.set(self.assignment_count.get() + 1);
    }

    #[must_use]
    pub fn has_jumps(&self) -> bool {
        self.has_jumps.get()
    }

    #[must_use]
    pub fn has_unstructured_jumps(&self) -> bool {
        self.has_unstructured_jumps.get()
    }

    pub fn set_jump_flags(&self, has_jumps: bool, has_unstructured_jumps: bool) {
        self.has_jumps.set(has_jumps);
        self.has_unstructured_jumps.set(has_unstructured_jumps);
    }

    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            SymbolKind::GlobalVariable => "global-variable",
            SymbolKind::LocalVariable => "local-variable",
            SymbolKind::Parameter => "parameter",
            SymbolKind::EventParameter => "event-parameter",
            SymbolKind::Function => "function",
            SymbolKind::State => "state",
            SymbolKind::Label => "label",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ScopeKind {
    Global,
    Function,
    Block,
}

#[derive(Clone, Debug)]
pub struct Scope {
    pub id: ScopeId,
    pub parent: Option<ScopeId>,
    pub kind: ScopeKind,
    pub depth: u32,
    symbols: FxHashMap<String, SymbolId>,
}

impl Scope {
    #[must_use]
    pub fn symbol_named(&self, name: &str) -> Option<SymbolId> {
        self.symbols.get(name).copied()
    }
}

/// Outcome of [`SymbolTable::declare`]. Kept separate from error reporting:
/// the symbol table only knows about scope shape, the calling pass decides
/// what diagnostic (if any) a given outcome deserves.
pub enum DeclareOutcome {
    /// No existing binding anywhere in the scope chain; `id` is the new
    /// symbol.
    Declared(SymbolId),
    /// `name` is already bound in the *same* scope as `existing` — a hard
    /// duplicate-declaration error, not a warning.
    Duplicate { existing: SymbolId },
    /// `name` shadows `existing`, bound in an *ancestor* scope. The new
    /// symbol is still declared; this is advisory.
    Shadows { existing: SymbolId, new: SymbolId },
}

pub struct SymbolTable {
    symbols: FxHashMap<SymbolId, Symbol>,
    scopes: FxHashMap<ScopeId, Scope>,
    root_scope: ScopeId,
    current_scope: ScopeId,
    next_symbol_id: SymbolId,
    next_scope_id: ScopeId,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        let root = Scope { id: 1, parent: None, kind: ScopeKind::Global, depth: 0, symbols: FxHashMap::default() };
        let mut scopes = FxHashMap::default();
        scopes.insert(1, root);
        Self {
            symbols: FxHashMap::default(),
            scopes,
            root_scope: 1,
            current_scope: 1,
            next_symbol_id: 1,
            next_scope_id: 2,
        }
    }

    #[must_use]
    pub fn root_scope(&self) -> ScopeId {
        self.root_scope
    }

    #[must_use]
    pub fn current_scope(&self) -> ScopeId {
        self.current_scope
    }

    #[must_use]
    pub fn scope(&self, id: ScopeId) -> &Scope {
        self.scopes.get(&id).expect("dangling ScopeId")
    }

    #[must_use]
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        self.symbols.get(&id).expect("dangling SymbolId")
    }

    pub fn push_scope(&mut self, kind: ScopeKind) -> ScopeId {
        let id = self.next_scope_id;
        self.next_scope_id += 1;
        let depth = self.scopes[&self.current_scope].depth + 1;
        self.scopes.insert(
            id,
            Scope { id, parent: Some(self.current_scope), kind, depth, symbols: FxHashMap::default() },
        );
        self.current_scope = id;
        id
    }

    /// Returns to the parent of the current scope. Errors with
    /// `ScopeHasNoParent` if called on the root scope — that's a
    /// pass-ordering bug in the caller, not a condition the table can
    /// silently absorb.
    pub fn pop_scope(&mut self) -> Result<(), AnalysisError> {
        let parent = self.scopes[&self.current_scope]
            .parent
            .ok_or(AnalysisError::ScopeHasNoParent(self.current_scope))?;
        self.current_scope = parent;
        Ok(())
    }

    /// Declares `name` in the current scope and returns how it relates to
    /// any existing binding. Always creates the symbol and binds it in the
    /// current scope's table, even on `Duplicate` — later passes still need
    /// somewhere to point `Node::symbol` at.
    pub fn declare(
        &mut self,
        name: &str,
        kind: SymbolKind,
        value_type: ValueType,
        location: Location,
        node: NodeId,
    ) -> DeclareOutcome {
        self.declare_inner(name, kind, value_type, location, node, false)
    }

    /// Declares a fixed built-in (constant or function) in the current
    /// scope. Only ever called against the root scope before any user
    /// declaration runs, so it always succeeds as a fresh `Declared`; the
    /// outcome is discarded by callers for that reason.
    pub fn declare_builtin(&mut self, name: &str, kind: SymbolKind, value_type: ValueType, node: NodeId) {
        self.declare_inner(name, kind, value_type, Location::synthetic(), node, true);
    }

    fn declare_inner(
        &mut self,
        name: &str,
        kind: SymbolKind,
        value_type: ValueType,
        location: Location,
        node: NodeId,
        is_builtin: bool,
    ) -> DeclareOutcome {
        let id = self.next_symbol_id;
        self.next_symbol_id += 1;
        let scope = self.current_scope;

        let duplicate = self.scopes[&scope].symbol_named(name);
        let shadowed = if duplicate.is_none() { self.lookup(name) } else { None };

        self.symbols.insert(
            id,
            Symbol {
                id,
                name: name.to_string(),
                kind,
                value_type,
                location,
                node,
                scope,
                reference_count: Cell::new(0),
                assignment_count: Cell::new(0),
                has_jumps: Cell::new(false),
                has_unstructured_jumps: Cell::new(false),
                mangled_name: Cell::new(None),
                is_builtin,
            },
        );
        self.scopes.get_mut(&scope).expect("dangling ScopeId").symbols.insert(name.to_string(), id);

        if let Some(existing) = duplicate {
            DeclareOutcome::Duplicate { existing }
        } else if let Some(existing) = shadowed {
            DeclareOutcome::Shadows { existing, new: id }
        } else {
            DeclareOutcome::Declared(id)
        }
    }

    /// Walks from the current scope up to the root looking for `name`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.lookup_from(self.current_scope, name)
    }

    #[must_use]
    pub fn lookup_from(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        let mut cursor = Some(scope);
        while let Some(id) = cursor {
            let scope = &self.scopes[&id];
            if let Some(symbol) = scope.symbol_named(name) {
                return Some(symbol);
            }
            cursor = scope.parent;
        }
        None
    }

    #[must_use]
    pub fn all_symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    pub fn set_mangled_index(&self, id: SymbolId, index: u32) {
        self.symbols[&id].mangled_name.set(Some(index));
    }

    #[must_use]
    pub fn mangled_index(&self, id: SymbolId) -> Option<u32> {
        self.symbols[&id].mangled_name.get()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptlang_ast::Location;

    fn loc(line: i32) -> Location {
        Location::new(line, 1, line, 1)
    }

    #[test]
    fn declare_in_fresh_scope_succeeds() {
        let mut table = SymbolTable::new();
        let outcome = table.declare("x", SymbolKind::GlobalVariable, ValueType::Integer, loc(1), 1);
        assert!(matches!(outcome, DeclareOutcome::Declared(_)));
    }

    #[test]
    fn redeclaring_in_same_scope_is_duplicate() {
        let mut table = SymbolTable::new();
        table.declare("x", SymbolKind::GlobalVariable, ValueType::Integer, loc(1), 1);
        let outcome = table.declare("x", SymbolKind::GlobalVariable, ValueType::Integer, loc(2), 2);
        assert!(matches!(outcome, DeclareOutcome::Duplicate { .. }));
    }

    #[test]
    fn declaring_over_an_outer_scope_binding_shadows() {
        let mut table = SymbolTable::new();
        table.declare("x", SymbolKind::GlobalVariable, ValueType::Integer, loc(1), 1);
        table.push_scope(ScopeKind::Function);
        let outcome = table.declare("x", SymbolKind::LocalVariable, ValueType::Integer, loc(2), 2);
        assert!(matches!(outcome, DeclareOutcome::Shadows { .. }));
    }

    #[test]
    fn lookup_walks_up_the_scope_chain() {
        let mut table = SymbolTable::new();
        let DeclareOutcome::Declared(global) =
            table.declare("g", SymbolKind::GlobalVariable, ValueType::Integer, loc(1), 1)
        else {
            panic!("expected fresh declaration");
        };
        table.push_scope(ScopeKind::Function);
        assert_eq!(table.lookup("g"), Some(global));
    }

    #[test]
    fn pop_scope_restores_parent_visibility() {
        let mut table = SymbolTable::new();
        table.push_scope(ScopeKind::Function);
        table.declare("local", SymbolKind::LocalVariable, ValueType::Integer, loc(1), 1);
        table.pop_scope().expect("function scope has the root as parent");
        assert_eq!(table.lookup("local"), None);
    }

    #[test]
    fn pop_scope_on_root_errors() {
        let mut table = SymbolTable::new();
        assert!(matches!(table.pop_scope(), Err(AnalysisError::ScopeHasNoParent(_))));
    }
}
