//! The tree dumper: renders an analyzed arena as a human-readable indented
//! tree, honoring the same name-mangling configuration the eventual code
//! emitters would use. The canonical-source pretty-printer and the two
//! code emitters themselves are a downstream concern (they need the
//! concrete surface grammar, which this crate never sees) — this is the
//! one formatter-side artifact that can be built purely from the AST and
//! symbol table this crate already owns.

use std::fmt::Write as _;

use scriptlang_ast::{Arena, NodeId};

use crate::symbol_table::{SymbolKind, SymbolTable};

/// Name-mangling toggles for the tree dumper (and, eventually, any code
/// emitter built on top of it). Defaults are all-false: render names as
/// written in the source.
#[derive(Clone, Copy, Debug, Default)]
pub struct PrettyPrintOpts {
    pub mangle_functions: bool,
    pub mangle_globals: bool,
    pub mangle_locals: bool,
    /// When mangling is on, append the original name in parentheses.
    pub show_unmangled: bool,
}

/// Renders the tree rooted at the arena's root as an indented dump, one
/// node per line: `<indent><subtype-name> [<value-type>]`.
#[must_use]
pub fn dump_tree(arena: &Arena, symbols: &SymbolTable, opts: PrettyPrintOpts) -> String {
    let mut out = String::new();
    if let Some(root) = arena.root() {
        dump_node(arena, symbols, opts, root, 0, &mut out);
    }
    out
}

fn dump_node(arena: &Arena, symbols: &SymbolTable, opts: PrettyPrintOpts, id: NodeId, depth: usize, out: &mut String) {
    let node = arena.get(id);
    let indent = "  ".repeat(depth);
    let label = display_name(symbols, opts, node.symbol.get()).unwrap_or_else(|| node.kind.subtype_name().to_string());
    let _ = writeln!(out, "{indent}{} [{}]", label, node.value_type.get());
    for child in arena.children(id) {
        dump_node(arena, symbols, opts, *child, depth + 1, out);
    }
}

/// If `symbol` names something the active mangling options cover, returns
/// `"<subtype-name> <mangled-or-original>"`; otherwise `None`, so the
/// caller falls back to the bare subtype name.
fn display_name(symbols: &SymbolTable, opts: PrettyPrintOpts, symbol: Option<crate::symbol_table::SymbolId>) -> Option<String> {
    let symbol = symbol?;
    let sym = symbols.symbol(symbol);
    let mangle = match sym.kind {
        SymbolKind::Function => opts.mangle_functions,
        SymbolKind::GlobalVariable => opts.mangle_globals,
        SymbolKind::LocalVariable | SymbolKind::Parameter | SymbolKind::EventParameter => opts.mangle_locals,
        SymbolKind::State | SymbolKind::Label => false,
    };
    if !mangle {
        return Some(format!("{} `{}'", sym.kind_name(), sym.name));
    }
    let mangled = symbols
        .mangled_index(symbol)
        .map(crate::mangler::mangled_name)
        .unwrap_or_else(|| sym.name.clone());
    if opts.show_unmangled {
        Some(format!("{} `{}' ({})", sym.kind_name(), mangled, sym.name))
    } else {
        Some(format!("{} `{}'", sym.kind_name(), mangled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptlang_ast::{Location, NodeKind, ValueType};

    #[test]
    fn dumps_a_single_global() {
        let mut arena = Arena::new();
        let mut symbols = SymbolTable::new();
        let script = arena.alloc(Location::synthetic(), NodeKind::Script);
        arena.set_root(script);
        let global = arena.alloc(
            Location::synthetic(),
            NodeKind::GlobalVariable(scriptlang_ast::Declaration {
                name: "counter".to_string(),
                declared_type: ValueType::Integer,
                has_initializer: false,
            }),
        );
        arena.push_child(script, global);
        let crate::symbol_table::DeclareOutcome::Declared(id) =
            symbols.declare("counter", SymbolKind::GlobalVariable, ValueType::Integer, Location::synthetic(), global)
        else {
            panic!("expected fresh declaration");
        };
        arena.get(global).symbol.set(Some(id));

        let text = dump_tree(&arena, &symbols, PrettyPrintOpts::default());
        assert!(text.contains("global-variable `counter'"));
    }
}
