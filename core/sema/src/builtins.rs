//! The fixed table of built-in constants and functions every script sees
//! without declaring them itself.
//!
//! Declared into the symbol table's root scope before any user top-level
//! declaration runs, so a user global or function of the same name shadows
//! (or, depending on [`crate::passes::symbol_collection`]'s rules,
//! duplicates) the built-in exactly the way an inner scope shadows an
//! outer one — built-ins live in the outermost scope there is.
//!
//! Built-in functions need an AST node shaped like a user
//! [`scriptlang_ast::GlobalFunction`] (return type plus `Parameter`
//! children) purely so [`crate::passes::type_determination`]'s call-site
//! checking can treat a call to a built-in exactly like a call to a
//! user function, with no special case. These synthetic nodes are
//! allocated into the caller's arena but never attached under the root —
//! they exist only to be pointed at by a symbol's `node` field.

use scriptlang_ast::{Arena, Declaration, GlobalFunction, Location, NodeKind, ValueType};

use crate::symbol_table::{SymbolKind, SymbolTable};

struct BuiltinConstant {
    name: &'static str,
    value_type: ValueType,
}

struct BuiltinFunction {
    name: &'static str,
    return_type: ValueType,
    params: &'static [ValueType],
}

const CONSTANTS: &[BuiltinConstant] = &[
    BuiltinConstant { name: "TRUE", value_type: ValueType::Integer },
    BuiltinConstant { name: "FALSE", value_type: ValueType::Integer },
    BuiltinConstant { name: "PI", value_type: ValueType::Float },
    BuiltinConstant { name: "TWO_PI", value_type: ValueType::Float },
    BuiltinConstant { name: "DEG_TO_RAD", value_type: ValueType::Float },
    BuiltinConstant { name: "RAD_TO_DEG", value_type: ValueType::Float },
    BuiltinConstant { name: "NULL_KEY", value_type: ValueType::Key },
    BuiltinConstant { name: "ZERO_VECTOR", value_type: ValueType::Vector },
    BuiltinConstant { name: "ZERO_ROTATION", value_type: ValueType::Rotation },
];

const FUNCTIONS: &[BuiltinFunction] = &[
    BuiltinFunction { name: "llAbs", return_type: ValueType::Integer, params: &[ValueType::Integer] },
    BuiltinFunction { name: "llFabs", return_type: ValueType::Float, params: &[ValueType::Float] },
    BuiltinFunction { name: "llSqrt", return_type: ValueType::Float, params: &[ValueType::Float] },
    BuiltinFunction { name: "llPow", return_type: ValueType::Float, params: &[ValueType::Float, ValueType::Float] },
    BuiltinFunction { name: "llVecMag", return_type: ValueType::Float, params: &[ValueType::Vector] },
    BuiltinFunction { name: "llVecNorm", return_type: ValueType::Vector, params: &[ValueType::Vector] },
    BuiltinFunction { name: "llGetOwner", return_type: ValueType::Key, params: &[] },
    BuiltinFunction { name: "llSay", return_type: ValueType::Void, params: &[ValueType::Integer, ValueType::String] },
];

/// Declares every built-in constant and function into `symbols`'s current
/// scope, which must be the root scope (true before any user top-level
/// declaration has run).
pub fn declare_builtins(arena: &mut Arena, symbols: &mut SymbolTable) {
    for constant in CONSTANTS {
        let node = arena.alloc(
            Location::synthetic(),
            NodeKind::GlobalVariable(Declaration {
                name: constant.name.to_string(),
                declared_type: constant.value_type,
                has_initializer: false,
            }),
        );
        symbols.declare_builtin(constant.name, SymbolKind::GlobalVariable, constant.value_type, node);
    }

    for function in FUNCTIONS {
        let node = arena.alloc(
            Location::synthetic(),
            NodeKind::GlobalFunction(GlobalFunction {
                name: function.name.to_string(),
                return_type: function.return_type,
            }),
        );
        for (index, &param_type) in function.params.iter().enumerate() {
            let param = arena.alloc(
                Location::synthetic(),
                NodeKind::Parameter(Declaration {
                    name: format!("arg{index}"),
                    declared_type: param_type,
                    has_initializer: false,
                }),
            );
            arena.push_child(node, param);
        }
        symbols.declare_builtin(function.name, SymbolKind::Function, function.return_type, node);
    }
}
