//! Arena-allocated AST for the analyzer pipeline.
//!
//! This crate is deliberately "dumb": it knows node shapes, source
//! locations, and value types, but nothing about symbols, scopes, or
//! diagnostics — those live one layer up, in the crate that actually runs
//! the semantic passes. Keeping this crate free of that dependency means the
//! tree can be built (by a parser this workspace doesn't include) without
//! pulling in analysis machinery.

pub mod arena;
pub mod constant;
pub mod location;
pub mod node;
pub mod value_type;
pub mod visitor;

pub use arena::Arena;
pub use constant::{constant_nodes_structurally_equal, constants_structurally_equal};
pub use location::Location;
pub use node::{
    AssignOperator, BinaryOperator, Constant, Declaration, EventHandler, ForStatement,
    FunctionCall, GlobalFunction, Identifier, MemberAccess, Node, NodeCategory, NodeId, NodeKind,
    ScopeId, State, SymbolId, UnaryOperator,
};
pub use value_type::ValueType;
pub use visitor::{walk, walk_from_root, Action, Visitor};
