//! Pass 2: assigns `Node::value_type` to every expression, bottom-up.
//!
//! Runs after symbol collection, so every identifier occurrence already has
//! `Node::symbol` set (or doesn't — an undeclared name is a type-determination
//! error, not a symbol-collection one, since whether a name *should* resolve
//! depends on the full program, not the declaration order the visitor
//! happens to walk in).

use scriptlang_ast::{Action, Arena, BinaryOperator, NodeId, NodeKind, UnaryOperator, ValueType, Visitor};

use crate::codes;
use crate::diagnostics::DiagnosticLog;
use crate::symbol_table::SymbolTable;

pub struct TypeDetermination<'a> {
    pub symbols: &'a SymbolTable,
    pub diagnostics: &'a DiagnosticLog,
}

impl<'a> TypeDetermination<'a> {
    pub fn run(arena: &mut Arena, symbols: &'a SymbolTable, diagnostics: &'a DiagnosticLog) {
        let mut pass = TypeDetermination { symbols, diagnostics };
        scriptlang_ast::walk_from_root(arena, &mut pass);
    }

    fn binary_result_type(&self, op: BinaryOperator, lhs: ValueType, rhs: ValueType, loc: scriptlang_ast::Location) -> ValueType {
        use BinaryOperator::*;
        if lhs.is_error() || rhs.is_error() {
            return ValueType::Error;
        }
        match op {
            Eq | Neq | Lt | Le | Gt | Ge | And | Or => ValueType::Integer,
            Add | Sub | Mul | Div | Mod if lhs.is_numeric() && rhs.is_numeric() => {
                if lhs == ValueType::Float || rhs == ValueType::Float {
                    ValueType::Float
                } else {
                    ValueType::Integer
                }
            }
            Add if lhs == ValueType::String && rhs == ValueType::String => ValueType::String,
            Add if lhs == ValueType::List || rhs == ValueType::List => ValueType::List,
            Add if lhs == ValueType::Vector && rhs == ValueType::Vector => ValueType::Vector,
            Add if lhs == ValueType::Rotation && rhs == ValueType::Rotation => ValueType::Rotation,
            BitAnd | BitOr | BitXor | Shl | Shr if lhs == ValueType::Integer && rhs == ValueType::Integer => {
                ValueType::Integer
            }
            _ => {
                self.diagnostics.error(
                    codes::TYPE_MISMATCH,
                    loc,
                    codes::type_mismatch(lhs.keyword(), rhs.keyword()),
                );
                ValueType::Error
            }
        }
    }

    /// Wraps the child at `slot` in a synthetic `integer -> float` typecast,
    /// in place, preserving the parent's child order.
    fn insert_promotion(&self, arena: &mut Arena, parent: NodeId, slot: usize) {
        let Some(operand) = arena.child(parent, slot) else { return };
        let location = arena.get(operand).location;
        let cast = arena.alloc(location, NodeKind::TypecastExpression(ValueType::Float));
        arena.get(cast).value_type.set(ValueType::Float);
        arena.replace_node(operand, cast);
        arena.push_child(cast, operand);
    }

    /// Whether an explicit `(type)expr` cast from `from` to `to` is legal.
    /// Same-type casts are legal (and elided later by constant folding);
    /// every primitive interconverts with `string`; `integer`/`float`
    /// interconvert with each other; everything else — casting a `list`,
    /// casting between `vector` and `rotation`, or casting `void` — is not.
    fn cast_is_legal(&self, from: ValueType, to: ValueType) -> bool {
        use ValueType::*;
        if from.is_error() || to.is_error() || from == to {
            return true;
        }
        match (from, to) {
            (Integer, Float) | (Float, Integer) => true,
            (String, _) | (_, String) => !matches!(from, List | Void) && !matches!(to, List | Void),
            _ => false,
        }
    }

    /// Checks a resolved call's argument list against the callee's declared
    /// parameters: arity first, then per-argument type compatibility under
    /// the same integer/float promotion rule `binary_result_type` uses
    /// (every other combination must match exactly).
    fn check_call_arguments(&self, arena: &Arena, call_id: NodeId, name: &str, function_node: NodeId) {
        let params: Vec<NodeId> = arena
            .children(function_node)
            .iter()
            .copied()
            .filter(|&c| matches!(arena.get(c).kind, NodeKind::Parameter(_)))
            .collect();
        let args = arena.children(call_id);

        if args.len() != params.len() {
            self.diagnostics.error(
                codes::ARGUMENT_COUNT_MISMATCH,
                arena.get(call_id).location,
                codes::argument_count_mismatch(name, params.len(), args.len()),
            );
            return;
        }

        for (index, (&param, &arg)) in params.iter().zip(args.iter()).enumerate() {
            let NodeKind::Parameter(decl) = &arena.get(param).kind else { continue };
            let expected = decl.declared_type;
            let found = arena.get(arg).value_type.get();
            if found.is_error() || expected == found {
                continue;
            }
            if expected == ValueType::Float && found == ValueType::Integer {
                continue;
            }
            self.diagnostics.error(
                codes::ARGUMENT_TYPE_MISMATCH,
                arena.get(arg).location,
                codes::argument_type_mismatch(name, index + 1, expected.keyword(), found.keyword()),
            );
        }
    }
}

impl Visitor for TypeDetermination<'_> {
    fn enter(&mut self, _arena: &Arena, _id: NodeId) -> Action {
        Action::Continue
    }

    fn leave(&mut self, arena: &mut Arena, id: NodeId) -> Action {
        let mut promote = [false, false];
        let node = arena.get(id);
        let value_type = match &node.kind {
            NodeKind::Constant(c) => match c {
                scriptlang_ast::Constant::Integer(_) => ValueType::Integer,
                scriptlang_ast::Constant::Float(_) => ValueType::Float,
                scriptlang_ast::Constant::String(_) => ValueType::String,
                scriptlang_ast::Constant::Key(_) => ValueType::Key,
                scriptlang_ast::Constant::Vector(_) => ValueType::Vector,
                scriptlang_ast::Constant::Rotation(_) => ValueType::Rotation,
                scriptlang_ast::Constant::List => ValueType::List,
            },
            NodeKind::ConstantExpression => {
                let wrapped = arena.child(id, 0).expect("constant-expression has no child");
                arena.get(wrapped).value_type.get()
            }
            NodeKind::IdentifierExpression(ident) => match node.symbol.get() {
                Some(symbol) => self.symbols.symbol(symbol).value_type,
                None => {
                    self.diagnostics.error(
                        codes::UNDECLARED_IDENTIFIER,
                        node.location,
                        codes::undeclared_identifier(&ident.name),
                    );
                    ValueType::Error
                }
            },
            NodeKind::BinaryExpression(op) => {
                let lhs = arena.child(id, 0).map_or(ValueType::Error, |c| arena.get(c).value_type.get());
                let rhs = arena.child(id, 1).map_or(ValueType::Error, |c| arena.get(c).value_type.get());
                let result = self.binary_result_type(*op, lhs, rhs, node.location);

                // Arithmetic between integer and float promotes the integer
                // operand: insert a synthetic typecast so every later pass
                // (constant folding, mangling, whatever eventually emits
                // bytecode) sees an explicit float-to-float operation rather
                // than having to re-derive the promotion from the result
                // type. Recorded here and applied after the match below,
                // once the borrow of `node` has ended.
                if result == ValueType::Float {
                    promote = [lhs == ValueType::Integer, rhs == ValueType::Integer];
                }
                result
            }
            NodeKind::UnaryExpression(op) => {
                let operand = arena.child(id, 0).map_or(ValueType::Error, |c| arena.get(c).value_type.get());
                match op {
                    UnaryOperator::Not | UnaryOperator::BitNot => {
                        if operand == ValueType::Integer {
                            ValueType::Integer
                        } else {
                            ValueType::Error
                        }
                    }
                    UnaryOperator::Neg => operand,
                }
            }
            NodeKind::AssignmentExpression(_) => {
                arena.child(id, 0).map_or(ValueType::Error, |c| arena.get(c).value_type.get())
            }
            NodeKind::TypecastExpression(target) => {
                let operand = arena.child(id, 0).map_or(ValueType::Error, |c| arena.get(c).value_type.get());
                if self.cast_is_legal(operand, *target) {
                    *target
                } else {
                    self.diagnostics.error(
                        codes::INVALID_CAST,
                        node.location,
                        codes::invalid_cast(operand.keyword(), target.keyword()),
                    );
                    ValueType::Error
                }
            }
            NodeKind::FunctionCallExpression(call) => match node.symbol.get() {
                Some(symbol) => {
                    let function_node = self.symbols.symbol(symbol).node;
                    self.check_call_arguments(arena, id, &call.name, function_node);
                    self.symbols.symbol(symbol).value_type
                }
                None => {
                    self.diagnostics.error(
                        codes::UNDECLARED_FUNCTION,
                        node.location,
                        codes::undeclared_function(&call.name),
                    );
                    ValueType::Error
                }
            },
            NodeKind::VectorExpression => ValueType::Vector,
            NodeKind::RotationExpression => ValueType::Rotation,
            NodeKind::ListExpression => {
                let has_nested_list = arena
                    .children(id)
                    .iter()
                    .any(|&c| arena.get(c).value_type.get() == ValueType::List);
                if has_nested_list {
                    self.diagnostics.error(codes::LIST_CONTAINS_LIST, node.location, codes::list_contains_list());
                    ValueType::Error
                } else {
                    ValueType::List
                }
            }
            NodeKind::MemberAccessExpression(access) => {
                let base = arena.child(id, 0).map_or(ValueType::Error, |c| arena.get(c).value_type.get());
                let legal = match base {
                    ValueType::Vector => matches!(access.component, 'x' | 'y' | 'z'),
                    ValueType::Rotation => matches!(access.component, 'x' | 'y' | 'z' | 's'),
                    _ => base.is_error(),
                };
                if legal {
                    ValueType::Float
                } else {
                    self.diagnostics.error(
                        codes::INVALID_MEMBER_ACCESS,
                        node.location,
                        codes::invalid_member_access(access.component, base.keyword()),
                    );
                    ValueType::Error
                }
            }
            _ => return Action::Continue,
        };
        if promote[0] {
            self.insert_promotion(arena, id, 0);
        }
        if promote[1] {
            self.insert_promotion(arena, id, 1);
        }
        arena.get(id).value_type.set(value_type);
        Action::Continue
    }
}
