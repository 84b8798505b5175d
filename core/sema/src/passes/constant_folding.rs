//! Pass 4 (and the optimizer's `fold_constants` step): evaluates
//! expressions whose operands are already constant and replaces them with a
//! `ConstantExpression` wrapping the folded value.
//!
//! Folding is post-order and idempotent: a node is only folded once its
//! children are already folded (or were constants to begin with), and
//! running the pass again over an already-folded tree folds nothing further,
//! which is what lets the optimizer re-invoke it after pruning without doing
//! duplicate work.

use scriptlang_ast::{
    Action, Arena, BinaryOperator, Constant, NodeId, NodeKind, UnaryOperator, ValueType, Visitor,
};

use crate::codes;
use crate::diagnostics::DiagnosticLog;
use crate::numeric;

pub struct ConstantFolding<'a> {
    pub diagnostics: &'a DiagnosticLog,
    folded_any: bool,
}

impl<'a> ConstantFolding<'a> {
    /// Runs one fold pass over the whole tree and reports whether anything
    /// changed, so a caller driving this to a fixed point knows when to
    /// stop.
    pub fn run(arena: &mut Arena, diagnostics: &'a DiagnosticLog) -> bool {
        let Some(root) = arena.root() else { return false };
        let mut pass = ConstantFolding { diagnostics, folded_any: false };
        scriptlang_ast::walk(arena, root, &mut pass);
        pass.folded_any
    }
}

impl Visitor for ConstantFolding<'_> {
    fn leave(&mut self, arena: &mut Arena, id: NodeId) -> Action {
        let location = arena.get(id).location;

        if matches!(arena.get(id).kind, NodeKind::ListExpression) {
            let Some(elements) = fold_list(arena, id, self.diagnostics) else { return Action::Continue };
            let constant_node = arena.alloc(location, NodeKind::Constant(Constant::List));
            arena.get(constant_node).value_type.set(ValueType::List);
            for element in elements {
                arena.push_child(constant_node, element);
            }
            return self.wrap_and_replace(arena, id, constant_node, ValueType::List);
        }

        let folded = match &arena.get(id).kind {
            NodeKind::BinaryExpression(op) => fold_binary(arena, id, *op, self.diagnostics),
            NodeKind::UnaryExpression(op) => fold_unary(arena, id, *op, self.diagnostics),
            NodeKind::TypecastExpression(target) => fold_cast(arena, id, *target),
            NodeKind::VectorExpression => fold_vector(arena, id),
            NodeKind::RotationExpression => fold_rotation(arena, id),
            _ => None,
        };

        let Some(constant) = folded else { return Action::Continue };
        let value_type = value_type_of(&constant);
        let constant_node = arena.alloc(location, NodeKind::Constant(constant));
        arena.get(constant_node).value_type.set(value_type);
        self.wrap_and_replace(arena, id, constant_node, value_type)
    }
}

impl ConstantFolding<'_> {
    fn wrap_and_replace(&mut self, arena: &mut Arena, old: NodeId, constant_node: NodeId, value_type: ValueType) -> Action {
        let location = arena.get(old).location;
        let wrapper = arena.alloc(location, NodeKind::ConstantExpression);
        arena.get(wrapper).value_type.set(value_type);
        arena.push_child(wrapper, constant_node);
        arena.replace_node(old, wrapper);
        self.folded_any = true;
        Action::Replaced
    }
}

fn value_type_of(c: &Constant) -> ValueType {
    match c {
        Constant::Integer(_) => ValueType::Integer,
        Constant::Float(_) => ValueType::Float,
        Constant::String(_) => ValueType::String,
        Constant::Key(_) => ValueType::Key,
        Constant::Vector(_) => ValueType::Vector,
        Constant::Rotation(_) => ValueType::Rotation,
        Constant::List => ValueType::List,
    }
}

/// Returns the folded constant payload of `id`, whether `id` is a bare
/// literal or an already-folded `ConstantExpression` wrapper.
fn constant_of(arena: &Arena, id: NodeId) -> Option<Constant> {
    match &arena.get(id).kind {
        NodeKind::Constant(c) => Some(c.clone()),
        NodeKind::ConstantExpression => {
            let wrapped = arena.child(id, 0)?;
            match &arena.get(wrapped).kind {
                NodeKind::Constant(c) => Some(c.clone()),
                _ => None,
            }
        }
        _ => None,
    }
}

fn fold_binary(arena: &Arena, id: NodeId, op: BinaryOperator, diagnostics: &DiagnosticLog) -> Option<Constant> {
    let lhs_id = arena.child(id, 0)?;
    let rhs_id = arena.child(id, 1)?;
    let lhs = constant_of(arena, lhs_id)?;
    let rhs = constant_of(arena, rhs_id)?;
    let location = arena.get(id).location;

    use BinaryOperator::*;
    match (op, lhs, rhs) {
        (Add, Constant::Integer(a), Constant::Integer(b)) => {
            if a.checked_add(b).is_none() {
                diagnostics.warning(codes::INTEGER_OVERFLOW, location, codes::integer_overflow());
            }
            Some(Constant::Integer(numeric::int_add(a, b)))
        }
        (Sub, Constant::Integer(a), Constant::Integer(b)) => {
            if a.checked_sub(b).is_none() {
                diagnostics.warning(codes::INTEGER_OVERFLOW, location, codes::integer_overflow());
            }
            Some(Constant::Integer(numeric::int_sub(a, b)))
        }
        (Mul, Constant::Integer(a), Constant::Integer(b)) => {
            if a.checked_mul(b).is_none() {
                diagnostics.warning(codes::INTEGER_OVERFLOW, location, codes::integer_overflow());
            }
            Some(Constant::Integer(numeric::int_mul(a, b)))
        }
        (Div, Constant::Integer(a), Constant::Integer(b)) => {
            if b == 0 {
                diagnostics.warning(codes::DIVISION_BY_ZERO, location, codes::division_by_zero());
            }
            Some(Constant::Integer(numeric::int_div(a, b)))
        }
        (Mod, Constant::Integer(a), Constant::Integer(b)) => {
            if b == 0 {
                diagnostics.warning(codes::DIVISION_BY_ZERO, location, codes::division_by_zero());
            }
            Some(Constant::Integer(numeric::int_mod(a, b)))
        }
        (Add, Constant::Float(a), Constant::Float(b)) => {
            Some(Constant::float(Constant::float_value(a) + Constant::float_value(b)))
        }
        (Sub, Constant::Float(a), Constant::Float(b)) => {
            Some(Constant::float(Constant::float_value(a) - Constant::float_value(b)))
        }
        (Mul, Constant::Float(a), Constant::Float(b)) => {
            Some(Constant::float(Constant::float_value(a) * Constant::float_value(b)))
        }
        (Div, Constant::Float(a), Constant::Float(b)) => {
            Some(Constant::float(Constant::float_value(a) / Constant::float_value(b)))
        }
        (BitAnd, Constant::Integer(a), Constant::Integer(b)) => Some(Constant::Integer(a & b)),
        (BitOr, Constant::Integer(a), Constant::Integer(b)) => Some(Constant::Integer(a | b)),
        (BitXor, Constant::Integer(a), Constant::Integer(b)) => Some(Constant::Integer(a ^ b)),
        (Shl, Constant::Integer(a), Constant::Integer(b)) => Some(Constant::Integer(a.wrapping_shl(b as u32))),
        (Shr, Constant::Integer(a), Constant::Integer(b)) => Some(Constant::Integer(a.wrapping_shr(b as u32))),
        (Add, Constant::String(a), Constant::String(b)) => Some(Constant::String(a + &b)),
        _ => None,
    }
}

fn fold_unary(arena: &Arena, id: NodeId, op: UnaryOperator, diagnostics: &DiagnosticLog) -> Option<Constant> {
    let operand_id = arena.child(id, 0)?;
    let operand = constant_of(arena, operand_id)?;
    let location = arena.get(id).location;
    match (op, operand) {
        (UnaryOperator::Neg, Constant::Integer(a)) => {
            if a.checked_neg().is_none() {
                diagnostics.warning(codes::INTEGER_OVERFLOW, location, codes::integer_overflow());
            }
            Some(Constant::Integer(numeric::int_neg(a)))
        }
        (UnaryOperator::Neg, Constant::Float(bits)) => Some(Constant::float(-Constant::float_value(bits))),
        (UnaryOperator::BitNot, Constant::Integer(a)) => Some(Constant::Integer(!a)),
        (UnaryOperator::Not, Constant::Integer(a)) => Some(Constant::Integer(i32::from(a == 0))),
        _ => None,
    }
}

/// Mirrors the reference simplifier: a same-type cast is elided outright
/// (handled one level up, see note below), and only int<->float casts fold
/// when the operand is already constant — casts to/from the aggregate
/// types never fold.
fn fold_cast(arena: &Arena, id: NodeId, target: ValueType) -> Option<Constant> {
    let operand_id = arena.child(id, 0)?;
    let operand = constant_of(arena, operand_id)?;
    match (target, operand) {
        (ValueType::Integer, Constant::Float(bits)) => {
            Some(Constant::Integer(numeric::cast_float_to_int(Constant::float_value(bits))))
        }
        (ValueType::Float, Constant::Integer(a)) => Some(Constant::float(numeric::cast_int_to_float(a))),
        (ValueType::Integer, Constant::Integer(a)) => Some(Constant::Integer(a)),
        (ValueType::Float, Constant::Float(bits)) => Some(Constant::Float(bits)),
        _ => None,
    }
}

fn fold_vector(arena: &Arena, id: NodeId) -> Option<Constant> {
    let mut components = [0u32; 3];
    for (slot, component) in components.iter_mut().enumerate() {
        let child = arena.child(id, slot)?;
        match constant_of(arena, child)? {
            Constant::Float(bits) => *component = bits,
            Constant::Integer(i) => *component = numeric::cast_int_to_float(i).to_bits(),
            _ => return None,
        }
    }
    Some(Constant::Vector(components))
}

fn fold_rotation(arena: &Arena, id: NodeId) -> Option<Constant> {
    let mut components = [0u32; 4];
    for (slot, component) in components.iter_mut().enumerate() {
        let child = arena.child(id, slot)?;
        match constant_of(arena, child)? {
            Constant::Float(bits) => *component = bits,
            Constant::Integer(i) => *component = numeric::cast_int_to_float(i).to_bits(),
            _ => return None,
        }
    }
    Some(Constant::Rotation(components))
}

/// Returns the element constant nodes for a fully-constant list literal,
/// detached from whatever wrapper currently owns them so the caller can
/// reparent them under the new `Constant::List` node. `None` if any element
/// isn't constant yet, or is itself a list — nested lists are never legal,
/// but that's reported once up front by type determination (every
/// `ListExpression` with a `list`-typed child is already flagged there
/// regardless of whether the nested list is constant), so this just
/// declines to fold rather than reporting it a second time.
fn fold_list(arena: &mut Arena, id: NodeId, _diagnostics: &DiagnosticLog) -> Option<Vec<NodeId>> {
    let children: Vec<NodeId> = arena.children(id).to_vec();
    let mut elements = Vec::with_capacity(children.len());
    for child in children {
        let (value, inner) = match &arena.get(child).kind {
            NodeKind::Constant(c) => (c.clone(), child),
            NodeKind::ConstantExpression => {
                let inner = arena.child(child, 0)?;
                let NodeKind::Constant(c) = &arena.get(inner).kind else { return None };
                (c.clone(), inner)
            }
            _ => return None,
        };
        if matches!(value, Constant::List) {
            return None;
        }
        arena.detach(inner);
        elements.push(inner);
    }
    Some(elements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptlang_ast::Location;

    fn binary(arena: &mut Arena, op: BinaryOperator, lhs: i32, rhs: i32) -> NodeId {
        let loc = Location::synthetic();
        let lhs = arena.alloc(loc, NodeKind::Constant(Constant::Integer(lhs)));
        let rhs = arena.alloc(loc, NodeKind::Constant(Constant::Integer(rhs)));
        let node = arena.alloc(loc, NodeKind::BinaryExpression(op));
        arena.push_child(node, lhs);
        arena.push_child(node, rhs);
        node
    }

    #[test]
    fn overflowing_add_wraps_and_warns() {
        let mut arena = Arena::new();
        let expr = binary(&mut arena, BinaryOperator::Add, i32::MAX, 1);
        arena.set_root(expr);
        let diagnostics = DiagnosticLog::new();

        ConstantFolding::run(&mut arena, &diagnostics);

        // `expr` was the root, so folding replaced it; the wrapper took its
        // place as the new root rather than becoming a child of `expr`.
        let wrapper = arena.root().expect("root survives folding");
        let folded = arena.child(wrapper, 0).expect("wrapped constant node");
        assert!(matches!(arena.get(folded).kind, NodeKind::Constant(Constant::Integer(i32::MIN))));
        assert_eq!(diagnostics.entries().iter().filter(|d| d.code == codes::INTEGER_OVERFLOW).count(), 1);
    }

    #[test]
    fn non_overflowing_add_stays_silent() {
        let mut arena = Arena::new();
        let expr = binary(&mut arena, BinaryOperator::Add, 2, 3);
        arena.set_root(expr);
        let diagnostics = DiagnosticLog::new();

        ConstantFolding::run(&mut arena, &diagnostics);

        assert!(diagnostics.is_empty());
    }

    #[test]
    fn folding_is_idempotent() {
        let mut arena = Arena::new();
        let expr = binary(&mut arena, BinaryOperator::Mul, 6, 7);
        arena.set_root(expr);
        let diagnostics = DiagnosticLog::new();

        let changed_first = ConstantFolding::run(&mut arena, &diagnostics);
        assert!(changed_first);
        let changed_second = ConstantFolding::run(&mut arena, &diagnostics);
        assert!(!changed_second);
        assert_eq!(diagnostics.len(), 0);
    }
}
