//! Structural equality for folded constants.
//!
//! Two constants are equal here iff they'd be indistinguishable at the bit
//! level — float comparison is bitwise, not IEEE `==`, so `NaN` compares
//! equal to itself and `-0.0` does not compare equal to `0.0`. This is the
//! comparison constant folding needs when deciding whether re-folding an
//! already-folded tree changed anything, not the comparison the language's
//! own `==` operator performs on folded values.

use crate::arena::Arena;
use crate::node::{Constant, NodeId, NodeKind};

/// Equality for the five scalar constant kinds only. `Constant::List`
/// carries no payload of its own — its elements are separate arena nodes —
/// so this function cannot tell two lists apart and always reports them
/// unequal; call [`constant_nodes_structurally_equal`] instead when either
/// side might be a list.
#[must_use]
pub fn constants_structurally_equal(a: &Constant, b: &Constant) -> bool {
    match (a, b) {
        (Constant::Integer(x), Constant::Integer(y)) => x == y,
        (Constant::Float(x), Constant::Float(y)) => x == y,
        (Constant::String(x), Constant::String(y)) => x == y,
        (Constant::Key(x), Constant::Key(y)) => x == y,
        (Constant::Vector(x), Constant::Vector(y)) => x == y,
        (Constant::Rotation(x), Constant::Rotation(y)) => x == y,
        _ => false,
    }
}

/// Structural equality for two constant-valued nodes (a bare `Constant`
/// node or a `ConstantExpression` wrapping one), descending element-wise
/// into `Constant::List` children instead of the payload-only comparison
/// [`constants_structurally_equal`] is limited to.
#[must_use]
pub fn constant_nodes_structurally_equal(arena: &Arena, a: NodeId, b: NodeId) -> bool {
    let (a_value, a_children) = constant_payload(arena, a);
    let (b_value, b_children) = constant_payload(arena, b);
    match (a_value, b_value) {
        (Some(Constant::List), Some(Constant::List)) => {
            a_children.len() == b_children.len()
                && a_children
                    .iter()
                    .zip(b_children.iter())
                    .all(|(&x, &y)| constant_nodes_structurally_equal(arena, x, y))
        }
        (Some(x), Some(y)) => constants_structurally_equal(&x, &y),
        _ => false,
    }
}

fn constant_payload(arena: &Arena, id: NodeId) -> (Option<Constant>, Vec<NodeId>) {
    match &arena.get(id).kind {
        NodeKind::Constant(c) => (Some(c.clone()), arena.children(id).to_vec()),
        NodeKind::ConstantExpression => match arena.child(id, 0) {
            Some(inner) => constant_payload(arena, inner),
            None => (None, Vec::new()),
        },
        _ => (None, Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_equality_is_bitwise() {
        let nan = Constant::float(f32::NAN);
        assert!(constants_structurally_equal(&nan, &nan));

        let pos_zero = Constant::float(0.0);
        let neg_zero = Constant::float(-0.0);
        assert!(!constants_structurally_equal(&pos_zero, &neg_zero));
    }

    #[test]
    fn different_kinds_are_unequal() {
        assert!(!constants_structurally_equal(
            &Constant::Integer(0),
            &Constant::float(0.0)
        ));
    }

    fn list_node(arena: &mut Arena, elements: &[i32]) -> NodeId {
        let list = arena.alloc(crate::location::Location::synthetic(), NodeKind::Constant(Constant::List));
        for &e in elements {
            let element = arena.alloc(crate::location::Location::synthetic(), NodeKind::Constant(Constant::Integer(e)));
            arena.push_child(list, element);
        }
        list
    }

    #[test]
    fn list_equality_is_element_wise() {
        let mut arena = Arena::new();
        let a = list_node(&mut arena, &[1, 2, 3]);
        let b = list_node(&mut arena, &[1, 2, 3]);
        let c = list_node(&mut arena, &[1, 2, 4]);
        assert!(constant_nodes_structurally_equal(&arena, a, b));
        assert!(!constant_nodes_structurally_equal(&arena, a, c));
    }

    #[test]
    fn lists_of_different_length_are_unequal() {
        let mut arena = Arena::new();
        let a = list_node(&mut arena, &[1, 2]);
        let b = list_node(&mut arena, &[1, 2, 3]);
        assert!(!constant_nodes_structurally_equal(&arena, a, b));
    }
}
