//! The fixed catalog of diagnostic codes and their message templates.
//!
//! Codes are never renumbered once assigned — downstream tooling (and the
//! assertion protocol in [`crate::diagnostics`]) pins expectations to these
//! numbers, so a code is retired rather than reused if its check is removed.

pub const DUPLICATE_DECLARATION: u32 = 10001;
pub const UNDECLARED_IDENTIFIER: u32 = 10002;
pub const UNDECLARED_FUNCTION: u32 = 10003;
pub const TYPE_MISMATCH: u32 = 10004;
pub const ARGUMENT_COUNT_MISMATCH: u32 = 10005;
pub const ARGUMENT_TYPE_MISMATCH: u32 = 10006;
pub const INVALID_CAST: u32 = 10007;
pub const MISSING_RETURN_VALUE: u32 = 10008;
pub const UNEXPECTED_RETURN_VALUE: u32 = 10009;
pub const UNKNOWN_STATE: u32 = 10010;
pub const GLOBAL_INITIALIZER_NOT_CONSTANT: u32 = 10011;
pub const LIST_CONTAINS_LIST: u32 = 10012;
pub const UNKNOWN_EVENT_HANDLER: u32 = 10013;
pub const UNDECLARED_LABEL: u32 = 10014;
pub const INVALID_MEMBER_ACCESS: u32 = 10015;
pub const DIVISION_BY_ZERO: u32 = 20001;
pub const SHADOWED_DECLARATION: u32 = 20002;
pub const UNUSED_LOCAL: u32 = 20003;
pub const UNUSED_GLOBAL: u32 = 20004;
pub const UNUSED_FUNCTION: u32 = 20005;
pub const INTEGER_OVERFLOW: u32 = 20006;

#[must_use]
pub fn duplicate_declaration(name: &str, first_line: i32, first_column: i32) -> String {
    format!(
        "Duplicate declaration of `{name}'; previously declared at ({first_line}, {first_column})."
    )
}

#[must_use]
pub fn undeclared_identifier(name: &str) -> String {
    format!("Use of undeclared identifier `{name}'.")
}

#[must_use]
pub fn undeclared_function(name: &str) -> String {
    format!("Call to undeclared function `{name}'.")
}

#[must_use]
pub fn type_mismatch(expected: &str, found: &str) -> String {
    format!("Type mismatch: expected `{expected}', found `{found}'.")
}

#[must_use]
pub fn argument_count_mismatch(name: &str, expected: usize, found: usize) -> String {
    format!("Function `{name}' expects {expected} argument(s), found {found}.")
}

#[must_use]
pub fn argument_type_mismatch(name: &str, index: usize, expected: &str, found: &str) -> String {
    format!("Argument {index} of `{name}' expects `{expected}', found `{found}'.")
}

#[must_use]
pub fn invalid_cast(from: &str, to: &str) -> String {
    format!("Cannot cast `{from}' to `{to}'.")
}

#[must_use]
pub fn missing_return_value(function: &str, return_type: &str) -> String {
    format!("Function `{function}' must return a value of type `{return_type}'.")
}

#[must_use]
pub fn unexpected_return_value(function: &str) -> String {
    format!("Function `{function}' returns void and cannot return a value.")
}

#[must_use]
pub fn unknown_state(name: &str) -> String {
    format!("State `{name}' is not declared in this script.")
}

#[must_use]
pub fn global_initializer_not_constant(name: &str) -> String {
    format!("Global variable `{name}' must be initialized with a constant expression.")
}

#[must_use]
pub fn list_contains_list() -> String {
    "Lists may not contain lists.".to_string()
}

#[must_use]
pub fn unknown_event_handler(name: &str) -> String {
    format!("`{name}' is not a recognized event handler.")
}

#[must_use]
pub fn undeclared_label(name: &str) -> String {
    format!("Jump to undeclared label `{name}'.")
}

#[must_use]
pub fn invalid_member_access(component: char, base_type: &str) -> String {
    format!("`{base_type}' has no member `{component}'.")
}

#[must_use]
pub fn division_by_zero() -> String {
    "Division by zero in constant expression; result folded to zero.".to_string()
}

#[must_use]
pub fn shadowed_declaration(name: &str, first_line: i32, first_column: i32) -> String {
    format!("Declaration of `{name}' shadows an outer declaration at ({first_line}, {first_column}).")
}

#[must_use]
pub fn unused_local(name: &str) -> String {
    format!("Local variable `{name}' is never used.")
}

#[must_use]
pub fn unused_global(name: &str) -> String {
    format!("Global variable `{name}' is never used.")
}

#[must_use]
pub fn unused_function(name: &str) -> String {
    format!("Function `{name}' is never called and was pruned.")
}

#[must_use]
pub fn integer_overflow() -> String {
    "Integer constant expression overflowed and wrapped around.".to_string()
}
