//! The check surface consumed by test bodies.
//!
//! Every macro verifies a condition; when it holds the check is a no-op,
//! otherwise the body returns a [`TestFail::Check`](crate::TestFail) whose
//! message is the stringified arguments plus the source location. The
//! macros only work inside functions returning
//! [`TestResult`](crate::TestResult).
//!
//! The structural and query checks are thin adapters over the same
//! mechanism; a query that fails to compile or evaluate counts as a false
//! condition.

use arbortest_dom::{Document, Node, Query};

pub use arbortest_dom::Format;

/// Verify a boolean condition.
#[macro_export]
macro_rules! check {
    ($cond:expr) => {
        if $cond {
        } else {
            return Err($crate::failure::TestFail::check(
                concat!(stringify!($cond), " is false"),
                file!(),
                line!(),
            ));
        }
    };
}

/// Verify string equality.
#[macro_export]
macro_rules! check_string {
    ($value:expr, $expected:expr) => {
        if $value == $expected {
        } else {
            return Err($crate::failure::TestFail::check(
                concat!(
                    stringify!($value),
                    " is not equal to ",
                    stringify!($expected)
                ),
                file!(),
                line!(),
            ));
        }
    };
}

/// Verify floating-point equality within an absolute tolerance of `1e-6`.
#[macro_export]
macro_rules! check_double {
    ($value:expr, $expected:expr) => {
        if $crate::checks::double_equal($value, $expected) {
        } else {
            return Err($crate::failure::TestFail::check(
                concat!(
                    stringify!($value),
                    " is not equal to ",
                    stringify!($expected)
                ),
                file!(),
                line!(),
            ));
        }
    };
}

/// Verify a node's name and value together.
#[macro_export]
macro_rules! check_name_value {
    ($node:expr, $name:expr, $value:expr) => {
        if $crate::checks::node_name_value_eq($node, $name, $value) {
        } else {
            return Err($crate::failure::TestFail::check(
                concat!(
                    stringify!($node),
                    " name/value do not match ",
                    stringify!($name),
                    " and ",
                    stringify!($value)
                ),
                file!(),
                line!(),
            ));
        }
    };
}

/// Verify a subtree's serialized contents under an explicit format.
#[macro_export]
macro_rules! check_node_ex {
    ($node:expr, $expected:expr, $format:expr) => {
        if $crate::checks::node_contents_eq($node, $expected, $format) {
        } else {
            return Err($crate::failure::TestFail::check(
                concat!(
                    stringify!($node),
                    " contents does not match ",
                    stringify!($expected)
                ),
                file!(),
                line!(),
            ));
        }
    };
}

/// Verify a subtree's raw serialized contents.
#[macro_export]
macro_rules! check_node {
    ($node:expr, $expected:expr) => {
        $crate::check_node_ex!($node, $expected, $crate::checks::Format::Raw)
    };
}

/// Verify a query evaluates to the expected string.
#[macro_export]
macro_rules! check_query_string {
    ($doc:expr, $query:expr, $expected:expr) => {
        if $crate::checks::query_string_eq(&$doc, $query, $expected) {
        } else {
            return Err($crate::failure::TestFail::check(
                concat!(
                    stringify!($query),
                    " does not evaluate to ",
                    stringify!($expected),
                    " in context ",
                    stringify!($doc)
                ),
                file!(),
                line!(),
            ));
        }
    };
}

/// Verify a query evaluates to the expected boolean.
#[macro_export]
macro_rules! check_query_boolean {
    ($doc:expr, $query:expr, $expected:expr) => {
        if $crate::checks::query_boolean_eq(&$doc, $query, $expected) {
        } else {
            return Err($crate::failure::TestFail::check(
                concat!(
                    stringify!($query),
                    " does not evaluate to ",
                    stringify!($expected),
                    " in context ",
                    stringify!($doc)
                ),
                file!(),
                line!(),
            ));
        }
    };
}

/// Verify a query evaluates to the expected number (tolerance `1e-6`).
#[macro_export]
macro_rules! check_query_number {
    ($doc:expr, $query:expr, $expected:expr) => {
        if $crate::checks::query_number_eq(&$doc, $query, $expected) {
        } else {
            return Err($crate::failure::TestFail::check(
                concat!(
                    stringify!($query),
                    " does not evaluate to ",
                    stringify!($expected),
                    " in context ",
                    stringify!($doc)
                ),
                file!(),
                line!(),
            ));
        }
    };
}

/// Verify a query evaluates to NaN.
#[macro_export]
macro_rules! check_query_number_nan {
    ($doc:expr, $query:expr) => {
        if $crate::checks::query_number_is_nan(&$doc, $query) {
        } else {
            return Err($crate::failure::TestFail::check(
                concat!(
                    stringify!($query),
                    " does not evaluate to NaN in context ",
                    stringify!($doc)
                ),
                file!(),
                line!(),
            ));
        }
    };
}

/// Verify a query is rejected at compile time.
#[macro_export]
macro_rules! check_query_fail {
    ($query:expr) => {
        if $crate::checks::query_fails_to_compile($query) {
        } else {
            return Err($crate::failure::TestFail::check(
                concat!(stringify!($query), " should not compile"),
                file!(),
                line!(),
            ));
        }
    };
}

/// Absolute-tolerance float comparison used by [`check_double!`].
#[must_use]
pub fn double_equal(value: f64, expected: f64) -> bool {
    (value - expected).abs() < 1e-6
}

/// Node name and value both match.
#[must_use]
pub fn node_name_value_eq(node: Node<'_>, name: &str, value: &str) -> bool {
    node.name() == name && node.value() == value
}

/// Serialized subtree matches the expected text under `format`.
#[must_use]
pub fn node_contents_eq(node: Node<'_>, expected: &str, format: Format) -> bool {
    node.serialize(format) == expected
}

/// Query compiles and evaluates to the expected string.
#[must_use]
pub fn query_string_eq(doc: &Document, query: &str, expected: &str) -> bool {
    Query::compile(query).is_ok_and(|q| q.evaluate_string(doc) == expected)
}

/// Query compiles and evaluates to the expected boolean.
#[must_use]
pub fn query_boolean_eq(doc: &Document, query: &str, expected: bool) -> bool {
    Query::compile(query).is_ok_and(|q| q.evaluate_boolean(doc) == expected)
}

/// Query compiles and evaluates to the expected number within `1e-6`.
#[must_use]
pub fn query_number_eq(doc: &Document, query: &str, expected: f64) -> bool {
    Query::compile(query).is_ok_and(|q| double_equal(q.evaluate_number(doc), expected))
}

/// Query compiles and evaluates to NaN.
#[must_use]
pub fn query_number_is_nan(doc: &Document, query: &str) -> bool {
    Query::compile(query).is_ok_and(|q| q.evaluate_number(doc).is_nan())
}

/// Query text is rejected by the compiler.
#[must_use]
pub fn query_fails_to_compile(query: &str) -> bool {
    Query::compile(query).is_err()
}
