//! Tree-walking interpreter over [`ast::Program`](crate::ast::Program).
//!
//! Statements run strictly in source order against a caller-owned
//! [`Runtime`](crate::runtime::Runtime).

pub mod evaluator;

pub use evaluator::Evaluator;
