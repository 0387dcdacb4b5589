//! # Analyzer
//!
//! Turns the preprocessed token stream into an [`ast::Program`](crate::ast::Program).
//!
//! * [`core`]: the [`Parser`] trait, [`ParseResult`] and [`ParseError`]
//! * [`combinators`] / [`prelude`]: generic combinators and their constructors
//! * [`parsers`]: grammar rules built from the combinators
//!
//! Parsers are functions returning `impl Parser<TokenSpan, O>`; recursive rules
//! go through [`prelude::lazy`]. There is no error recovery: the first
//! [`ParseError`] aborts the parse.

pub mod combinators;
pub mod core;
pub mod parsers;
pub mod prelude;

pub use core::ParseError;
pub use core::ParseResult;
pub use core::Parser;
pub use parsers::parse_program;
