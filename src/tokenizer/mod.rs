//! # Tokenizer Component
//!
//! Lexical analysis of AgentLang source: raw text in, a flat stream of
//! [`TokenSpan`](token::TokenSpan)s out, always terminated by
//! [`Token::Eof`](token::Token::Eof).
//!
//! ## Component Structure
//!
//! * [`token`]: Core token types and the [`Tokenizer`](token::Tokenizer) driver
//! * [`keyword`]: Reserved words
//! * [`symbol`]: Operators and delimiters
//! * [`literal`]: String, number and boolean literals
//! * [`whitespace`]: Blanks and line breaks
//! * [`comment`]: Line and block comments
//!
//! Each sub-parser is a `nom` combinator over `&str`; the driver tries them in
//! a fixed order at the current position and tracks line and column as it
//! consumes input. Whitespace and comments are consumed without producing a
//! token. Newlines are kept so that positions stay meaningful; the
//! [`preprocessor`](crate::preprocessor) removes them before parsing.
//!
//! ## Usage Example
//!
//! ```
//! use agentlang::tokenizer::token::{Token, Tokenizer};
//! use agentlang::tokenizer::keyword::Keyword;
//!
//! let tokens = Tokenizer::new().tokenize("agent writer {}").unwrap();
//! assert_eq!(tokens[0].token, Token::Keyword(Keyword::Agent));
//! assert_eq!(tokens.last().unwrap().token, Token::Eof);
//! ```

pub mod comment;
pub mod keyword;
pub mod literal;
pub mod symbol;
pub mod token;
pub mod whitespace;
