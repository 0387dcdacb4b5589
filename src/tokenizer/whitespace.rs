//! # Whitespace Token Handling
//!
//! Spaces, tabs and carriage returns separate tokens and are dropped. A line
//! feed becomes a [`Token::Newline`] so that line tracking stays visible in
//! the token stream; the preprocessor filters it out later.

use nom::{
    bytes::complete::{tag, take_while1},
    combinator::{map, value},
    error::context,
};

use super::token::{ParserResult, Token};

#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_whitespace(input: &str) -> ParserResult<Option<Token>> {
    context(
        "whitespace",
        value(None, take_while1(|c: char| c == ' ' || c == '\t' || c == '\r')),
    )(input)
}

#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_newline(input: &str) -> ParserResult<Option<Token>> {
    context("newline", map(tag("\n"), |_| Some(Token::Newline)))(input)
}
