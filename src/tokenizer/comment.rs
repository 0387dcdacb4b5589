use nom::{
    branch::alt,
    bytes::complete::{tag, take_until, take_while},
    combinator::{rest, value},
    error::context,
    sequence::{delimited, preceded},
};

use super::token::{ParserResult, Token};

/// `//` up to, not including, the line feed.
#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_line_comment(input: &str) -> ParserResult<Option<Token>> {
    context(
        "line comment",
        value(None, preceded(tag("//"), take_while(|c: char| c != '\n'))),
    )(input)
}

/// `/* ... */`, not nested. Without a closing `*/` the comment swallows the
/// rest of the input.
#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_block_comment(input: &str) -> ParserResult<Option<Token>> {
    context(
        "block comment",
        value(
            None,
            alt((
                delimited(tag("/*"), take_until("*/"), tag("*/")),
                preceded(tag("/*"), rest),
            )),
        ),
    )(input)
}

#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_comment(input: &str) -> ParserResult<Option<Token>> {
    alt((parse_line_comment, parse_block_comment))(input)
}
