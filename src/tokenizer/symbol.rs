//! # Symbol Token Handling
//!
//! Operators and delimiters of the language.
//!
//! * [`Operator`]: the pipeline arrow `->` and the member access dot `.`
//! * [`Delimiter`]: braces, brackets, parentheses and punctuation
//!
//! `->` is matched as a whole; a lone `-` is not a valid token.

use std::fmt;

use nom::{
    branch::alt,
    bytes::complete::tag,
    combinator::{map, value},
    error::context,
};
use strum::{AsRefStr, Display, EnumString};

use super::token::{ParserResult, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr)]
pub enum Operator {
    /// Pipeline step separator (`->`)
    #[strum(serialize = "->")]
    ThinArrow,
    /// Member access (`.`)
    #[strum(serialize = ".")]
    Dot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    OpenParen,
    CloseParen,
    Comma,
    Colon,
    Equal,
}

impl Delimiter {
    pub fn symbol(&self) -> &'static str {
        match self {
            Delimiter::OpenBrace => "{",
            Delimiter::CloseBrace => "}",
            Delimiter::OpenBracket => "[",
            Delimiter::CloseBracket => "]",
            Delimiter::OpenParen => "(",
            Delimiter::CloseParen => ")",
            Delimiter::Comma => ",",
            Delimiter::Colon => ":",
            Delimiter::Equal => "=",
        }
    }
}

// Written by hand: strum's derived Display does not cope with brace literals.
impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_operator(input: &str) -> ParserResult<Token> {
    context(
        "operator",
        map(
            alt((
                value(Operator::ThinArrow, tag("->")),
                value(Operator::Dot, tag(".")),
            )),
            Token::Operator,
        ),
    )(input)
}

#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_delimiter(input: &str) -> ParserResult<Token> {
    context(
        "delimiter",
        map(
            alt((
                value(Delimiter::OpenBrace, tag("{")),
                value(Delimiter::CloseBrace, tag("}")),
                value(Delimiter::OpenBracket, tag("[")),
                value(Delimiter::CloseBracket, tag("]")),
                value(Delimiter::OpenParen, tag("(")),
                value(Delimiter::CloseParen, tag(")")),
                value(Delimiter::Comma, tag(",")),
                value(Delimiter::Colon, tag(":")),
                value(Delimiter::Equal, tag("=")),
            )),
            Token::Delimiter,
        ),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operators() {
        let test_cases = [
            ("->", Token::Operator(Operator::ThinArrow)),
            (".", Token::Operator(Operator::Dot)),
        ];
        for (input, expected) in test_cases {
            let (rest, token) = parse_operator(input).unwrap();
            assert_eq!(token, expected);
            assert_eq!(rest, "");
        }
    }

    #[test]
    fn test_lone_minus_is_not_an_operator() {
        assert!(parse_operator("- b").is_err());
    }

    #[test]
    fn test_delimiters() {
        for input in ["{", "}", "[", "]", "(", ")", ",", ":", "="] {
            let (rest, token) = parse_delimiter(input).unwrap();
            match token {
                Token::Delimiter(d) => assert_eq!(d.symbol(), input),
                other => panic!("expected delimiter, got {:?}", other),
            }
            assert_eq!(rest, "");
        }
    }

    #[test]
    fn test_delimiter_display() {
        assert_eq!(Delimiter::CloseBrace.to_string(), "}");
        assert_eq!(Operator::ThinArrow.to_string(), "->");
    }
}
