use nom::{
    branch::alt,
    character::complete::{char, digit0, digit1},
    combinator::{map, opt, recognize},
    error::{context, ErrorKind, ParseError, VerboseError},
    sequence::pair,
};

use super::token::{ParserResult, Token};

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

/// Double-quoted string. `\n`, `\t`, `\\` and `\"` are unescaped, any other
/// escaped character is kept as is. A string missing its closing quote runs
/// to the end of input.
#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_string_literal(input: &str) -> ParserResult<Literal> {
    let (body, _) = context("string literal", char('"'))(input)?;

    let mut value = String::new();
    let mut chars = body.char_indices();
    let end = loop {
        match chars.next() {
            None => break body.len(),
            Some((i, '"')) => break i + 1,
            Some((_, '\\')) => match chars.next() {
                Some((_, 'n')) => value.push('\n'),
                Some((_, 't')) => value.push('\t'),
                Some((_, escaped)) => value.push(escaped),
                None => break body.len(),
            },
            Some((_, c)) => value.push(c),
        }
    };

    Ok((&body[end..], Literal::String(value)))
}

/// Digits with at most one decimal point. `1.` is a float; `1.2.3` stops
/// after `1.2`. An integer that does not fit `i64` is a hard failure so the
/// driver reports it instead of trying other alternatives.
#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_number_literal(input: &str) -> ParserResult<Literal> {
    let (rest, text) = context(
        "number literal",
        recognize(pair(digit1, opt(pair(char('.'), digit0)))),
    )(input)?;

    if text.contains('.') {
        return match text.parse::<f64>() {
            Ok(f) => Ok((rest, Literal::Float(f))),
            Err(_) => Err(nom::Err::Failure(VerboseError::from_error_kind(
                input,
                ErrorKind::Float,
            ))),
        };
    }
    match text.parse::<i64>() {
        Ok(i) => Ok((rest, Literal::Integer(i))),
        Err(_) => Err(nom::Err::Failure(VerboseError::from_error_kind(
            input,
            ErrorKind::Digit,
        ))),
    }
}

#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_literal(input: &str) -> ParserResult<Token> {
    context(
        "literal",
        map(
            alt((parse_string_literal, parse_number_literal)),
            Token::Literal,
        ),
    )(input)
}
