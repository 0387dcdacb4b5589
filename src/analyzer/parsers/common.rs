use super::super::{core::*, prelude::*};
use crate::ast::Span;
use crate::tokenizer::{
    keyword::Keyword,
    literal::Literal,
    symbol::{Delimiter, Operator},
    token::{Token, TokenSpan},
};
use crate::value::{Properties, Value};

pub fn parse_identifier() -> impl Parser<TokenSpan, String> {
    satisfy("identifier", |span: &TokenSpan| match &span.token {
        Token::Identifier(s) => Some(s.clone()),
        _ => None,
    })
}

/// Matches `keyword` and yields its position.
pub fn parse_keyword(keyword: Keyword) -> impl Parser<TokenSpan, Span> {
    satisfy(&format!("keyword '{}'", keyword), move |span: &TokenSpan| {
        (span.token == Token::Keyword(keyword)).then(|| Span::new(span.line, span.column))
    })
}

fn parse_delimiter(delimiter: Delimiter) -> impl Parser<TokenSpan, ()> {
    satisfy(&format!("'{}'", delimiter), move |span: &TokenSpan| {
        (span.token == Token::Delimiter(delimiter)).then_some(())
    })
}

fn parse_operator(operator: Operator) -> impl Parser<TokenSpan, ()> {
    satisfy(&format!("'{}'", operator), move |span: &TokenSpan| {
        (span.token == Token::Operator(operator)).then_some(())
    })
}

// Punctuation
pub fn parse_open_brace() -> impl Parser<TokenSpan, ()> {
    parse_delimiter(Delimiter::OpenBrace)
}

pub fn parse_close_brace() -> impl Parser<TokenSpan, ()> {
    parse_delimiter(Delimiter::CloseBrace)
}

pub fn parse_open_bracket() -> impl Parser<TokenSpan, ()> {
    parse_delimiter(Delimiter::OpenBracket)
}

pub fn parse_close_bracket() -> impl Parser<TokenSpan, ()> {
    parse_delimiter(Delimiter::CloseBracket)
}

pub fn parse_open_paren() -> impl Parser<TokenSpan, ()> {
    parse_delimiter(Delimiter::OpenParen)
}

pub fn parse_close_paren() -> impl Parser<TokenSpan, ()> {
    parse_delimiter(Delimiter::CloseParen)
}

pub fn parse_comma() -> impl Parser<TokenSpan, ()> {
    parse_delimiter(Delimiter::Comma)
}

pub fn parse_colon() -> impl Parser<TokenSpan, ()> {
    parse_delimiter(Delimiter::Colon)
}

pub fn parse_equal() -> impl Parser<TokenSpan, ()> {
    parse_delimiter(Delimiter::Equal)
}

pub fn parse_arrow() -> impl Parser<TokenSpan, ()> {
    parse_operator(Operator::ThinArrow)
}

pub fn parse_dot() -> impl Parser<TokenSpan, ()> {
    parse_operator(Operator::Dot)
}

/// Any value: literal, list, nested block or identifier reference.
pub fn parse_value() -> impl Parser<TokenSpan, Value> {
    with_context(
        choice(vec![
            Box::new(parse_literal()),
            Box::new(parse_list()),
            Box::new(map(parse_properties(), Value::Map)),
            Box::new(parse_reference()),
        ]),
        "value",
    )
}

fn parse_literal() -> impl Parser<TokenSpan, Value> {
    satisfy("literal", |span: &TokenSpan| match &span.token {
        Token::Literal(Literal::String(s)) => Some(Value::String(s.clone())),
        Token::Literal(Literal::Integer(i)) => Some(Value::Integer(*i)),
        Token::Literal(Literal::Float(f)) => Some(Value::Float(*f)),
        Token::Literal(Literal::Boolean(b)) => Some(Value::Boolean(*b)),
        _ => None,
    })
}

/// `[a, b c]`: commas between items are optional.
pub fn parse_list() -> impl Parser<TokenSpan, Value> {
    map(
        delimited(
            parse_open_bracket(),
            many(map(
                tuple2(lazy(parse_value), optional(parse_comma())),
                |(value, _)| value,
            )),
            with_context(parse_close_bracket(), "']'"),
        ),
        Value::List,
    )
}

/// `{ key: value ... }`. Keys may also be keywords so that `message:` and
/// `on_error:` can appear inside blocks. A repeated key keeps its first
/// position and takes the last value.
pub fn parse_properties() -> impl Parser<TokenSpan, Properties> {
    map(
        delimited(
            parse_open_brace(),
            many(parse_property()),
            parse_close_brace(),
        ),
        |entries| entries.into_iter().collect::<Properties>(),
    )
}

fn parse_property() -> impl Parser<TokenSpan, (String, Value)> {
    map(
        tuple4(
            parse_property_key(),
            parse_colon(),
            lazy(parse_value),
            optional(parse_comma()),
        ),
        |(key, _, value, _)| (key, value),
    )
}

fn parse_property_key() -> impl Parser<TokenSpan, String> {
    satisfy("property name", |span: &TokenSpan| match &span.token {
        Token::Identifier(s) => Some(s.clone()),
        Token::Keyword(k) => Some(k.to_string()),
        _ => None,
    })
}

enum ReferenceSuffix {
    Call(Vec<Value>),
    Property(String),
}

/// A bare identifier, `id.name` or `id(args)`. None of these are resolved
/// here; each is kept as its source rendering.
fn parse_reference() -> impl Parser<TokenSpan, Value> {
    map(
        tuple2(
            parse_identifier(),
            optional(choice(vec![
                Box::new(map(parse_call_arguments(), ReferenceSuffix::Call)),
                Box::new(map(
                    preceded(parse_dot(), parse_identifier()),
                    ReferenceSuffix::Property,
                )),
            ])),
        ),
        |(name, suffix)| match suffix {
            None => Value::String(name),
            Some(ReferenceSuffix::Property(property)) => {
                Value::String(format!("{}.{}", name, property))
            }
            Some(ReferenceSuffix::Call(args)) => {
                let rendered: Vec<String> = args.iter().map(Value::to_literal).collect();
                Value::String(format!("{}({})", name, rendered.join(", ")))
            }
        },
    )
}

fn parse_call_arguments() -> impl Parser<TokenSpan, Vec<Value>> {
    delimited(
        parse_open_paren(),
        many(map(
            tuple2(lazy(parse_value), optional(parse_comma())),
            |(value, _)| value,
        )),
        with_context(parse_close_paren(), "')'"),
    )
}
