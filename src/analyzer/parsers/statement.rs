use super::super::{core::*, prelude::*};
use super::common::*;
use crate::ast::{
    AgentDef, ConfigBlock, LetStatement, LetValue, PipelineDef, RunStatement, SendMessage,
    Statement, ToolDef,
};
use crate::tokenizer::{keyword::Keyword, token::TokenSpan};
use crate::value::{Properties, Value};

/// One top-level statement, chosen by its leading keyword.
pub fn parse_statement() -> impl Parser<TokenSpan, Statement> {
    with_unexpected(choice(vec![
        Box::new(parse_agent()),
        Box::new(parse_tool()),
        Box::new(parse_pipeline()),
        Box::new(map(parse_run_statement(), Statement::Run)),
        Box::new(parse_let()),
        Box::new(parse_config()),
        Box::new(parse_send()),
    ]))
}

fn parse_agent() -> impl Parser<TokenSpan, Statement> {
    map(
        tuple3(
            parse_keyword(Keyword::Agent),
            with_context(parse_identifier(), "agent name"),
            parse_block(),
        ),
        |(span, name, properties)| {
            Statement::AgentDef(AgentDef {
                name,
                properties,
                span,
            })
        },
    )
}

fn parse_tool() -> impl Parser<TokenSpan, Statement> {
    map(
        tuple3(
            parse_keyword(Keyword::Tool),
            with_context(parse_identifier(), "tool name"),
            parse_block(),
        ),
        |(span, name, properties)| {
            Statement::ToolDef(ToolDef {
                name,
                description: text_property(&properties, "description"),
                params: match properties.get("params") {
                    Some(Value::Map(params)) => params.clone(),
                    _ => Properties::new(),
                },
                handler: text_property(&properties, "handler"),
                span,
            })
        },
    )
}

fn text_property(properties: &Properties, key: &str) -> String {
    properties
        .get(key)
        .filter(|value| !value.is_null())
        .map(|value| value.to_string())
        .unwrap_or_default()
}

/// `pipeline NAME { a -> b -> c on_error: { ... } }`
fn parse_pipeline() -> impl Parser<TokenSpan, Statement> {
    map(
        tuple3(
            parse_keyword(Keyword::Pipeline),
            with_context(parse_identifier(), "pipeline name"),
            delimited(
                with_context(parse_open_brace(), "'{'"),
                tuple3(
                    with_context(parse_identifier(), "agent name"),
                    many(preceded(
                        parse_arrow(),
                        with_context(parse_identifier(), "agent name"),
                    )),
                    optional(preceded(
                        tuple2(parse_keyword(Keyword::OnError), parse_colon()),
                        with_context(parse_properties(), "'{'"),
                    )),
                ),
                with_context(parse_close_brace(), "'}'"),
            ),
        ),
        |(span, name, (first, rest, error_handling))| {
            let mut agents = vec![first];
            agents.extend(rest);
            Statement::PipelineDef(PipelineDef {
                name,
                agents,
                error_handling,
                span,
            })
        },
    )
}

/// `run TARGET with { ... }`
pub fn parse_run_statement() -> impl Parser<TokenSpan, RunStatement> {
    map(
        tuple4(
            parse_keyword(Keyword::Run),
            with_context(parse_identifier(), "run target"),
            parse_keyword(Keyword::With),
            parse_block(),
        ),
        |(span, target, _, params)| RunStatement {
            target,
            params,
            span,
        },
    )
}

/// `let NAME = run ...` or `let NAME = value`
fn parse_let() -> impl Parser<TokenSpan, Statement> {
    map(
        tuple4(
            parse_keyword(Keyword::Let),
            with_context(parse_identifier(), "variable name"),
            parse_equal(),
            with_context(
                choice(vec![
                    Box::new(map(parse_run_statement(), LetValue::Run)),
                    Box::new(map(parse_value(), LetValue::Value)),
                ]),
                "run statement or value",
            ),
        ),
        |(span, name, _, value)| Statement::Let(LetStatement { name, value, span }),
    )
}

fn parse_config() -> impl Parser<TokenSpan, Statement> {
    map(
        tuple2(parse_keyword(Keyword::Config), parse_block()),
        |(span, settings)| Statement::Config(ConfigBlock { settings, span }),
    )
}

/// `send TARGET message { ... }`
fn parse_send() -> impl Parser<TokenSpan, Statement> {
    map(
        tuple4(
            parse_keyword(Keyword::Send),
            with_context(parse_identifier(), "send target"),
            parse_keyword(Keyword::Message),
            parse_block(),
        ),
        |(span, target, _, message)| {
            Statement::Send(SendMessage {
                target,
                message,
                span,
            })
        },
    )
}

/// Property block required after a statement header.
fn parse_block() -> impl Parser<TokenSpan, Properties> {
    with_context(parse_properties(), "'{'")
}
