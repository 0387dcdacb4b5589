pub mod common;
pub mod statement;

use super::core::{ParseError, Parser};
use crate::ast::Program;
use crate::tokenizer::{
    symbol::Delimiter,
    token::{Token, TokenSpan},
};

/// Deepest allowed nesting of braces, brackets and parentheses. Value
/// parsers recurse once per level.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Parses statements until the end-of-input token. The first error aborts.
#[tracing::instrument(level = "debug", skip(tokens))]
pub fn parse_program(tokens: &[TokenSpan]) -> Result<Program, ParseError> {
    check_nesting(tokens, MAX_NESTING_DEPTH)?;
    let statement = statement::parse_statement();
    let mut statements = Vec::new();
    let mut pos = 0;

    while let Some(span) = tokens.get(pos) {
        if span.token == Token::Eof {
            break;
        }
        let (next, parsed) = statement.parse(tokens, pos)?;
        statements.push(parsed);
        pos = next;
    }

    tracing::debug!(statements = statements.len(), "parsed program");
    Ok(Program { statements })
}

/// Fails on the first opening delimiter that goes past `limit` levels.
/// Unbalanced closers are left for the grammar to report.
fn check_nesting(tokens: &[TokenSpan], limit: usize) -> Result<(), ParseError> {
    let mut depth = 0usize;
    for span in tokens {
        match span.token {
            Token::Delimiter(Delimiter::OpenBrace | Delimiter::OpenBracket | Delimiter::OpenParen) => {
                depth += 1;
                if depth > limit {
                    return Err(ParseError::TooDeep {
                        limit,
                        found: span.token.to_string(),
                        line: span.line,
                        column: span.column,
                    });
                }
            }
            Token::Delimiter(
                Delimiter::CloseBrace | Delimiter::CloseBracket | Delimiter::CloseParen,
            ) => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Statement;
    use crate::preprocessor::{Preprocessor, TokenPreprocessor};
    use crate::tokenizer::token::tokenize;

    fn program(source: &str) -> Result<Program, ParseError> {
        parse_program(&TokenPreprocessor::default().process(tokenize(source).unwrap()))
    }

    #[test]
    fn test_empty_program() {
        assert!(program("").unwrap().statements.is_empty());
        assert!(program("// only a comment\n").unwrap().statements.is_empty());
    }

    #[test]
    fn test_statements_in_order() {
        let parsed = program(
            r#"
            config { default_model: "gpt-4" }
            agent a { prompt: "x" }
            run a with { task: "t" }
            "#,
        )
        .unwrap();
        let keywords: Vec<&str> = parsed.statements.iter().map(Statement::keyword).collect();
        assert_eq!(keywords, vec!["config", "agent", "run"]);
    }

    #[test]
    fn test_first_error_aborts() {
        let err = program("agent a {}\n42").unwrap_err();
        assert!(matches!(
            err,
            ParseError::Unexpected { line: 2, column: 1, .. }
        ));
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("let x = {}{}", "[".repeat(10_000), "]".repeat(10_000));
        let err = program(&deep).unwrap_err();
        assert_eq!(
            err,
            ParseError::TooDeep {
                limit: MAX_NESTING_DEPTH,
                found: "'['".to_string(),
                line: 1,
                column: 9 + MAX_NESTING_DEPTH,
            }
        );

        let inside = MAX_NESTING_DEPTH - 1;
        let ok = format!(
            "agent a {{ tags: {}{} }}",
            "[".repeat(inside),
            "]".repeat(inside)
        );
        assert!(program(&ok).is_ok());
    }
}
