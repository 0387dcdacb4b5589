use thiserror::Error;

use crate::tokenizer::token::TokenSpan;

pub trait Parser<I, O> {
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O>;
}

pub type ParseResult<O> = Result<(usize, O), ParseError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Expected {expected}, found {found} at line {line}, column {column}")]
    Expected {
        expected: String,
        found: String,
        line: usize,
        column: usize,
    },
    #[error("Unexpected {found} at line {line}, column {column}")]
    Unexpected {
        found: String,
        line: usize,
        column: usize,
    },
    #[error("Nesting deeper than {limit} levels at {found}, line {line}, column {column}")]
    TooDeep {
        limit: usize,
        found: String,
        line: usize,
        column: usize,
    },
}

impl ParseError {
    pub fn position(&self) -> (usize, usize) {
        match self {
            ParseError::Expected { line, column, .. }
            | ParseError::Unexpected { line, column, .. }
            | ParseError::TooDeep { line, column, .. } => (*line, *column),
        }
    }

    pub fn found(&self) -> &str {
        match self {
            ParseError::Expected { found, .. }
            | ParseError::Unexpected { found, .. }
            | ParseError::TooDeep { found, .. } => found,
        }
    }
}

/// Input elements that know where they came from in the source.
pub trait Located {
    fn location(&self) -> (usize, usize);
}

impl Located for TokenSpan {
    fn location(&self) -> (usize, usize) {
        (self.line, self.column)
    }
}

/// Location of `input[pos]`, or of the last element past the end.
pub fn location_at<I: Located>(input: &[I], pos: usize) -> (usize, usize) {
    input
        .get(pos)
        .or_else(|| input.last())
        .map(Located::location)
        .unwrap_or((0, 0))
}

/// A parser that failed beyond its starting token has committed to its
/// alternative; callers must propagate the error instead of backtracking.
pub fn is_committed<I: Located>(error: &ParseError, input: &[I], pos: usize) -> bool {
    error.position() > location_at(input, pos)
}
