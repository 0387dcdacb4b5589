use std::fmt;

use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    combinator::{map, recognize},
    error::{context, VerboseError},
    sequence::pair,
    IResult,
};
use thiserror::Error;

use super::{
    comment::parse_comment,
    keyword::Keyword,
    literal::{parse_literal, Literal},
    symbol::{parse_delimiter, parse_operator, Delimiter, Operator},
    whitespace::{parse_newline, parse_whitespace},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords
    Keyword(Keyword),
    // Identifiers
    Identifier(String),
    // Literals
    Literal(Literal),
    // Symbols
    Operator(Operator),
    Delimiter(Delimiter),
    // Structure
    Newline,
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Keyword(k) => write!(f, "keyword '{}'", k),
            Token::Identifier(name) => write!(f, "identifier '{}'", name),
            Token::Literal(Literal::String(s)) => write!(f, "string {:?}", s),
            Token::Literal(Literal::Integer(i)) => write!(f, "integer {}", i),
            Token::Literal(Literal::Float(x)) => write!(f, "float {:?}", x),
            Token::Literal(Literal::Boolean(b)) => write!(f, "boolean {}", b),
            Token::Operator(op) => write!(f, "'{}'", op),
            Token::Delimiter(d) => write!(f, "'{}'", d),
            Token::Newline => write!(f, "newline"),
            Token::Eof => write!(f, "end of input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenSpan {
    pub token: Token,
    /// Byte offsets into the source.
    pub start: usize,
    pub end: usize,
    /// 1-based.
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for TokenSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.token, f)
    }
}

#[derive(Debug, Clone)]
pub struct Tokenizer {
    current_position: usize,
    current_line: usize,
    current_column: usize,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    pub fn new() -> Self {
        Self {
            current_position: 0,
            current_line: 1,   // 1-based
            current_column: 1, // 1-based
        }
    }

    /// Scans the whole input. The result always ends with [`Token::Eof`].
    #[tracing::instrument(level = "debug", skip(self, input))]
    pub fn tokenize(&mut self, input: &str) -> TokenizerResult<Vec<TokenSpan>> {
        let mut tokens = Vec::new();
        let mut remaining = input;

        while let Some(next_char) = remaining.chars().next() {
            let start_position = self.current_position;
            let start_line = self.current_line;
            let start_column = self.current_column;

            let result = alt((
                // Formatting
                parse_whitespace,
                parse_newline,
                parse_comment,
                // Code elements
                map(parse_literal, Some),
                map(parse_word, Some),
                map(parse_operator, Some),
                map(parse_delimiter, Some),
            ))(remaining);

            match result {
                Ok((new_remaining, token)) => {
                    let consumed = &remaining[..(remaining.len() - new_remaining.len())];
                    self.update_position(consumed);

                    if let Some(token) = token {
                        tokens.push(TokenSpan {
                            token,
                            start: start_position,
                            end: self.current_position,
                            line: start_line,
                            column: start_column,
                        });
                    }

                    remaining = new_remaining;
                }
                Err(nom::Err::Failure(_)) => {
                    let text = remaining
                        .chars()
                        .take_while(|c| c.is_ascii_digit() || *c == '.')
                        .collect::<String>();
                    let error = TokenizerError::InvalidNumber {
                        text,
                        line: start_line,
                        column: start_column,
                    };
                    tracing::error!("{}", error);
                    return Err(error);
                }
                Err(_) => {
                    let error = TokenizerError::UnexpectedCharacter {
                        character: next_char,
                        line: start_line,
                        column: start_column,
                    };
                    tracing::error!("{}", error);
                    return Err(error);
                }
            }
        }

        tokens.push(TokenSpan {
            token: Token::Eof,
            start: self.current_position,
            end: self.current_position,
            line: self.current_line,
            column: self.current_column,
        });

        tracing::debug!(count = tokens.len(), "tokenized");
        Ok(tokens)
    }

    fn update_position(&mut self, text: &str) {
        for c in text.chars() {
            self.current_position += c.len_utf8();
            if c == '\n' {
                self.current_line += 1;
                self.current_column = 1;
            } else {
                self.current_column += 1;
            }
        }
    }
}

/// Tokenizes `source` with a fresh [`Tokenizer`].
pub fn tokenize(source: &str) -> TokenizerResult<Vec<TokenSpan>> {
    Tokenizer::new().tokenize(source)
}

/// Identifier, keyword or boolean literal.
#[tracing::instrument(level = "debug", skip(input))]
fn parse_word(input: &str) -> ParserResult<Token> {
    let (input, word) = context(
        "identifier",
        recognize(pair(
            take_while1(|c: char| c.is_ascii_alphabetic() || c == '_'),
            take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
        )),
    )(input)?;

    match word {
        "true" => return Ok((input, Token::Literal(Literal::Boolean(true)))),
        "false" => return Ok((input, Token::Literal(Literal::Boolean(false)))),
        _ => {}
    }
    if let Ok(kw) = Keyword::try_from(word) {
        return Ok((input, Token::Keyword(kw)));
    }

    Ok((input, Token::Identifier(word.to_string())))
}

pub type ParserResult<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

pub type TokenizerResult<T> = Result<T, TokenizerError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TokenizerError {
    #[error("Unexpected character '{character}' at line {line}, column {column}")]
    UnexpectedCharacter {
        character: char,
        line: usize,
        column: usize,
    },
    #[error("Invalid number literal '{text}' at line {line}, column {column}")]
    InvalidNumber {
        text: String,
        line: usize,
        column: usize,
    },
}
