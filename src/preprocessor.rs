//! # Preprocessor
//!
//! Sits between the tokenizer and the parser:
//!
//! ```text
//! Source → Tokenizer → Preprocessor → Parser → Evaluator
//! ```
//!
//! The tokenizer keeps line feeds as [`Token::Newline`](crate::tokenizer::token::Token::Newline)
//! so positions stay traceable; the grammar itself is newline-insensitive,
//! so [`TokenPreprocessor`] removes them. Every other token, including the
//! trailing end-of-input marker, passes through in order.

use crate::tokenizer::token::{Token, TokenSpan};

/// A trait for preprocessing different types of input
pub trait Preprocessor<T, U = T> {
    fn process(&self, input: T) -> U;
}

#[derive(Debug, Default)]
pub struct TokenPreprocessor {}

impl TokenPreprocessor {
    pub fn new() -> Self {
        Self {}
    }
}

impl Preprocessor<Vec<TokenSpan>> for TokenPreprocessor {
    fn process(&self, input: Vec<TokenSpan>) -> Vec<TokenSpan> {
        input
            .into_iter()
            .filter(|span| span.token != Token::Newline)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::token::tokenize;
    use proptest::prelude::*;

    #[test]
    fn test_newlines_removed() {
        let spans = tokenize("config {\n  a: 1\n}\n").unwrap();
        let processed = TokenPreprocessor::new().process(spans);
        assert!(processed.iter().all(|s| s.token != Token::Newline));
        assert_eq!(processed.len(), 7);
        assert_eq!(processed.last().map(|s| &s.token), Some(&Token::Eof));
    }

    proptest! {
        #[test]
        fn filtering_keeps_other_tokens_in_order(
            parts in prop::collection::vec(
                prop_oneof![
                    Just("run"), Just("x"), Just("{"), Just("}"), Just("\n"),
                    Just("7"), Just("\"s\""), Just(" "), Just("[")
                ],
                0..50,
            )
        ) {
            let source = parts.concat();
            let spans = tokenize(&source).unwrap();
            let expected: Vec<TokenSpan> = spans
                .iter()
                .filter(|s| s.token != Token::Newline)
                .cloned()
                .collect();
            let processed = TokenPreprocessor::default().process(spans);
            prop_assert_eq!(processed, expected);
        }
    }
}
