//! # AgentLang: a declarative language for AI agent orchestration
//!
//! AgentLang programs declare agents, tools and pipelines and then run them:
//!
//! ```text
//! agent researcher {
//!     model: "claude-3-5-sonnet-latest"
//!     prompt: "You research topics thoroughly."
//!     tools: [web_search]
//! }
//! agent writer { model: "gpt-4o" prompt: "You write clear summaries." }
//!
//! pipeline report { researcher -> writer on_error: { fallback: writer } }
//!
//! let result = run report with { task: "Rust async runtimes" }
//! ```
//!
//! ## DSL Processing Pipeline
//!
//! ```text
//! Source Code → Tokenizer → Preprocessor → Parser → Evaluator → Runtime
//! ```
//!
//! ### Stage 1: Tokenization
//!
//! The [`tokenizer`] module turns source text into positioned tokens,
//! discarding whitespace and comments.
//!
//! ### Stage 2: Preprocessing
//!
//! The [`preprocessor`] module drops newline tokens; statements are delimited
//! by their keywords and braces.
//!
//! ### Stage 3: Parsing
//!
//! The [`analyzer`] module builds an [`ast::Program`] with parser combinators.
//! The first error aborts the parse.
//!
//! ### Stage 4: Evaluation
//!
//! The [`eval`] module walks the program in order and dispatches each
//! statement to the [`runtime`].
//!
//! ## Runtime and Providers
//!
//! The [`runtime`] owns agents, tools, pipelines, variables and the config map.
//! Agents call a completion [`provider`] picked from their model name, or
//! return mock responses when no API key is configured.
//!
//! [`system::System`] ties the stages together for a source string or file.

pub mod analyzer;
pub mod ast;
pub mod config;
pub mod error;
pub mod eval;
pub mod preprocessor;
pub mod provider;
pub mod runtime;
pub mod system;
pub mod tokenizer;
pub mod value;

// Re-exports
pub use ast::*;
pub use error::*;
pub use runtime::{Runtime, RuntimeError, RuntimeResult};
pub use system::System;
pub use value::{Properties, Value};
