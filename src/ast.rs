//! # Abstract Syntax Tree
//!
//! A [`Program`] is an ordered list of [`Statement`]s; order is execution
//! order. `Statement` is closed: the evaluator matches it exhaustively.
//!
//! Every node records the [`Span`] of its leading keyword for diagnostics.

use crate::value::{Properties, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    AgentDef(AgentDef),
    ToolDef(ToolDef),
    PipelineDef(PipelineDef),
    Run(RunStatement),
    Let(LetStatement),
    Config(ConfigBlock),
    Send(SendMessage),
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::AgentDef(def) => def.span,
            Statement::ToolDef(def) => def.span,
            Statement::PipelineDef(def) => def.span,
            Statement::Run(run) => run.span,
            Statement::Let(stmt) => stmt.span,
            Statement::Config(block) => block.span,
            Statement::Send(send) => send.span,
        }
    }

    /// Leading keyword, used in log output.
    pub fn keyword(&self) -> &'static str {
        match self {
            Statement::AgentDef(_) => "agent",
            Statement::ToolDef(_) => "tool",
            Statement::PipelineDef(_) => "pipeline",
            Statement::Run(_) => "run",
            Statement::Let(_) => "let",
            Statement::Config(_) => "config",
            Statement::Send(_) => "send",
        }
    }
}

/// `agent NAME { ... }`. Recognized properties are `model`, `prompt`,
/// `tools`, `temperature`, `max_tokens` and `on_error`; others are kept but
/// ignored at runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentDef {
    pub name: String,
    pub properties: Properties,
    pub span: Span,
}

/// `tool NAME { description: ..., params: { ... }, handler: ... }`.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDef {
    pub name: String,
    pub description: String,
    /// Parameter name to its `{ type, required, default, description }` block.
    pub params: Properties,
    /// Opaque descriptor such as `builtin("web_search")`.
    pub handler: String,
    pub span: Span,
}

/// `pipeline NAME { a -> b -> c on_error: { ... } }`.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineDef {
    pub name: String,
    pub agents: Vec<String>,
    pub error_handling: Option<Properties>,
    pub span: Span,
}

/// `run TARGET with { ... }`.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStatement {
    pub target: String,
    pub params: Properties,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LetStatement {
    pub name: String,
    pub value: LetValue,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LetValue {
    Run(RunStatement),
    Value(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigBlock {
    pub settings: Properties,
    pub span: Span,
}

/// `send TARGET message { ... }`.
#[derive(Debug, Clone, PartialEq)]
pub struct SendMessage {
    pub target: String,
    pub message: Properties,
    pub span: Span,
}
