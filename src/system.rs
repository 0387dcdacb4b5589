use std::path::Path;

use tracing::{debug, info};

use crate::analyzer::parse_program;
use crate::ast::Program;
use crate::config::SystemConfig;
use crate::eval::Evaluator;
use crate::preprocessor::{Preprocessor, TokenPreprocessor};
use crate::provider::secret::Credentials;
use crate::runtime::Runtime;
use crate::tokenizer::token::Tokenizer;
use crate::value::Value;
use crate::InternalResult;

/// Drives source text through tokenizer, preprocessor, parser and
/// evaluator against one [`Runtime`].
pub struct System {
    runtime: Runtime,
    evaluator: Evaluator,
    preprocessor: TokenPreprocessor,
}

impl System {
    pub fn new(config: SystemConfig, credentials: Credentials) -> Self {
        Self::with_runtime(Runtime::new(config, credentials))
    }

    /// Credentials come from the process environment.
    pub fn from_env(config: SystemConfig) -> Self {
        Self::new(config, Credentials::from_env())
    }

    pub fn with_runtime(runtime: Runtime) -> Self {
        Self {
            runtime,
            evaluator: Evaluator::new(),
            preprocessor: TokenPreprocessor::new(),
        }
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn parse_dsl(&self, source: &str) -> InternalResult<Program> {
        let tokens = Tokenizer::new().tokenize(source)?;
        debug!("tokens: {}", tokens.len());
        let tokens = self.preprocessor.process(tokens);
        let program = parse_program(&tokens)?;
        debug!("statements: {}", program.statements.len());
        Ok(program)
    }

    /// Parses the whole source before running anything, so syntax errors
    /// leave the runtime untouched.
    pub async fn run_dsl(&mut self, source: &str) -> InternalResult<Option<Value>> {
        let program = self.parse_dsl(source)?;
        Ok(self.evaluator.execute(&program, &mut self.runtime).await?)
    }

    pub async fn run_file<P: AsRef<Path>>(&mut self, path: P) -> InternalResult<Option<Value>> {
        let path = path.as_ref();
        info!("Running {}", path.display());
        let source = std::fs::read_to_string(path)?;
        self.run_dsl(&source).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn system() -> System {
        System::new(SystemConfig::default(), Credentials::mock())
    }

    #[tokio::test]
    async fn test_run_dsl() {
        let mut system = system();
        let result = system
            .run_dsl("agent greeter { model: \"gpt-4\" prompt: \"hi\" }\nrun greeter with { task: \"hello\" }")
            .await
            .unwrap()
            .unwrap();
        let output = result.as_map().unwrap();
        assert_eq!(output.get("agent"), Some(&Value::from("greeter")));
        assert!(output["output"].to_string().contains("hello"));
    }

    #[tokio::test]
    async fn test_syntax_error_runs_nothing() {
        let mut system = system();
        let result = system.run_dsl("agent a { }\nagent { }").await;
        assert!(matches!(result, Err(Error::Parse(_))));
        assert!(!system.runtime().has_agent("a"));
    }

    #[tokio::test]
    async fn test_lex_error() {
        let mut system = system();
        let result = system.run_dsl("agent a { x: @ }").await;
        assert!(matches!(result, Err(Error::Tokenizer(_))));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let mut system = system();
        let result = system.run_file("/nonexistent/program.agent").await;
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
