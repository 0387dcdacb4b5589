use indexmap::IndexMap;
use tracing::{debug, info};

use crate::ast::{
    AgentDef, ConfigBlock, LetStatement, LetValue, PipelineDef, Program, RunStatement,
    SendMessage, Statement, ToolDef,
};
use crate::runtime::{
    agent::Agent,
    pipeline::Pipeline,
    tool::{ParamSpec, Tool},
    Runtime, RuntimeError, RuntimeResult,
};
use crate::value::Value;

#[derive(Debug, Default, Clone)]
pub struct Evaluator;

impl Evaluator {
    pub fn new() -> Self {
        Self
    }

    /// Runs every statement in order. Returns the last statement's value, or
    /// `None` for an empty program.
    pub async fn execute(
        &self,
        program: &Program,
        runtime: &mut Runtime,
    ) -> RuntimeResult<Option<Value>> {
        debug!("Executing {} statements", program.statements.len());
        let mut last = None;
        for statement in &program.statements {
            last = Some(self.execute_statement(statement, runtime).await?);
        }
        Ok(last)
    }

    pub async fn execute_statement(
        &self,
        statement: &Statement,
        runtime: &mut Runtime,
    ) -> RuntimeResult<Value> {
        let span = statement.span();
        debug!(
            "{} statement at {}:{}",
            statement.keyword(),
            span.line,
            span.column
        );
        match statement {
            Statement::AgentDef(def) => Ok(self.define_agent(def, runtime)),
            Statement::ToolDef(def) => Ok(self.define_tool(def, runtime)),
            Statement::PipelineDef(def) => Ok(self.define_pipeline(def, runtime)),
            Statement::Run(run) => self.run(run, runtime).await,
            Statement::Let(binding) => self.bind(binding, runtime).await,
            Statement::Config(block) => Ok(self.configure(block, runtime)),
            Statement::Send(send) => Ok(self.send(send, runtime)),
        }
    }

    fn define_agent(&self, def: &AgentDef, runtime: &mut Runtime) -> Value {
        let agent = Agent::from_properties(&def.name, &def.properties, &runtime.default_model());
        let value = agent.to_value();
        runtime.register_agent(agent);
        value
    }

    fn define_tool(&self, def: &ToolDef, runtime: &mut Runtime) -> Value {
        let params: IndexMap<String, ParamSpec> = def
            .params
            .iter()
            .map(|(name, spec)| (name.clone(), ParamSpec::from_value(spec)))
            .collect();
        info!(
            "Tool {} handler '{}' is not resolved; using a placeholder",
            def.name, def.handler
        );
        let name = def.name.clone();
        let tool = Tool::new(&def.name, &def.description, params, move |args| {
            info!("Tool {} called with {}", name, crate::value::Value::Map(args.clone()));
            Ok(Value::String(format!("[MOCK] {} result", name)))
        });
        let value = tool.to_value();
        runtime.register_tool(tool);
        value
    }

    fn define_pipeline(&self, def: &PipelineDef, runtime: &mut Runtime) -> Value {
        runtime.register_pipeline(Pipeline::new(
            &def.name,
            def.agents.clone(),
            def.error_handling.clone(),
        ));
        Value::String(def.name.clone())
    }

    /// Pipelines shadow agents of the same name.
    async fn run(&self, run: &RunStatement, runtime: &mut Runtime) -> RuntimeResult<Value> {
        let params = runtime.resolve_params(&run.params);
        if runtime.has_pipeline(&run.target) {
            Ok(runtime.run_pipeline(&run.target, params).await?.to_value())
        } else if runtime.has_agent(&run.target) {
            Ok(runtime.run_agent(&run.target, params).await?.to_value())
        } else {
            Err(RuntimeError::UnknownTarget(run.target.clone()))
        }
    }

    async fn bind(&self, binding: &LetStatement, runtime: &mut Runtime) -> RuntimeResult<Value> {
        let value = match &binding.value {
            LetValue::Run(run) => self.run(run, runtime).await?,
            LetValue::Value(value) => value.clone(),
        };
        runtime.set_variable(&binding.name, value.clone());
        Ok(value)
    }

    fn configure(&self, block: &ConfigBlock, runtime: &mut Runtime) -> Value {
        runtime.update_config(&block.settings);
        Value::Null
    }

    fn send(&self, send: &SendMessage, runtime: &mut Runtime) -> Value {
        let message = runtime.resolve_params(&send.message);
        info!(
            "Sending message to {}: {} (not delivered)",
            send.target,
            crate::value::Value::Map(message)
        );
        Value::Null
    }
}
