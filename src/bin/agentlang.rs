use std::path::PathBuf;

use agentlang::{config::SystemConfig, system::System, Error, Value};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(author, version, about = "Run an AgentLang program", long_about = None)]
struct Cli {
    /// Program to run
    file: PathBuf,

    /// Path to config file, used when it exists
    #[arg(short, long, default_value = "agentlang.json")]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

async fn run(cli: &Cli) -> Result<Option<Value>, Error> {
    let config = if cli.config.exists() {
        SystemConfig::from_file(&cli.config)?
    } else {
        SystemConfig::default()
    };
    debug!("config: {:?}", config);

    let mut system = System::from_env(config);
    if system.runtime().is_mock() {
        debug!("No API key configured, agents return mock responses");
    }
    system.run_file(&cli.file).await
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(&cli).await {
        Ok(Some(value)) => {
            let json = serde_json::Value::from(&value);
            match serde_json::to_string_pretty(&json) {
                Ok(rendered) => println!("{}", rendered),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Ok(None) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
