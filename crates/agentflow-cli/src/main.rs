use std::path::PathBuf;

use agentflow_agents::registry_from_config;
use agentflow_core::{
    AppConfig, ConfigLoader, DiagramFormat, Orchestrator, TelemetryOptions, WorkflowDefinition,
    WorkflowResult, init_telemetry, metrics,
};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio::runtime::Runtime;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "agentflow",
    version,
    about = "Run configurable multi-agent workflows"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, env = "AGENTFLOW_CONFIG")]
    config: Option<PathBuf>,

    /// Workflow definition to use instead of the configured one.
    #[arg(long, global = true)]
    workflow: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute the workflow once for a query.
    Run(RunArgs),
    /// Print the loaded workflow definition as JSON.
    Show,
    /// Render the workflow as a flowchart.
    Diagram(DiagramArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Query handed to the first step.
    #[arg(long)]
    query: String,

    /// Emit the full result (final output and step log) as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct DiagramArgs {
    /// `mermaid` or `graphviz`.
    #[arg(long, default_value = "mermaid")]
    format: DiagramFormat,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = ConfigLoader::load(cli.config.clone())?;
    if let Some(path) = cli.workflow.clone() {
        config.workflow.path = path;
    }

    init_telemetry(TelemetryOptions::from_logging(&config.logging).to_stderr())?;

    match cli.command {
        Command::Run(args) => {
            let rt = Runtime::new()?;
            rt.block_on(run_command(&config, args))
        }
        Command::Show => show_command(&config),
        Command::Diagram(args) => diagram_command(&config, args),
    }
}

async fn run_command(config: &AppConfig, args: RunArgs) -> Result<()> {
    metrics::init_metrics_from_env("agentflow-cli");

    let registry = registry_from_config(config)?;
    let orchestrator = Orchestrator::from_path(&config.workflow.path, registry)?;
    info!(workflow = %orchestrator.definition().name, "running workflow");

    let result = orchestrator.run_workflow(&args.query).await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_human(&result);
    }

    Ok(())
}

fn print_human(result: &WorkflowResult) {
    for entry in &result.workflow_log {
        println!("== Step {} · {} ==", entry.step, entry.agent_name);
        println!("{}\n", entry.output_text);
    }
    println!("== Final output ==");
    println!("{}", result.final_output);
}

fn show_command(config: &AppConfig) -> Result<()> {
    let definition = load_definition(config)?;
    println!("{}", serde_json::to_string_pretty(&definition)?);
    Ok(())
}

fn diagram_command(config: &AppConfig, args: DiagramArgs) -> Result<()> {
    let definition = load_definition(config)?;
    print!("{}", args.format.render(&definition));
    Ok(())
}

fn load_definition(config: &AppConfig) -> Result<WorkflowDefinition> {
    WorkflowDefinition::load(&config.workflow.path)
        .with_context(|| format!("reading {}", config.workflow.path.display()))
}
