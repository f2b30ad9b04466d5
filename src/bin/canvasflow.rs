use std::path::PathBuf;
use std::sync::Arc;

use canvasflow::cli::{import_flows, load_config, parse_parameters, render_flow_table};
use canvasflow::{FlowManager, LoggingConfig, RecordingCanvas, ToolRegistry};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "canvasflow", version, about = "Recorded canvas flows: inspect, validate, replay", author)]
struct Cli {
    /// JSON config file; `CANVASFLOW_*` variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    Flows {
        #[command(subcommand)]
        command: FlowsCommand,
    },
    Schema {
        #[command(subcommand)]
        command: SchemaCommand,
    },
    /// Checks parameters against a flow's discovered schema
    Validate {
        name: String,
        #[arg(long)]
        params: Option<String>,
    },
    /// Replays a flow against an in-memory canvas and prints the calls
    Run {
        name: String,
        #[arg(long)]
        params: Option<String>,
    },
}

#[derive(Subcommand)]
enum FlowsCommand {
    List,
    Show { id: String },
    Delete { id: String },
    Find { name: String },
    Import { path: PathBuf },
}

#[derive(Subcommand)]
enum SchemaCommand {
    /// Discovered parameter schema of a flow, by name
    Show { name: String },
    /// Parameter metadata registered per tool
    Tools,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    LoggingConfig::init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    let tools = Arc::new(ToolRegistry::new());
    let canvas = RecordingCanvas::new();
    canvas.install(&tools);
    let manager = FlowManager::from_config(&config, Arc::clone(&tools)).await;

    match cli.command {
        Command::Flows { command } => match command {
            FlowsCommand::List => handle_flows_list(&manager),
            FlowsCommand::Show { id } => handle_flows_show(&manager, &id)?,
            FlowsCommand::Delete { id } => handle_flows_delete(&manager, &id).await,
            FlowsCommand::Find { name } => handle_flows_find(&manager, &name),
            FlowsCommand::Import { path } => {
                let saved = import_flows(&manager, &path).await?;
                println!("Imported {} flow(s) from `{}`", saved.len(), path.display());
            }
        },
        Command::Schema { command } => match command {
            SchemaCommand::Show { name } => handle_schema_show(&manager, &name)?,
            SchemaCommand::Tools => {
                println!("{}", serde_json::to_string_pretty(&manager.tool_schemas())?);
            }
        },
        Command::Validate { name, params } => {
            handle_validate(&manager, &name, params.as_deref())?
        }
        Command::Run { name, params } => {
            handle_run(&manager, &canvas, &name, params.as_deref()).await?
        }
    }
    Ok(())
}

fn handle_flows_list(manager: &FlowManager) {
    let flows = manager.list_flows();
    if flows.is_empty() {
        println!("No saved flows");
    } else {
        render_flow_table(&flows);
    }
}

fn handle_flows_show(manager: &FlowManager, id: &str) -> anyhow::Result<()> {
    match manager.get_flow(id) {
        Some(flow) => println!("{}", serde_json::to_string_pretty(&flow)?),
        None => println!("Flow `{id}` not found"),
    }
    Ok(())
}

async fn handle_flows_delete(manager: &FlowManager, id: &str) {
    if manager.delete_flow(id).await {
        println!("Deleted flow `{id}`");
    } else {
        println!("Flow `{id}` not found");
    }
}

fn handle_flows_find(manager: &FlowManager, name: &str) {
    let flows = manager.find_flows_by_name(name);
    if flows.is_empty() {
        println!("No flow matches `{name}`");
    } else {
        render_flow_table(&flows);
    }
}

fn handle_schema_show(manager: &FlowManager, name: &str) -> anyhow::Result<()> {
    let Some(flow) = manager.find_flow_by_name(name) else {
        println!("No flow matches `{name}`");
        return Ok(());
    };
    match manager.get_flow_parameter_schema(&flow.id) {
        Some(schema) => println!("{}", serde_json::to_string_pretty(&schema)?),
        None => println!("Flow `{}` not found", flow.id),
    }
    Ok(())
}

fn handle_validate(manager: &FlowManager, name: &str, params: Option<&str>) -> anyhow::Result<()> {
    let params = parse_parameters(params)?.unwrap_or_default();
    let report = match manager.find_flow_by_name(name) {
        Some(flow) => manager.validate_flow_parameters(&flow.id, &params),
        None => canvasflow::ValidationReport::flow_not_found(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn handle_run(
    manager: &FlowManager,
    canvas: &RecordingCanvas,
    name: &str,
    params: Option<&str>,
) -> anyhow::Result<()> {
    let params = parse_parameters(params)?;
    let summary = manager.execute_flow_by_name(name, params.as_ref()).await?;
    for call in canvas.calls() {
        println!("{} {}", call.tool, call.payload);
    }
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
