use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use orchestrator::{OrchestrationRequest, TaskOrchestrator};
use provisioner_client::{HttpProvisioner, ProvisionerApi};
use serde::{Deserialize, Serialize};
use slipway_core::{DesignRef, NodeFilter};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const CONFIG_FILE: &str = "slipway.toml";
const DEFAULT_TOKEN_ENV: &str = "SLIPWAY_AUTH_TOKEN";
const DEFAULT_INTERVAL_SECS: u64 = 30;
const DEFAULT_TIMEOUT_SECS: u64 = 1800;

#[derive(Parser)]
#[command(name = "slipway")]
#[command(about = "Task orchestration for the bare-metal provisioning service", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Provisioning service endpoint, overriding the config file
    #[arg(long)]
    endpoint: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a task and drive it to a terminal state
    Run {
        /// Design reference the task operates against
        #[arg(long)]
        design_ref: String,

        /// Task action, e.g. prepare_site or deploy_nodes
        #[arg(long)]
        action: String,

        /// Restrict the task to a named node (repeatable)
        #[arg(long = "node")]
        nodes: Vec<String>,

        /// Restrict the task to a named rack (repeatable)
        #[arg(long = "rack")]
        racks: Vec<String>,

        /// Restrict the task to a node tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Seconds between status queries
        #[arg(long)]
        interval: Option<u64>,

        /// Total seconds to wait for a terminal state
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Show the current record of a task
    Status {
        task_id: String,

        /// Print the raw task record as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
struct SlipwayConfig {
    service: ServiceConfig,
    poll: PollConfig,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
struct ServiceConfig {
    endpoint: String,
    /// Environment variable holding the pre-resolved auth token.
    token_env: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
struct PollConfig {
    interval_secs: u64,
    timeout_secs: u64,
}

impl Default for SlipwayConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            poll: PollConfig::default(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://drydock-api:9000/api/v1.0".to_string(),
            token_env: DEFAULT_TOKEN_ENV.to_string(),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_INTERVAL_SECS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

fn load_config(path: &Path) -> Result<SlipwayConfig> {
    if !path.exists() {
        return Ok(SlipwayConfig::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

fn node_filter(nodes: Vec<String>, racks: Vec<String>, tags: Vec<String>) -> Option<NodeFilter> {
    let filter = NodeFilter {
        node_names: nodes,
        rack_names: racks,
        node_tags: tags,
    };
    (!filter.is_empty()).then_some(filter)
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mut config = load_config(&cli.config)?;
    if let Some(endpoint) = cli.endpoint {
        config.service.endpoint = endpoint;
    }

    let token = std::env::var(&config.service.token_env).with_context(|| {
        format!(
            "auth token environment variable {} is not set",
            config.service.token_env
        )
    })?;
    let client: Arc<dyn ProvisionerApi> =
        Arc::new(HttpProvisioner::new(&config.service.endpoint, &token)?);

    match cli.command {
        Commands::Run {
            design_ref,
            action,
            nodes,
            racks,
            tags,
            interval,
            timeout,
        } => {
            let request = OrchestrationRequest {
                design_ref: DesignRef::new(design_ref)?,
                action,
                node_filter: node_filter(nodes, racks, tags),
                poll_interval: Duration::from_secs(
                    interval.unwrap_or(config.poll.interval_secs),
                ),
                poll_timeout: Duration::from_secs(timeout.unwrap_or(config.poll.timeout_secs)),
            };
            run_task(client, request).await
        }
        Commands::Status { task_id, json } => show_status(client, &task_id, json).await,
    }
}

async fn run_task(client: Arc<dyn ProvisionerApi>, request: OrchestrationRequest) -> Result<()> {
    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping orchestration");
            ctrl_c_cancel.cancel();
        }
    });

    let orchestrator = TaskOrchestrator::new(client).with_cancellation(cancel);
    match orchestrator.run(request).await {
        Ok(success) => {
            println!(
                "{}",
                format!("Task {} completed successfully", success.task_id).green()
            );
            Ok(())
        }
        Err(failure) => {
            if let Some(report) = &failure.report {
                println!("{}", report.render());
            }
            eprintln!("{}", failure.cause.to_string().red());
            Err(failure.cause.into())
        }
    }
}

async fn show_status(client: Arc<dyn ProvisionerApi>, task_id: &str, json: bool) -> Result<()> {
    info!(task_id, "Fetching task record");
    let record = client.get_task(task_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!("task:   {}", record.task_id);
        println!("action: {}", record.action);
        println!("status: {}", record.status.as_str());
        println!("result: {}", record.result.status.as_str());
        if !record.subtask_ids.is_empty() {
            println!("subtasks: {}", record.subtask_ids.join(", "));
        }
    }
    Ok(())
}
