//! Run `servicenow.getIncidents` once against a ServiceNow instance.
//!
//! Connection settings come from `SERVICENOW_INSTANCE_URL` plus either
//! `SERVICENOW_ACCESS_TOKEN` or `SERVICENOW_USERNAME`/`SERVICENOW_PASSWORD`.

use anyhow::{Context, Result};
use clap::Parser;
use component::memory::{MemoryMetadata, RecordingExecutionState};
use component::{Component, ExecutionContext, SetupContext};
use serde_json::{json, Map, Value};
use servicenow::{ConnectionConfig, GetIncidents};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Query ServiceNow incidents and print the routed result.
#[derive(Parser)]
#[command(name = "get-incidents")]
#[command(about = "Query ServiceNow incidents and route them by urgency")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Assignment group sys_id
    #[arg(long)]
    assignment_group: Option<String>,

    /// Assigned user sys_id
    #[arg(long)]
    assigned_to: Option<String>,

    /// Caller sys_id
    #[arg(long)]
    caller: Option<String>,

    /// Category value
    #[arg(long)]
    category: Option<String>,

    /// Subcategory value
    #[arg(long)]
    subcategory: Option<String>,

    /// Business service sys_id
    #[arg(long)]
    service: Option<String>,

    /// States, comma-separated (e.g. "1,2")
    #[arg(long)]
    state: Option<String>,

    /// Urgencies, comma-separated
    #[arg(long)]
    urgency: Option<String>,

    /// Impacts, comma-separated
    #[arg(long)]
    impact: Option<String>,

    /// Priorities, comma-separated
    #[arg(long)]
    priority: Option<String>,

    /// Maximum number of incidents to return
    #[arg(long, default_value_t = 10)]
    limit: i64,
}

impl Cli {
    /// Component configuration in the shape the host stores it.
    fn configuration(&self) -> Value {
        let filters = [
            ("assignmentGroup", &self.assignment_group),
            ("assignedTo", &self.assigned_to),
            ("caller", &self.caller),
            ("category", &self.category),
            ("subcategory", &self.subcategory),
            ("service", &self.service),
            ("state", &self.state),
            ("urgency", &self.urgency),
            ("impact", &self.impact),
            ("priority", &self.priority),
        ];

        let mut configuration: Map<String, Value> = filters
            .into_iter()
            .filter_map(|(key, value)| value.clone().map(|v| (key.to_string(), Value::String(v))))
            .collect();
        configuration.insert("limit".to_string(), json!(self.limit));

        Value::Object(configuration)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("servicenow=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let connection = ConnectionConfig::from_env();
    info!(
        instance_url = %connection.instance_url(),
        oauth = connection.uses_oauth(),
        "ServiceNow connection configured"
    );

    let http = reqwest::Client::new();
    let configuration = cli.configuration();
    let component = GetIncidents;

    let mut metadata = MemoryMetadata::default();
    component
        .setup(SetupContext {
            configuration: &configuration,
            http: &http,
            integration: &connection,
            metadata: &mut metadata,
        })
        .await
        .context("Failed to set up component")?;

    let mut state = RecordingExecutionState::default();
    component
        .execute(ExecutionContext {
            configuration: &configuration,
            http: &http,
            integration: &connection,
            execution_state: &mut state,
        })
        .await
        .context("Failed to execute component")?;

    let output = json!({
        "channel": state.channel(),
        "metadata": metadata.metadata,
        "payloads": state.payloads(),
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("Failed to serialize output")?
    );

    Ok(())
}
