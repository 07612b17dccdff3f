use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;

use hdinsight_core::provider::{ErrorKind, Provider, ProviderError};
use hdinsight_core::resource::{Resource, ResourceId, State, Value};
use hdinsight_core::schema::{AttributeSchema, ResourceSchema};
use hdinsight_provider::config::DEFAULT_ENDPOINT;
use hdinsight_provider::schemas::{self, spark_cluster};
use hdinsight_provider::{HdInsightProvider, ProviderConfig};

#[derive(Parser)]
#[command(name = "hdinsight")]
#[command(about = "Manage Azure HDInsight Spark clusters declaratively", long_about = None)]
struct Cli {
    /// Azure subscription the clusters live in
    #[arg(long, env = "AZURE_SUBSCRIPTION_ID", global = true)]
    subscription_id: Option<String>,

    /// Bearer token for Azure Resource Manager
    #[arg(long, env = "AZURE_ACCESS_TOKEN", global = true, hide_env_values = true)]
    access_token: Option<String>,

    /// Azure Resource Manager endpoint
    #[arg(long, env = "ARM_ENDPOINT", global = true, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the attribute schema of the Spark cluster resource
    Schema,
    /// Validate a resource document
    Validate {
        /// Path to a JSON resource document
        file: PathBuf,
    },
    /// Create the cluster a resource document describes
    Create {
        /// Path to a JSON resource document
        file: PathBuf,
    },
    /// Read a cluster by its resource ID
    Read {
        /// ARM resource ID of the cluster
        id: String,

        /// State file of a previous run; secrets are carried over from it
        #[arg(long)]
        state: Option<PathBuf>,
    },
    /// Update a cluster in place
    Update {
        /// Path to a JSON resource document
        file: PathBuf,

        /// State file of a previous run
        #[arg(long)]
        state: PathBuf,
    },
    /// Delete a cluster by its resource ID
    Delete {
        /// ARM resource ID of the cluster
        id: String,
    },
    /// Generate shell completions
    Completions {
        shell: Shell,
    },
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Schema => run_schema(),
        Commands::Validate { file } => run_validate(file),
        Commands::Create { file } => run_create(&cli, file).await,
        Commands::Read { id, state } => run_read(&cli, id, state.as_deref()).await,
        Commands::Update { file, state } => run_update(&cli, file, state).await,
        Commands::Delete { id } => run_delete(&cli, id).await,
        Commands::Completions { shell } => {
            clap_complete::generate(*shell, &mut Cli::command(), "hdinsight", &mut io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

// =============================================================================
// Documents
// =============================================================================

/// Name the CLI records single-resource documents under
const RESOURCE_NAME: &str = "main";

fn resource_id() -> ResourceId {
    ResourceId::new(spark_cluster::RESOURCE_TYPE, RESOURCE_NAME)
}

fn read_json(path: &Path) -> Result<serde_json::Value, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&content).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}

fn json_object(
    value: &serde_json::Value,
    path: &Path,
) -> Result<HashMap<String, Value>, String> {
    match Value::from_json(value) {
        Some(Value::Map(map)) => Ok(map),
        _ => Err(format!("{}: expected a JSON object", path.display())),
    }
}

/// Load a resource document: a JSON object of attributes
fn load_resource(path: &Path) -> Result<Resource, String> {
    let attributes = json_object(&read_json(path)?, path)?;
    Ok(Resource::new(spark_cluster::RESOURCE_TYPE, RESOURCE_NAME).with_attributes(attributes))
}

/// Load a state file written by `create`, `read` or `update`
fn load_state(path: &Path) -> Result<State, String> {
    let doc = read_json(path)?;
    let identifier = doc
        .get("identifier")
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("{}: missing \"identifier\"", path.display()))?;
    let attributes = match doc.get("attributes") {
        Some(attributes) => json_object(attributes, path)?,
        None => HashMap::new(),
    };
    Ok(State::existing(resource_id(), attributes).with_identifier(identifier))
}

fn state_to_json(state: &State) -> serde_json::Value {
    let attributes: serde_json::Map<String, serde_json::Value> = state
        .attributes
        .iter()
        .map(|(k, v)| (k.clone(), v.to_json()))
        .collect();
    serde_json::json!({
        "identifier": state.identifier,
        "attributes": attributes,
    })
}

fn print_state(state: &State) -> Result<(), String> {
    let doc = serde_json::to_string_pretty(&state_to_json(state)).map_err(|e| e.to_string())?;
    println!("{}", doc);
    Ok(())
}

// =============================================================================
// Provider
// =============================================================================

fn build_provider(cli: &Cli) -> Result<HdInsightProvider, String> {
    let subscription_id = cli
        .subscription_id
        .clone()
        .ok_or("Missing subscription: pass --subscription-id or set AZURE_SUBSCRIPTION_ID")?;
    let access_token = cli
        .access_token
        .clone()
        .ok_or("Missing access token: pass --access-token or set AZURE_ACCESS_TOKEN")?;
    let config = ProviderConfig::new(subscription_id, access_token).with_endpoint(&cli.endpoint);
    HdInsightProvider::new(config).map_err(|e| e.to_string())
}

fn describe_error(e: &ProviderError) -> String {
    match e.kind {
        ErrorKind::PartialSuccess => format!(
            "{}\n{} {}",
            e,
            "The cluster exists and should be imported:".yellow(),
            e.identifier.as_deref().unwrap_or_default()
        ),
        _ if e.is_not_found() => format!(
            "{}\n{}",
            e,
            "The cluster no longer exists; run `read` to clear it from the state.".yellow()
        ),
        _ => e.to_string(),
    }
}

// =============================================================================
// Commands
// =============================================================================

fn format_attribute(attr: &AttributeSchema) -> String {
    let mut flags = Vec::new();
    if attr.required {
        flags.push("required");
    }
    if attr.force_new {
        flags.push("force new");
    }
    if attr.computed {
        flags.push("computed");
    }
    if attr.sensitive {
        flags.push("sensitive");
    }
    if attr.write_only {
        flags.push("write-only");
    }
    if flags.is_empty() {
        attr.name.clone()
    } else {
        format!("{} ({})", attr.name, flags.join(", "))
    }
}

fn print_schema(schema: &ResourceSchema) {
    println!("{}", schema.resource_type.cyan().bold());
    if let Some(desc) = &schema.description {
        println!("  {}", desc);
    }
    let mut attributes: Vec<&AttributeSchema> = schema.attributes.values().collect();
    attributes.sort_by(|a, b| a.name.cmp(&b.name));
    for attr in attributes {
        println!("  • {}", format_attribute(attr));
    }
}

fn run_schema() -> Result<(), String> {
    for schema in schemas::all_schemas() {
        print_schema(&schema);
    }
    Ok(())
}

fn validate_resource(resource: &Resource) -> Result<(), String> {
    spark_cluster::schema()
        .validate(&resource.attributes)
        .map_err(|errors| {
            errors
                .iter()
                .map(|e| format!("{}: {}", resource.id, e))
                .collect::<Vec<_>>()
                .join("\n")
        })
}

fn run_validate(file: &Path) -> Result<(), String> {
    println!("{}", "Validating...".cyan());
    let resource = load_resource(file)?;
    validate_resource(&resource)?;
    println!("{}", "✓ Resource document is valid.".green());
    Ok(())
}

async fn run_create(cli: &Cli, file: &Path) -> Result<(), String> {
    let resource = load_resource(file)?;
    validate_resource(&resource)?;
    let provider = build_provider(cli)?;

    eprintln!("{}", "Creating cluster...".cyan().bold());
    let state = provider
        .create(&resource)
        .await
        .map_err(|e| describe_error(&e))?;
    eprintln!("  {} {}", "✓".green(), state.identifier.as_deref().unwrap_or_default());
    print_state(&state)
}

async fn run_read(cli: &Cli, identifier: &str, state: Option<&Path>) -> Result<(), String> {
    let prior = state.map(load_state).transpose()?;
    let provider = build_provider(cli)?;

    let state = provider
        .read(&resource_id(), Some(identifier), prior.as_ref())
        .await
        .map_err(|e| describe_error(&e))?;
    if !state.exists {
        eprintln!("{}", "Cluster not found.".yellow());
        return Ok(());
    }
    print_state(&state)
}

async fn run_update(cli: &Cli, file: &Path, state: &Path) -> Result<(), String> {
    let resource = load_resource(file)?;
    validate_resource(&resource)?;
    let from = load_state(state)?;
    let identifier = from.identifier.clone().unwrap_or_default();
    let provider = build_provider(cli)?;

    eprintln!("{}", "Updating cluster...".cyan().bold());
    let state = provider
        .update(&resource.id, &identifier, &from, &resource)
        .await
        .map_err(|e| describe_error(&e))?;
    eprintln!("  {} {}", "✓".green(), identifier);
    print_state(&state)
}

async fn run_delete(cli: &Cli, identifier: &str) -> Result<(), String> {
    let provider = build_provider(cli)?;

    eprintln!("{}", "Deleting cluster...".red().bold());
    provider
        .delete(&resource_id(), identifier)
        .await
        .map_err(|e| describe_error(&e))?;
    eprintln!("  {} {}", "✓".green(), identifier);
    Ok(())
}
