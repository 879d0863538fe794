//! Tabula CLI
//!
//! Entry point for the deployment tool. Handles CLI args and wires
//! the converter, prompt registry, and platform client together.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use tabula::config::{load_config, resolve_path};
use tabula::platform::{auth, VertexClient};
use tabula::prompts::template::{list_templates, load_template};
use tabula::prompts::{resolve_instruction, PromptRegistryClient};
use tabula::setup::environment::detect_credentials;
use tabula::setup::wizard::run_setup_wizard;
use tabula::types::{AppConfig, PlatformClient, PromptRegistry};
use tabula::{agent, convert, deploy, history};

const VERSION: &str = "0.1.0";

/// Tabula -- CSV to JSON Agent Deployment Tool
#[derive(Parser, Debug)]
#[command(
    name = "tabula",
    version = VERSION,
    about = "Tabula -- CSV to JSON Agent Deployment Tool",
    long_about = "Packages and deploys a CSV to JSON converter agent to Vertex AI, \
                  with the agent instruction optionally pulled from the prompt registry."
)]
struct Cli {
    /// Run the interactive setup wizard
    #[arg(long)]
    setup: bool,

    /// Deploy the agent (first run triggers the setup wizard)
    #[arg(long)]
    deploy: bool,

    /// Show configuration, credentials, and deployment history
    #[arg(long)]
    status: bool,

    /// Convert a local CSV file to JSON ("-" reads stdin)
    #[arg(long, value_name = "FILE")]
    convert: Option<PathBuf>,

    /// Exercise the agent's behavior locally, without deploying
    #[arg(long)]
    test_agent: bool,

    /// Upload a prompt template JSON file to the registry
    #[arg(long, value_name = "FILE")]
    upload_prompt: Option<PathBuf>,

    /// List prompts in the registry (falls back to local templates)
    #[arg(long)]
    list_prompts: bool,

    /// Show the instruction that would be deployed for a prompt name
    #[arg(long, value_name = "NAME")]
    show_prompt: Option<String>,

    /// List live deployments on the platform
    #[arg(long)]
    list_deployments: bool,

    /// Tear down a deployment by resource name
    #[arg(long, value_name = "RESOURCE")]
    teardown: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    if cli.setup {
        run_setup_wizard().await?;
    } else if cli.deploy {
        run_deploy_command().await?;
    } else if cli.status {
        show_status();
    } else if let Some(path) = cli.convert {
        run_convert(&path)?;
    } else if cli.test_agent {
        run_test_agent();
    } else if let Some(path) = cli.upload_prompt {
        run_upload_prompt(&path).await?;
    } else if cli.list_prompts {
        run_list_prompts().await?;
    } else if let Some(name) = cli.show_prompt {
        run_show_prompt(&name).await?;
    } else if cli.list_deployments {
        run_list_deployments().await?;
    } else if let Some(resource) = cli.teardown {
        run_teardown(&resource).await?;
    } else {
        println!("Nothing to do. Try: tabula --setup, then tabula --deploy");
        println!("See: tabula --help");
    }

    Ok(())
}

fn init_tracing() {
    let default_filter = load_config()
        .map(|c| c.log_level.as_filter())
        .unwrap_or("info");
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Load config, falling back to the setup wizard on first run.
async fn load_or_setup() -> Result<AppConfig> {
    match load_config() {
        Some(config) => Ok(config),
        None => run_setup_wizard().await,
    }
}

// ---- Deploy Command ---------------------------------------------------------

async fn run_deploy_command() -> Result<()> {
    println!("Tabula v{} -- deploying CSV to JSON agent", VERSION);
    println!();

    let config = load_or_setup().await?;

    // Credential path is read once here and carried in the clients;
    // nothing deeper in the call chain touches the environment.
    auth::preflight()?;
    let token = auth::fetch_access_token()?;

    let client = VertexClient::new(&config, token.clone());
    let registry =
        PromptRegistryClient::new(&config.resolved_endpoint(), &config.parent_path(), token);

    let record = deploy::run_deploy(&config, &client, &registry).await?;

    let history_path = resolve_path(&config.history_path);
    history::append_record(&history_path, &record)
        .context("Deployment succeeded but recording history failed")?;

    println!("{}", "SUCCESS!".green().bold());
    println!();
    println!("Resource: {}", record.resource_name);
    println!("Console:  https://console.cloud.google.com/vertex-ai/agents");
    println!();
    println!("Usage example -- send CSV data like:");
    println!("  name,age,city");
    println!("  John,25,NYC");
    println!("  Jane,30,LA");

    Ok(())
}

// ---- Status Command ---------------------------------------------------------

fn show_status() {
    let Some(config) = load_config() else {
        println!("Tabula is not configured. Run: tabula --setup");
        return;
    };

    let credentials = detect_credentials();
    let credential_line = match credentials.path {
        Some(path) => format!("{} ({})", credentials.source, path.display()),
        None => credentials.source.to_string(),
    };
    let account = auth::active_account().unwrap_or_else(|| "(none)".to_string());

    println!(
        r#"
=== TABULA STATUS ===
Project:     {}
Location:    {}
Bucket:      {}
Agent:       {}
Model:       {}
Prompt:      {}
Credentials: {}
Account:     {}
Version:     {}
====================="#,
        config.project_id,
        config.location,
        config.staging_bucket,
        config.agent_name,
        config.model,
        config.prompt_name,
        credential_line,
        account,
        config.version,
    );

    let records = history::load_history(&resolve_path(&config.history_path));
    if records.is_empty() {
        println!("No deployments yet.");
        return;
    }

    println!("Deployments ({}):", records.len());
    for record in records.iter().rev().take(5) {
        println!(
            "  [{}] {} via {}",
            record.timestamp,
            record.resource_name,
            record.engine.as_str()
        );
    }
}

// ---- Convert Command --------------------------------------------------------

fn run_convert(path: &PathBuf) -> Result<()> {
    let text = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };

    let table = convert::parse(&text)?;
    println!("{}", table.to_json_pretty());
    Ok(())
}

// ---- Local Agent Test -------------------------------------------------------

/// Run the agent's behavior locally against a few canned inputs,
/// the same check the original tooling ran before deploying.
fn run_test_agent() {
    println!("Testing CSV to JSON agent locally");
    println!("{}", "=".repeat(33));

    let cases = [
        "Hello!",
        "name,age,city\nJohn,25,New York\nJane,30,London\nBob,35,Paris",
        "name,age\nJohn",
    ];

    for (i, case) in cases.into_iter().enumerate() {
        println!();
        println!("--- Test {} ---", i + 1);
        let preview: String = case.chars().take(50).collect();
        println!("Input: {}{}", preview, if case.len() > 50 { "..." } else { "" });
        let response = agent::handle_query(case);
        let preview: String = response.chars().take(200).collect();
        println!(
            "Response: {}{}",
            preview,
            if response.len() > 200 { "..." } else { "" }
        );
    }

    println!();
    println!("Local testing complete.");
}

// ---- Prompt Commands --------------------------------------------------------

fn registry_for(config: &AppConfig) -> Result<PromptRegistryClient> {
    auth::preflight()?;
    let token = auth::fetch_access_token()?;
    Ok(PromptRegistryClient::new(
        &config.resolved_endpoint(),
        &config.parent_path(),
        token,
    ))
}

async fn run_upload_prompt(path: &PathBuf) -> Result<()> {
    let config = load_or_setup().await?;
    let template = load_template(path)?;

    println!("Uploading prompt: {}", template.name);
    println!("  Display name: {}", template.display_name);
    println!("  Length: {} characters", template.content.len());

    let registry = registry_for(&config)?;
    registry.upload_prompt(&template).await?;

    println!("{}", "Upload successful.".green());
    Ok(())
}

async fn run_list_prompts() -> Result<()> {
    let config = load_or_setup().await?;

    match registry_for(&config) {
        Ok(registry) => match registry.list_prompts().await {
            Ok(prompts) => {
                if prompts.is_empty() {
                    println!("No prompts in the registry.");
                } else {
                    println!("Registry prompts ({}):", prompts.len());
                    for p in prompts {
                        println!("  {} ({})", p.name, p.display_name);
                    }
                }
                return Ok(());
            }
            Err(e) => {
                println!("{}", format!("Registry unavailable: {:#}", e).yellow());
            }
        },
        Err(e) => {
            println!("{}", format!("Registry unavailable: {:#}", e).yellow());
        }
    }

    // Registry down: show local template files instead.
    let dir = resolve_path(&config.prompts_dir);
    let files = list_templates(&dir);
    if files.is_empty() {
        println!("No local prompt templates in {}.", dir.display());
    } else {
        println!("Local prompt templates ({}):", files.len());
        for file in files {
            println!("  {}", file.display());
        }
    }
    Ok(())
}

// ---- Deployment Management --------------------------------------------------

fn platform_for(config: &AppConfig) -> Result<VertexClient> {
    auth::preflight()?;
    let token = auth::fetch_access_token()?;
    Ok(VertexClient::new(config, token))
}

async fn run_list_deployments() -> Result<()> {
    let config = load_or_setup().await?;
    let client = platform_for(&config)?;

    let deployments = client.list_deployments().await?;
    if deployments.is_empty() {
        println!("No live deployments.");
        return Ok(());
    }

    println!("Live deployments ({}):", deployments.len());
    for d in deployments {
        println!("  {} [{}] {}", d.resource_name, d.state, d.create_time);
    }
    Ok(())
}

async fn run_teardown(resource: &str) -> Result<()> {
    let config = load_or_setup().await?;
    let client = platform_for(&config)?;

    client.delete_deployment(resource).await?;
    println!("{}", format!("Deleted {}", resource).green());
    Ok(())
}

async fn run_show_prompt(name: &str) -> Result<()> {
    let config = load_or_setup().await?;

    let instruction = match registry_for(&config) {
        Ok(registry) => {
            resolve_instruction(&registry, name, agent::instruction::DEFAULT_INSTRUCTION).await
        }
        Err(_) => agent::instruction::DEFAULT_INSTRUCTION.to_string(),
    };

    println!("{}", instruction);
    Ok(())
}
