//! Setup Wizard
//!
//! Interactive first-run setup. Walks through credential detection,
//! project and location selection, staging bucket choice, and model
//! configuration, then writes the config file and seeds the local
//! prompt template.

use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::Select;
use tracing::debug;

use crate::config::{resolve_path, save_config};
use crate::platform::auth;
use crate::platform::VertexClient;
use crate::prompts::template::{default_template, save_template};
use crate::types::{default_config, AppConfig, PlatformClient};

use super::banner::show_banner;
use super::environment::detect_credentials;
use super::prompts::{prompt_project_id, prompt_with_default};

/// Run the interactive setup wizard.
/// Returns a fully populated `AppConfig`, already saved to disk.
pub async fn run_setup_wizard() -> Result<AppConfig> {
    show_banner();

    println!(
        "{}",
        "  First-run setup. Let's configure your deployment.\n".white()
    );

    // ---- 1. Credentials -----------------------------------------------------
    println!("{}", "  [1/5] Checking credentials...".cyan());

    let credentials = detect_credentials();
    match credentials.source {
        "service-account" => {
            if let Some(path) = credentials.path.as_deref() {
                if !path.is_file() {
                    anyhow::bail!(
                        "{} points at {}, which does not exist",
                        auth::CREDENTIAL_ENV,
                        path.display()
                    );
                }
                println!(
                    "{}",
                    format!("  Service-account key: {}\n", path.display()).green()
                );
            }
        }
        "application-default" => {
            println!("{}", "  Using application-default credentials.\n".green());
        }
        _ => {
            println!(
                "{}",
                "  No credentials found. Deployment will fail until you run:\n\
                 \u{0020}   gcloud auth application-default login\n"
                    .yellow()
            );
        }
    }

    let mut config = default_config();

    // ---- 2. Project and location --------------------------------------------
    println!("{}", "  [2/5] Project\n".cyan());

    config.project_id = prompt_project_id("Google Cloud project id")?;
    config.location = prompt_with_default("Location", &config.location)?;
    println!();

    // ---- 3. Staging bucket --------------------------------------------------
    println!("{}", "  [3/5] Staging bucket\n".cyan());

    let suggested = format!("{}-vertex-staging", config.project_id);
    config.staging_bucket = select_staging_bucket(&config, &suggested).await?;
    println!(
        "{}",
        format!("  Staging bucket: gs://{}\n", config.staging_bucket).green()
    );

    // ---- 4. Agent -----------------------------------------------------------
    println!("{}", "  [4/5] Agent\n".cyan());

    config.agent_name = prompt_with_default("Agent name", &config.agent_name)?;
    config.model = prompt_with_default("Model", &config.model)?;
    config.prompt_name = prompt_with_default("Registry prompt name", &config.prompt_name)?;
    println!();

    // ---- 5. Save ------------------------------------------------------------
    println!("{}", "  [5/5] Writing configuration...".cyan());

    save_config(&config).context("Failed to save config")?;

    // Seed the local prompt template so there is something to upload.
    let prompts_dir = resolve_path(&config.prompts_dir);
    let template = default_template(&config);
    let template_path = prompts_dir.join(format!("{}.json", template.name));
    if !template_path.exists() {
        save_template(&prompts_dir, &template)?;
        println!(
            "{}",
            format!("  Seeded prompt template: {}", template_path.display()).green()
        );
    }

    println!("{}", "  Setup complete. Run: tabula --deploy\n".green());

    Ok(config)
}

/// Offer existing buckets when they can be listed, otherwise fall
/// back to a manually entered name. Either way the bucket is created
/// at deploy time if it does not exist yet.
async fn select_staging_bucket(config: &AppConfig, suggested: &str) -> Result<String> {
    let buckets = match auth::fetch_access_token() {
        Ok(token) => {
            let client = VertexClient::new(config, token);
            match client.list_buckets().await {
                Ok(buckets) => buckets,
                Err(e) => {
                    debug!(error = %e, "bucket listing failed, entering name manually");
                    Vec::new()
                }
            }
        }
        Err(e) => {
            debug!(error = %e, "no access token, entering bucket name manually");
            Vec::new()
        }
    };

    if buckets.is_empty() {
        println!(
            "{}",
            "  Could not list buckets; a new one will be created if needed.".dimmed()
        );
        return prompt_with_default("Staging bucket name", suggested);
    }

    let mut items = buckets.clone();
    items.push(format!("(create new: {})", suggested));

    let index = Select::new()
        .with_prompt("  Select a staging bucket")
        .items(&items)
        .default(0)
        .interact()?;

    if index == buckets.len() {
        prompt_with_default("New bucket name", suggested)
    } else {
        Ok(buckets[index].clone())
    }
}
