//! Deployment Pipeline
//!
//! Orchestrates one deployment end to end: staging bucket, instruction
//! resolution, manifest build, deploy with engine fallback, and a
//! post-deploy smoke test. Pure glue over the platform clients; the
//! caller persists the returned record.

use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::agent;
use crate::agent::instruction::DEFAULT_INSTRUCTION;
use crate::prompts::resolve_instruction;
use crate::types::{
    AppConfig, DeploymentInfo, DeploymentRecord, EngineKind, PlatformClient, PromptRegistry,
};

/// CSV sent to the freshly deployed agent as a smoke test.
const SMOKE_TEST_CSV: &str = "name,age,city\nAlice,28,Tokyo\nBob,32,Berlin";

/// Run the full deployment pipeline and return the record to persist.
pub async fn run_deploy(
    config: &AppConfig,
    client: &dyn PlatformClient,
    registry: &dyn PromptRegistry,
) -> Result<DeploymentRecord> {
    if config.project_id.is_empty() {
        anyhow::bail!("No project configured. Run: tabula --setup");
    }
    if config.staging_bucket.is_empty() {
        anyhow::bail!("No staging bucket configured. Run: tabula --setup");
    }

    println!("{}", "  [1/5] Preparing staging bucket...".cyan());
    client
        .ensure_bucket(&config.staging_bucket)
        .await
        .context("Staging bucket setup failed")?;
    println!(
        "{}",
        format!("  Bucket ready: gs://{}\n", config.staging_bucket).green()
    );

    println!("{}", "  [2/5] Resolving agent instruction...".cyan());
    let instruction =
        resolve_instruction(registry, &config.prompt_name, DEFAULT_INSTRUCTION).await;
    let from_registry = instruction != DEFAULT_INSTRUCTION;
    println!(
        "{}",
        format!(
            "  Instruction: {} ({} chars)\n",
            if from_registry {
                "registry"
            } else {
                "embedded default"
            },
            instruction.len()
        )
        .green()
    );

    println!("{}", "  [3/5] Packaging agent manifest...".cyan());
    let manifest = agent::build_manifest(config, &instruction);
    println!(
        "{}",
        format!(
            "  Agent: {} (model {}, {} tools)\n",
            manifest.name,
            manifest.model,
            manifest.tools.len()
        )
        .green()
    );

    println!("{}", "  [4/5] Deploying (this may take several minutes)...".cyan());
    let (deployment, engine) = deploy_with_fallback(client, &manifest, config).await?;
    println!(
        "{}",
        format!(
            "  Deployed via {}: {}\n",
            engine.as_str(),
            deployment.resource_name
        )
        .green()
    );

    println!("{}", "  [5/5] Smoke testing deployed agent...".cyan());
    match client
        .query_agent(&deployment.resource_name, SMOKE_TEST_CSV)
        .await
    {
        Ok(response) if !response.trim().is_empty() => {
            info!(chars = response.len(), "smoke test response received");
            println!("{}", "  Smoke test passed.\n".green());
        }
        Ok(_) => {
            warn!("smoke test returned an empty response");
            println!("{}", "  Smoke test returned no output.\n".yellow());
        }
        Err(e) => {
            // Deployment itself succeeded; a failed probe is not fatal.
            warn!(error = %e, "smoke test query failed");
            println!("{}", "  Smoke test failed (deployment kept).\n".yellow());
        }
    }

    Ok(build_record(config, &deployment, engine))
}

/// Try the primary engine surface, fall back to the older one.
async fn deploy_with_fallback(
    client: &dyn PlatformClient,
    manifest: &crate::types::AgentManifest,
    config: &AppConfig,
) -> Result<(DeploymentInfo, EngineKind)> {
    match client
        .create_agent_engine(manifest, &config.staging_bucket)
        .await
    {
        Ok(deployment) => Ok((deployment, EngineKind::AgentEngine)),
        Err(e) => {
            warn!(error = %e, "agent engine deploy failed, trying reasoning engine");
            println!(
                "{}",
                "  Agent engine unavailable, falling back to reasoning engine...".yellow()
            );
            let deployment = client
                .create_reasoning_engine(manifest, &config.staging_bucket)
                .await
                .context("Both deployment surfaces failed")?;
            Ok((deployment, EngineKind::ReasoningEngine))
        }
    }
}

/// Build the history record for a completed deployment.
pub fn build_record(
    config: &AppConfig,
    deployment: &DeploymentInfo,
    engine: EngineKind,
) -> DeploymentRecord {
    DeploymentRecord {
        id: Uuid::new_v4().to_string(),
        timestamp: Utc::now().to_rfc3339(),
        resource_name: deployment.resource_name.clone(),
        engine,
        display_name: deployment.display_name.clone(),
        model: config.model.clone(),
        staging_bucket: config.staging_bucket.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AgentManifest, PromptSummary, PromptTemplate, default_config};
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct MockPlatform {
        fail_primary: bool,
        queried: AtomicBool,
    }

    impl MockPlatform {
        fn new(fail_primary: bool) -> Self {
            Self {
                fail_primary,
                queried: AtomicBool::new(false),
            }
        }

        fn deployment(&self, suffix: &str) -> DeploymentInfo {
            DeploymentInfo {
                resource_name: format!("projects/p/locations/l/{}/1", suffix),
                display_name: "csv-json-converter".to_string(),
                state: "CREATING".to_string(),
                create_time: String::new(),
            }
        }
    }

    #[async_trait]
    impl PlatformClient for MockPlatform {
        async fn list_buckets(&self) -> Result<Vec<String>> {
            Ok(vec!["existing-bucket".to_string()])
        }

        async fn ensure_bucket(&self, _name: &str) -> Result<()> {
            Ok(())
        }

        async fn create_agent_engine(
            &self,
            _manifest: &AgentManifest,
            _staging_bucket: &str,
        ) -> Result<DeploymentInfo> {
            if self.fail_primary {
                anyhow::bail!("agent engine surface unavailable")
            }
            Ok(self.deployment("agentEngines"))
        }

        async fn create_reasoning_engine(
            &self,
            _manifest: &AgentManifest,
            _staging_bucket: &str,
        ) -> Result<DeploymentInfo> {
            Ok(self.deployment("reasoningEngines"))
        }

        async fn query_agent(&self, _resource_name: &str, _message: &str) -> Result<String> {
            self.queried.store(true, Ordering::SeqCst);
            Ok("[{\"name\":\"Alice\"}]".to_string())
        }

        async fn list_deployments(&self) -> Result<Vec<DeploymentInfo>> {
            Ok(Vec::new())
        }

        async fn delete_deployment(&self, _resource_name: &str) -> Result<()> {
            Ok(())
        }
    }

    struct DownRegistry;

    #[async_trait]
    impl PromptRegistry for DownRegistry {
        async fn get_prompt(&self, _name: &str) -> Result<String> {
            anyhow::bail!("registry down")
        }
        async fn upload_prompt(&self, _template: &PromptTemplate) -> Result<()> {
            anyhow::bail!("registry down")
        }
        async fn list_prompts(&self) -> Result<Vec<PromptSummary>> {
            anyhow::bail!("registry down")
        }
    }

    fn test_config() -> AppConfig {
        let mut config = default_config();
        config.project_id = "demo".to_string();
        config.staging_bucket = "demo-vertex-staging".to_string();
        config
    }

    #[tokio::test]
    async fn test_primary_engine_used() {
        let platform = MockPlatform::new(false);
        let record = run_deploy(&test_config(), &platform, &DownRegistry)
            .await
            .unwrap();
        assert_eq!(record.engine, EngineKind::AgentEngine);
        assert!(record.resource_name.contains("agentEngines"));
        assert!(platform.queried.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_fallback_engine_on_primary_failure() {
        let platform = MockPlatform::new(true);
        let record = run_deploy(&test_config(), &platform, &DownRegistry)
            .await
            .unwrap();
        assert_eq!(record.engine, EngineKind::ReasoningEngine);
        assert!(record.resource_name.contains("reasoningEngines"));
    }

    #[tokio::test]
    async fn test_unconfigured_project_rejected() {
        let platform = MockPlatform::new(false);
        let err = run_deploy(&default_config(), &platform, &DownRegistry)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No project configured"));
    }

    #[test]
    fn test_record_fields() {
        let config = test_config();
        let deployment = DeploymentInfo {
            resource_name: "projects/p/locations/l/agentEngines/9".to_string(),
            display_name: "csv-json-converter".to_string(),
            state: "ACTIVE".to_string(),
            create_time: String::new(),
        };
        let record = build_record(&config, &deployment, EngineKind::AgentEngine);
        assert_eq!(record.resource_name, deployment.resource_name);
        assert_eq!(record.model, "gemini-2.0-flash");
        assert_eq!(record.staging_bucket, "demo-vertex-staging");
        assert!(!record.id.is_empty());
        assert!(!record.timestamp.is_empty());
    }
}
