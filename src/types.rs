//! Tabula - Type Definitions
//!
//! Shared types for the deployment tool: configuration, the agent
//! manifest, prompt templates, and the client traits the deployment
//! pipeline is written against.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ─── Configuration ───────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub project_id: String,
    pub location: String,
    /// Override for the platform API base URL. Empty means derive it
    /// from `location` (`https://{location}-aiplatform.googleapis.com/v1`).
    pub api_endpoint: String,
    pub staging_bucket: String,
    pub model: String,
    pub agent_name: String,
    pub agent_description: String,
    /// Name of the prompt template to fetch from the registry.
    pub prompt_name: String,
    pub prompts_dir: String,
    pub history_path: String,
    pub log_level: LogLevel,
    pub version: String,
}

impl AppConfig {
    /// The platform API base URL, derived from the location unless
    /// an explicit override is configured.
    pub fn resolved_endpoint(&self) -> String {
        if self.api_endpoint.is_empty() {
            format!("https://{}-aiplatform.googleapis.com/v1", self.location)
        } else {
            self.api_endpoint.trim_end_matches('/').to_string()
        }
    }

    /// The resource parent path: `projects/{project}/locations/{location}`.
    pub fn parent_path(&self) -> String {
        format!("projects/{}/locations/{}", self.project_id, self.location)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Returns a default `AppConfig`. Fields with no sensible default
/// (project id, staging bucket) are left empty so the setup wizard
/// can fill them in.
pub fn default_config() -> AppConfig {
    AppConfig {
        project_id: String::new(),
        location: "us-central1".to_string(),
        api_endpoint: String::new(),
        staging_bucket: String::new(),
        model: "gemini-2.0-flash".to_string(),
        agent_name: "csv-json-converter".to_string(),
        agent_description: "Converts CSV files to JSON format".to_string(),
        prompt_name: "csv_json_converter".to_string(),
        prompts_dir: "~/.tabula/prompts".to_string(),
        history_path: "~/.tabula/deployments.json".to_string(),
        log_level: LogLevel::Info,
        version: "0.1.0".to_string(),
    }
}

// ─── Agent Manifest ──────────────────────────────────────────────

/// The packaged agent definition uploaded by the deploy call.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentManifest {
    pub name: String,
    pub model: String,
    pub description: String,
    pub instruction: String,
    pub tools: Vec<String>,
}

// ─── Prompt Registry ─────────────────────────────────────────────

/// A prompt template as stored locally and uploaded to the registry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_template_version")]
    pub version: String,
}

fn default_template_version() -> String {
    "1.0".to_string()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptSummary {
    pub name: String,
    pub display_name: String,
}

#[async_trait]
pub trait PromptRegistry: Send + Sync {
    /// Fetch the text of a named prompt from the registry.
    async fn get_prompt(&self, name: &str) -> anyhow::Result<String>;

    /// Upload a prompt template to the registry.
    async fn upload_prompt(&self, template: &PromptTemplate) -> anyhow::Result<()>;

    /// List prompts known to the registry.
    async fn list_prompts(&self) -> anyhow::Result<Vec<PromptSummary>>;
}

// ─── Deployment ──────────────────────────────────────────────────

/// Which deploy surface produced a deployment.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    AgentEngine,
    ReasoningEngine,
}

impl EngineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::AgentEngine => "agent-engine",
            EngineKind::ReasoningEngine => "reasoning-engine",
        }
    }
}

/// A live deployment as reported by the platform.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentInfo {
    pub resource_name: String,
    pub display_name: String,
    pub state: String,
    pub create_time: String,
}

/// One entry in the local deployment history file.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    pub id: String,
    pub timestamp: String,
    pub resource_name: String,
    pub engine: EngineKind,
    pub display_name: String,
    pub model: String,
    pub staging_bucket: String,
}

#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// List staging buckets visible to the project.
    async fn list_buckets(&self) -> anyhow::Result<Vec<String>>;

    /// Make sure the named staging bucket exists, creating it if needed.
    async fn ensure_bucket(&self, name: &str) -> anyhow::Result<()>;

    /// Deploy the agent via the primary (agent engine) surface.
    async fn create_agent_engine(
        &self,
        manifest: &AgentManifest,
        staging_bucket: &str,
    ) -> anyhow::Result<DeploymentInfo>;

    /// Deploy the agent via the fallback (reasoning engine) surface.
    async fn create_reasoning_engine(
        &self,
        manifest: &AgentManifest,
        staging_bucket: &str,
    ) -> anyhow::Result<DeploymentInfo>;

    /// Send one query to a deployed agent and return its text response.
    async fn query_agent(&self, resource_name: &str, message: &str) -> anyhow::Result<String>;

    /// List deployments under the configured parent.
    async fn list_deployments(&self) -> anyhow::Result<Vec<DeploymentInfo>>;

    /// Tear down a deployment.
    async fn delete_deployment(&self, resource_name: &str) -> anyhow::Result<()>;
}
