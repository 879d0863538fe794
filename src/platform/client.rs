//! Vertex AI REST Client
//!
//! Talks to the Vertex AI control plane for agent deployment and to
//! Cloud Storage for the staging bucket. Deployments go through the
//! Agent Engine surface first, with the older Reasoning Engine
//! surface kept as a fallback.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::types::{AgentManifest, AppConfig, DeploymentInfo, PlatformClient};

const STORAGE_API: &str = "https://storage.googleapis.com/storage/v1";

/// Python packages the hosted runtime installs alongside the agent.
const RUNTIME_REQUIREMENTS: &[&str] = &[
    "google-cloud-aiplatform[adk,agent_engines]>=1.95.1",
    "google-cloud-storage>=2.18.0",
];

/// Vertex AI client for deployment, queries, and staging buckets.
pub struct VertexClient {
    api_base: String,
    project: String,
    location: String,
    parent: String,
    token: String,
    http: Client,
}

impl VertexClient {
    pub fn new(config: &AppConfig, token: String) -> Self {
        Self {
            api_base: config.resolved_endpoint(),
            project: config.project_id.clone(),
            location: config.location.clone(),
            parent: config.parent_path(),
            token,
            http: Client::new(),
        }
    }

    /// Internal helper: send a request and return the JSON body.
    async fn request(&self, method: &str, url: &str, body: Option<Value>) -> Result<Value> {
        let mut builder = match method {
            "GET" => self.http.get(url),
            "POST" => self.http.post(url),
            "DELETE" => self.http.delete(url),
            _ => self.http.get(url),
        };

        builder = builder.bearer_auth(&self.token);
        if let Some(b) = body {
            builder = builder.json(&b);
        }

        let resp = builder
            .send()
            .await
            .with_context(|| format!("Vertex AI request failed: {} {}", method, url))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!(
                "Vertex AI error: {} {} -> {}: {}",
                method,
                url,
                status.as_u16(),
                text
            );
        }

        if status.as_u16() == 204 {
            return Ok(Value::Null);
        }
        let json: Value = resp.json().await.unwrap_or(Value::Null);
        Ok(json)
    }

    fn engine_payload(&self, manifest: &AgentManifest, staging_bucket: &str) -> Value {
        serde_json::json!({
            "displayName": manifest.name,
            "description": manifest.description,
            "spec": {
                "agent": manifest,
                "stagingBucket": format!("gs://{}", staging_bucket.trim_start_matches("gs://")),
                "requirements": RUNTIME_REQUIREMENTS,
            },
        })
    }

    fn deployment_from_response(&self, data: &Value, manifest: &AgentManifest) -> DeploymentInfo {
        // Create calls may return a long-running operation; the engine
        // resource name is the part before "/operations/".
        let raw_name = data["name"]
            .as_str()
            .or_else(|| data["resourceName"].as_str())
            .unwrap_or("");
        let resource_name = raw_name
            .split("/operations/")
            .next()
            .unwrap_or(raw_name)
            .to_string();

        DeploymentInfo {
            resource_name,
            display_name: data["displayName"]
                .as_str()
                .unwrap_or(&manifest.name)
                .to_string(),
            state: data["state"].as_str().unwrap_or("CREATING").to_string(),
            create_time: data["createTime"].as_str().unwrap_or("").to_string(),
        }
    }
}

#[async_trait]
impl PlatformClient for VertexClient {
    // ── Staging Bucket ───────────────────────────────────────────

    /// List bucket names in the project.
    async fn list_buckets(&self) -> Result<Vec<String>> {
        let url = format!(
            "{}/b?project={}",
            STORAGE_API,
            urlencoding::encode(&self.project)
        );
        let result = self.request("GET", &url, None).await?;

        Ok(result["items"]
            .as_array()
            .cloned()
            .unwrap_or_default()
            .iter()
            .filter_map(|b| b["name"].as_str().map(|s| s.to_string()))
            .collect())
    }

    /// Make sure the staging bucket exists, creating it in the
    /// configured location if it does not.
    async fn ensure_bucket(&self, name: &str) -> Result<()> {
        let name = name.trim_start_matches("gs://");
        let url = format!("{}/b/{}", STORAGE_API, urlencoding::encode(name));

        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .with_context(|| format!("Bucket lookup failed: {}", name))?;

        if resp.status().is_success() {
            debug!(bucket = name, "staging bucket exists");
            return Ok(());
        }
        if resp.status().as_u16() != 404 {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!(
                "Bucket lookup error: {} -> {}: {}",
                name,
                status.as_u16(),
                text
            );
        }

        debug!(bucket = name, "creating staging bucket");
        let create_url = format!(
            "{}/b?project={}",
            STORAGE_API,
            urlencoding::encode(&self.project)
        );
        let body = serde_json::json!({
            "name": name,
            "location": self.location,
        });
        self.request("POST", &create_url, Some(body))
            .await
            .with_context(|| format!("Failed to create bucket {}", name))?;
        Ok(())
    }

    // ── Deployment ───────────────────────────────────────────────

    /// Deploy via the Agent Engine surface.
    async fn create_agent_engine(
        &self,
        manifest: &AgentManifest,
        staging_bucket: &str,
    ) -> Result<DeploymentInfo> {
        let url = format!("{}/{}/agentEngines", self.api_base, self.parent);
        let body = self.engine_payload(manifest, staging_bucket);
        let result = self.request("POST", &url, Some(body)).await?;
        Ok(self.deployment_from_response(&result, manifest))
    }

    /// Deploy via the Reasoning Engine surface (fallback path).
    async fn create_reasoning_engine(
        &self,
        manifest: &AgentManifest,
        staging_bucket: &str,
    ) -> Result<DeploymentInfo> {
        let url = format!("{}/{}/reasoningEngines", self.api_base, self.parent);
        let body = self.engine_payload(manifest, staging_bucket);
        let result = self.request("POST", &url, Some(body)).await?;
        Ok(self.deployment_from_response(&result, manifest))
    }

    /// Send one query to a deployed agent.
    async fn query_agent(&self, resource_name: &str, message: &str) -> Result<String> {
        let url = format!("{}/{}:query", self.api_base, resource_name);
        let body = serde_json::json!({ "input": message });
        let result = self.request("POST", &url, Some(body)).await?;

        let text = result["output"]
            .as_str()
            .or_else(|| result["response"].as_str())
            .or_else(|| result["text"].as_str());

        match text {
            Some(t) => Ok(t.to_string()),
            None => Ok(result.to_string()),
        }
    }

    /// List deployments under the parent. Engines created through the
    /// fallback surface show up there instead, so both are merged.
    async fn list_deployments(&self) -> Result<Vec<DeploymentInfo>> {
        let mut deployments = Vec::new();

        for collection in ["agentEngines", "reasoningEngines"] {
            let url = format!("{}/{}/{}", self.api_base, self.parent, collection);
            let result = match self.request("GET", &url, None).await {
                Ok(r) => r,
                // One of the two surfaces may not exist on this API
                // revision; the other still counts.
                Err(e) => {
                    debug!(collection, error = %e, "deployment listing skipped");
                    continue;
                }
            };

            let items = result[collection]
                .as_array()
                .cloned()
                .unwrap_or_default();

            deployments.extend(items.iter().map(|d| DeploymentInfo {
                resource_name: d["name"].as_str().unwrap_or("").to_string(),
                display_name: d["displayName"].as_str().unwrap_or("").to_string(),
                state: d["state"].as_str().unwrap_or("unknown").to_string(),
                create_time: d["createTime"].as_str().unwrap_or("").to_string(),
            }));
        }

        Ok(deployments)
    }

    /// Tear down a deployment by resource name.
    async fn delete_deployment(&self, resource_name: &str) -> Result<()> {
        let url = format!("{}/{}", self.api_base, resource_name);
        self.request("DELETE", &url, None).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::default_config;

    fn test_client() -> VertexClient {
        let mut config = default_config();
        config.project_id = "demo-project".to_string();
        VertexClient::new(&config, "token".to_string())
    }

    #[test]
    fn test_endpoint_derived_from_location() {
        let client = test_client();
        assert_eq!(
            client.api_base,
            "https://us-central1-aiplatform.googleapis.com/v1"
        );
        assert_eq!(
            client.parent,
            "projects/demo-project/locations/us-central1"
        );
    }

    #[test]
    fn test_engine_payload_normalizes_bucket_uri() {
        let client = test_client();
        let manifest = crate::agent::build_manifest(&default_config(), "do the thing");

        let plain = client.engine_payload(&manifest, "my-bucket");
        assert_eq!(plain["spec"]["stagingBucket"], "gs://my-bucket");

        let prefixed = client.engine_payload(&manifest, "gs://my-bucket");
        assert_eq!(prefixed["spec"]["stagingBucket"], "gs://my-bucket");
    }

    #[test]
    fn test_deployment_from_operation_response() {
        let client = test_client();
        let manifest = crate::agent::build_manifest(&default_config(), "x");
        let data = serde_json::json!({
            "name": "projects/demo/locations/us-central1/agentEngines/123/operations/456",
        });

        let info = client.deployment_from_response(&data, &manifest);
        assert_eq!(
            info.resource_name,
            "projects/demo/locations/us-central1/agentEngines/123"
        );
        assert_eq!(info.display_name, manifest.name);
        assert_eq!(info.state, "CREATING");
    }
}
