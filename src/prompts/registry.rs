//! Prompt Registry Client
//!
//! Talks to the Vertex AI prompt-template surface over REST. The
//! exact endpoint has shifted between API revisions, so writes try
//! the known variants in order and the first success wins.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::types::{PromptRegistry, PromptSummary, PromptTemplate};

/// Endpoint variants for the prompt-template collection, tried in order.
const COLLECTION_PATHS: &[&str] = &["promptTemplates", "prompts", "modelTemplates"];

/// REST client for the prompt registry.
pub struct PromptRegistryClient {
    /// Fully qualified parent URL:
    /// `{endpoint}/projects/{project}/locations/{location}`.
    parent_url: String,
    token: String,
    http: Client,
}

impl PromptRegistryClient {
    pub fn new(endpoint: &str, parent_path: &str, token: String) -> Self {
        Self {
            parent_url: format!("{}/{}", endpoint.trim_end_matches('/'), parent_path),
            token,
            http: Client::new(),
        }
    }

    /// Pull prompt text out of a registry response. Field names have
    /// varied across API revisions.
    fn extract_prompt_text(data: &Value) -> Option<&str> {
        data["promptTemplate"]["text"]
            .as_str()
            .or_else(|| data["templateText"].as_str())
            .or_else(|| data["content"].as_str())
            .or_else(|| data["promptText"].as_str())
    }
}

#[async_trait]
impl PromptRegistry for PromptRegistryClient {
    /// Fetch the text of a named prompt.
    async fn get_prompt(&self, name: &str) -> Result<String> {
        let url = format!(
            "{}/promptTemplates/{}",
            self.parent_url,
            urlencoding::encode(name)
        );

        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .with_context(|| format!("Prompt registry request failed: GET {}", name))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!(
                "Prompt registry error: GET {} -> {}: {}",
                name,
                status.as_u16(),
                text
            );
        }

        let data: Value = resp
            .json()
            .await
            .context("Failed to parse prompt registry response")?;

        match Self::extract_prompt_text(&data) {
            Some(text) => Ok(text.to_string()),
            None => anyhow::bail!("Prompt {} has no text content in registry response", name),
        }
    }

    /// Upload a template, trying each known collection endpoint.
    /// A 404 means that endpoint variant does not exist on this API
    /// revision; anything else is a real failure.
    async fn upload_prompt(&self, template: &PromptTemplate) -> Result<()> {
        let payload = serde_json::json!({
            "name": template.name,
            "displayName": template.display_name,
            "description": template.description,
            "templateText": template.content,
            "content": template.content,
            "tags": template.tags,
            "version": template.version,
        });

        let mut last_error = String::from("no endpoint variant accepted the upload");

        for path in COLLECTION_PATHS {
            let url = format!("{}/{}", self.parent_url, path);
            debug!(endpoint = %url, "trying prompt upload endpoint");

            let resp = match self
                .http
                .post(&url)
                .bearer_auth(&self.token)
                .json(&payload)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    last_error = e.to_string();
                    continue;
                }
            };

            let status = resp.status();
            if status.is_success() {
                return Ok(());
            }

            let text = resp.text().await.unwrap_or_default();
            last_error = format!("{}: {}", status.as_u16(), text);
            if status.as_u16() == 404 {
                continue;
            }
            anyhow::bail!(
                "Prompt registry error: POST {} -> {}",
                path,
                last_error
            );
        }

        anyhow::bail!("Prompt upload failed: {}", last_error)
    }

    /// List prompts known to the registry.
    async fn list_prompts(&self) -> Result<Vec<PromptSummary>> {
        let url = format!("{}/promptTemplates", self.parent_url);

        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .context("Prompt registry request failed: list")?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!(
                "Prompt registry error: list -> {}: {}",
                status.as_u16(),
                text
            );
        }

        let data: Value = resp
            .json()
            .await
            .context("Failed to parse prompt registry response")?;

        let items = data["promptTemplates"]
            .as_array()
            .or_else(|| data["prompts"].as_array())
            .cloned()
            .unwrap_or_default();

        Ok(items
            .iter()
            .map(|p| PromptSummary {
                name: p["name"].as_str().unwrap_or("").to_string(),
                display_name: p["displayName"]
                    .as_str()
                    .or_else(|| p["display_name"].as_str())
                    .unwrap_or("")
                    .to_string(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_prompt_text_variants() {
        let nested = serde_json::json!({"promptTemplate": {"text": "from nested"}});
        assert_eq!(
            PromptRegistryClient::extract_prompt_text(&nested),
            Some("from nested")
        );

        let flat = serde_json::json!({"templateText": "from flat"});
        assert_eq!(
            PromptRegistryClient::extract_prompt_text(&flat),
            Some("from flat")
        );

        let content = serde_json::json!({"content": "from content"});
        assert_eq!(
            PromptRegistryClient::extract_prompt_text(&content),
            Some("from content")
        );

        let none = serde_json::json!({"unrelated": true});
        assert_eq!(PromptRegistryClient::extract_prompt_text(&none), None);
    }

    #[test]
    fn test_parent_url_construction() {
        let client = PromptRegistryClient::new(
            "https://us-central1-aiplatform.googleapis.com/v1/",
            "projects/demo/locations/us-central1",
            "token".to_string(),
        );
        assert_eq!(
            client.parent_url,
            "https://us-central1-aiplatform.googleapis.com/v1/projects/demo/locations/us-central1"
        );
    }
}
