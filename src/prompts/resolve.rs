//! Instruction Resolution
//!
//! Two-tier resolution for the agent instruction: prefer the remote
//! prompt registry, fall back to the embedded default on any failure.
//! No retries and no caching; the call happens once per deployment.

use tracing::{info, warn};

use crate::types::PromptRegistry;

/// Resolve the agent instruction by name.
///
/// Any registry failure (network, auth, missing prompt, empty
/// content) downgrades silently to `fallback` so the agent stays
/// deployable with the registry down. The failure is logged, not
/// surfaced.
pub async fn resolve_instruction(
    registry: &dyn PromptRegistry,
    name: &str,
    fallback: &str,
) -> String {
    match registry.get_prompt(name).await {
        Ok(text) if !text.trim().is_empty() => {
            info!(prompt = name, chars = text.len(), "loaded instruction from registry");
            text
        }
        Ok(_) => {
            warn!(prompt = name, "registry returned empty prompt, using embedded default");
            fallback.to_string()
        }
        Err(e) => {
            warn!(prompt = name, error = %e, "prompt fetch failed, using embedded default");
            fallback.to_string()
        }
    }
}
