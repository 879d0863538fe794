//! Credential Handling
//!
//! The service-account key path comes from one environment variable,
//! read once at startup. Access tokens are minted by the gcloud CLI
//! from application-default credentials, which honor that same
//! variable. No token refresh: a deployment run is short-lived.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use tracing::{debug, warn};

/// Environment variable naming the service-account key file.
pub const CREDENTIAL_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Validate the credential environment at startup.
///
/// If the variable is set, the file it names must exist; this is a
/// hard startup failure of the deployment tooling. An unset variable
/// is fine, since application-default credentials may come from a
/// prior `gcloud auth application-default login`.
pub fn preflight() -> Result<Option<PathBuf>> {
    match env::var(CREDENTIAL_ENV) {
        Ok(value) => {
            let path = PathBuf::from(&value);
            if !path.is_file() {
                anyhow::bail!(
                    "{} points at {}, which does not exist",
                    CREDENTIAL_ENV,
                    path.display()
                );
            }
            if !looks_like_service_account_key(&path) {
                warn!(
                    path = %path.display(),
                    "credential file does not look like a service-account key"
                );
            }
            debug!(path = %path.display(), "using service-account key file");
            Ok(Some(path))
        }
        Err(_) => Ok(None),
    }
}

/// Mint a bearer token from application-default credentials.
pub fn fetch_access_token() -> Result<String> {
    let output = Command::new("gcloud")
        .args(["auth", "application-default", "print-access-token"])
        .output()
        .context(
            "Failed to run gcloud. Install the gcloud CLI and run \
             `gcloud auth application-default login`",
        )?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!(
            "gcloud could not mint an access token: {}\n\
             Run `gcloud auth login` and `gcloud auth application-default login`",
            stderr.trim()
        );
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() {
        anyhow::bail!("gcloud returned an empty access token");
    }
    Ok(token)
}

/// The active gcloud account, if any. Used by `--status` output only.
pub fn active_account() -> Option<String> {
    let output = Command::new("gcloud")
        .args([
            "auth",
            "list",
            "--filter=status:ACTIVE",
            "--format=value(account)",
        ])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let account = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if account.is_empty() {
        None
    } else {
        Some(account)
    }
}

/// Whether a path looks like a service-account key file (exists and
/// parses as JSON with a `client_email`).
pub fn looks_like_service_account_key(path: &Path) -> bool {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return false;
    };
    let Ok(data) = serde_json::from_str::<serde_json::Value>(&contents) else {
        return false;
    };
    data.get("client_email").and_then(|v| v.as_str()).is_some()
}
