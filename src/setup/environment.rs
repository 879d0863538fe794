//! Credential Environment Detection
//!
//! Figure out where Google Cloud credentials will come from: the
//! service-account key file named by the environment, or
//! application-default credentials left by a prior gcloud login.

use std::env;
use std::path::PathBuf;

use crate::platform::auth::CREDENTIAL_ENV;

/// Where credentials were found.
pub struct CredentialInfo {
    /// "service-account", "application-default", or "none".
    pub source: &'static str,
    pub path: Option<PathBuf>,
}

/// Detect the credential source without validating it.
pub fn detect_credentials() -> CredentialInfo {
    // 1. Explicit service-account key file
    if let Ok(value) = env::var(CREDENTIAL_ENV) {
        return CredentialInfo {
            source: "service-account",
            path: Some(PathBuf::from(value)),
        };
    }

    // 2. Well-known application-default credentials location
    let adc_path = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("/root"))
        .join(".config/gcloud/application_default_credentials.json");
    if adc_path.exists() {
        return CredentialInfo {
            source: "application-default",
            path: Some(adc_path),
        };
    }

    CredentialInfo {
        source: "none",
        path: None,
    }
}
