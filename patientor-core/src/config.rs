use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001/api";

/// Client settings shared by the CLI, the JS bridge and the browser UI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Root of the patient API, without a trailing slash.
    pub api_base_url: String,
    /// Disable the submit button while the form has errors. Off by default:
    /// the button stays enabled and submitting invalid values is refused.
    pub disable_invalid_submit: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            disable_invalid_submit: false,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            api_base_url: base_url.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }
}
