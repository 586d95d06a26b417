//! Planner configuration from environment variables.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const ENV_PROVIDER: &str = "PLANSCRIPT_PLANNER_PROVIDER";
pub const ENV_MODEL: &str = "PLANSCRIPT_PLANNER_MODEL";
pub const ENV_BASE_URL: &str = "PLANSCRIPT_PLANNER_BASE_URL";
pub const ENV_API_KEY: &str = "PLANSCRIPT_PLANNER_API_KEY";
pub const ENV_SYSTEM_PROMPT: &str = "PLANSCRIPT_PLANNER_SYSTEM_PROMPT";
pub const ENV_TEMPERATURE: &str = "PLANSCRIPT_PLANNER_TEMPERATURE";
pub const ENV_TIMEOUT_SECS: &str = "PLANSCRIPT_PLANNER_TIMEOUT_SECS";
pub const ENV_MAX_ATTEMPTS: &str = "PLANSCRIPT_PLANNER_MAX_ATTEMPTS";

const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Connection and retry settings for [`ChatPlanner`](crate::ChatPlanner).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// `openrouter` or `openai_compatible`.
    pub provider: Option<String>,
    pub model: Option<String>,
    pub api_base_url: Option<String>,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub system_prompt: Option<String>,
    pub temperature: Option<f32>,
    pub timeout: Duration,
    /// Planning attempts per request, including the first.
    pub max_attempts: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig {
            provider: None,
            model: None,
            api_base_url: None,
            api_key: None,
            system_prompt: None,
            temperature: Some(0.0),
            timeout: Duration::from_secs(60),
            max_attempts: 3,
        }
    }
}

impl PlannerConfig {
    /// Reads `PLANSCRIPT_PLANNER_*` variables from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable lookup. Empty values count
    /// as unset; unparsable numbers fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = PlannerConfig::default();
        PlannerConfig {
            provider: get(ENV_PROVIDER),
            model: get(ENV_MODEL),
            api_base_url: get(ENV_BASE_URL),
            api_key: get(ENV_API_KEY),
            system_prompt: get(ENV_SYSTEM_PROMPT),
            temperature: get(ENV_TEMPERATURE)
                .and_then(|v| v.parse().ok())
                .or(defaults.temperature),
            timeout: get(ENV_TIMEOUT_SECS)
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            max_attempts: get(ENV_MAX_ATTEMPTS)
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_attempts),
        }
    }

    /// A provider and a model are set.
    pub fn is_configured(&self) -> bool {
        self.provider.is_some() && self.model.is_some()
    }

    /// Base URL for the configured provider, or `None` if it cannot be
    /// determined.
    pub fn base_url(&self) -> Option<String> {
        match self.provider.as_deref() {
            Some("openrouter") => Some(
                self.api_base_url
                    .clone()
                    .unwrap_or_else(|| OPENROUTER_BASE_URL.to_string()),
            ),
            Some("openai_compatible") => self.api_base_url.clone(),
            _ => None,
        }
    }
}
