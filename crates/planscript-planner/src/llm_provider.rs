//! Blocking OpenAI-compatible chat client.

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::PlannerConfig;
use crate::error::ProviderError;

/// Sends one user message and returns the assistant's text.
///
/// [`ChatPlanner`](crate::ChatPlanner) talks to providers only through this
/// trait, so tests can script responses.
pub trait ChatTransport {
    fn complete_json(&self, user_message: &str) -> Result<String, ProviderError>;
}

/// Chat-completions client for `openrouter` and `openai_compatible`
/// providers, requesting JSON-object responses.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleClient {
    config: PlannerConfig,
    http: reqwest::blocking::Client,
}

impl OpenAiCompatibleClient {
    pub fn new(config: PlannerConfig) -> Result<Self, ProviderError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| ProviderError::Request(err.to_string()))?;
        Ok(OpenAiCompatibleClient { config, http })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    fn endpoint(&self) -> Result<String, ProviderError> {
        let provider = self
            .config
            .provider
            .as_deref()
            .ok_or_else(|| ProviderError::Unconfigured {
                reason: "no provider set".to_string(),
            })?;
        let base_url = match provider {
            "openrouter" | "openai_compatible" => self.config.base_url().ok_or_else(|| ProviderError::Unconfigured {
                reason: "openai_compatible provider requires a base url".to_string(),
            })?,
            other => {
                return Err(ProviderError::UnsupportedProvider {
                    provider: other.to_string(),
                })
            }
        };
        Ok(format!("{}/chat/completions", base_url.trim_end_matches('/')))
    }

    /// The request body sent for `user_message`.
    pub fn request_body(&self, user_message: &str) -> serde_json::Value {
        let mut messages = Vec::new();
        if let Some(system_prompt) = &self.config.system_prompt {
            messages.push(json!({ "role": "system", "content": system_prompt }));
        }
        messages.push(json!({ "role": "user", "content": user_message }));

        let mut body = json!({
            "model": self.config.model.clone().unwrap_or_default(),
            "messages": messages,
            "response_format": { "type": "json_object" },
        });
        if let Some(temperature) = self.config.temperature {
            body["temperature"] = json!(temperature);
        }
        body
    }
}

impl ChatTransport for OpenAiCompatibleClient {
    fn complete_json(&self, user_message: &str) -> Result<String, ProviderError> {
        if !self.config.is_configured() {
            return Err(ProviderError::Unconfigured {
                reason: "provider and model must both be set".to_string(),
            });
        }
        let endpoint = self.endpoint()?;
        debug!(%endpoint, bytes = user_message.len(), "sending planner request");

        let mut req = self
            .http
            .post(endpoint)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.api_key.clone().unwrap_or_default()),
            )
            .json(&self.request_body(user_message));
        if self.config.provider.as_deref() == Some("openrouter") {
            req = req.header("X-Title", "planscript planner");
        }

        let response = req.send().map_err(|err| ProviderError::Request(err.to_string()))?;
        let status = response.status();
        let body_text = response
            .text()
            .map_err(|err| ProviderError::Request(format!("response read failed: {}", err)))?;
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: body_text,
            });
        }

        extract_content(&body_text)
    }
}

/// Pulls the first choice's assistant content out of a chat response body.
pub fn extract_content(body_text: &str) -> Result<String, ProviderError> {
    let parsed: OpenAiCompatibleChatResponse =
        serde_json::from_str(body_text).map_err(|err| ProviderError::InvalidResponse(err.to_string()))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ProviderError::InvalidResponse("missing assistant content".to_string()))
}

#[derive(Debug, Deserialize)]
struct OpenAiCompatibleChatResponse {
    choices: Vec<OpenAiCompatibleChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiCompatibleChoice {
    message: OpenAiCompatibleMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiCompatibleMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(provider: Option<&str>, base_url: Option<&str>) -> OpenAiCompatibleClient {
        OpenAiCompatibleClient::new(PlannerConfig {
            provider: provider.map(str::to_string),
            model: Some("m".into()),
            api_base_url: base_url.map(str::to_string),
            system_prompt: Some("be terse".into()),
            ..PlannerConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn endpoint_per_provider() {
        assert_eq!(
            client(Some("openrouter"), None).endpoint().unwrap(),
            "https://openrouter.ai/api/v1/chat/completions"
        );
        assert_eq!(
            client(Some("openai_compatible"), Some("http://localhost:1234/v1/")).endpoint().unwrap(),
            "http://localhost:1234/v1/chat/completions"
        );
        assert!(matches!(
            client(Some("openai_compatible"), None).endpoint(),
            Err(ProviderError::Unconfigured { .. })
        ));
        assert_eq!(
            client(Some("acme"), None).endpoint(),
            Err(ProviderError::UnsupportedProvider { provider: "acme".into() })
        );
    }

    #[test]
    fn unconfigured_client_fails_without_network() {
        let err = client(None, None).complete_json("hi").unwrap_err();
        assert!(!err.is_retryable());
    }

    #[test]
    fn body_requests_json_mode() {
        let body = client(Some("openrouter"), None).request_body("plan it");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "plan it");
        assert_eq!(body["temperature"], 0.0);
    }

    #[test]
    fn extracts_trimmed_content() {
        let raw = r#"{"choices":[{"message":{"content":"  {\"a\":1}\n"}}]}"#;
        assert_eq!(extract_content(raw).unwrap(), r#"{"a":1}"#);
        assert!(matches!(
            extract_content(r#"{"choices":[]}"#),
            Err(ProviderError::InvalidResponse(_))
        ));
    }
}
