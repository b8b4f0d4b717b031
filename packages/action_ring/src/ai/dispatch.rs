use std::collections::HashMap;
use std::time::Duration;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::error::AiError;
use super::provider::{ProviderDescriptor, ProviderKind};
use crate::config::ProvidersFileConfig;

/// Body of `POST /api/ai/{provider}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiRequest {
    pub prompt: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub gesture: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiReply {
    pub response: String,
    pub model: String,
}

/// Sends prompts to whichever provider is asked for. One instance is shared
/// by the HTTP endpoint and every ring session.
#[derive(Debug, Clone)]
pub struct AiDispatcher {
    client: reqwest::Client,
    providers: HashMap<ProviderKind, ProviderDescriptor>,
}

impl AiDispatcher {
    pub fn new(config: &ProvidersFileConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let providers = HashMap::from([
            (
                ProviderKind::OpenAi,
                ProviderDescriptor::new(ProviderKind::OpenAi, &config.openai),
            ),
            (
                ProviderKind::Claude,
                ProviderDescriptor::new(ProviderKind::Claude, &config.claude),
            ),
        ]);
        Ok(Self { client, providers })
    }

    pub fn descriptor(&self, kind: ProviderKind) -> Option<&ProviderDescriptor> {
        self.providers.get(&kind)
    }

    pub fn is_configured(&self, kind: ProviderKind) -> bool {
        self.descriptor(kind)
            .is_some_and(|d| d.api_key.is_some())
    }

    /// Dispatch by provider name, as it appears in the URL.
    pub async fn dispatch(&self, provider: &str, request: &AiRequest) -> Result<AiReply, AiError> {
        let kind: ProviderKind = provider
            .parse()
            .map_err(|_| AiError::UnknownProvider(provider.to_string()))?;
        self.dispatch_to(kind, request).await
    }

    pub async fn dispatch_to(
        &self,
        kind: ProviderKind,
        request: &AiRequest,
    ) -> Result<AiReply, AiError> {
        let descriptor = self
            .descriptor(kind)
            .ok_or_else(|| AiError::UnknownProvider(kind.to_string()))?;
        let api_key = descriptor
            .api_key
            .as_deref()
            .ok_or(AiError::NotConfigured(kind))?;

        let system = kind.system_message(&request.context, &request.gesture);
        let body = descriptor.request_body(&system, &request.prompt);

        debug!(
            provider = %kind,
            context = %request.context,
            gesture = %request.gesture,
            "Dispatching AI request"
        );

        let resp = descriptor
            .authorize(self.client.post(&descriptor.endpoint), api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let bytes = resp.bytes().await?;
            let body = serde_json::from_slice::<Value>(&bytes)
                .unwrap_or_else(|_| Value::from(String::from_utf8_lossy(&bytes).into_owned()));
            warn!(provider = %kind, status = %status, "AI provider returned an error");
            return Err(AiError::Upstream {
                status: StatusCode::from_u16(status.as_u16())
                    .unwrap_or(StatusCode::BAD_GATEWAY),
                body,
            });
        }

        let body: Value = resp.json().await?;
        Ok(AiReply {
            response: descriptor.extract_text(&body),
            model: kind.model_label().to_string(),
        })
    }
}
