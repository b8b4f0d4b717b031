//! AI Provider Descriptors
//!
//! The two supported providers differ only in data: endpoint, how the key
//! is presented, the shape of the request and response bodies, and the
//! persona used for the system instruction. [`ProviderDescriptor`] carries
//! those differences so one dispatcher can talk to both.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::config::ProviderFileConfig;

pub const MAX_OUTPUT_TOKENS: u32 = 300;
pub const NO_RESPONSE: &str = "No response from AI";
const FALLBACK_PERSONA: &str = "You are a helpful AI assistant.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[serde(rename = "openai")]
    OpenAi,
    Claude,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::OpenAi, ProviderKind::Claude];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Claude => "claude",
        }
    }

    /// Label reported back to callers as `model`
    pub fn model_label(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai-gpt4",
            ProviderKind::Claude => "claude-3.5-haiku",
        }
    }

    fn default_endpoint(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "https://api.openai.com/v1/chat/completions",
            ProviderKind::Claude => "https://api.anthropic.com/v1/messages",
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "gpt-4",
            ProviderKind::Claude => "claude-3-5-haiku-20241022",
        }
    }

    fn personas(&self) -> &'static HashMap<&'static str, &'static str> {
        match self {
            ProviderKind::OpenAi => &*OPENAI_PERSONAS,
            ProviderKind::Claude => &*CLAUDE_PERSONAS,
        }
    }

    fn gesture_hints(&self) -> &'static HashMap<&'static str, &'static str> {
        match self {
            ProviderKind::OpenAi => &*OPENAI_HINTS,
            ProviderKind::Claude => &*CLAUDE_HINTS,
        }
    }

    /// System instruction for a context and gesture. Both arrive as free-form
    /// strings from callers, so unknown values fall back rather than fail.
    pub fn system_message(&self, context: &str, gesture: &str) -> String {
        let persona = self
            .personas()
            .get(context)
            .copied()
            .unwrap_or(FALLBACK_PERSONA);
        let hint = self.gesture_hints().get(gesture).copied().unwrap_or("");
        format!("{persona} {hint}")
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown provider: {0}")]
pub struct ParseProviderError(pub String);

impl FromStr for ProviderKind {
    type Err = ParseProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProviderKind::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ParseProviderError(s.to_string()))
    }
}

static OPENAI_PERSONAS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        (
            "vscode",
            "You are an expert coding assistant helping developers in VS Code. Provide clear, concise, and actionable insights.",
        ),
        (
            "cursor",
            "You are an AI pair programmer working in Cursor IDE. Focus on code quality, best practices, and thoughtful suggestions.",
        ),
        (
            "figma",
            "You are a design assistant helping with Figma projects. Provide UX feedback and design recommendations.",
        ),
        (
            "docs",
            "You are a writing assistant for document editing. Help improve clarity, grammar, and structure.",
        ),
        (
            "browser",
            "You are a research assistant helping users browse the web. Summarize content and provide insights.",
        ),
    ])
});

static OPENAI_HINTS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("rotate", "Summarize or provide an overview."),
        ("press-drag", "Explain in simple terms."),
        ("long-press", "Suggest next actions or improvements."),
        ("double-tap", "Fix or optimize."),
    ])
});

static CLAUDE_PERSONAS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        (
            "vscode",
            "You are an expert coding assistant with deep knowledge of software architecture. Provide thoughtful, detailed insights.",
        ),
        (
            "cursor",
            "You are an elite code reviewer and mentor. Focus on code quality, patterns, and best practices with clear explanations.",
        ),
        (
            "figma",
            "You are a senior UX designer. Provide detailed feedback on design systems, accessibility, and user experience.",
        ),
        (
            "docs",
            "You are a professional editor with expertise in technical writing. Improve clarity, structure, and flow.",
        ),
        (
            "browser",
            "You are a research analyst. Provide comprehensive summaries and critical analysis of web content.",
        ),
    ])
});

static CLAUDE_HINTS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("rotate", "Provide a comprehensive overview or summary."),
        (
            "press-drag",
            "Break this down with detailed explanations and examples.",
        ),
        ("long-press", "Analyze and suggest strategic next steps."),
        ("double-tap", "Identify issues and provide solutions."),
    ])
});

/// How the API key is attached to the outbound request
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// `x-api-key: <key>` plus a pinned API version header
    ApiKeyHeader { version: &'static str },
}

/// Request/response body shape
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WireFormat {
    /// System message first in `messages`, text at `choices[0].message.content`
    ChatCompletions { temperature: f64 },
    /// Top-level `system`, text at `content[0].text`
    Messages,
}

#[derive(Clone, Debug)]
pub struct ProviderDescriptor {
    pub kind: ProviderKind,
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub auth: AuthScheme,
    pub wire: WireFormat,
    pub max_tokens: u32,
}

impl ProviderDescriptor {
    pub fn new(kind: ProviderKind, fc: &ProviderFileConfig) -> Self {
        let (auth, wire) = match kind {
            ProviderKind::OpenAi => (
                AuthScheme::Bearer,
                WireFormat::ChatCompletions { temperature: 0.7 },
            ),
            ProviderKind::Claude => (
                AuthScheme::ApiKeyHeader {
                    version: "2023-06-01",
                },
                WireFormat::Messages,
            ),
        };

        Self {
            kind,
            endpoint: fc
                .endpoint
                .clone()
                .unwrap_or_else(|| kind.default_endpoint().to_string()),
            model: fc
                .model
                .clone()
                .unwrap_or_else(|| kind.default_model().to_string()),
            api_key: fc.api_key.clone().filter(|k| !k.is_empty()),
            auth,
            wire,
            max_tokens: MAX_OUTPUT_TOKENS,
        }
    }

    pub fn request_body(&self, system: &str, prompt: &str) -> Value {
        match self.wire {
            WireFormat::ChatCompletions { temperature } => json!({
                "model": self.model,
                "messages": [
                    { "role": "system", "content": system },
                    { "role": "user", "content": prompt },
                ],
                "max_tokens": self.max_tokens,
                "temperature": temperature,
            }),
            WireFormat::Messages => json!({
                "model": self.model,
                "max_tokens": self.max_tokens,
                "system": system,
                "messages": [
                    { "role": "user", "content": prompt },
                ],
            }),
        }
    }

    pub fn authorize(
        &self,
        request: reqwest::RequestBuilder,
        api_key: &str,
    ) -> reqwest::RequestBuilder {
        match &self.auth {
            AuthScheme::Bearer => request.bearer_auth(api_key),
            AuthScheme::ApiKeyHeader { version } => request
                .header("x-api-key", api_key)
                .header("anthropic-version", *version),
        }
    }

    /// Pull the generated text out of a success body. Missing or empty text
    /// is reported as [`NO_RESPONSE`].
    pub fn extract_text(&self, body: &Value) -> String {
        let text = match self.wire {
            WireFormat::ChatCompletions { .. } => body
                .pointer("/choices/0/message/content")
                .and_then(Value::as_str),
            WireFormat::Messages => body.pointer("/content/0/text").and_then(Value::as_str),
        };
        match text {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => NO_RESPONSE.to_string(),
        }
    }
}
