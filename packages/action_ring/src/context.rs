//! Host application contexts the ring can be pointed at.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum AppContext {
    #[default]
    Vscode,
    Cursor,
    Figma,
    Docs,
    Browser,
}

impl AppContext {
    pub const ALL: [AppContext; 5] = [
        AppContext::Vscode,
        AppContext::Cursor,
        AppContext::Figma,
        AppContext::Docs,
        AppContext::Browser,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppContext::Vscode => "vscode",
            AppContext::Cursor => "cursor",
            AppContext::Figma => "figma",
            AppContext::Docs => "docs",
            AppContext::Browser => "browser",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AppContext::Vscode => "VS Code",
            AppContext::Cursor => "Cursor IDE",
            AppContext::Figma => "Figma",
            AppContext::Docs => "Google Docs",
            AppContext::Browser => "Browser",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AppContext::Vscode => "Code editor",
            AppContext::Cursor => "AI-powered IDE",
            AppContext::Figma => "Design tool",
            AppContext::Docs => "Document editor",
            AppContext::Browser => "Web browsing",
        }
    }

    /// Stand-in for what the user is looking at in this application.
    /// Fed into the prompt since the demo has no real editor to read from.
    pub fn example_content(&self) -> &'static str {
        match self {
            AppContext::Vscode => {
                "You are looking at a React component with TypeScript. The code contains state management, API calls, and form validation."
            }
            AppContext::Cursor => {
                "You are reviewing a pull request with changes to the authentication system. The code includes new middleware and route handlers."
            }
            AppContext::Figma => {
                "You are examining a mobile app design with a card-based layout, custom navigation, and dark mode support."
            }
            AppContext::Docs => {
                "You are editing a technical documentation page about API integration. The document contains code examples and usage instructions."
            }
            AppContext::Browser => {
                "You are reading an article about modern web development practices, focusing on performance optimization and accessibility."
            }
        }
    }

    pub fn info(&self) -> ContextInfo {
        ContextInfo {
            id: *self,
            name: self.name(),
            description: self.description(),
        }
    }
}

impl fmt::Display for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown context: {0}")]
pub struct ParseContextError(pub String);

impl FromStr for AppContext {
    type Err = ParseContextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AppContext::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ParseContextError(s.to_string()))
    }
}

/// Context picker entry
#[derive(Debug, Clone, Serialize)]
pub struct ContextInfo {
    pub id: AppContext,
    pub name: &'static str,
    pub description: &'static str,
}
