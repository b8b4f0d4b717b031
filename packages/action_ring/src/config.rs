use anyhow::{Context, Result};
use ring_gesture::GestureConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

// =============================================================================
// Unified config (figment-deserialized from defaults / config.toml / env vars)
// =============================================================================
//
// Three equivalent ways to configure:
//
//   config.toml:     [gesture]
//                    long_press_ms = 600
//
//   env var:         ACTION_RING_GESTURE__LONG_PRESS_MS=600   (double underscore = nesting)
//
// Provider keys additionally honor the conventional OPENAI_API_KEY and
// ANTHROPIC_API_KEY variables; prefixed variables win over them.

/// Top-level tunable configuration, deserialized by figment.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerFileConfig,
    #[serde(default)]
    pub gesture: GestureFileConfig,
    #[serde(default)]
    pub dispatch: DispatchFileConfig,
    #[serde(default)]
    pub providers: ProvidersFileConfig,
    #[serde(default)]
    pub relay: RelayFileConfig,
}

/// Listener settings (lives under `[server]` in config.toml).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerFileConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerFileConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Gesture thresholds (lives under `[gesture]` in config.toml).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GestureFileConfig {
    #[serde(default = "default_movement_threshold")]
    pub movement_threshold: f64,
    #[serde(default = "default_long_press_ms")]
    pub long_press_ms: u64,
    #[serde(default = "default_double_tap_ms")]
    pub double_tap_ms: u64,
    #[serde(default = "default_idle_reset_ms")]
    pub idle_reset_ms: u64,
    #[serde(default = "default_rotation_per_unit")]
    pub rotation_per_unit: f64,
}

impl Default for GestureFileConfig {
    fn default() -> Self {
        Self {
            movement_threshold: default_movement_threshold(),
            long_press_ms: default_long_press_ms(),
            double_tap_ms: default_double_tap_ms(),
            idle_reset_ms: default_idle_reset_ms(),
            rotation_per_unit: default_rotation_per_unit(),
        }
    }
}

/// Ring session dispatch behavior (lives under `[dispatch]`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DispatchFileConfig {
    /// Send a request to the selected provider whenever the ring leaves idle
    #[serde(default = "default_auto_dispatch")]
    pub auto_dispatch: bool,
    /// Provider a new ring session starts with
    #[serde(default = "default_provider")]
    pub default_provider: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for DispatchFileConfig {
    fn default() -> Self {
        Self {
            auto_dispatch: default_auto_dispatch(),
            default_provider: default_provider(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProvidersFileConfig {
    #[serde(default)]
    pub openai: ProviderFileConfig,
    #[serde(default)]
    pub claude: ProviderFileConfig,
}

/// Per-provider overrides (`[providers.openai]`, `[providers.claude]`).
/// Unset endpoint/model fall back to the provider's built-in values.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProviderFileConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

/// Generic relay settings (lives under `[relay]`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RelayFileConfig {
    /// Origins the relay may forward to. Empty allows any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    /// Masked word -> secret value, substituted into envelopes before forwarding
    #[serde(default)]
    pub secrets: BTreeMap<String, String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for RelayFileConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            secrets: BTreeMap::new(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_movement_threshold() -> f64 {
    ring_gesture::DEFAULT_MOVEMENT_THRESHOLD
}
fn default_long_press_ms() -> u64 {
    ring_gesture::DEFAULT_LONG_PRESS.as_millis() as u64
}
fn default_double_tap_ms() -> u64 {
    ring_gesture::DEFAULT_DOUBLE_TAP_WINDOW.as_millis() as u64
}
fn default_idle_reset_ms() -> u64 {
    ring_gesture::DEFAULT_IDLE_RESET.as_millis() as u64
}
fn default_rotation_per_unit() -> f64 {
    ring_gesture::DEFAULT_ROTATION_PER_UNIT
}
fn default_auto_dispatch() -> bool {
    true
}
fn default_provider() -> String {
    "openai".to_string()
}
fn default_request_timeout_secs() -> u64 {
    30
}

/// Build a figment that layers: defaults → config.toml → OPENAI_API_KEY /
/// ANTHROPIC_API_KEY → ACTION_RING_* env vars.
///
/// Env vars use double-underscore for nesting into sections:
///   `ACTION_RING_SERVER__PORT=8080`  →  `server.port = 8080`
///   `ACTION_RING_PROVIDERS__CLAUDE__API_KEY=..`  →  `providers.claude.api_key = ..`
pub fn load_config(data_dir: &Path) -> figment::Figment {
    use figment::{
        Figment,
        providers::{Env, Format, Serialized, Toml},
    };

    let provider_keys = Env::raw()
        .only(&["OPENAI_API_KEY", "ANTHROPIC_API_KEY"])
        .map(|key| {
            if key.as_str().eq_ignore_ascii_case("OPENAI_API_KEY") {
                "providers.openai.api_key".into()
            } else {
                "providers.claude.api_key".into()
            }
        });

    Figment::from(Serialized::defaults(FileConfig::default()))
        .merge(Toml::file(data_dir.join("config.toml")))
        .merge(provider_keys)
        .merge(Env::prefixed("ACTION_RING_").split("__"))
}

// =============================================================================
// Runtime config (derived from FileConfig, used throughout the server)
// =============================================================================

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub gesture: GestureConfig,
    pub dispatch: DispatchConfig,
    pub providers: ProvidersFileConfig,
    pub relay: RelayConfig,
}

#[derive(Clone, Debug)]
pub struct DispatchConfig {
    pub auto_dispatch: bool,
    pub default_provider: String,
    pub request_timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct RelayConfig {
    pub allowed_origins: Vec<String>,
    pub secrets: BTreeMap<String, String>,
    pub request_timeout: Duration,
}

impl AppConfig {
    pub fn from_file(fc: &FileConfig) -> Result<Self> {
        let listen_addr: SocketAddr = format!("{}:{}", fc.server.host, fc.server.port)
            .parse()
            .with_context(|| {
                format!(
                    "Invalid listen address: {}:{}",
                    fc.server.host, fc.server.port
                )
            })?;

        Ok(Self {
            listen_addr,
            gesture: gesture_config(&fc.gesture),
            dispatch: DispatchConfig {
                auto_dispatch: fc.dispatch.auto_dispatch,
                default_provider: fc.dispatch.default_provider.clone(),
                request_timeout: Duration::from_secs(fc.dispatch.request_timeout_secs),
            },
            providers: fc.providers.clone(),
            relay: RelayConfig {
                allowed_origins: fc.relay.allowed_origins.clone(),
                secrets: fc.relay.secrets.clone(),
                request_timeout: Duration::from_secs(fc.relay.request_timeout_secs),
            },
        })
    }
}

pub fn gesture_config(fc: &GestureFileConfig) -> GestureConfig {
    GestureConfig {
        movement_threshold: fc.movement_threshold,
        long_press: Duration::from_millis(fc.long_press_ms),
        double_tap_window: Duration::from_millis(fc.double_tap_ms),
        idle_reset: Duration::from_millis(fc.idle_reset_ms),
        rotation_per_unit: fc.rotation_per_unit,
    }
}

// =============================================================================
// Directory layout config (derived from --data-dir, not tunable via figment)
// =============================================================================

#[derive(Clone, Debug)]
pub struct ActionRingConfig {
    pub data_dir: PathBuf,
}

impl ActionRingConfig {
    pub fn new(custom_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = match custom_dir {
            Some(dir) => dir,
            None => dirs::home_dir()
                .context("Could not find home directory")?
                .join(".action-ring"),
        };

        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;

        info!("Data directory: {}", data_dir.display());

        Ok(Self { data_dir })
    }

    pub fn config_toml_path(&self) -> PathBuf {
        self.data_dir.join("config.toml")
    }
}
