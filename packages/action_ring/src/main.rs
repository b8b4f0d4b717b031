use anyhow::{Context, Result};
use axum::{
    Router,
    routing::{get, post},
};
use clap::{Parser, Subcommand};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tower_http::cors::CorsLayer;
use tower_http::trace::MakeSpan;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;
use uuid::Uuid;

mod ai;
mod cli;
mod config;
mod context;
mod handlers;
mod intent;
mod metrics;
mod relay;
mod ring;
#[cfg(test)]
mod test_helpers;

use crate::ai::{AiDispatcher, ProviderKind};
use crate::config::{ActionRingConfig, AppConfig, FileConfig, load_config};
use crate::context::AppContext;
use crate::metrics::ServerMetrics;
use crate::relay::RelayClient;

/// Custom span maker that adds a unique request ID to each incoming request
#[derive(Clone)]
struct RequestIdMakeSpan;

impl<B> MakeSpan<B> for RequestIdMakeSpan {
    fn make_span(&mut self, request: &axum::http::Request<B>) -> tracing::Span {
        let request_id = Uuid::new_v4().to_string();
        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    }
}

#[derive(Parser)]
#[command(name = "action-ring")]
#[command(about = "Gesture-driven AI actions for a simulated input ring")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Custom data directory (defaults to ~/.action-ring)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the server in the foreground (default)
    Serve(ServeArgs),

    /// Print the context/gesture intent table
    Intents(IntentsArgs),

    /// Show the prompt a gesture produces, optionally sending it
    Prompt(PromptArgs),

    /// Replay a pointer script through the gesture classifier
    Simulate(SimulateArgs),
}

#[derive(Parser, Default)]
struct ServeArgs {
    /// Port for the web server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Host to bind to (overrides config)
    #[arg(short = 'b', long)]
    host: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Parser)]
struct IntentsArgs {
    /// Only show one context
    #[arg(short, long, value_enum)]
    context: Option<AppContext>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct PromptArgs {
    /// Application context
    #[arg(value_enum)]
    context: AppContext,

    /// Gesture (idle, rotate, press-drag, long-press, double-tap)
    gesture: String,

    /// Provider to use (defaults to dispatch.default_provider)
    #[arg(short, long)]
    provider: Option<String>,

    /// Send the prompt to the provider and print the reply
    #[arg(long)]
    send: bool,
}

#[derive(Parser)]
struct SimulateArgs {
    /// Script file, one `<t_ms> <event> [args]` per line
    script: PathBuf,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub config: Arc<AppConfig>,
    /// Provider table and shared HTTP client for AI dispatch
    pub dispatcher: Arc<AiDispatcher>,
    pub relay: Arc<RelayClient>,
    /// Server metrics for observability
    pub metrics: Arc<ServerMetrics>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let dirs = ActionRingConfig::new(cli.data_dir.clone())?;
    let file_config: FileConfig = load_config(&dirs.data_dir)
        .extract()
        .with_context(|| format!("Failed to load {}", dirs.config_toml_path().display()))?;

    match cli.command {
        None => run_server(ServeArgs::default(), file_config).await,
        Some(Commands::Serve(args)) => run_server(args, file_config).await,
        Some(Commands::Intents(args)) => cli::intents_command(args.context, args.json),
        Some(Commands::Prompt(args)) => {
            let config = AppConfig::from_file(&file_config)?;
            let provider: ProviderKind = args
                .provider
                .as_deref()
                .unwrap_or(&config.dispatch.default_provider)
                .parse()?;
            cli::prompt_command(&config, args.context, &args.gesture, provider, args.send).await
        }
        Some(Commands::Simulate(args)) => {
            let gesture = config::gesture_config(&file_config.gesture);
            cli::simulate_command(&args.script, gesture, args.json)
        }
    }
}

pub(crate) fn build_router(state: AppState) -> Router {
    Router::new()
        // Intent catalogue
        .route("/api/contexts", get(handlers::list_contexts))
        .route("/api/intents", get(handlers::list_intents))
        .route(
            "/api/intents/{context}/{gesture}",
            get(handlers::get_intent),
        )
        // AI dispatch
        .route("/api/ai/{provider}", post(handlers::ai_dispatch_handler))
        // Generic relay
        .route(
            "/api/proxy",
            get(handlers::relay_handler)
                .post(handlers::relay_handler)
                .put(handlers::relay_handler)
                .patch(handlers::relay_handler)
                .delete(handlers::relay_handler),
        )
        // Simulated ring
        .route("/api/ring/ws", get(handlers::ring_websocket_handler))
        // Health endpoints
        .route("/health", get(handlers::health_handler))
        .route("/health/live", get(handlers::health_live_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .layer(TraceLayer::new_for_http().make_span_with(RequestIdMakeSpan))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn run_server(args: ServeArgs, mut file_config: FileConfig) -> Result<()> {
    // Setup logging
    let default_directive = if args.debug {
        "action_ring=debug,ring_gesture=debug,tower_http=debug,info"
    } else {
        "action_ring=info,ring_gesture=info,tower_http=info,warn"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(env_filter)
        .init();

    info!("Starting Action Ring");

    if let Some(host) = args.host {
        file_config.server.host = host;
    }
    if let Some(port) = args.port {
        file_config.server.port = port;
    }
    let config = AppConfig::from_file(&file_config)?;

    let dispatcher = AiDispatcher::new(&config.providers, config.dispatch.request_timeout)
        .context("Failed to build AI HTTP client")?;
    for kind in ProviderKind::ALL {
        if dispatcher.is_configured(kind) {
            info!("Provider {} configured", kind);
        } else {
            warn!("Provider {} has no API key, requests to it will fail", kind);
        }
    }

    let relay = RelayClient::new(&config.relay)?;
    if config.relay.allowed_origins.is_empty() {
        warn!("Relay origin allowlist is empty, any origin will be forwarded");
    }

    info!(
        "Gesture config: long_press={}ms, double_tap={}ms, idle_reset={}ms",
        config.gesture.long_press.as_millis(),
        config.gesture.double_tap_window.as_millis(),
        config.gesture.idle_reset.as_millis()
    );

    let addr = config.listen_addr;
    let app_state = AppState {
        config: Arc::new(config),
        dispatcher: Arc::new(dispatcher),
        relay: Arc::new(relay),
        metrics: Arc::new(ServerMetrics::new()),
    };

    let app = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    let actual_addr: SocketAddr = listener.local_addr()?;

    info!("Action Ring listening on http://{}", actual_addr);
    info!("");
    info!("API endpoints:");
    info!("  GET    /api/contexts                     - List application contexts");
    info!("  GET    /api/intents                      - Full intent table");
    info!("  GET    /api/intents/:context/:gesture    - One intent with its prompt");
    info!("  POST   /api/ai/:provider                 - Dispatch a prompt (openai, claude)");
    info!("  ANY    /api/proxy                        - Relay a request to a third-party API");
    info!("  GET    /api/ring/ws                      - WebSocket for a simulated ring");

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received shutdown signal, shutting down...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}
