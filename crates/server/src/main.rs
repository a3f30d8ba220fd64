//! nexus-server: HTTP boundary for the text-generation service.
//!
//! Loads the model and tokenizer artifacts, builds the engine, and serves
//! the API until SIGINT/SIGTERM. Any construction failure — missing
//! artifacts, missing special tokens, invalid generation config — aborts
//! startup rather than serving degraded.

mod api;
mod config;
mod logging;
mod shutdown;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use nexus_core::engine::{Engine, GenerateOptions};
use nexus_core::onnx::OnnxForwardPass;
use nexus_core::sampling::SamplingParams;
use nexus_core::tokenizer::TokenizerWrapper;

use api::AppState;
use config::ServerConfig;

#[derive(Debug, Parser)]
#[command(name = "nexus-server", about = "Text-generation HTTP service")]
struct Cli {
    /// Path to the ONNX model artifact.
    #[arg(long)]
    model: Option<PathBuf>,

    /// Path to the tokenizer artifact.
    #[arg(long)]
    tokenizer: Option<PathBuf>,

    /// Host to bind to.
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on.
    #[arg(long)]
    port: Option<u16>,

    /// Maximum context window in tokens.
    #[arg(long)]
    max_context: Option<usize>,

    /// Sampling temperature.
    #[arg(long)]
    temperature: Option<f32>,

    /// Top-k truncation width.
    #[arg(long)]
    top_k: Option<usize>,

    /// Explicit config file path. Defaults to the per-user config dir.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    /// CLI arguments as a config layer, merged over the file config.
    fn as_config(&self) -> ServerConfig {
        ServerConfig {
            model: self.model.clone(),
            tokenizer: self.tokenizer.clone(),
            host: self.host.clone(),
            port: self.port,
            max_context: self.max_context,
            temperature: self.temperature,
            top_k: self.top_k,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    let mut config = match &cli.config {
        // An explicitly named config file must load.
        Some(path) => ServerConfig::load_from(path)?,
        None => ServerConfig::load(),
    };
    config.merge(&cli.as_config());

    let generate = GenerateOptions {
        max_window: config.max_context(),
        sampling: SamplingParams {
            temperature: config.temperature(),
            top_k: config.top_k(),
        },
        seed: None,
    };
    generate
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid generation config: {e}"))?;

    let tokenizer_path = config.tokenizer_path();
    let tokenizer = Arc::new(TokenizerWrapper::from_file(&tokenizer_path)?);
    tracing::info!(path = %tokenizer_path.display(), "tokenizer loaded");

    let model_path = config.model_path();
    let forward = Arc::new(OnnxForwardPass::load(&model_path)?);
    tracing::info!(path = %model_path.display(), "model loaded");

    // Resolves the framing special tokens; a vocabulary without them
    // refuses to start serving.
    let engine = Arc::new(Engine::new(forward, tokenizer)?);

    let app = api::create_router(AppState::new(engine, generate));
    let addr = format!("{}:{}", config.host(), config.port());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("serving on http://{addr}/api");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_arguments_become_a_config_layer() {
        let cli = Cli::parse_from([
            "nexus-server",
            "--port",
            "9000",
            "--temperature",
            "0.8",
            "--model",
            "alt/model.onnx",
        ]);
        let layer = cli.as_config();
        assert_eq!(layer.port, Some(9000));
        assert_eq!(layer.temperature, Some(0.8));
        assert_eq!(layer.model, Some(PathBuf::from("alt/model.onnx")));
        assert!(layer.host.is_none());
    }
}
