use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use consult_scribe::{AppState, Config, GeminiSummarizer, NatsSpeechBackend, SpeechBackend, Summarizer};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "consult-scribe")]
#[command(about = "Real-time clinical consultation transcription relay")]
struct Args {
    /// Path to the configuration file (without extension)
    #[arg(long, default_value = "config/consult-scribe")]
    config: String,

    /// Override the configured bind address
    #[arg(long)]
    bind: Option<String>,

    /// Override the configured port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("{} v{} starting", cfg.service.name, env!("CARGO_PKG_VERSION"));

    let backend: Arc<dyn SpeechBackend> = Arc::new(
        NatsSpeechBackend::connect(&cfg.recognition)
            .await
            .context("Failed to connect to the recognition backend")?,
    );
    let summarizer: Arc<dyn Summarizer> = Arc::new(GeminiSummarizer::new(&cfg.summary));

    let state = AppState::new(
        backend,
        summarizer,
        cfg.recognition.clone(),
        cfg.session.clone(),
    );
    let app = consult_scribe::create_router(state);

    let bind = args.bind.unwrap_or(cfg.service.http.bind);
    let port = args.port.unwrap_or(cfg.service.http.port);
    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .context("Invalid bind address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind HTTP listener")?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await.context("HTTP server error")?;

    Ok(())
}
