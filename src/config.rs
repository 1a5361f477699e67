use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub recognition: RecognitionSettings,
    pub summary: SummarySettings,
    #[serde(default)]
    pub session: SessionSettings,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

/// Settings for the streaming recognition backend.
#[derive(Debug, Clone, Deserialize)]
pub struct RecognitionSettings {
    /// NATS server URL the recognizer is reached through
    pub nats_url: String,

    /// Optional NATS credentials file for authenticated clusters
    #[serde(default)]
    pub credentials_file: Option<String>,

    /// Primary language code (e.g. "en-US")
    #[serde(default = "default_language")]
    pub language: String,

    /// Alternate language codes the recognizer may fall back to
    #[serde(default = "default_alternate_languages")]
    pub alternate_languages: Vec<String>,

    /// Audio sample rate in Hz (clients send 16kHz LINEAR16 PCM)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

/// Settings for the summarization backend.
#[derive(Debug, Clone, Deserialize)]
pub struct SummarySettings {
    /// Completion model used for summary generation
    #[serde(default = "default_summary_model")]
    pub model: String,

    /// API key, read from the GEMINI_API_KEY environment variable at startup
    #[serde(skip)]
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    /// Seconds without an inbound frame before the session drains (0 disables)
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout_secs(),
        }
    }
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_alternate_languages() -> Vec<String> {
    vec!["kn-IN".to_string(), "hi-IN".to_string()]
}

fn default_sample_rate() -> u32 {
    16000
}

fn default_summary_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_idle_timeout_secs() -> u64 {
    300
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        let mut cfg: Config = settings.try_deserialize()?;

        // The summarization key is a startup requirement, never a per-session
        // concern. A missing key means the process refuses to come up.
        cfg.summary.api_key = std::env::var("GEMINI_API_KEY")
            .context("GEMINI_API_KEY environment variable must be set")?;

        Ok(cfg)
    }
}
