use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "recirc", about = "Web frontend for the office-supply reuse board")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Base URL of the backend REST API
    #[arg(long)]
    pub api_url: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub api: ApiConfig,
    pub gate: GateConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Production mode: marks the gate cookie Secure and quiets default logging.
    pub production: bool,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct GateConfig {
    pub cookie_name: String,
    pub passcode: String,
    /// Lifetime of the gate cookie in seconds. Zero means a session-only
    /// cookie that dies with the browser.
    pub cookie_max_age_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            production: false,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
        }
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            cookie_name: "company-auth".to_string(),
            passcode: "test123456".to_string(),
            cookie_max_age_secs: Some(3600),
        }
    }
}

impl Config {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| Self::default_dir().join("config.toml"));

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };

        // Environment overrides
        if let Ok(url) = std::env::var("RECIRC_API_URL") {
            config.api.base_url = url;
        }
        if let Ok(passcode) = std::env::var("COMPANY_PASSWORD") {
            config.gate.passcode = passcode;
        }
        if std::env::var("RECIRC_PRODUCTION").is_ok_and(|v| v == "1" || v == "true") {
            config.server.production = true;
        }

        // CLI overrides beat both file and environment
        if let Some(ref host) = cli.host {
            config.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            config.server.port = port;
        }
        if let Some(ref api_url) = cli.api_url {
            config.api.base_url = api_url.clone();
        }

        Ok(config)
    }

    pub fn default_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".recirc")
    }
}
