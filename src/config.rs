use std::str::FromStr;
use std::time::Duration;

use clap::Parser;

use crate::error::ConfigError;

// CLI argument structure, every flag can also come from the environment (.env included)
#[derive(Parser, Debug, Clone)]
#[command(name = "credit-gateway")]
#[command(about = "API-key and credit gated gateway for Ollama chat")]
pub struct Args {
    // Address to bind
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    // Ollama server url
    #[arg(short, long, env = "OLLAMA_URL", default_value = "http://localhost:11434")]
    pub ollama_url: String,

    // Model used for every chat call
    #[arg(short, long, env = "OLLAMA_MODEL", default_value = "mistral")]
    pub model: String,

    // Single key granted `initial_credits`
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    // Credits given to --api-key
    #[arg(long, default_value_t = 5)]
    pub initial_credits: u64,

    // Extra grants, KEY=CREDITS (repeatable or comma-separated)
    #[arg(
        long = "key",
        value_name = "KEY=CREDITS",
        env = "API_KEYS",
        value_delimiter = ',',
        hide_env_values = true
    )]
    pub keys: Vec<KeyGrant>,

    // Backend request timeout in seconds
    #[arg(long, default_value_t = 120)]
    pub request_timeout: u64,
}

/// One `{key: initial_credit}` pair of the ledger configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyGrant {
    pub key: String,
    pub credits: u64,
}

impl FromStr for KeyGrant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, credits) = s
            .split_once('=')
            .ok_or_else(|| format!("expected KEY=CREDITS, got '{}'", s))?;
        let credits = credits
            .trim()
            .parse::<u64>()
            .map_err(|e| format!("invalid credit count '{}': {}", credits.trim(), e))?;
        Ok(KeyGrant {
            key: key.trim().to_string(),
            credits,
        })
    }
}

impl Args {
    /// Ledger grants in configuration order; `--api-key` comes first so an
    /// explicit `--key` for the same value overrides it.
    pub fn grants(&self) -> Result<Vec<KeyGrant>, ConfigError> {
        let mut grants = Vec::with_capacity(self.keys.len() + 1);

        if let Some(key) = &self.api_key {
            grants.push(KeyGrant {
                key: key.trim().to_string(),
                credits: self.initial_credits,
            });
        }
        grants.extend(self.keys.iter().cloned());

        if grants.is_empty() {
            return Err(ConfigError::NoKeys);
        }
        if grants.iter().any(|g| g.key.is_empty()) {
            return Err(ConfigError::EmptyKey);
        }
        Ok(grants)
    }

    // add http:// if not present
    pub fn backend_url(&self) -> String {
        let url = self.ollama_url.trim().trim_end_matches('/');
        if url.starts_with("http") {
            url.to_string()
        } else {
            format!("http://{}", url)
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
