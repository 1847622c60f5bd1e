use std::env;

use tracing::warn;

use chorus_core::providers::anthropic::{DEFAULT_ANTHROPIC_BASE_URL, DEFAULT_ANTHROPIC_MODEL};
use chorus_core::providers::google::{DEFAULT_GEMINI_MODEL, DEFAULT_GOOGLE_BASE_URL};
use chorus_core::providers::openai::{DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL};
use chorus_core::providers::openrouter::{DEFAULT_OPENROUTER_BASE_URL, DEFAULT_OPENROUTER_MODEL};

/// Everything the process needs, read from the environment once at startup
/// and passed into the adapters by reference — no globals below this point.
#[derive(Debug, Clone)]
pub struct ChorusConfig {
    pub providers: ProvidersConfig,
    pub gateway: GatewayConfig,
}

#[derive(Debug, Clone)]
pub struct ProvidersConfig {
    pub openai: ProviderConfig,
    pub anthropic: ProviderConfig,
    pub google: ProviderConfig,
    pub openrouter: ProviderConfig,
}

/// One provider's slice of the environment.
///
/// An absent credential is the sole switch between "configured" and
/// "unconfigured" — the adapter answers with its fixed fallback text instead
/// of calling out.
#[derive(Clone)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &self.api_key.as_deref().map(mask_secret))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bind: String,
    pub port: u16,
}

fn default_gateway_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    8080
}

impl ChorusConfig {
    pub fn from_env() -> Self {
        Self {
            providers: ProvidersConfig {
                openai: ProviderConfig {
                    api_key: env_key("OPENAI_API_KEY"),
                    model: env_or("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
                    base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
                },
                anthropic: ProviderConfig {
                    api_key: env_key("ANTHROPIC_API_KEY"),
                    model: env_or("ANTHROPIC_MODEL", DEFAULT_ANTHROPIC_MODEL),
                    base_url: DEFAULT_ANTHROPIC_BASE_URL.to_string(),
                },
                google: ProviderConfig {
                    api_key: env_key("GOOGLE_API_KEY"),
                    model: env_or("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
                    base_url: DEFAULT_GOOGLE_BASE_URL.to_string(),
                },
                openrouter: ProviderConfig {
                    api_key: env_key("OPENROUTER_API_KEY"),
                    model: env_or("OPENROUTER_MODEL", DEFAULT_OPENROUTER_MODEL),
                    base_url: DEFAULT_OPENROUTER_BASE_URL.to_string(),
                },
            },
            gateway: GatewayConfig {
                bind: env_or("CHORUS_BIND", &default_gateway_bind()),
                port: env::var("CHORUS_PORT")
                    .ok()
                    .and_then(|p| match p.parse() {
                        Ok(port) => Some(port),
                        Err(_) => {
                            warn!("Ignoring invalid CHORUS_PORT value: {}", p);
                            None
                        }
                    })
                    .unwrap_or_else(default_gateway_port),
            },
        }
    }
}

/// Read a credential; empty counts as unset
fn env_key(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Mask a secret string for safe display in Debug output / logs.
/// Shows first 3 and last 4 chars for keys longer than 7 chars, otherwise "***".
pub fn mask_secret(s: &str) -> String {
    if s.is_empty() {
        return "(empty)".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() > 7 {
        let prefix: String = chars[..3].iter().collect();
        let suffix: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", prefix, suffix)
    } else {
        "***".to_string()
    }
}
