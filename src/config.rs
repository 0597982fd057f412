use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which decoder feeds the session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DecoderKind {
    /// Continuous keyboard-wedge input: a USB barcode scanner (or a pipe)
    /// types payloads followed by Enter.
    Keyboard,
    /// One scan per explicit prompt.
    Prompt,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the POS backend.
    pub base_url: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Window during which a repeated identical payload is suppressed.
    pub debounce_window_ms: u64,

    /// Decoder strategy for this session.
    pub decoder: DecoderKind,

    /// Currency symbol used when rendering prices.
    pub currency: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            request_timeout_secs: 10,
            debounce_window_ms: 2000,
            decoder: DecoderKind::Keyboard,
            currency: "₹".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `SMARTCART_*` environment variables, falling
    /// back to defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            base_url: std::env::var("SMARTCART_BASE_URL").unwrap_or(defaults.base_url),
            request_timeout_secs: env_u64("SMARTCART_REQUEST_TIMEOUT_SECS")
                .unwrap_or(defaults.request_timeout_secs),
            debounce_window_ms: env_u64("SMARTCART_DEBOUNCE_MS")
                .unwrap_or(defaults.debounce_window_ms),
            decoder: match std::env::var("SMARTCART_DECODER").as_deref() {
                Ok("prompt") => DecoderKind::Prompt,
                Ok("keyboard") => DecoderKind::Keyboard,
                _ => defaults.decoder,
            },
            currency: std::env::var("SMARTCART_CURRENCY").unwrap_or(defaults.currency),
        }
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_window_ms)
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok()?.parse().ok()
}
