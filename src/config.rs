use anyhow::{Context, Result};
use std::env;

pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";
pub const DEFAULT_API_PREFIX: &str = "/api";

/// Configuration for the gemchat backend, loaded from the environment.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Gemini API key
    pub api_key: String,
    /// Base URL of the Gemini API (overridable for testing/self-hosted proxies)
    pub api_base_url: String,
    /// Model name sent to the upstream API
    pub model: String,
    /// Origins allowed by the CORS layer; "*" allows any
    pub allowed_origins: Vec<String>,
    /// Path prefix for the API routes
    pub api_prefix: String,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("GEMINI_API_KEY")
            .context("GEMINI_API_KEY environment variable not set")?;
        let api_base_url =
            env::var("GEMINI_API_URL").unwrap_or_else(|_| GEMINI_API_URL.to_string());
        let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .map(|v| parse_origins(&v))
            .unwrap_or_else(|_| default_origins());
        let api_prefix =
            env::var("API_PREFIX").unwrap_or_else(|_| DEFAULT_API_PREFIX.to_string());

        Ok(Self {
            api_key,
            api_base_url,
            model,
            allowed_origins,
            api_prefix,
        })
    }
}

fn default_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://localhost:3000".to_string(),
    ]
}

/// Parse a comma-separated origin list, ignoring empty segments.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_and_trims_origin_list() {
        assert_eq!(
            parse_origins("http://localhost:5173, https://app.example.com ,"),
            vec![
                "http://localhost:5173".to_string(),
                "https://app.example.com".to_string(),
            ]
        );
    }

    #[test]
    fn wildcard_passes_through() {
        assert_eq!(parse_origins("*"), vec!["*".to_string()]);
    }
}
