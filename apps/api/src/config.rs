use anyhow::{Context, Result};

/// OAuth client credentials for the Google Docs API.
#[derive(Debug, Clone)]
pub struct GoogleCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

/// Application configuration loaded from environment variables.
/// Fails at startup if `GEMINI_API_KEY` is missing. Google credentials are
/// optional here; their absence surfaces on first use of the auth or
/// document endpoints.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub google: Option<GoogleCredentials>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let port = optional_env("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        Ok(Config {
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            google: google_credentials(port),
            port,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn google_credentials(port: u16) -> Option<GoogleCredentials> {
    let client_id = optional_env("GOOGLE_CLIENT_ID")?;
    let client_secret = optional_env("GOOGLE_CLIENT_SECRET")?;
    let redirect_uri = optional_env("GOOGLE_REDIRECT_URI")
        .unwrap_or_else(|| format!("http://localhost:{port}/auth/callback"));

    Some(GoogleCredentials {
        client_id,
        client_secret,
        redirect_uri,
    })
}

fn require_env(key: &str) -> Result<String> {
    optional_env(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Reads an env var, treating empty or whitespace-only values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
