// src/config.rs

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use dotenvy::dotenv;

/// Client credentials for one OAuth provider.
#[derive(Debug, Clone)]
pub struct OAuthClientConfig {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub rust_log: String,

    /// Lifetime of a login session, in hours.
    pub session_ttl_hours: i64,
    /// Set the `Secure` attribute on the session cookie.
    pub cookie_secure: bool,

    /// Requests allowed per client IP per one-minute window.
    pub rate_limit_per_minute: u32,
    /// Trust `X-Forwarded-For` / `X-Real-IP` when identifying clients.
    pub trust_proxy_headers: bool,

    pub upload_dir: PathBuf,
    pub max_image_bytes: usize,

    pub admin_username: Option<String>,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,

    /// Externally visible base URL, used to build OAuth redirect URIs.
    pub public_base_url: String,
    /// Where the browser lands after a successful OAuth login.
    pub frontend_url: String,
    pub google: Option<OAuthClientConfig>,
    pub github: Option<OAuthClientConfig>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://forum.db?mode=rwc".to_string());

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8081".to_string());

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            database_url,
            bind_addr,
            rust_log,
            session_ttl_hours: parse_var("SESSION_TTL_HOURS", 3),
            cookie_secure: parse_var("COOKIE_SECURE", false),
            rate_limit_per_minute: parse_var("RATE_LIMIT_PER_MINUTE", 60),
            trust_proxy_headers: parse_var("TRUST_PROXY_HEADERS", false),
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads")),
            max_image_bytes: parse_var("MAX_IMAGE_BYTES", 20 * 1024 * 1024),
            admin_username: env::var("ADMIN_USERNAME").ok(),
            admin_email: env::var("ADMIN_EMAIL").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8081".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            google: oauth_client("GOOGLE"),
            github: oauth_client("GITHUB"),
        }
    }
}

fn parse_var<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid value for {}: {:?}", key, raw);
            default
        }),
        Err(_) => default,
    }
}

fn oauth_client(prefix: &str) -> Option<OAuthClientConfig> {
    let client_id = env::var(format!("{prefix}_CLIENT_ID")).ok()?;
    let client_secret = env::var(format!("{prefix}_CLIENT_SECRET")).ok()?;
    Some(OAuthClientConfig {
        client_id,
        client_secret,
    })
}
