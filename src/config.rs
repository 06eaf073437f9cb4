//! Configuration management for the media download server

use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub media: MediaConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub download: DownloadConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Whether this process terminates TLS itself. When false, the
    /// `x-forwarded-proto` header decides whether a request arrived
    /// over TLS.
    pub tls_enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    /// Directory scanned into the attachment index at startup
    pub root: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Secret key the anti-forgery nonces are derived from
    pub nonce_secret: String,
    /// Full lifetime of a nonce in seconds; a nonce is accepted during
    /// the tick it was issued in and the one after
    pub nonce_lifetime_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DownloadConfig {
    /// Optional cap on the size of a served file. `None` preserves the
    /// legacy behavior of allowing arbitrarily large transfers.
    pub max_transfer_bytes: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                tls_enabled: false,
            },
            media: MediaConfig {
                root: PathBuf::from("./media"),
            },
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
            },
            auth: AuthConfig {
                nonce_secret: "insecure-dev-secret".to_string(),
                nonce_lifetime_secs: 86400,
            },
            download: DownloadConfig {
                max_transfer_bytes: None,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .unwrap_or(3000),
                tls_enabled: env::var("TLS_ENABLED")
                    .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                    .unwrap_or(false),
            },
            media: MediaConfig {
                root: PathBuf::from(env::var("MEDIA_ROOT")?),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string()),
            },
            auth: AuthConfig {
                nonce_secret: env::var("NONCE_SECRET")
                    .unwrap_or_else(|_| "insecure-dev-secret".to_string()),
                nonce_lifetime_secs: env::var("NONCE_LIFETIME_SECS")
                    .unwrap_or_else(|_| "86400".to_string())
                    .parse()
                    .unwrap_or(86400),
            },
            download: DownloadConfig {
                max_transfer_bytes: env::var("MAX_TRANSFER_BYTES")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .filter(|v| *v > 0),
            },
        })
    }
}
