use std::{net::SocketAddr, time::Duration};

use axum::http::{HeaderName, HeaderValue, Method};
use serde::Deserialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

const ENV_PREFIX: &str = "MENU_SERVER";

/// Server configuration.
///
/// Defaults, then an optional `menu-server.{toml,yaml,json}` file, then
/// `MENU_SERVER__*` environment variables (lists are comma separated).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bind_addr: String,
    pub port: u16,
    pub mongo_uri: String,
    pub database: String,
    /// Upper bound for a single store operation, in seconds.
    pub store_timeout_secs: u64,
    pub cors_allowed_origins: Vec<String>,
    pub cors_allowed_headers: Vec<String>,
    /// Tracing filter used when `RUST_LOG` is not set.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 8080,
            mongo_uri: "mongodb://localhost:27017".to_string(),
            database: "restaurant".to_string(),
            store_timeout_secs: 10,
            cors_allowed_origins: vec!["*".to_string()],
            cors_allowed_headers: vec![
                "origin".to_string(),
                "content-type".to_string(),
                "accept".to_string(),
            ],
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        // .env is optional
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("menu-server").required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors_allowed_origins")
                    .with_list_parse_key("cors_allowed_headers")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.bind_addr, self.port).parse()?)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }

    /// CORS policy for every route. Entries that are not valid header
    /// values are dropped with a warning.
    pub fn cors_layer(&self) -> CorsLayer {
        let origin = if self.cors_allowed_origins.iter().any(|o| o.trim() == "*") {
            AllowOrigin::from(Any)
        } else {
            let origins: Vec<HeaderValue> = self
                .cors_allowed_origins
                .iter()
                .filter_map(|o| {
                    HeaderValue::from_str(o.trim())
                        .map_err(|e| warn!("Ignoring CORS origin {o:?}: {e}"))
                        .ok()
                })
                .collect();
            AllowOrigin::list(origins)
        };

        let headers: Vec<HeaderName> = self
            .cors_allowed_headers
            .iter()
            .filter_map(|h| {
                HeaderName::from_bytes(h.trim().as_bytes())
                    .map_err(|e| warn!("Ignoring CORS header {h:?}: {e}"))
                    .ok()
            })
            .collect();

        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers(headers)
    }
}
