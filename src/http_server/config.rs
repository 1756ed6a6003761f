//! REST layer settings: the bind address and the browser origins allowed to
//! call the API.

use std::net::SocketAddr;

use axum::http::HeaderValue;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Port the web front end expects the API on
pub const DEFAULT_PORT: u16 = 8090;

/// Rejected `http` settings
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpConfigError {
    #[error("http.host must be an IP address, got '{0}'")]
    InvalidHost(String),

    #[error("http.port must not be 0: the front end needs a fixed port")]
    ZeroPort,

    #[error("Invalid CORS origin '{origin}': {reason}")]
    InvalidOrigin { origin: String, reason: &'static str },
}

/// HTTP server configuration. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpServerConfig {
    pub host: String,

    pub port: u16,

    /// `scheme://host[:port]` origins, as browsers send them. Empty allows
    /// any origin.
    pub cors_origins: Vec<String>,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            cors_origins: vec![
                "http://localhost:8080".to_string(),
                "http://127.0.0.1:8080".to_string(),
            ],
        }
    }
}

impl HttpServerConfig {
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Checks the settings the server would otherwise trip over at bind
    /// time, or silently ignore (an origin that never matches).
    pub fn validate(&self) -> Result<(), HttpConfigError> {
        if self.socket_addr().parse::<SocketAddr>().is_err() {
            return Err(HttpConfigError::InvalidHost(self.host.clone()));
        }
        if self.port == 0 {
            return Err(HttpConfigError::ZeroPort);
        }
        for origin in &self.cors_origins {
            parse_origin(origin)?;
        }
        Ok(())
    }

    /// Origins for the CORS layer; entries `validate` rejects are left out.
    pub fn allowed_origins(&self) -> Vec<HeaderValue> {
        self.cors_origins
            .iter()
            .filter_map(|origin| parse_origin(origin).ok())
            .collect()
    }
}

fn parse_origin(origin: &str) -> Result<HeaderValue, HttpConfigError> {
    let invalid = |reason| HttpConfigError::InvalidOrigin {
        origin: origin.to_string(),
        reason,
    };

    if origin == "*" {
        return Err(invalid("leave cors_origins empty to allow any origin"));
    }
    let authority = origin
        .strip_prefix("http://")
        .or_else(|| origin.strip_prefix("https://"))
        .ok_or_else(|| invalid("must start with http:// or https://"))?;
    if authority.is_empty() {
        return Err(invalid("missing host"));
    }
    // Browsers never send a path, so such an entry could not match
    if authority.contains('/') {
        return Err(invalid("must not contain a path"));
    }
    HeaderValue::from_str(origin).map_err(|_| invalid("not a valid header value"))
}
