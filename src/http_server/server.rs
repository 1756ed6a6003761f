//! # HTTP Server
//!
//! Combines the module routers into one axum application.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::info;

use super::config::HttpServerConfig;
use super::observability_routes::health_routes;
use super::workcenter_routes::{workcenter_routes, WorkCenterState};
use crate::workcenter::WorkCenterService;

/// HTTP server over the provisioned modules
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig, workcenter: WorkCenterService) -> Self {
        let router = Self::build_router(&config, workcenter);
        Self { config, router }
    }

    fn build_router(config: &HttpServerConfig, workcenter: WorkCenterService) -> Router {
        let workcenter_state = Arc::new(WorkCenterState::new(workcenter));

        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(config.allowed_origins()))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .merge(health_routes())
            .nest("/WorkCenter", workcenter_routes(workcenter_state))
            .layer(cors)
    }

    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Binds and serves until the process is stopped
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid bind address {}: {}", self.config.socket_addr(), e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        info!(%addr, "http server listening");
        axum::serve(listener, self.router).await?;

        Ok(())
    }
}
