//! # HTTP Server Module
//!
//! Thin REST layer over the storage modules.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/WorkCenter/listByDates` - Work log of one day
//! - `/WorkCenter/listDateTaskCount` - Number of entries of one day
//! - `/WorkCenter/addDataTask` - Add an entry

pub mod config;
pub mod observability_routes;
pub mod server;
pub mod workcenter_routes;

pub use config::{HttpConfigError, HttpServerConfig};
pub use server::HttpServer;
