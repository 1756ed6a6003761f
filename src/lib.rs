//! toolboxes - per-module file storage for a small personal tools backend
//!
//! Each storage module owns one directory under a single storage root. The
//! directory is derived from the module's identity and provisioned at
//! startup; records are kept as one JSON document per file.

pub mod cli;
pub mod document;
pub mod file_store;
pub mod http_server;
pub mod module;
pub mod observability;
pub mod provision;
pub mod workcenter;
