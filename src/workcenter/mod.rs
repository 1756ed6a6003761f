//! # WorkCenter
//!
//! Daily work log. Each entry is an [`EventInfo`] document stored in the
//! day bucket of the entry's date under this module's directory.

mod event;
mod service;

pub use event::EventInfo;
pub use service::WorkCenterService;
