//! # Document Storage
//!
//! Record persistence on top of the file store. Each document is one file
//! holding one encoded record. A module's directory can be split into
//! day buckets so per-day listing and counting only touch that day.
//!
//! No index is kept: listing walks the directory and decodes every file.

mod bucket;
mod codec;
mod collection;
mod errors;
mod storage;

pub use bucket::{DateBucket, BUCKET_DATE_FORMAT};
pub use codec::{DocumentCodec, JsonCodec};
pub use collection::DocumentCollection;
pub use errors::{DocumentError, DocumentResult};
pub use storage::ModuleStorage;
