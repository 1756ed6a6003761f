//! # File Store
//!
//! Safety-checked filesystem primitives used by provisioning and document
//! collections. Every mutating operation validates its preconditions before
//! touching the filesystem and leaves it unchanged when they fail.
//!
//! All operations are blocking. Contents are streamed through a fixed-size
//! buffer, so memory use does not grow with file size. No locking is done
//! across operations on the same path.

mod copy;
mod delete;
mod errors;
mod inspect;
mod io;
mod relocate;

pub use copy::{copy_directory, copy_directory_to_directory, copy_file, copy_file_to_directory, CopyFilter};
pub use delete::{clean_directory, delete_quietly, delete_recursive};
pub use errors::{FileStoreError, FileStoreResult};
pub use inspect::{
    canonical_path, content_equals, format_byte_size, is_nested_in, is_symlink, path_exists,
    size_of,
};
pub use io::{create_dir_all, read, read_to_string, write};
pub use relocate::{move_directory, move_file, move_to_directory};
