//! File Store Safety Tests
//!
//! End-to-end checks of the guarantees mutating file operations give:
//! - self-copies and self-nesting are rejected before anything is touched
//! - copying a tree into its own descendant terminates without duplication
//! - recursive delete reports what it removed and is idempotent

use std::fs;
use std::path::Path;

use tempfile::TempDir;
use toolboxes::file_store::{
    self, content_equals, copy_directory, copy_file, delete_recursive, move_directory,
    FileStoreError,
};

// =============================================================================
// Test Utilities
// =============================================================================

/// Builds `files` regular files spread over `dirs` nested directories.
fn build_tree(root: &Path, dirs: usize, files_per_dir: usize) {
    let mut dir = root.to_path_buf();
    fs::create_dir_all(&dir).unwrap();
    for d in 0..dirs {
        dir = dir.join(format!("d{}", d));
        fs::create_dir(&dir).unwrap();
        for f in 0..files_per_dir {
            fs::write(dir.join(format!("f{}.txt", f)), format!("{}-{}", d, f)).unwrap();
        }
    }
}

fn count_entries(root: &Path) -> usize {
    let mut count = 0;
    for entry in fs::read_dir(root).unwrap() {
        let entry = entry.unwrap();
        count += 1;
        if entry.file_type().unwrap().is_dir() {
            count += count_entries(&entry.path());
        }
    }
    count
}

// =============================================================================
// Copy
// =============================================================================

/// Copying a file onto itself fails and leaves the content untouched.
#[test]
fn test_copy_file_onto_itself() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("a.txt");
    fs::write(&file, b"original").unwrap();

    let result = copy_file(&file, &file, false);
    assert!(matches!(result, Err(FileStoreError::SameFile { .. })));
    assert_eq!(fs::read(&file).unwrap(), b"original");

    // Same file through a non-normalized path
    let dotted = temp.path().join(".").join("a.txt");
    assert!(matches!(
        copy_file(&file, &dotted, false),
        Err(FileStoreError::SameFile { .. })
    ));
}

/// Copying a tree into its own subdirectory terminates and copies each
/// original entry exactly once.
#[test]
fn test_copy_directory_into_own_subdirectory() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("tree");
    build_tree(&src, 2, 2);
    let before = count_entries(&src);

    let dst = src.join("backup");
    copy_directory(&src, &dst, None, false).unwrap();

    assert!(dst.join("d0/f0.txt").is_file());
    assert!(dst.join("d0/d1/f1.txt").is_file());
    assert!(!dst.join("backup").exists());
    assert_eq!(count_entries(&dst), before);
    assert!(content_equals(&src.join("d0/d1/f0.txt"), &dst.join("d0/d1/f0.txt")).unwrap());
}

/// A destination deeper in the tree is never copied into itself.
#[test]
fn test_copy_directory_into_deep_descendant() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("tree");
    build_tree(&src, 2, 1);
    let before = count_entries(&src);

    let dst = src.join("d0").join("backup");
    copy_directory(&src, &dst, None, false).unwrap();

    assert_eq!(count_entries(&dst), before);
    assert!(!dst.join("d0").join("backup").exists());
}

/// Copying a tree onto itself is rejected.
#[test]
fn test_copy_directory_same_path() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("tree");
    build_tree(&src, 1, 1);

    assert!(matches!(
        copy_directory(&src, &src, None, false),
        Err(FileStoreError::SamePath { .. })
    ));
}

// =============================================================================
// Move
// =============================================================================

/// Moving a directory into its own descendant is rejected with nothing moved.
#[test]
fn test_move_directory_into_descendant() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("tree");
    build_tree(&src, 2, 1);
    let before = count_entries(&src);

    let result = move_directory(&src, &src.join("d0").join("moved"));
    assert!(matches!(result, Err(FileStoreError::InvalidNesting { .. })));
    assert_eq!(count_entries(&src), before);
    assert!(!src.join("d0/moved").exists());
}

/// A plain directory move relocates the whole tree.
#[test]
fn test_move_directory() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("tree");
    build_tree(&src, 2, 2);
    let before = count_entries(&src);

    let dst = temp.path().join("elsewhere").join("tree");
    fs::create_dir(temp.path().join("elsewhere")).unwrap();
    move_directory(&src, &dst).unwrap();

    assert!(!src.exists());
    assert_eq!(count_entries(&dst), before);
}

// =============================================================================
// Delete
// =============================================================================

/// Deleting a tree of N files and M directories removes N + M + 1 entries;
/// deleting it again removes nothing and succeeds.
#[test]
fn test_delete_recursive_counts_and_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("tree");
    build_tree(&root, 3, 2); // 3 dirs, 6 files

    assert_eq!(delete_recursive(&root).unwrap(), 3 + 6 + 1);
    assert!(!root.exists());
    assert_eq!(delete_recursive(&root).unwrap(), 0);
}

/// Deleting through a symlinked directory removes the link only.
#[cfg(unix)]
#[test]
fn test_delete_symlinked_directory_keeps_target() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("target");
    build_tree(&target, 1, 3);
    let link = temp.path().join("link");
    std::os::unix::fs::symlink(&target, &link).unwrap();

    assert_eq!(delete_recursive(&link).unwrap(), 1);
    assert!(!file_store::path_exists(&link));
    assert_eq!(count_entries(&target), 4);
}
