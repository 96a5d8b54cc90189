//! Filesystem port: source-tree reads and artifact writes.

use std::path::Path;

use super::BoxedError;

/// Disk access for one analysis run.
///
/// Everything the pipeline touches on disk goes through this trait: the
/// recursive `.java` walk, per-file source reads, and the diagram and
/// report writes. Tests can swap in an in-memory tree.
pub trait FileSystem: Send + Sync {
    /// Reads one source file as UTF-8.
    ///
    /// # Errors
    ///
    /// Returns an error when the file is missing, unreadable, or not
    /// valid UTF-8.
    fn read_to_string(&self, path: &Path) -> Result<String, BoxedError>;

    /// Writes an artifact, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error when the write fails.
    fn write(&self, path: &Path, contents: &str) -> Result<(), BoxedError>;

    /// Whether `path` names an existing directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Entry names of a directory, sorted for stable traversal order.
    ///
    /// # Errors
    ///
    /// Returns an error when `path` is not a readable directory.
    fn list_dir(&self, path: &Path) -> Result<Vec<String>, BoxedError>;
}
