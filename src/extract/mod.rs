//! Per-file structural extraction.
//!
//! Each source file is parsed independently into a [`FileModel`]: the
//! entities it declares plus raw relationship hints whose targets are
//! resolved later by `assemble`. Extraction is syntactic only — a hint
//! target is the name as written, qualified against the file's imports
//! when one matches.

mod java;

use serde::{Deserialize, Serialize};

use crate::model::{Diagnostic, Entity, RelationKind};

/// A raw relationship observed in one file, prior to resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationHint {
    /// Fully-qualified name of the declaring entity.
    pub source: String,
    /// Target name as written (simple or qualified).
    pub target: String,
    /// Edge kind implied by where the name appeared.
    pub kind: RelationKind,
}

/// Extraction result for a single source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileModel {
    /// Path the file was read from.
    pub path: String,
    /// Declared package, or `default` when absent.
    pub package: String,
    /// Entities declared in the file, in declaration order.
    pub entities: Vec<Entity>,
    /// Raw relationship hints in observation order.
    pub hints: Vec<RelationHint>,
}

/// Extracts the structural model of one Java source file.
///
/// A file that fails to parse contributes zero entities; the failure is
/// returned as a [`Diagnostic::ParseFailure`] so the caller can record it
/// and continue with the remaining files.
///
/// # Errors
///
/// Returns `Diagnostic::ParseFailure` when the grammar cannot be loaded,
/// the parser produces no tree, or the tree contains syntax errors.
pub fn extract(path: &str, content: &str) -> Result<FileModel, Diagnostic> {
    java::extract_file(path, content)
}
