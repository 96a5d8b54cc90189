//! Global model assembly.
//!
//! Merges per-file extraction results in two phases: collect every
//! declaration first, then resolve every relationship hint against the
//! collected set. Keeping the phases separate makes resolution
//! independent of file order.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::RunConfig;
use crate::extract::{FileModel, RelationHint};
use crate::model::{Diagnostic, Entity, GlobalModel, Relationship};

/// Assembles one [`GlobalModel`] from the extraction results of a run.
///
/// Duplicate fully-qualified names are replaced by the later observation
/// (recording a collision diagnostic). Hint targets resolve to entities
/// by qualified name, by unique simple name, or by the documented
/// tie-break; unmatched targets become external edges kept only when
/// `config.show_external` is set.
#[must_use]
pub fn assemble(files: &[FileModel], config: &RunConfig) -> (GlobalModel, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();

    // Phase 1: collect declarations.
    let mut entities: BTreeMap<String, Entity> = BTreeMap::new();
    for file in files {
        for entity in &file.entities {
            if entities.insert(entity.name.clone(), entity.clone()).is_some() {
                diagnostics.push(Diagnostic::Collision {
                    entity: entity.name.clone(),
                    message: format!(
                        "declared again in {}; the later declaration replaces the earlier one",
                        file.path
                    ),
                });
            }
        }
    }

    let mut simple_index: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for fqn in entities.keys() {
        let simple = fqn.rsplit('.').next().unwrap_or(fqn);
        simple_index.entry(simple.to_string()).or_default().push(fqn.clone());
    }

    // Phase 2: resolve hints.
    let mut seen: BTreeSet<(String, String, crate::model::RelationKind)> = BTreeSet::new();
    let mut relationships = Vec::new();
    for file in files {
        for hint in &file.hints {
            let Some((target, external)) =
                resolve_target(hint, &entities, &simple_index, &mut diagnostics)
            else {
                continue;
            };
            if external && !config.show_external {
                continue;
            }
            if target == hint.source {
                continue;
            }
            if seen.insert((hint.source.clone(), target.clone(), hint.kind)) {
                relationships.push(Relationship {
                    source: hint.source.clone(),
                    target,
                    kind: hint.kind,
                    external,
                });
            }
        }
    }

    relationships.sort_by(|a, b| {
        (a.kind.priority(), &a.source, &a.target).cmp(&(b.kind.priority(), &b.source, &b.target))
    });

    (GlobalModel { entities, relationships }, diagnostics)
}

/// Resolves a hint target to `(name, external)`.
///
/// Simple names matching several entities tie-break by: same package as
/// the source, then longest shared dotted package prefix, then first
/// alphabetically — always recording an ambiguity diagnostic.
fn resolve_target(
    hint: &RelationHint,
    entities: &BTreeMap<String, Entity>,
    simple_index: &BTreeMap<String, Vec<String>>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<(String, bool)> {
    if entities.contains_key(&hint.target) {
        return Some((hint.target.clone(), false));
    }
    if hint.target.contains('.') {
        // Qualified but unknown: an external/library type.
        return Some((hint.target.clone(), true));
    }

    match simple_index.get(&hint.target).map(Vec::as_slice) {
        None | Some([]) => Some((hint.target.clone(), true)),
        Some([only]) => Some((only.clone(), false)),
        Some(candidates) => {
            let source_package = entities
                .get(&hint.source)
                .map(|e| e.package.clone())
                .unwrap_or_default();
            let mut ranked: Vec<&String> = candidates.iter().collect();
            ranked.sort_by_key(|fqn| {
                let package = entities.get(*fqn).map(|e| e.package.as_str()).unwrap_or("");
                let same = package == source_package;
                let shared = shared_prefix_segments(package, &source_package);
                (!same, std::cmp::Reverse(shared), (*fqn).clone())
            });
            let chosen = ranked[0].clone();
            diagnostics.push(Diagnostic::Ambiguity {
                entity: hint.source.clone(),
                message: format!(
                    "{} matches {} entities; resolved to {chosen} by package proximity",
                    hint.target,
                    candidates.len()
                ),
            });
            Some((chosen, false))
        }
    }
}

/// Number of leading dotted segments two package names share.
fn shared_prefix_segments(a: &str, b: &str) -> usize {
    a.split('.').zip(b.split('.')).take_while(|(x, y)| x == y).count()
}
