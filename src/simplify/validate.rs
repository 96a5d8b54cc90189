//! Structural validation of a reduced diagram against the full diagram.
//!
//! The delegated simplifier is untrusted: its output is accepted only
//! when every node maps back to entities of the full diagram and every
//! edge is witnessed by a full edge of the same kind. The fallback
//! heuristic's output passes through the same gate; a failure there is
//! an internal invariant violation, not a recoverable condition.

use std::collections::{BTreeMap, BTreeSet};

use crate::diagram::{DiagramDescription, NodeDecl};

/// Validates `candidate` as a structural reduction of `full`.
///
/// On success returns the candidate with each node's `represents` list
/// filled with the full-diagram entity names it stands for.
///
/// # Errors
///
/// Returns a description of the first violation: a duplicate or
/// unmappable node, an edge with an undeclared endpoint, or an edge with
/// no witnessing full edge of the same kind.
pub fn validate(
    full: &DiagramDescription,
    candidate: &DiagramDescription,
) -> Result<DiagramDescription, String> {
    if candidate.nodes.is_empty() {
        return Err("reduced diagram declares no nodes".to_string());
    }

    let full_names: BTreeSet<&str> = full.nodes.iter().map(|n| n.name.as_str()).collect();
    let mut simple_index: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    let mut package_index: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for node in &full.nodes {
        simple_index.entry(simple(&node.name)).or_default().push(&node.name);
        if !node.package.is_empty() {
            package_index.entry(node.package.as_str()).or_default().push(&node.name);
        }
    }

    let mut represents: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut validated = candidate.clone();
    for node in &mut validated.nodes {
        if represents.contains_key(&node.name) {
            return Err(format!("node {} is declared twice", node.name));
        }
        let resolved = resolve_node(node, &full_names, &simple_index, &package_index)?;
        node.represents = resolved.clone();
        represents.insert(node.name.clone(), resolved);
    }

    for edge in &validated.edges {
        let Some(sources) = represents.get(edge.source.as_str()) else {
            return Err(format!("edge references undeclared node {}", edge.source));
        };
        let Some(targets) = represents.get(edge.target.as_str()) else {
            return Err(format!("edge references undeclared node {}", edge.target));
        };
        let witnessed = full.edges.iter().any(|f| {
            f.kind == edge.kind
                && sources.iter().any(|s| *s == f.source)
                && targets.iter().any(|t| *t == f.target)
        });
        if !witnessed {
            return Err(format!(
                "edge {} -> {} ({:?}) has no counterpart in the full diagram",
                edge.source, edge.target, edge.kind
            ));
        }
    }

    Ok(validated)
}

/// Maps a candidate node name back onto full-diagram entities.
///
/// Accepted forms, in order: an exact fully-qualified name; a group
/// node whose member lines resolve within its package; a package name
/// standing for all of the package's entities; a simple name that is
/// unique across the full diagram.
fn resolve_node(
    node: &NodeDecl,
    full_names: &BTreeSet<&str>,
    simple_index: &BTreeMap<&str, Vec<&str>>,
    package_index: &BTreeMap<&str, Vec<&str>>,
) -> Result<Vec<String>, String> {
    if full_names.contains(node.name.as_str()) {
        return Ok(vec![node.name.clone()]);
    }

    let is_group = node
        .stereotype
        .as_deref()
        .is_some_and(|s| s.eq_ignore_ascii_case("group"))
        || node.name.ends_with(".other")
        || node.name == "other";
    if is_group {
        if node.members.is_empty() {
            return Err(format!("group node {} lists no members", node.name));
        }
        let package = node.name.strip_suffix(".other").unwrap_or("");
        let mut resolved = Vec::new();
        for member in &node.members {
            let member = member.trim();
            let qualified = if package.is_empty() {
                member.to_string()
            } else {
                format!("{package}.{member}")
            };
            if full_names.contains(qualified.as_str()) {
                resolved.push(qualified);
            } else if let Some([only]) = simple_index.get(member).map(Vec::as_slice) {
                resolved.push((*only).to_string());
            } else {
                return Err(format!(
                    "group node {} lists unknown member {member}",
                    node.name
                ));
            }
        }
        resolved.sort();
        resolved.dedup();
        return Ok(resolved);
    }

    if let Some(members) = package_index.get(node.name.as_str()) {
        return Ok(members.iter().map(ToString::to_string).collect());
    }

    match simple_index.get(node.name.as_str()).map(Vec::as_slice) {
        Some([only]) => Ok(vec![(*only).to_string()]),
        Some(_) => Err(format!("node name {} is ambiguous in the full diagram", node.name)),
        None => Err(format!("node {} does not exist in the full diagram", node.name)),
    }
}

fn simple(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}
