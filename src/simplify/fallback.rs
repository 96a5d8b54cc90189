//! Deterministic reduction heuristic.
//!
//! Used whenever the delegated simplification is disabled, unavailable,
//! or rejected. Inheritance and implementation edges are load-bearing:
//! their endpoints never collapse and the edges are emitted unchanged.

use std::collections::{BTreeMap, BTreeSet};

use crate::diagram::{DiagramDescription, EdgeDecl, NodeDecl};
use crate::model::{EntityKind, RelationKind};

/// Collapses low-signal nodes into one `<package>.other` group per package.
///
/// A node collapses when it touches no inheritance or implementation
/// edge and its composition+dependency degree is at most `threshold`.
/// Composition and dependency edges are rewritten to the surviving
/// endpoints and deduplicated; dependency edges connecting two group
/// nodes are dropped.
#[must_use]
pub fn reduce(full: &DiagramDescription, threshold: usize) -> DiagramDescription {
    let mut protected: BTreeSet<&str> = BTreeSet::new();
    let mut degree: BTreeMap<&str, usize> = BTreeMap::new();
    for edge in &full.edges {
        match edge.kind {
            RelationKind::Inheritance | RelationKind::Implementation => {
                protected.insert(&edge.source);
                protected.insert(&edge.target);
            }
            RelationKind::Composition | RelationKind::Dependency => {
                *degree.entry(&edge.source).or_default() += 1;
                *degree.entry(&edge.target).or_default() += 1;
            }
        }
    }

    // Group name per collapsed node, and member lists per group.
    let mut collapsed: BTreeMap<&str, String> = BTreeMap::new();
    let mut groups: BTreeMap<String, Vec<&NodeDecl>> = BTreeMap::new();
    for node in &full.nodes {
        if protected.contains(node.name.as_str()) {
            continue;
        }
        if degree.get(node.name.as_str()).copied().unwrap_or(0) > threshold {
            continue;
        }
        let group_name = if node.package.is_empty() {
            "other".to_string()
        } else {
            format!("{}.other", node.package)
        };
        collapsed.insert(&node.name, group_name.clone());
        groups.entry(group_name).or_default().push(node);
    }

    let mut nodes: Vec<NodeDecl> = full
        .nodes
        .iter()
        .filter(|n| !collapsed.contains_key(n.name.as_str()))
        .cloned()
        .collect();
    for (group_name, members) in &groups {
        let mut member_lines: Vec<String> =
            members.iter().map(|n| simple(&n.name).to_string()).collect();
        member_lines.sort();
        let mut represents: Vec<String> = members.iter().map(|n| n.name.clone()).collect();
        represents.sort();
        nodes.push(NodeDecl {
            name: group_name.clone(),
            kind: EntityKind::Class,
            is_abstract: false,
            package: members.first().map(|n| n.package.clone()).unwrap_or_default(),
            stereotype: Some("group".to_string()),
            members: member_lines,
            represents,
        });
    }

    let mut seen: BTreeSet<(String, String, RelationKind)> = BTreeSet::new();
    let mut edges: Vec<EdgeDecl> = Vec::new();
    for edge in &full.edges {
        match edge.kind {
            RelationKind::Inheritance | RelationKind::Implementation => {
                edges.push(edge.clone());
            }
            RelationKind::Composition | RelationKind::Dependency => {
                let source_group = collapsed.get(edge.source.as_str());
                let target_group = collapsed.get(edge.target.as_str());
                let source = source_group.cloned().unwrap_or_else(|| edge.source.clone());
                let target = target_group.cloned().unwrap_or_else(|| edge.target.clone());
                if source == target {
                    continue;
                }
                if edge.kind == RelationKind::Dependency
                    && source_group.is_some()
                    && target_group.is_some()
                {
                    continue;
                }
                if seen.insert((source.clone(), target.clone(), edge.kind)) {
                    edges.push(EdgeDecl { source, target, kind: edge.kind });
                }
            }
        }
    }

    DiagramDescription { nodes, edges }
}

fn simple(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}
