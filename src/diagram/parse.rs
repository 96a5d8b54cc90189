//! Parsing PlantUML text back into a diagram description.
//!
//! The parser accepts the subset of PlantUML this crate emits, plus the
//! small variations a guided simplifier tends to produce: unquoted
//! names, missing labels, reordered blocks. Unknown directives are
//! skipped; anything that looks like an edge in a foreign notation is an
//! error so an invented relationship cannot slip through unnoticed.

use super::{DiagramDescription, EdgeDecl, NodeDecl};
use crate::model::{EntityKind, RelationKind};

/// Parses diagram text into a [`DiagramDescription`].
///
/// Parsed nodes carry an empty `represents` list; mapping back to the
/// original entities is the validator's job.
///
/// # Errors
///
/// Returns an error for an unterminated node block, a malformed node or
/// package header, or an edge written in an unrecognized notation.
pub fn parse(text: &str) -> Result<DiagramDescription, String> {
    let mut nodes: Vec<NodeDecl> = Vec::new();
    let mut edges: Vec<EdgeDecl> = Vec::new();
    let mut package_stack: Vec<String> = Vec::new();
    let mut current: Option<NodeDecl> = None;

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        let line_no = index + 1;

        if line.is_empty() || is_directive(line) {
            continue;
        }

        if let Some(mut node) = current.take() {
            if line == "}" {
                nodes.push(node);
            } else {
                node.members.push(line.to_string());
                current = Some(node);
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix("package ") {
            let (name, _) = take_name(rest);
            if name.is_empty() {
                return Err(format!("line {line_no}: package without a name"));
            }
            if line.ends_with('{') {
                package_stack.push(name);
            }
            continue;
        }
        if line == "}" {
            package_stack.pop();
            continue;
        }

        if let Some(edge) = parse_edge(line) {
            edges.push(edge.map_err(|e| format!("line {line_no}: {e}"))?);
            continue;
        }

        if let Some(header) = parse_node_header(line, package_stack.last().map(String::as_str)) {
            let (node, opens_block) = header.map_err(|e| format!("line {line_no}: {e}"))?;
            if opens_block {
                current = Some(node);
            } else {
                nodes.push(node);
            }
            continue;
        }

        if looks_like_edge(line) {
            return Err(format!("line {line_no}: unrecognized edge notation: {line}"));
        }
        // Anything else (notes, layout hints) is ignored.
    }

    if let Some(node) = current {
        return Err(format!("unterminated block for node {}", node.name));
    }
    Ok(DiagramDescription { nodes, edges })
}

fn is_directive(line: &str) -> bool {
    line.starts_with('\'')
        || line.starts_with('@')
        || line.starts_with('!')
        || line.starts_with("skinparam")
        || line.starts_with("title")
        || line.starts_with("hide ")
        || line.starts_with("left to right")
        || line.starts_with("top to bottom")
}

/// The inverse of the fixed notation table. Inheritance and
/// implementation lines are target-first, so their endpoints swap back.
fn parse_edge(line: &str) -> Option<Result<EdgeDecl, String>> {
    const ARROWS: [(&str, RelationKind, bool); 4] = [
        (" <|-- ", RelationKind::Inheritance, true),
        (" <|.. ", RelationKind::Implementation, true),
        (" *-- ", RelationKind::Composition, false),
        (" ..> ", RelationKind::Dependency, false),
    ];
    for (token, kind, reversed) in ARROWS {
        let Some(idx) = line.find(token) else {
            continue;
        };
        let left = unquote(line[..idx].trim());
        let mut right_part = line[idx + token.len()..].trim();
        if let Some((name, _label)) = right_part.split_once(" : ") {
            right_part = name.trim();
        }
        let right = unquote(right_part);
        if left.is_empty() || right.is_empty() {
            return Some(Err(format!("edge with a missing endpoint: {line}")));
        }
        let (source, target) = if reversed { (right, left) } else { (left, right) };
        return Some(Ok(EdgeDecl { source, target, kind }));
    }
    None
}

fn parse_node_header(
    line: &str,
    package: Option<&str>,
) -> Option<Result<(NodeDecl, bool), String>> {
    let mut rest = line;
    let mut is_abstract = false;
    if let Some(r) = rest.strip_prefix("abstract ") {
        is_abstract = true;
        rest = r.trim_start();
    }
    let (kind, rest) = if let Some(r) = rest.strip_prefix("class ") {
        (EntityKind::Class, r)
    } else if let Some(r) = rest.strip_prefix("interface ") {
        (EntityKind::Interface, r)
    } else if let Some(r) = rest.strip_prefix("enum ") {
        (EntityKind::Enum, r)
    } else if let Some(r) = rest.strip_prefix("annotation ") {
        (EntityKind::Annotation, r)
    } else {
        return None;
    };

    let (name, trailer) = take_name(rest.trim());
    if name.is_empty() {
        return Some(Err(format!("declaration without a name: {line}")));
    }
    let stereotype = trailer
        .find("<<")
        .and_then(|start| {
            trailer[start + 2..]
                .find(">>")
                .map(|end| trailer[start + 2..start + 2 + end].trim().to_string())
        })
        .filter(|s| !s.is_empty());
    let opens_block = trailer.trim_end().ends_with('{');

    let node_package = name
        .rsplit_once('.')
        .map(|(p, _)| p.to_string())
        .or_else(|| package.map(ToString::to_string))
        .unwrap_or_default();

    Some(Ok((
        NodeDecl {
            name,
            kind,
            is_abstract,
            package: node_package,
            stereotype,
            members: vec![],
            represents: vec![],
        },
        opens_block,
    )))
}

/// Takes a quoted or bare name off the front of `rest`, returning the
/// name and the remainder of the line.
fn take_name(rest: &str) -> (String, &str) {
    let rest = rest.trim_start();
    if let Some(stripped) = rest.strip_prefix('"') {
        match stripped.find('"') {
            Some(end) => (stripped[..end].to_string(), &stripped[end + 1..]),
            None => (String::new(), rest),
        }
    } else {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        (rest[..end].trim_end_matches('{').to_string(), &rest[end..])
    }
}

fn unquote(name: &str) -> String {
    name.trim().trim_matches('"').to_string()
}

/// `true` when a line that matched nothing still smells like an edge.
fn looks_like_edge(line: &str) -> bool {
    line.contains("--") || line.contains("..") || line.contains("->")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::render;

    #[test]
    fn round_trip_preserves_nodes_and_edges() {
        let diagram = DiagramDescription {
            nodes: vec![
                NodeDecl {
                    name: "com.app.Animal".to_string(),
                    kind: EntityKind::Class,
                    is_abstract: true,
                    package: "com.app".to_string(),
                    stereotype: None,
                    members: vec!["+ age : int".to_string()],
                    represents: vec!["com.app.Animal".to_string()],
                },
                NodeDecl {
                    name: "com.app.Walker".to_string(),
                    kind: EntityKind::Interface,
                    is_abstract: false,
                    package: "com.app".to_string(),
                    stereotype: None,
                    members: vec![],
                    represents: vec!["com.app.Walker".to_string()],
                },
            ],
            edges: vec![EdgeDecl {
                source: "com.app.Dog".to_string(),
                target: "com.app.Animal".to_string(),
                kind: RelationKind::Inheritance,
            }],
        };

        let parsed = parse(&render(&diagram)).unwrap();
        assert_eq!(parsed.nodes.len(), 2);
        assert_eq!(parsed.nodes[0].name, "com.app.Animal");
        assert!(parsed.nodes[0].is_abstract);
        assert_eq!(parsed.nodes[0].members, vec!["+ age : int"]);
        assert_eq!(parsed.nodes[1].kind, EntityKind::Interface);
        assert_eq!(parsed.edges, diagram.edges);
    }

    #[test]
    fn round_trip_recovers_every_edge_kind() {
        let kinds = [
            RelationKind::Inheritance,
            RelationKind::Implementation,
            RelationKind::Composition,
            RelationKind::Dependency,
        ];
        let diagram = DiagramDescription {
            nodes: vec![],
            edges: kinds
                .iter()
                .map(|kind| EdgeDecl {
                    source: "com.app.A".to_string(),
                    target: "com.app.B".to_string(),
                    kind: *kind,
                })
                .collect(),
        };
        let parsed = parse(&render(&diagram)).unwrap();
        assert_eq!(parsed.edges, diagram.edges);
    }

    #[test]
    fn parses_unquoted_names_and_missing_labels() {
        let text = "@startuml\nclass Dog\nAnimal <|-- Dog\nDog ..> Vet\n@enduml\n";
        let parsed = parse(text).unwrap();
        assert_eq!(parsed.nodes[0].name, "Dog");
        assert_eq!(parsed.edges.len(), 2);
        assert_eq!(parsed.edges[0].source, "Dog");
        assert_eq!(parsed.edges[0].target, "Animal");
        assert_eq!(parsed.edges[0].kind, RelationKind::Inheritance);
        assert_eq!(parsed.edges[1].kind, RelationKind::Dependency);
    }

    #[test]
    fn parses_group_stereotype() {
        let text = "class \"com.app.other\" <<group>> {\n  Trainer\n}\n";
        let parsed = parse(text).unwrap();
        assert_eq!(parsed.nodes[0].stereotype.as_deref(), Some("group"));
        assert_eq!(parsed.nodes[0].members, vec!["Trainer"]);
        assert_eq!(parsed.nodes[0].package, "com.app");
    }

    #[test]
    fn node_inside_package_inherits_package_context() {
        let text = "package \"com.app\" as com_app {\n  class Dog\n}\n";
        let parsed = parse(text).unwrap();
        assert_eq!(parsed.nodes[0].package, "com.app");
    }

    #[test]
    fn rejects_unterminated_block() {
        let text = "class \"com.app.Dog\" {\n  - name : String\n";
        assert!(parse(text).is_err());
    }

    #[test]
    fn rejects_foreign_arrow_notation() {
        let text = "Dog --> Animal\n";
        let err = parse(text).unwrap_err();
        assert!(err.contains("unrecognized edge notation"));
    }

    #[test]
    fn ignores_directives_and_comments() {
        let text = "@startuml\nskinparam shadowing false\ntitle X\n' comment\nhide circle\nclass Dog\n@enduml\n";
        let parsed = parse(text).unwrap();
        assert_eq!(parsed.nodes.len(), 1);
        assert!(parsed.edges.is_empty());
    }
}
