//! PlantUML rendering of a diagram description.

use std::collections::BTreeMap;

use super::{DiagramDescription, EdgeDecl, NodeDecl};
use crate::model::RelationKind;

/// Renders a diagram description as PlantUML text.
///
/// Output order follows the description exactly, so rendering the same
/// description twice yields byte-identical text. Nodes with a package are
/// grouped into `package` blocks; top-level nodes (externals, ungrouped
/// names) follow the packages.
#[must_use]
pub fn render(diagram: &DiagramDescription) -> String {
    let mut out = String::new();
    out.push_str("@startuml\n");
    out.push_str("skinparam packageStyle rect\n");
    out.push_str("title Architecture\n\n");

    let mut packaged: BTreeMap<&str, Vec<&NodeDecl>> = BTreeMap::new();
    let mut top_level: Vec<&NodeDecl> = Vec::new();
    for node in &diagram.nodes {
        if node.package.is_empty() {
            top_level.push(node);
        } else {
            packaged.entry(node.package.as_str()).or_default().push(node);
        }
    }

    for (package, nodes) in &packaged {
        let alias = package.replace('.', "_");
        out.push_str(&format!("package \"{package}\" as {alias} {{\n"));
        for node in nodes {
            write_node(&mut out, node, "  ");
        }
        out.push_str("}\n");
    }
    for node in top_level {
        write_node(&mut out, node, "");
    }

    if !diagram.edges.is_empty() {
        out.push_str("\n' relationships\n");
        for edge in &diagram.edges {
            out.push_str(&edge_line(edge));
            out.push('\n');
        }
    }

    out.push_str("\n@enduml\n");
    out
}

fn write_node(out: &mut String, node: &NodeDecl, indent: &str) {
    let keyword = if node.is_abstract {
        "abstract class".to_string()
    } else {
        node.kind.keyword().to_string()
    };
    let stereotype = node
        .stereotype
        .as_ref()
        .map(|s| format!(" <<{s}>>"))
        .unwrap_or_default();
    if node.members.is_empty() {
        out.push_str(&format!("{indent}{keyword} \"{}\"{stereotype}\n", node.name));
    } else {
        out.push_str(&format!("{indent}{keyword} \"{}\"{stereotype} {{\n", node.name));
        for member in &node.members {
            out.push_str(&format!("{indent}  {member}\n"));
        }
        out.push_str(&format!("{indent}}}\n"));
    }
}

/// The fixed notation table. Inheritance and implementation are written
/// target-first (PlantUML convention); composition and dependency
/// source-first. The four arrow tokens are mutually distinct so the kind
/// can be recovered from the text.
fn edge_line(edge: &EdgeDecl) -> String {
    match edge.kind {
        RelationKind::Inheritance => {
            format!("\"{}\" <|-- \"{}\" : extends", edge.target, edge.source)
        }
        RelationKind::Implementation => {
            format!("\"{}\" <|.. \"{}\" : implements", edge.target, edge.source)
        }
        RelationKind::Composition => {
            format!("\"{}\" *-- \"{}\" : has", edge.source, edge.target)
        }
        RelationKind::Dependency => {
            format!("\"{}\" ..> \"{}\" : uses", edge.source, edge.target)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityKind;

    fn node(name: &str, package: &str) -> NodeDecl {
        NodeDecl {
            name: name.to_string(),
            kind: EntityKind::Class,
            is_abstract: false,
            package: package.to_string(),
            stereotype: None,
            members: vec![],
            represents: vec![name.to_string()],
        }
    }

    #[test]
    fn renders_package_blocks_and_edges() {
        let diagram = DiagramDescription {
            nodes: vec![
                node("com.app.Animal", "com.app"),
                node("com.app.Dog", "com.app"),
            ],
            edges: vec![EdgeDecl {
                source: "com.app.Dog".to_string(),
                target: "com.app.Animal".to_string(),
                kind: RelationKind::Inheritance,
            }],
        };
        let text = render(&diagram);
        assert!(text.starts_with("@startuml\n"));
        assert!(text.contains("package \"com.app\" as com_app {"));
        assert!(text.contains("  class \"com.app.Animal\"\n"));
        assert!(text.contains("\"com.app.Animal\" <|-- \"com.app.Dog\" : extends"));
        assert!(text.trim_end().ends_with("@enduml"));
    }

    #[test]
    fn renders_members_inside_braces() {
        let mut n = node("com.app.Dog", "com.app");
        n.members = vec!["- name : String".to_string()];
        let diagram = DiagramDescription { nodes: vec![n], edges: vec![] };
        let text = render(&diagram);
        assert!(text.contains("  class \"com.app.Dog\" {\n    - name : String\n  }\n"));
    }

    #[test]
    fn all_four_edge_notations_are_distinct() {
        let notations: Vec<String> = [
            RelationKind::Inheritance,
            RelationKind::Implementation,
            RelationKind::Composition,
            RelationKind::Dependency,
        ]
        .into_iter()
        .map(|kind| {
            edge_line(&EdgeDecl { source: "A".to_string(), target: "B".to_string(), kind })
        })
        .collect();
        for (i, a) in notations.iter().enumerate() {
            for b in notations.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn rendering_is_byte_stable() {
        let diagram = DiagramDescription {
            nodes: vec![node("com.app.A", "com.app")],
            edges: vec![],
        };
        assert_eq!(render(&diagram), render(&diagram));
    }
}
