//! Diagram description and deterministic synthesis.
//!
//! A [`DiagramDescription`] is the ordered, renderer-independent form of
//! a diagram: node declarations plus typed edges. `synthesize` produces
//! the full description from a model; `render` and `parse` convert to and
//! from PlantUML text. Parsing exists for two consumers: round-trip tests
//! and validation of externally simplified text.

mod parse;
mod render;

pub use parse::parse;
pub use render::render;

use serde::{Deserialize, Serialize};

use crate::model::{Entity, EntityKind, Field, GlobalModel, Method, RelationKind};

/// One node declaration in a diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDecl {
    /// Node name; the entity's fully-qualified name, or a group name.
    pub name: String,
    /// Declaration kind.
    pub kind: EntityKind,
    /// `true` for an abstract class.
    pub is_abstract: bool,
    /// Enclosing package, empty for top-level nodes.
    pub package: String,
    /// Optional stereotype (`group`, `external`).
    pub stereotype: Option<String>,
    /// Pre-formatted member lines.
    pub members: Vec<String>,
    /// Fully-qualified names of the entities this node stands for.
    /// A full-diagram node represents itself; a group node represents
    /// every entity collapsed into it. Empty until computed for parsed
    /// external text.
    pub represents: Vec<String>,
}

/// One edge declaration in a diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDecl {
    /// Source node name.
    pub source: String,
    /// Target node name.
    pub target: String,
    /// Edge kind; determines the arrow notation.
    pub kind: RelationKind,
}

/// An ordered diagram: nodes then edges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramDescription {
    /// Node declarations in emission order.
    pub nodes: Vec<NodeDecl>,
    /// Edge declarations in emission order.
    pub edges: Vec<EdgeDecl>,
}

impl DiagramDescription {
    /// Looks up a node by name.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<&NodeDecl> {
        self.nodes.iter().find(|n| n.name == name)
    }
}

/// Renders the global model as a full diagram description.
///
/// Pure and deterministic: nodes sorted by fully-qualified name, edges in
/// the model's kind-priority order. External edge targets get bare
/// `<<external>>` nodes so every edge endpoint is declared.
#[must_use]
pub fn synthesize(model: &GlobalModel) -> DiagramDescription {
    let mut nodes: Vec<NodeDecl> = model.entities.values().map(entity_node).collect();

    let mut external: Vec<String> = model
        .relationships
        .iter()
        .filter(|r| r.external)
        .map(|r| r.target.clone())
        .collect();
    external.sort();
    external.dedup();
    for name in external {
        nodes.push(NodeDecl {
            name: name.clone(),
            kind: EntityKind::Class,
            is_abstract: false,
            package: String::new(),
            stereotype: Some("external".to_string()),
            members: vec![],
            represents: vec![name],
        });
    }

    let edges = model
        .relationships
        .iter()
        .map(|r| EdgeDecl { source: r.source.clone(), target: r.target.clone(), kind: r.kind })
        .collect();

    DiagramDescription { nodes, edges }
}

fn entity_node(entity: &Entity) -> NodeDecl {
    let mut members: Vec<String> = entity.fields.iter().map(format_field).collect();
    members.extend(entity.methods.iter().map(format_method));
    NodeDecl {
        name: entity.name.clone(),
        kind: entity.kind,
        is_abstract: entity.kind == EntityKind::Class && entity.has_modifier("abstract"),
        package: entity.package.clone(),
        stereotype: None,
        members,
        represents: vec![entity.name.clone()],
    }
}

/// UML visibility marker for a modifier list.
fn visibility(modifiers: &[String]) -> char {
    if modifiers.iter().any(|m| m == "private") {
        '-'
    } else if modifiers.iter().any(|m| m == "protected") {
        '#'
    } else if modifiers.iter().any(|m| m == "public") {
        '+'
    } else {
        '~'
    }
}

/// Stereotype suffix like ` {static, final}` for the given keywords.
fn stereotype_suffix(modifiers: &[String], keywords: &[&str]) -> String {
    let present: Vec<&str> = keywords
        .iter()
        .filter(|k| modifiers.iter().any(|m| m == *k))
        .copied()
        .collect();
    if present.is_empty() {
        String::new()
    } else {
        format!(" {{{}}}", present.join(", "))
    }
}

fn format_field(field: &Field) -> String {
    format!(
        "{} {} : {}{}",
        visibility(&field.modifiers),
        field.name,
        simple(&field.type_name),
        stereotype_suffix(&field.modifiers, &["static", "final"]),
    )
}

fn format_method(method: &Method) -> String {
    let params: Vec<&str> = method.parameter_types.iter().map(|p| simple(p)).collect();
    format!(
        "{} {}({}) : {}{}",
        visibility(&method.modifiers),
        method.name,
        params.join(", "),
        simple(&method.return_type),
        stereotype_suffix(&method.modifiers, &["abstract", "static"]),
    )
}

/// Last segment of a dotted name, for compact member display.
fn simple(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Relationship;
    use std::collections::BTreeMap;

    fn entity(fqn: &str, kind: EntityKind) -> Entity {
        Entity {
            name: fqn.to_string(),
            package: fqn.rsplit_once('.').map(|(p, _)| p.to_string()).unwrap_or_default(),
            kind,
            modifiers: vec![],
            fields: vec![],
            methods: vec![],
            extends: None,
            implements: vec![],
        }
    }

    fn model_of(entities: Vec<Entity>, relationships: Vec<Relationship>) -> GlobalModel {
        let entities: BTreeMap<String, Entity> =
            entities.into_iter().map(|e| (e.name.clone(), e)).collect();
        GlobalModel { entities, relationships }
    }

    #[test]
    fn nodes_are_sorted_by_qualified_name() {
        let model = model_of(
            vec![
                entity("com.app.Zebra", EntityKind::Class),
                entity("com.app.Ant", EntityKind::Class),
                entity("aaa.first.Thing", EntityKind::Interface),
            ],
            vec![],
        );
        let diagram = synthesize(&model);
        let names: Vec<&str> = diagram.nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["aaa.first.Thing", "com.app.Ant", "com.app.Zebra"]);
    }

    #[test]
    fn member_lines_use_visibility_and_stereotypes() {
        let mut e = entity("com.app.Dog", EntityKind::Class);
        e.fields.push(Field {
            name: "count".to_string(),
            type_name: "int".to_string(),
            modifiers: vec!["private".to_string(), "static".to_string()],
        });
        e.methods.push(Method {
            name: "bark".to_string(),
            return_type: "void".to_string(),
            parameter_types: vec!["com.app.Sound".to_string()],
            modifiers: vec!["public".to_string()],
            referenced_types: vec![],
        });
        let diagram = synthesize(&model_of(vec![e], vec![]));
        assert_eq!(diagram.nodes[0].members[0], "- count : int {static}");
        assert_eq!(diagram.nodes[0].members[1], "+ bark(Sound) : void");
    }

    #[test]
    fn abstract_classes_are_marked() {
        let mut e = entity("com.app.Animal", EntityKind::Class);
        e.modifiers = vec!["abstract".to_string(), "public".to_string()];
        let diagram = synthesize(&model_of(vec![e], vec![]));
        assert!(diagram.nodes[0].is_abstract);
    }

    #[test]
    fn external_targets_get_declared_nodes() {
        let model = model_of(
            vec![entity("com.app.A", EntityKind::Class)],
            vec![Relationship {
                source: "com.app.A".to_string(),
                target: "java.util.List".to_string(),
                kind: RelationKind::Composition,
                external: true,
            }],
        );
        let diagram = synthesize(&model);
        let external = diagram.node("java.util.List").unwrap();
        assert_eq!(external.stereotype.as_deref(), Some("external"));
        assert!(external.members.is_empty());
    }

    #[test]
    fn synthesis_is_deterministic() {
        let model = model_of(
            vec![
                entity("com.app.B", EntityKind::Class),
                entity("com.app.A", EntityKind::Class),
            ],
            vec![Relationship {
                source: "com.app.B".to_string(),
                target: "com.app.A".to_string(),
                kind: RelationKind::Inheritance,
                external: false,
            }],
        );
        assert_eq!(synthesize(&model), synthesize(&model));
    }
}
