//! Structural model of an analyzed Java codebase.
//!
//! Entities and relationships are collected per file by `extract`, merged
//! into one [`GlobalModel`] by `assemble`, and read-only afterwards. Both
//! diagram stages consume the model without mutating it.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of a modeled Java type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    /// A concrete or abstract class.
    Class,
    /// An interface.
    Interface,
    /// An enum.
    Enum,
    /// An annotation type.
    Annotation,
}

impl EntityKind {
    /// The declaration keyword used in diagram output.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            EntityKind::Class => "class",
            EntityKind::Interface => "interface",
            EntityKind::Enum => "enum",
            EntityKind::Annotation => "annotation",
        }
    }
}

/// A field declared on an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field name.
    pub name: String,
    /// Declared type name, as written (erased of generics).
    pub type_name: String,
    /// Declared modifiers, sorted and deduplicated.
    pub modifiers: Vec<String>,
}

/// A method declared on an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    /// Method name.
    pub name: String,
    /// Declared return type name.
    pub return_type: String,
    /// Parameter type names in declaration order.
    pub parameter_types: Vec<String>,
    /// Declared modifiers, sorted and deduplicated.
    pub modifiers: Vec<String>,
    /// Type names referenced in the body, best-effort. Used only to
    /// infer dependency edges; never part of member summaries.
    pub referenced_types: Vec<String>,
}

/// One top-level or nested Java type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Fully-qualified name; the unique key in the global model.
    pub name: String,
    /// Package the type was declared in (`default` when absent).
    pub package: String,
    /// Declaration kind.
    pub kind: EntityKind,
    /// Declared modifiers, sorted and deduplicated.
    pub modifiers: Vec<String>,
    /// Fields in declaration order.
    pub fields: Vec<Field>,
    /// Methods in declaration order.
    pub methods: Vec<Method>,
    /// Declared supertype name as written, if any.
    pub extends: Option<String>,
    /// Declared interface names as written.
    pub implements: Vec<String>,
}

impl Entity {
    /// The last segment of the fully-qualified name.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Returns `true` if the entity carries the given modifier.
    #[must_use]
    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }
}

/// The kind of a directed relationship edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RelationKind {
    /// `extends` between classes, or between interfaces.
    Inheritance,
    /// `implements` from a class to an interface.
    Implementation,
    /// A field whose type is another entity.
    Composition,
    /// Method-level usage: signature types or body references.
    Dependency,
}

impl RelationKind {
    /// Fixed ordering priority used when emitting edges.
    #[must_use]
    pub fn priority(self) -> u8 {
        match self {
            RelationKind::Inheritance => 0,
            RelationKind::Implementation => 1,
            RelationKind::Composition => 2,
            RelationKind::Dependency => 3,
        }
    }

    /// Human-readable edge label used in diagram output.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            RelationKind::Inheritance => "extends",
            RelationKind::Implementation => "implements",
            RelationKind::Composition => "has",
            RelationKind::Dependency => "uses",
        }
    }
}

/// A directed, typed edge between two entities.
///
/// `(source, target, kind)` is unique within a model. When `external` is
/// set the target names a type outside the analyzed tree and is not a key
/// in the entity set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// Fully-qualified name of the source entity.
    pub source: String,
    /// Fully-qualified name of the target entity, or the raw name of an
    /// external type.
    pub target: String,
    /// Edge kind.
    pub kind: RelationKind,
    /// `true` when the target is not part of the analyzed tree.
    pub external: bool,
}

/// The complete set of entities and relationships for one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalModel {
    /// Entities keyed by fully-qualified name.
    pub entities: BTreeMap<String, Entity>,
    /// Deduplicated edges in deterministic order.
    pub relationships: Vec<Relationship>,
}

impl GlobalModel {
    /// Returns `true` if the model contains no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// A recoverable problem recorded during a run and surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Diagnostic {
    /// A file could not be parsed; it contributed zero entities.
    ParseFailure {
        /// Path of the file that failed to parse.
        path: String,
        /// What went wrong.
        message: String,
    },
    /// A simple-name reference matched more than one entity.
    Ambiguity {
        /// Fully-qualified name of the edge source.
        entity: String,
        /// How the reference was tie-broken.
        message: String,
    },
    /// The same fully-qualified name was declared more than once.
    Collision {
        /// The colliding fully-qualified name.
        entity: String,
        /// Which observation won.
        message: String,
    },
    /// The delegated simplification was rejected or unavailable.
    Simplification {
        /// Why the fallback heuristic was used.
        message: String,
    },
}

impl Diagnostic {
    /// One-line rendering for summaries and logs.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Diagnostic::ParseFailure { path, message } => format!("parse failure in {path}: {message}"),
            Diagnostic::Ambiguity { entity, message } => format!("ambiguous reference from {entity}: {message}"),
            Diagnostic::Collision { entity, message } => format!("duplicate declaration of {entity}: {message}"),
            Diagnostic::Simplification { message } => format!("simplification fallback: {message}"),
        }
    }
}

/// The `model.yaml` artifact: the assembled model plus run metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelReport {
    /// Root of the analyzed source tree.
    pub root: String,
    /// When the model was assembled.
    pub generated_at: DateTime<Utc>,
    /// Number of entities in the model.
    pub entity_count: usize,
    /// Number of relationship edges in the model.
    pub relationship_count: usize,
    /// The assembled model.
    pub model: GlobalModel,
    /// Diagnostics recorded during extraction and assembly.
    pub diagnostics: Vec<Diagnostic>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(name: &str, kind: EntityKind) -> Entity {
        Entity {
            name: name.to_string(),
            package: name.rsplit_once('.').map(|(p, _)| p.to_string()).unwrap_or_default(),
            kind,
            modifiers: vec![],
            fields: vec![],
            methods: vec![],
            extends: None,
            implements: vec![],
        }
    }

    #[test]
    fn simple_name_is_last_segment() {
        let e = entity("com.app.service.UserService", EntityKind::Class);
        assert_eq!(e.simple_name(), "UserService");
    }

    #[test]
    fn simple_name_of_nested_type() {
        let e = entity("com.app.Outer.Inner", EntityKind::Class);
        assert_eq!(e.simple_name(), "Inner");
    }

    #[test]
    fn relation_kind_priority_order() {
        let mut kinds = vec![
            RelationKind::Dependency,
            RelationKind::Inheritance,
            RelationKind::Composition,
            RelationKind::Implementation,
        ];
        kinds.sort_by_key(|k| k.priority());
        assert_eq!(
            kinds,
            vec![
                RelationKind::Inheritance,
                RelationKind::Implementation,
                RelationKind::Composition,
                RelationKind::Dependency,
            ]
        );
    }

    #[test]
    fn model_report_round_trips_through_yaml() {
        let mut entities = BTreeMap::new();
        entities.insert("com.app.Dog".to_string(), entity("com.app.Dog", EntityKind::Class));
        let report = ModelReport {
            root: "/project".to_string(),
            generated_at: chrono::DateTime::parse_from_rfc3339("2025-06-15T10:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            entity_count: 1,
            relationship_count: 0,
            model: GlobalModel { entities, relationships: vec![] },
            diagnostics: vec![Diagnostic::ParseFailure {
                path: "Bad.java".to_string(),
                message: "syntax error".to_string(),
            }],
        };
        let yaml = serde_yaml::to_string(&report).unwrap();
        let back: ModelReport = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(report, back);
    }
}
