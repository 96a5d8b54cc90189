//! Tree-sitter traversal for Java source files.
//!
//! The grammar is walked with exhaustive matches on the node kinds that
//! carry structure (type declarations, members, bodies); everything else
//! is skipped. Hint targets are qualified against the file's explicit
//! imports; unknown simple names are kept as placeholders for assembly.

use std::collections::{BTreeMap, BTreeSet};

use tree_sitter::{Node, Parser};

use super::{FileModel, RelationHint};
use crate::model::{Diagnostic, Entity, EntityKind, Field, Method, RelationKind};

pub(super) fn extract_file(path: &str, content: &str) -> Result<FileModel, Diagnostic> {
    let mut parser = Parser::new();
    let language: tree_sitter::Language = tree_sitter_java::LANGUAGE.into();
    parser.set_language(&language).map_err(|e| Diagnostic::ParseFailure {
        path: path.to_string(),
        message: format!("failed to load Java grammar: {e}"),
    })?;

    let Some(tree) = parser.parse(content, None) else {
        return Err(Diagnostic::ParseFailure {
            path: path.to_string(),
            message: "parser produced no tree".to_string(),
        });
    };
    let root = tree.root_node();
    if root.has_error() {
        return Err(Diagnostic::ParseFailure {
            path: path.to_string(),
            message: "syntax error".to_string(),
        });
    }

    let src = content.as_bytes();
    let package = find_package(root, src);
    let mut walker = Walker {
        src,
        package: package.clone(),
        imports: collect_imports(root, src),
        entities: Vec::new(),
        hints: Vec::new(),
        seen_hints: BTreeSet::new(),
    };
    walker.visit_scope(root, &package);

    Ok(FileModel {
        path: path.to_string(),
        package,
        entities: walker.entities,
        hints: walker.hints,
    })
}

struct Walker<'a> {
    src: &'a [u8],
    package: String,
    imports: BTreeMap<String, String>,
    entities: Vec<Entity>,
    hints: Vec<RelationHint>,
    seen_hints: BTreeSet<(String, String, RelationKind)>,
}

impl Walker<'_> {
    /// Visits a scope (program or type body) looking for type declarations.
    fn visit_scope(&mut self, node: Node, prefix: &str) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "class_declaration" => self.visit_type(child, EntityKind::Class, prefix),
                "interface_declaration" => self.visit_type(child, EntityKind::Interface, prefix),
                "enum_declaration" => self.visit_type(child, EntityKind::Enum, prefix),
                "annotation_type_declaration" => {
                    self.visit_type(child, EntityKind::Annotation, prefix);
                }
                _ => {}
            }
        }
    }

    fn visit_type(&mut self, node: Node, kind: EntityKind, prefix: &str) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let simple = node_text(name_node, self.src).to_string();
        let fqn = format!("{prefix}.{simple}");

        let extends = if kind == EntityKind::Class {
            node.child_by_field_name("superclass")
                .and_then(|sc| first_type_name(sc, self.src))
                .map(|raw| self.qualify(&raw))
        } else {
            None
        };
        if let Some(target) = &extends {
            self.push_hint(&fqn, &simple, target, RelationKind::Inheritance);
        }

        let mut implements = Vec::new();
        for raw in interface_names(node, self.src) {
            let target = self.qualify(&raw);
            self.push_hint(&fqn, &simple, &target, RelationKind::Implementation);
            implements.push(target);
        }

        let mut entity = Entity {
            name: fqn.clone(),
            package: self.package.clone(),
            kind,
            modifiers: modifier_list(node, self.src),
            fields: Vec::new(),
            methods: Vec::new(),
            extends,
            implements,
        };

        if let Some(body) = node.child_by_field_name("body") {
            self.visit_body(body, &mut entity, &simple);
        }

        self.entities.push(entity);
    }

    /// Visits the members of a type body, recursing into nested types.
    fn visit_body(&mut self, body: Node, entity: &mut Entity, simple: &str) {
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            match member.kind() {
                "field_declaration" | "constant_declaration" => {
                    self.visit_field(member, entity, simple);
                }
                "method_declaration" => {
                    let method = self.visit_method(member, &entity.name, simple);
                    entity.methods.push(method);
                }
                "enum_constant" => {
                    if let Some(name_node) = member.child_by_field_name("name") {
                        entity.fields.push(Field {
                            name: node_text(name_node, self.src).to_string(),
                            type_name: simple.to_string(),
                            modifiers: vec!["final".to_string(), "static".to_string()],
                        });
                    }
                }
                // Enum members past the constant list live in a nested block.
                "enum_body_declarations" => self.visit_body(member, entity, simple),
                "class_declaration" => self.visit_type(member, EntityKind::Class, &entity.name),
                "interface_declaration" => {
                    self.visit_type(member, EntityKind::Interface, &entity.name);
                }
                "enum_declaration" => self.visit_type(member, EntityKind::Enum, &entity.name),
                "annotation_type_declaration" => {
                    self.visit_type(member, EntityKind::Annotation, &entity.name);
                }
                _ => {}
            }
        }
    }

    fn visit_field(&mut self, node: Node, entity: &mut Entity, simple: &str) {
        let Some(type_node) = node.child_by_field_name("type") else {
            return;
        };
        let Some(base) = erased_type(type_node, self.src) else {
            return;
        };
        let type_name = self.qualify(&base);
        self.push_hint(&entity.name, simple, &type_name, RelationKind::Composition);
        for arg in type_argument_names(type_node, self.src) {
            let target = self.qualify(&arg);
            self.push_hint(&entity.name, simple, &target, RelationKind::Dependency);
        }

        let modifiers = modifier_list(node, self.src);
        let mut cursor = node.walk();
        for declarator in node.named_children(&mut cursor) {
            if declarator.kind() == "variable_declarator" {
                if let Some(name_node) = declarator.child_by_field_name("name") {
                    entity.fields.push(Field {
                        name: node_text(name_node, self.src).to_string(),
                        type_name: type_name.clone(),
                        modifiers: modifiers.clone(),
                    });
                }
            }
        }
    }

    fn visit_method(&mut self, node: Node, entity_fqn: &str, simple: &str) -> Method {
        let name = node
            .child_by_field_name("name")
            .map(|n| node_text(n, self.src).to_string())
            .unwrap_or_default();

        let return_type = node
            .child_by_field_name("type")
            .and_then(|t| {
                for arg in type_argument_names(t, self.src) {
                    let target = self.qualify(&arg);
                    self.push_hint(entity_fqn, simple, &target, RelationKind::Dependency);
                }
                erased_type(t, self.src)
            })
            .map_or_else(|| "void".to_string(), |raw| self.qualify(&raw));
        self.push_hint(entity_fqn, simple, &return_type, RelationKind::Dependency);

        let mut parameter_types = Vec::new();
        if let Some(params) = node.child_by_field_name("parameters") {
            let mut cursor = params.walk();
            for param in params.named_children(&mut cursor) {
                if !matches!(param.kind(), "formal_parameter" | "spread_parameter") {
                    continue;
                }
                if let Some(type_node) = param.child_by_field_name("type") {
                    if let Some(base) = erased_type(type_node, self.src) {
                        let target = self.qualify(&base);
                        self.push_hint(entity_fqn, simple, &target, RelationKind::Dependency);
                        parameter_types.push(target);
                    }
                    for arg in type_argument_names(type_node, self.src) {
                        let target = self.qualify(&arg);
                        self.push_hint(entity_fqn, simple, &target, RelationKind::Dependency);
                    }
                }
            }
        }

        let mut referenced = BTreeSet::new();
        if let Some(body) = node.child_by_field_name("body") {
            collect_body_references(body, self.src, &mut referenced);
        }
        let referenced_types: Vec<String> = referenced
            .iter()
            .map(|raw| self.qualify(raw))
            .filter(|t| !is_primitive(t) && t != simple && t != entity_fqn)
            .collect();
        for target in &referenced_types {
            self.push_hint(entity_fqn, simple, target, RelationKind::Dependency);
        }

        Method {
            name,
            return_type,
            parameter_types,
            modifiers: modifier_list(node, self.src),
            referenced_types,
        }
    }

    /// Records a hint unless it is primitive, a self-reference, or a repeat.
    fn push_hint(&mut self, source: &str, simple: &str, target: &str, kind: RelationKind) {
        if is_primitive(target) || target == simple || target == source {
            return;
        }
        let key = (source.to_string(), target.to_string(), kind);
        if self.seen_hints.insert(key) {
            self.hints.push(RelationHint {
                source: source.to_string(),
                target: target.to_string(),
                kind,
            });
        }
    }

    fn qualify(&self, raw: &str) -> String {
        if raw.contains('.') {
            raw.to_string()
        } else {
            self.imports.get(raw).cloned().unwrap_or_else(|| raw.to_string())
        }
    }
}

/// Returns the declared package name, or `default` when absent.
fn find_package(root: Node, src: &[u8]) -> String {
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        if child.kind() == "package_declaration" {
            let mut inner = child.walk();
            for part in child.named_children(&mut inner) {
                if matches!(part.kind(), "scoped_identifier" | "identifier") {
                    return node_text(part, src).to_string();
                }
            }
        }
    }
    "default".to_string()
}

/// Maps simple names to fully-qualified names from explicit imports.
///
/// Wildcard and static imports are ignored; they cannot be resolved to a
/// single type name syntactically.
fn collect_imports(root: Node, src: &[u8]) -> BTreeMap<String, String> {
    let mut imports = BTreeMap::new();
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        if child.kind() != "import_declaration" {
            continue;
        }
        let mut is_static = false;
        let mut is_wildcard = false;
        let mut path = None;
        let mut inner = child.walk();
        for part in child.children(&mut inner) {
            match part.kind() {
                "static" => is_static = true,
                "asterisk" => is_wildcard = true,
                "scoped_identifier" | "identifier" => {
                    path = Some(node_text(part, src).to_string());
                }
                _ => {}
            }
        }
        if is_static || is_wildcard {
            continue;
        }
        if let Some(path) = path {
            if let Some((_, simple)) = path.rsplit_once('.') {
                imports.insert(simple.to_string(), path);
            }
        }
    }
    imports
}

/// Interface names from `implements` / `extends` clauses.
///
/// For interfaces the `extends` list is recorded alongside a class's
/// `implements` list; both resolve to implementation edges.
fn interface_names(node: Node, src: &[u8]) -> Vec<String> {
    let mut names = Vec::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if matches!(child.kind(), "super_interfaces" | "extends_interfaces") {
            let mut inner = child.walk();
            for part in child.named_children(&mut inner) {
                if part.kind() == "type_list" {
                    let mut types = part.walk();
                    for t in part.named_children(&mut types) {
                        if let Some(name) = erased_type(t, src) {
                            names.push(name);
                        }
                    }
                }
            }
        }
    }
    names
}

/// Declared modifier keywords, excluding annotations, sorted and deduped.
fn modifier_list(node: Node, src: &[u8]) -> Vec<String> {
    let mut out = Vec::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() != "modifiers" {
            continue;
        }
        let mut inner = child.walk();
        for modifier in child.children(&mut inner) {
            if !matches!(modifier.kind(), "marker_annotation" | "annotation") {
                out.push(node_text(modifier, src).to_string());
            }
        }
    }
    out.sort();
    out.dedup();
    out
}

/// The base name of a type node, erased of generics and array brackets.
fn erased_type(node: Node, src: &[u8]) -> Option<String> {
    match node.kind() {
        "type_identifier" | "scoped_type_identifier" | "identifier" | "integral_type"
        | "floating_point_type" | "boolean_type" | "void_type" => {
            Some(node_text(node, src).to_string())
        }
        "array_type" => node.child_by_field_name("element").and_then(|e| erased_type(e, src)),
        "generic_type" => {
            let mut cursor = node.walk();
            let result = node.named_children(&mut cursor).find_map(|c| match c.kind() {
                "type_identifier" | "scoped_type_identifier" => {
                    Some(node_text(c, src).to_string())
                }
                _ => None,
            });
            result
        }
        _ => {
            let mut cursor = node.walk();
            let child = node.named_children(&mut cursor).next()?;
            erased_type(child, src)
        }
    }
}

/// Type names appearing as generic arguments anywhere inside a type node.
fn type_argument_names(node: Node, src: &[u8]) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "type_arguments" {
            collect_type_identifiers(child, src, &mut names);
        } else {
            names.extend(type_argument_names(child, src));
        }
    }
    names
}

fn collect_type_identifiers(node: Node, src: &[u8], out: &mut BTreeSet<String>) {
    if node.kind() == "type_identifier" {
        out.insert(node_text(node, src).to_string());
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_type_identifiers(child, src, out);
    }
}

/// Best-effort type references inside a method body: object creations,
/// casts, local declarations, and capitalized invocation receivers.
fn collect_body_references(node: Node, src: &[u8], out: &mut BTreeSet<String>) {
    match node.kind() {
        "object_creation_expression" | "cast_expression" | "local_variable_declaration" => {
            if let Some(type_node) = node.child_by_field_name("type") {
                collect_type_identifiers(type_node, src, out);
                if let Some(base) = erased_type(type_node, src) {
                    out.insert(base);
                }
            }
        }
        "method_invocation" | "field_access" => {
            if let Some(object) = node.child_by_field_name("object") {
                if object.kind() == "identifier" {
                    let name = node_text(object, src);
                    if name.chars().next().is_some_and(char::is_uppercase) {
                        out.insert(name.to_string());
                    }
                }
            }
        }
        _ => {}
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_body_references(child, src, out);
    }
}

fn node_text<'a>(node: Node, src: &'a [u8]) -> &'a str {
    node.utf8_text(src).unwrap_or("")
}

/// The superclass clause wraps a single type node.
fn first_type_name(node: Node, src: &[u8]) -> Option<String> {
    let mut cursor = node.walk();
    let result = node.named_children(&mut cursor).find_map(|c| erased_type(c, src));
    result
}

fn is_primitive(name: &str) -> bool {
    matches!(
        name,
        "int" | "long" | "short" | "byte" | "float" | "double" | "boolean" | "char" | "void"
            | "var"
    )
}
