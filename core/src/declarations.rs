//! # Declaration Reader
//!
//! Reads Go model source into a [`PackageDescription`] without semantic resolution.
//!
//! The source is parsed with the tree-sitter Go grammar. Only the nodes the
//! Introspector needs are walked: the package clause, import specs, type specs with
//! their struct fields and tags, and the names of top-level functions. Methods,
//! `var` and `const` declarations are ignored.

use crate::config::package_qualifier;
use crate::description::{
    FunctionDescription, MemberDescription, PackageDescription, TypeDescription, TypeExpr,
};
use crate::error::{AppError, AppResult};
use indexmap::IndexMap;
use tree_sitter::{Node, Parser};

fn builtin(name: &str) -> Option<TypeExpr> {
    match name {
        "bool" | "string" | "int" | "int8" | "int16" | "int32" | "int64" | "uint" | "uint8"
        | "uint16" | "uint32" | "uint64" | "uintptr" | "byte" | "rune" | "float32"
        | "float64" | "complex64" | "complex128" => Some(TypeExpr::basic(name)),
        "error" | "any" => Some(TypeExpr::Interface),
        _ => None,
    }
}

fn line_of(node: Node<'_>) -> usize {
    node.start_position().row + 1
}

/// First syntax error of the tree in document order.
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find_map(first_error);
    found
}

/// Value of a Go string literal, quotes removed and escapes resolved.
fn literal_value(text: &str) -> String {
    if let Some(raw) = text.strip_prefix('`') {
        return raw.strip_suffix('`').unwrap_or(raw).to_string();
    }
    let inner = text.strip_prefix('"').unwrap_or(text);
    let inner = inner.strip_suffix('"').unwrap_or(inner);
    let mut value = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    value.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        other => other,
                    });
                }
            }
            other => value.push(other),
        }
    }
    value
}

struct Reader<'s> {
    source: &'s str,
    imports: IndexMap<String, String>,
}

impl<'s> Reader<'s> {
    fn text(&self, node: Node<'_>) -> &'s str {
        node.utf8_text(self.source.as_bytes()).unwrap_or_default()
    }

    fn required<'t>(&self, node: Node<'t>, field: &str) -> AppResult<Node<'t>> {
        node.child_by_field_name(field)
            .ok_or_else(|| AppError::Declaration {
                line: line_of(node),
                message: format!("{} without {}", node.kind(), field),
            })
    }

    fn first_named<'t>(&self, node: Node<'t>) -> AppResult<Node<'t>> {
        let mut cursor = node.walk();
        let child = node
            .named_children(&mut cursor)
            .find(|child| child.kind() != "comment");
        child.ok_or_else(|| AppError::Declaration {
            line: line_of(node),
            message: format!("empty {}", node.kind()),
        })
    }

    fn read_imports(&mut self, declaration: Node<'_>) {
        let mut cursor = declaration.walk();
        for child in declaration.named_children(&mut cursor) {
            match child.kind() {
                "import_spec" => self.read_import_spec(child),
                "import_spec_list" => self.read_imports(child),
                _ => {}
            }
        }
    }

    fn read_import_spec(&mut self, spec: Node<'_>) {
        let Some(path) = spec.child_by_field_name("path") else {
            return;
        };
        let path = literal_value(self.text(path));
        let alias = match spec.child_by_field_name("name") {
            Some(name) => self.text(name).to_string(),
            None => package_qualifier(&path).to_string(),
        };
        self.imports.insert(alias, path);
    }

    fn read_type_declaration(
        &self,
        declaration: Node<'_>,
        types: &mut Vec<TypeDescription>,
    ) -> AppResult<()> {
        let mut cursor = declaration.walk();
        for spec in declaration.named_children(&mut cursor) {
            if !matches!(spec.kind(), "type_spec" | "type_alias") {
                continue;
            }
            let name = self.text(self.required(spec, "name")?).to_string();
            let ty = self.read_type(self.required(spec, "type")?)?;
            types.push(TypeDescription { name, ty });
        }
        Ok(())
    }

    fn read_type(&self, node: Node<'_>) -> AppResult<TypeExpr> {
        match node.kind() {
            "type_identifier" => {
                let name = self.text(node);
                Ok(builtin(name).unwrap_or_else(|| TypeExpr::local(name)))
            }
            "qualified_type" => {
                let qualifier = self.text(self.required(node, "package")?);
                let name = self.text(self.required(node, "name")?);
                let package = self
                    .imports
                    .get(qualifier)
                    .map_or(qualifier, String::as_str);
                Ok(TypeExpr::imported(package, name))
            }
            // Type arguments carry no structure the pipeline uses.
            "generic_type" => self.read_type(self.required(node, "type")?),
            "pointer_type" => Ok(TypeExpr::pointer(self.read_type(self.first_named(node)?)?)),
            "parenthesized_type" => self.read_type(self.first_named(node)?),
            "slice_type" => Ok(TypeExpr::slice(
                self.read_type(self.required(node, "element")?)?,
            )),
            "array_type" => Ok(TypeExpr::Array {
                len: self.text(self.required(node, "length")?).to_string(),
                elem: Box::new(self.read_type(self.required(node, "element")?)?),
            }),
            "map_type" => Ok(TypeExpr::Map {
                key: Box::new(self.read_type(self.required(node, "key")?)?),
                value: Box::new(self.read_type(self.required(node, "value")?)?),
            }),
            "channel_type" => Ok(TypeExpr::Chan {
                elem: Box::new(self.read_type(self.required(node, "value")?)?),
            }),
            "function_type" => Ok(TypeExpr::Func),
            "interface_type" | "negated_type" => Ok(TypeExpr::Interface),
            "struct_type" => Ok(TypeExpr::Struct {
                members: self.read_struct(node)?,
            }),
            other => Err(AppError::Declaration {
                line: line_of(node),
                message: format!("unsupported type expression '{}'", other),
            }),
        }
    }

    fn read_struct(&self, struct_type: Node<'_>) -> AppResult<Vec<MemberDescription>> {
        let body = self.first_named(struct_type)?;
        let mut members = Vec::new();
        let mut cursor = body.walk();
        for declaration in body.named_children(&mut cursor) {
            if declaration.kind() == "field_declaration" {
                self.read_field_declaration(declaration, &mut members)?;
            }
        }
        Ok(members)
    }

    fn read_field_declaration(
        &self,
        declaration: Node<'_>,
        members: &mut Vec<MemberDescription>,
    ) -> AppResult<()> {
        let ty = self.read_type(self.required(declaration, "type")?)?;
        let tag = declaration
            .child_by_field_name("tag")
            .map(|tag| literal_value(self.text(tag)))
            .unwrap_or_default();

        let mut cursor = declaration.walk();
        let names: Vec<&str> = declaration
            .children_by_field_name("name", &mut cursor)
            .map(|name| self.text(name))
            .collect();

        if names.is_empty() {
            let mut cursor = declaration.walk();
            let is_pointer = declaration.children(&mut cursor).any(|c| c.kind() == "*");
            let ty = if is_pointer { TypeExpr::pointer(ty) } else { ty };
            let mut member = MemberDescription::embedded(ty);
            member.tag = tag;
            members.push(member);
        } else {
            members.extend(
                names
                    .into_iter()
                    .map(|name| MemberDescription::field(name, ty.clone(), &tag))
                    .filter(MemberDescription::is_exported),
            );
        }
        Ok(())
    }
}

/// Reads one Go source file.
///
/// `path` is the import path of the package; when empty the package name stands in.
///
/// # Errors
///
/// * `Declaration` with the offending line on a syntax error or a missing package
///   clause.
/// * `General` if the Go grammar cannot be loaded.
pub fn read_package(source: &str, path: &str) -> AppResult<PackageDescription> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|e| AppError::General(format!("Go grammar unavailable: {}", e)))?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| AppError::General("Go parser produced no tree".to_string()))?;
    let root = tree.root_node();

    if let Some(node) = first_error(root) {
        let message = if node.is_missing() {
            format!("missing {}", node.kind())
        } else {
            let text = node.utf8_text(source.as_bytes()).unwrap_or_default();
            format!("unexpected '{}'", text.lines().next().unwrap_or_default().trim())
        };
        return Err(AppError::Declaration {
            line: line_of(node),
            message,
        });
    }

    let mut reader = Reader {
        source,
        imports: IndexMap::new(),
    };

    let mut cursor = root.walk();
    let top_level: Vec<Node<'_>> = root.named_children(&mut cursor).collect();

    let name = top_level
        .iter()
        .find(|node| node.kind() == "package_clause")
        .and_then(|clause| reader.first_named(*clause).ok())
        .map(|name| reader.text(name).to_string())
        .ok_or_else(|| AppError::Declaration {
            line: 1,
            message: "expected package clause".to_string(),
        })?;
    let mut package = PackageDescription::new(&name);
    if !path.is_empty() {
        package.path = path.to_string();
    }

    for node in top_level.iter().filter(|n| n.kind() == "import_declaration") {
        reader.read_imports(*node);
    }

    for node in &top_level {
        match node.kind() {
            "type_declaration" => reader.read_type_declaration(*node, &mut package.types)?,
            "function_declaration" => {
                let name = reader.text(reader.required(*node, "name")?);
                package.functions.push(FunctionDescription {
                    name: name.to_string(),
                });
            }
            _ => {}
        }
    }

    package.imports = reader.imports;
    tracing::debug!(
        package = %package.name,
        types = package.types.len(),
        functions = package.functions.len(),
        "read declarations"
    );
    Ok(package)
}
