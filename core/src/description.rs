//! # Structural Descriptions
//!
//! The neutral input of the Introspector: names, types, tags and embedding of the
//! declarations in one package. Produced by [`crate::declarations::read_package`]
//! or handed over as JSON/YAML by any other reflection facility.

use crate::config::{package_qualifier, IntrospectOptions};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A structural type expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeExpr {
    /// A predeclared type (`string`, `int64`, ...).
    Basic {
        /// Identifier of the type.
        name: String,
    },
    /// A declared type, local (`package: None`) or imported.
    Named {
        /// Import path of the declaring package.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        package: Option<String>,
        /// Bare type name.
        name: String,
    },
    /// `*T`
    Pointer {
        /// Pointee.
        elem: Box<TypeExpr>,
    },
    /// `[]T`
    Slice {
        /// Element type.
        elem: Box<TypeExpr>,
    },
    /// `[N]T`
    Array {
        /// Length expression as written.
        len: String,
        /// Element type.
        elem: Box<TypeExpr>,
    },
    /// `map[K]V`
    Map {
        /// Key type.
        key: Box<TypeExpr>,
        /// Value type.
        value: Box<TypeExpr>,
    },
    /// `chan T`
    Chan {
        /// Element type.
        elem: Box<TypeExpr>,
    },
    /// Any function type.
    Func,
    /// Any interface type.
    Interface,
    /// An anonymous or declared struct body.
    Struct {
        /// Members in declaration order.
        members: Vec<MemberDescription>,
    },
}

impl TypeExpr {
    /// Shorthand for a predeclared type.
    pub fn basic(name: &str) -> Self {
        TypeExpr::Basic {
            name: name.to_string(),
        }
    }

    /// Shorthand for a type declared in the same package.
    pub fn local(name: &str) -> Self {
        TypeExpr::Named {
            package: None,
            name: name.to_string(),
        }
    }

    /// Shorthand for an imported type.
    pub fn imported(package: &str, name: &str) -> Self {
        TypeExpr::Named {
            package: Some(package.to_string()),
            name: name.to_string(),
        }
    }

    /// Shorthand for `*elem`.
    pub fn pointer(elem: TypeExpr) -> Self {
        TypeExpr::Pointer {
            elem: Box::new(elem),
        }
    }

    /// Shorthand for `[]elem`.
    pub fn slice(elem: TypeExpr) -> Self {
        TypeExpr::Slice {
            elem: Box::new(elem),
        }
    }

    /// Whether the shape algebra (scalar, pointer, slice, named) covers this type.
    ///
    /// Predeclared types outside the scalar table (complex, uintptr) are not covered.
    pub fn is_classifiable(&self) -> bool {
        match self {
            TypeExpr::Basic { name } => crate::shape::ScalarKind::from_identifier(name).is_some(),
            TypeExpr::Named { .. } => true,
            TypeExpr::Pointer { elem } | TypeExpr::Slice { elem } => elem.is_classifiable(),
            TypeExpr::Array { .. }
            | TypeExpr::Map { .. }
            | TypeExpr::Chan { .. }
            | TypeExpr::Func
            | TypeExpr::Interface
            | TypeExpr::Struct { .. } => false,
        }
    }

    /// Renders the raw type descriptor.
    ///
    /// Types of `local_package` or of the configured module render as bare names;
    /// other imported types keep their package qualifier (`time.Time`).
    pub fn render(&self, local_package: &str, options: &IntrospectOptions) -> String {
        match self {
            TypeExpr::Basic { name } => name.clone(),
            TypeExpr::Named { package, name } => match package.as_deref() {
                None => name.clone(),
                Some(p) if p == local_package || options.is_module_package(p) => name.clone(),
                Some(p) => format!("{}.{}", package_qualifier(p), name),
            },
            TypeExpr::Pointer { elem } => format!("*{}", elem.render(local_package, options)),
            TypeExpr::Slice { elem } => format!("[]{}", elem.render(local_package, options)),
            TypeExpr::Array { len, elem } => {
                format!("[{}]{}", len, elem.render(local_package, options))
            }
            TypeExpr::Map { key, value } => format!(
                "map[{}]{}",
                key.render(local_package, options),
                value.render(local_package, options)
            ),
            TypeExpr::Chan { elem } => format!("chan {}", elem.render(local_package, options)),
            TypeExpr::Func => "func()".to_string(),
            TypeExpr::Interface => "interface{}".to_string(),
            TypeExpr::Struct { .. } => "struct{...}".to_string(),
        }
    }
}

/// One member of a struct body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDescription {
    /// Member name; for embedded members, the bare type name.
    pub name: String,
    /// Member type.
    pub ty: TypeExpr,
    /// Raw struct tag, possibly empty.
    #[serde(default)]
    pub tag: String,
    /// Whether the member is embedded (anonymous).
    #[serde(default)]
    pub embedded: bool,
}

impl MemberDescription {
    /// An ordinary named member.
    pub fn field(name: &str, ty: TypeExpr, tag: &str) -> Self {
        Self {
            name: name.to_string(),
            ty,
            tag: tag.to_string(),
            embedded: false,
        }
    }

    /// An embedded member.
    pub fn embedded(ty: TypeExpr) -> Self {
        let name = embedded_name(&ty);
        Self {
            name,
            ty,
            tag: String::new(),
            embedded: true,
        }
    }

    /// Whether the member is visible outside its package.
    pub fn is_exported(&self) -> bool {
        self.name.chars().next().is_some_and(char::is_uppercase)
    }
}

fn embedded_name(ty: &TypeExpr) -> String {
    match ty {
        TypeExpr::Pointer { elem } => embedded_name(elem),
        TypeExpr::Named { name, .. } | TypeExpr::Basic { name } => name.clone(),
        _ => String::new(),
    }
}

/// A declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescription {
    /// Declared name.
    pub name: String,
    /// Underlying type; models have a `Struct` underlying.
    pub ty: TypeExpr,
}

impl TypeDescription {
    /// A struct declaration.
    pub fn structure(name: &str, members: Vec<MemberDescription>) -> Self {
        Self {
            name: name.to_string(),
            ty: TypeExpr::Struct { members },
        }
    }

    /// Members of the struct body, if this declares a struct.
    pub fn members(&self) -> Option<&[MemberDescription]> {
        match &self.ty {
            TypeExpr::Struct { members } => Some(members),
            _ => None,
        }
    }
}

/// A top-level function declaration. Only the name matters for override binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDescription {
    /// Function name.
    pub name: String,
}

/// Everything declared in one package.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PackageDescription {
    /// Package name (`model`).
    pub name: String,
    /// Import path (`example.com/app/model`); defaults to the name when unknown.
    #[serde(default)]
    pub path: String,
    /// Import aliases to paths, in source order.
    #[serde(default)]
    pub imports: IndexMap<String, String>,
    /// Declared types in source order.
    #[serde(default)]
    pub types: Vec<TypeDescription>,
    /// Declared top-level functions in source order.
    #[serde(default)]
    pub functions: Vec<FunctionDescription>,
}

impl PackageDescription {
    /// An empty package named `name`.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            path: name.to_string(),
            ..Self::default()
        }
    }

    /// Effective import path.
    pub fn import_path(&self) -> &str {
        if self.path.is_empty() {
            &self.name
        } else {
            &self.path
        }
    }

    /// Looks up a declared type by name.
    pub fn find_type(&self, name: &str) -> Option<&TypeDescription> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Whether `package` refers to this package.
    pub fn is_local(&self, package: Option<&str>) -> bool {
        package.map_or(true, |p| p == self.import_path())
    }
}
