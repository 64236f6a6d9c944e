//! # Wire-Type Projector
//!
//! Derives the abstract wire type of a field, the building block of the OpenAPI
//! fragment a wire model is later generated from.

use crate::naming::to_snake_case;
use crate::schema::ModelField;
use crate::shape::{ScalarKind, Shape};
use serde::Serialize;
use std::fmt::{self, Display};
use std::str::FromStr;

/// Kind of a wire value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WireKind {
    /// `string`
    String,
    /// `integer`
    Integer,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
    /// `array`
    Array,
    /// A reference to another schema fragment.
    ObjectRef,
}

impl WireKind {
    /// The OpenAPI type keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            WireKind::String => "string",
            WireKind::Integer => "integer",
            WireKind::Number => "number",
            WireKind::Boolean => "boolean",
            WireKind::Array => "array",
            WireKind::ObjectRef => "object",
        }
    }
}

impl Display for WireKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WireKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "string" => Ok(WireKind::String),
            "integer" => Ok(WireKind::Integer),
            "number" => Ok(WireKind::Number),
            "boolean" => Ok(WireKind::Boolean),
            "array" => Ok(WireKind::Array),
            "object" | "objectRef" => Ok(WireKind::ObjectRef),
            other => Err(format!("Unknown wire type '{}'", other)),
        }
    }
}

/// Abstract wire type of one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireTypeDescriptor {
    /// Value kind.
    pub kind: WireKind,
    /// OpenAPI `format`, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Whether `null` is allowed.
    pub nullable: bool,
    /// Element descriptor, present iff `kind` is `Array`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<WireTypeDescriptor>>,
    /// Referenced schema name, present iff `kind` is `ObjectRef`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_name: Option<String>,
}

impl WireTypeDescriptor {
    /// A non-nullable descriptor of `kind` without format.
    pub fn of(kind: WireKind) -> Self {
        Self {
            kind,
            format: None,
            nullable: false,
            items: None,
            ref_name: None,
        }
    }

    /// Sets the format.
    pub fn with_format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    /// Marks the descriptor nullable.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// A reference to the fragment of `name`.
    pub fn object_ref(name: &str) -> Self {
        Self {
            ref_name: Some(name.to_string()),
            ..Self::of(WireKind::ObjectRef)
        }
    }

    /// A nullable array of `items`.
    pub fn array(items: WireTypeDescriptor) -> Self {
        Self {
            items: Some(Box::new(items)),
            nullable: true,
            ..Self::of(WireKind::Array)
        }
    }

    /// Whether the property belongs in the schema's `required` list.
    pub fn is_required(&self) -> bool {
        !self.nullable
    }

    /// `$ref` target of an object reference, pointing at the referenced type's
    /// generated fragment.
    pub fn fragment_ref(&self) -> Option<String> {
        match (self.kind, &self.ref_name) {
            (WireKind::ObjectRef, Some(name)) => Some(format!(
                "./{}.gen.yaml#/components/schemas/{}",
                to_snake_case(name),
                name
            )),
            _ => None,
        }
    }
}

/// Projects a field.
///
/// A complete `openapi_*` override wins outright, nullability included; otherwise
/// the field's shape is projected.
pub fn project(field: &ModelField) -> WireTypeDescriptor {
    let annotations = &field.annotations;
    let descriptor = match annotations.wire_override() {
        Some(descriptor) => descriptor,
        None => {
            if annotations.has_wire_override() {
                tracing::warn!(field = %field.name, "incomplete wire override ignored");
            }
            project_shape(&field.shape())
        }
    };

    tracing::trace!(field = %field.name, kind = %descriptor.kind, "projected wire type");
    descriptor
}

/// Projects a shape without any annotation.
pub fn project_shape(shape: &Shape) -> WireTypeDescriptor {
    match shape {
        Shape::Pointer { elem } => project_shape(elem).nullable(),
        Shape::Slice { elem } => {
            let mut items = project_shape(elem);
            items.nullable = false;
            WireTypeDescriptor::array(items)
        }
        Shape::Scalar { kind } => project_scalar(*kind),
        Shape::Named { .. } if shape.is_soft_delete_marker() => {
            WireTypeDescriptor::of(WireKind::String)
                .with_format("date-time")
                .nullable()
        }
        Shape::Named { .. } if shape.is_timestamp() => {
            WireTypeDescriptor::of(WireKind::String).with_format("date-time")
        }
        Shape::Named { name, .. } => {
            let bare = name.rsplit('.').next().unwrap_or(name);
            WireTypeDescriptor::object_ref(bare)
        }
    }
}

fn project_scalar(kind: ScalarKind) -> WireTypeDescriptor {
    match kind {
        ScalarKind::String => WireTypeDescriptor::of(WireKind::String),
        ScalarKind::Bool => WireTypeDescriptor::of(WireKind::Boolean),
        ScalarKind::Int | ScalarKind::Uint => WireTypeDescriptor::of(WireKind::Integer),
        ScalarKind::Int8
        | ScalarKind::Int16
        | ScalarKind::Int32
        | ScalarKind::Uint8
        | ScalarKind::Uint16
        | ScalarKind::Uint32 => WireTypeDescriptor::of(WireKind::Integer).with_format("int32"),
        ScalarKind::Int64 | ScalarKind::Uint64 | ScalarKind::Duration => {
            WireTypeDescriptor::of(WireKind::Integer).with_format("int64")
        }
        ScalarKind::Float32 | ScalarKind::Float64 => {
            WireTypeDescriptor::of(WireKind::Number).with_format("float")
        }
        ScalarKind::Decimal => WireTypeDescriptor::of(WireKind::String).with_format("decimal"),
    }
}

/// Name of the wire property carrying `field`.
pub fn property_name(field: &ModelField) -> String {
    to_snake_case(&field.name)
}
