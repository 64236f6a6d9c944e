//! # Type Shape Classifier
//!
//! Classifies raw type descriptors (`*[]Part`, `decimal.Decimal`, ...) into a closed
//! shape algebra. Both the Projector and the Synthesizer classify through here, so
//! the same descriptor always yields the same [`Shape`].

use serde::Serialize;
use std::fmt::{self, Display};

/// Descriptor of the plain timestamp type.
pub const TIMESTAMP_TYPE: &str = "time.Time";

/// Descriptor of the soft-delete marker (nullable timestamp plus validity flag).
pub const SOFT_DELETE_TYPE: &str = "gorm.DeletedAt";

const POINTER_MARKER: &str = "*";
const SLICE_MARKER: &str = "[]";

/// Scalar kinds recognized by the fixed scalar table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    /// `string`
    String,
    /// `bool`
    Bool,
    /// `int`
    Int,
    /// `int8`
    Int8,
    /// `int16`
    Int16,
    /// `int32` / `rune`
    Int32,
    /// `int64`
    Int64,
    /// `uint`
    Uint,
    /// `uint8` / `byte`
    Uint8,
    /// `uint16`
    Uint16,
    /// `uint32`
    Uint32,
    /// `uint64`
    Uint64,
    /// `float32`
    Float32,
    /// `float64`
    Float64,
    /// `decimal.Decimal`
    Decimal,
    /// `time.Duration`
    Duration,
}

impl ScalarKind {
    /// Looks up a bare identifier in the scalar table.
    pub fn from_identifier(ident: &str) -> Option<Self> {
        let kind = match ident {
            "string" => ScalarKind::String,
            "bool" => ScalarKind::Bool,
            "int" => ScalarKind::Int,
            "int8" => ScalarKind::Int8,
            "int16" => ScalarKind::Int16,
            "int32" | "rune" => ScalarKind::Int32,
            "int64" => ScalarKind::Int64,
            "uint" => ScalarKind::Uint,
            "uint8" | "byte" => ScalarKind::Uint8,
            "uint16" => ScalarKind::Uint16,
            "uint32" => ScalarKind::Uint32,
            "uint64" => ScalarKind::Uint64,
            "float32" => ScalarKind::Float32,
            "float64" => ScalarKind::Float64,
            "decimal.Decimal" => ScalarKind::Decimal,
            "time.Duration" => ScalarKind::Duration,
            _ => return None,
        };
        Some(kind)
    }

    /// The canonical descriptor of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Bool => "bool",
            ScalarKind::Int => "int",
            ScalarKind::Int8 => "int8",
            ScalarKind::Int16 => "int16",
            ScalarKind::Int32 => "int32",
            ScalarKind::Int64 => "int64",
            ScalarKind::Uint => "uint",
            ScalarKind::Uint8 => "uint8",
            ScalarKind::Uint16 => "uint16",
            ScalarKind::Uint32 => "uint32",
            ScalarKind::Uint64 => "uint64",
            ScalarKind::Float32 => "float32",
            ScalarKind::Float64 => "float64",
            ScalarKind::Decimal => "decimal.Decimal",
            ScalarKind::Duration => "time.Duration",
        }
    }

    /// Integer kinds, including `Duration` (an `int64` underneath).
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            ScalarKind::Int
                | ScalarKind::Int8
                | ScalarKind::Int16
                | ScalarKind::Int32
                | ScalarKind::Int64
                | ScalarKind::Uint
                | ScalarKind::Uint8
                | ScalarKind::Uint16
                | ScalarKind::Uint32
                | ScalarKind::Uint64
                | ScalarKind::Duration
        )
    }

    /// Floating point kinds.
    pub fn is_float(self) -> bool {
        matches!(self, ScalarKind::Float32 | ScalarKind::Float64)
    }

    /// Whether a value of this kind can be cast to `other` by a numeric conversion.
    ///
    /// `string`, `bool` and `Decimal` convert to nothing but themselves.
    pub fn converts_to(self, other: ScalarKind) -> bool {
        let numeric = |k: ScalarKind| k.is_integer() || k.is_float();
        self == other || (numeric(self) && numeric(other))
    }
}

impl Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structural classification of a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Shape {
    /// A type from the scalar table.
    Scalar {
        /// The scalar kind.
        kind: ScalarKind,
    },
    /// `*T`
    Pointer {
        /// Pointee shape.
        elem: Box<Shape>,
    },
    /// `[]T`
    Slice {
        /// Element shape.
        elem: Box<Shape>,
    },
    /// Any other type, by name.
    Named {
        /// Name as it appears in the descriptor (`Part`, `time.Time`).
        name: String,
        /// Whether the type lives in another package (a library type).
        external: bool,
    },
}

/// Classifies a raw type descriptor.
///
/// A leading `*` yields `Pointer`, a leading `[]` yields `Slice`; the remaining
/// identifier is looked up in the scalar table and is `Named` otherwise.
pub fn classify(descriptor: &str) -> Shape {
    let descriptor = descriptor.trim();
    if let Some(rest) = descriptor.strip_prefix(POINTER_MARKER) {
        return Shape::Pointer {
            elem: Box::new(classify(rest)),
        };
    }
    if let Some(rest) = descriptor.strip_prefix(SLICE_MARKER) {
        return Shape::Slice {
            elem: Box::new(classify(rest)),
        };
    }
    match ScalarKind::from_identifier(descriptor) {
        Some(kind) => Shape::Scalar { kind },
        None => Shape::Named {
            name: descriptor.to_string(),
            external: descriptor.contains('.'),
        },
    }
}

impl Shape {
    /// Strips one pointer layer, reporting whether there was one.
    pub fn unwrap_pointer(&self) -> (&Shape, bool) {
        match self {
            Shape::Pointer { elem } => (elem, true),
            other => (other, false),
        }
    }

    /// Whether this is the plain timestamp type.
    pub fn is_timestamp(&self) -> bool {
        matches!(self, Shape::Named { name, .. } if name == TIMESTAMP_TYPE)
    }

    /// Whether this is the soft-delete marker type.
    pub fn is_soft_delete_marker(&self) -> bool {
        matches!(self, Shape::Named { name, .. } if name == SOFT_DELETE_TYPE)
    }

    /// Whether the value may be absent (pointer-wrapped at the top level).
    pub fn is_optional(&self) -> bool {
        matches!(self, Shape::Pointer { .. })
    }
}

impl Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Scalar { kind } => write!(f, "{}", kind),
            Shape::Pointer { elem } => write!(f, "{}{}", POINTER_MARKER, elem),
            Shape::Slice { elem } => write!(f, "{}{}", SLICE_MARKER, elem),
            Shape::Named { name, .. } => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn named(name: &str) -> Shape {
        Shape::Named {
            name: name.to_string(),
            external: name.contains('.'),
        }
    }

    fn ptr(elem: Shape) -> Shape {
        Shape::Pointer {
            elem: Box::new(elem),
        }
    }

    fn slice(elem: Shape) -> Shape {
        Shape::Slice {
            elem: Box::new(elem),
        }
    }

    #[test]
    fn test_scalars() {
        assert_eq!(
            classify("uint"),
            Shape::Scalar {
                kind: ScalarKind::Uint
            }
        );
        assert_eq!(
            classify("decimal.Decimal"),
            Shape::Scalar {
                kind: ScalarKind::Decimal
            }
        );
        assert_eq!(
            classify("byte"),
            Shape::Scalar {
                kind: ScalarKind::Uint8
            }
        );
    }

    #[test]
    fn test_pointer_slice_combinations_are_distinct() {
        let cases = [
            ("[]T", slice(named("T"))),
            ("*[]T", ptr(slice(named("T")))),
            ("[]*T", slice(ptr(named("T")))),
            ("*[]*T", ptr(slice(ptr(named("T"))))),
        ];
        for (descriptor, expected) in &cases {
            assert_eq!(&classify(descriptor), expected, "{}", descriptor);
        }
        for (i, (a, _)) in cases.iter().enumerate() {
            for (b, _) in cases.iter().skip(i + 1) {
                assert_ne!(classify(a), classify(b));
            }
        }
    }

    #[test]
    fn test_named_external_flag() {
        assert_eq!(classify("time.Time"), named("time.Time"));
        assert!(classify("time.Time").is_timestamp());
        assert!(classify("gorm.DeletedAt").is_soft_delete_marker());
        assert_eq!(
            classify("Part"),
            Shape::Named {
                name: "Part".into(),
                external: false
            }
        );
    }

    #[test]
    fn test_display_round_trips_descriptor() {
        for descriptor in ["*[]*Part", "[]string", "*time.Time", "decimal.Decimal"] {
            assert_eq!(classify(descriptor).to_string(), descriptor);
        }
    }

    #[test]
    fn test_classify_is_deterministic() {
        assert_eq!(classify("*[]*Part"), classify("*[]*Part"));
    }

    #[test]
    fn test_converts_to() {
        assert!(ScalarKind::Int.converts_to(ScalarKind::Uint));
        assert!(ScalarKind::Float64.converts_to(ScalarKind::Int64));
        assert!(ScalarKind::Duration.converts_to(ScalarKind::Int64));
        assert!(!ScalarKind::String.converts_to(ScalarKind::Int));
        assert!(!ScalarKind::Decimal.converts_to(ScalarKind::Float64));
        assert!(!ScalarKind::Bool.converts_to(ScalarKind::Int));
    }

    #[test]
    fn test_unwrap_pointer_strips_one_layer() {
        let shape = classify("**int");
        let (inner, was_ptr) = shape.unwrap_pointer();
        assert!(was_ptr);
        assert!(inner.is_optional());
    }
}
