//! # Mapping Synthesizer
//!
//! Decides, for one source field and a destination model, how the value moves across
//! the domain/wire boundary. The result is a [`ConversionDescriptor`] handed to the
//! renderer; no source text is produced here.
//!
//! Rules apply in priority order, first match wins:
//!
//! 1. A bound override for the direction yields [`ConversionDescriptor::UserFunctionCall`].
//! 2. The destination field is located (exact name, then casing-insensitive); a
//!    missing counterpart is [`AppError::FieldNotFound`].
//! 3. One pointer layer is stripped from each side and remembered.
//! 4. Differing convertible scalars yield a `NumericCast`, bridged when optional.
//! 5. Differing named types yield the soft-delete bridge or a nested mapper call.
//! 6. Slices of generated models yield a collection mapper call.
//! 7. Everything else is a direct assignment, bridged on pointer mismatch.

use crate::error::{AppError, AppResult};
use crate::schema::{ModelField, ModelMetadata};
use crate::shape::{ScalarKind, Shape};
use serde::Serialize;
use std::fmt::{self, Display};

/// Suffix conventionally carried by wire model mappers.
pub const WIRE_MAPPER_SUFFIX: &str = "Api";

/// Which way a value travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Domain model to wire model.
    ToWire,
    /// Wire model to domain model.
    ToDomain,
}

impl Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::ToWire => f.write_str("to_wire"),
            Direction::ToDomain => f.write_str("to_domain"),
        }
    }
}

/// How a nested mapper receives and returns its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Addressing {
    /// Value in, value out.
    Value,
    /// Value in, address of the result out.
    AddressOf,
    /// Pointer in, pointer out; absent stays absent.
    Pointer,
    /// Pointer in, value out; guarded, absent leaves the zero value.
    Dereference,
}

impl Addressing {
    fn between(source_optional: bool, destination_optional: bool) -> Self {
        match (source_optional, destination_optional) {
            (false, false) => Addressing::Value,
            (false, true) => Addressing::AddressOf,
            (true, true) => Addressing::Pointer,
            (true, false) => Addressing::Dereference,
        }
    }

    /// Whether the source must be checked for absence first.
    pub fn is_guarded(self) -> bool {
        matches!(self, Addressing::Pointer | Addressing::Dereference)
    }
}

/// Pointer wrapping of one side of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CollectionWrapping {
    /// `*[]T`
    pub collection: bool,
    /// `[]*T`
    pub element: bool,
}

impl CollectionWrapping {
    /// Whether any pointer is involved.
    pub fn is_optional(self) -> bool {
        self.collection || self.element
    }
}

/// The four collection entry points of a generated mapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CollectionEntryPoint {
    /// Produces `[]T`.
    MapSlice,
    /// Produces `[]*T`.
    MapSlicePtrs,
    /// Produces `*[]T`.
    MapPtrSlice,
    /// Produces `*[]*T`.
    MapPtrSlicePtrs,
}

impl CollectionEntryPoint {
    /// Entry point producing the `destination` wrapping.
    pub fn producing(destination: CollectionWrapping) -> Self {
        match (destination.collection, destination.element) {
            (false, false) => CollectionEntryPoint::MapSlice,
            (false, true) => CollectionEntryPoint::MapSlicePtrs,
            (true, false) => CollectionEntryPoint::MapPtrSlice,
            (true, true) => CollectionEntryPoint::MapPtrSlicePtrs,
        }
    }
}

/// Which way the timestamp and the soft-delete marker are bridged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SoftDeleteBridge {
    /// Plain timestamp to marker: the marker is valid iff the timestamp is present.
    TimeToMarker,
    /// Marker to plain timestamp: an invalid marker yields the absent/zero timestamp.
    MarkerToTime,
}

/// How one value moves from source to destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum ConversionDescriptor {
    /// `dst = src`
    DirectAssign,
    /// `dst = to(src)`
    NumericCast {
        /// Source kind.
        from: ScalarKind,
        /// Destination kind.
        to: ScalarKind,
    },
    /// Applies `inner` to the pointee; an absent optional source yields an absent
    /// (or zero) destination.
    PointerBridge {
        /// Conversion of the unwrapped value.
        inner: Box<ConversionDescriptor>,
        /// Source was pointer-wrapped.
        source_optional: bool,
        /// Destination is pointer-wrapped.
        destination_optional: bool,
    },
    /// `New<Mapper>Mapper().Map(src)` and its pointer variants.
    NestedMapperCall {
        /// Conventional mapper name of the destination type.
        mapper: String,
        /// Direction the mapper converts in.
        direction: Direction,
        /// Pointer bridging around the call.
        addressing: Addressing,
    },
    /// One of the four collection entry points of a nested mapper.
    CollectionMapperCall {
        /// Conventional mapper name of the destination element type.
        mapper: String,
        /// Direction the mapper converts in.
        direction: Direction,
        /// Selected entry point.
        entry_point: CollectionEntryPoint,
        /// Wrapping of the source.
        source: CollectionWrapping,
        /// Wrapping of the destination.
        destination: CollectionWrapping,
        /// Whether the call sits behind an absence check on the source.
        guarded: bool,
    },
    /// Timestamp and soft-delete marker, which carries an extra validity flag.
    TimeSoftDeleteBridge {
        /// Bridge direction.
        bridge: SoftDeleteBridge,
        /// Source was pointer-wrapped.
        source_optional: bool,
        /// Destination is pointer-wrapped.
        destination_optional: bool,
    },
    /// A user-provided function replaces the generated logic.
    UserFunctionCall {
        /// Function name.
        function: String,
    },
}

impl ConversionDescriptor {
    fn user_function(function: &str) -> Self {
        ConversionDescriptor::UserFunctionCall {
            function: function.to_string(),
        }
    }

    /// Wraps `self` in a [`ConversionDescriptor::PointerBridge`] when either side is optional.
    fn bridged(self, source_optional: bool, destination_optional: bool) -> Self {
        if !source_optional && !destination_optional {
            return self;
        }
        ConversionDescriptor::PointerBridge {
            inner: Box::new(self),
            source_optional,
            destination_optional,
        }
    }

    /// Direct assignment, bridged only when exactly one side is optional.
    fn assign(source_optional: bool, destination_optional: bool) -> Self {
        if source_optional == destination_optional {
            ConversionDescriptor::DirectAssign
        } else {
            ConversionDescriptor::DirectAssign.bridged(source_optional, destination_optional)
        }
    }
}

/// A resolved field pair and its conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldConversion {
    /// Source field name.
    pub source: String,
    /// Destination field name as found on the destination model.
    pub destination: String,
    /// The decision.
    pub descriptor: ConversionDescriptor,
}

/// Conventional mapper name of `type_name` on the destination side.
pub fn mapper_name(type_name: &str, destination_is_wire: bool) -> String {
    if destination_is_wire && !type_name.ends_with(WIRE_MAPPER_SUFFIX) {
        format!("{}{}", type_name, WIRE_MAPPER_SUFFIX)
    } else {
        type_name.to_string()
    }
}

/// Decides the conversion of `source` onto its counterpart in `destination`.
///
/// # Errors
///
/// `FieldNotFound` when `destination` has no counterpart.
pub fn synthesize(
    source: &ModelField,
    destination: &ModelMetadata,
    direction: Direction,
) -> AppResult<ConversionDescriptor> {
    convert_field(source, destination, direction).map(|c| c.descriptor)
}

/// Like [`synthesize`], also reporting the resolved destination field.
pub fn convert_field(
    source: &ModelField,
    destination: &ModelMetadata,
    direction: Direction,
) -> AppResult<FieldConversion> {
    let resolved = |target: &ModelField, descriptor: ConversionDescriptor| {
        tracing::trace!(
            source = %source.name,
            destination = %target.name,
            %direction,
            ?descriptor,
            "synthesized conversion"
        );
        FieldConversion {
            source: source.name.clone(),
            destination: target.name.clone(),
            descriptor,
        }
    };

    let target = destination
        .find_field(&source.name)
        .ok_or_else(|| AppError::FieldNotFound {
            field: source.name.clone(),
            model: destination.name.clone(),
        });

    if let Some(found) = source.override_for(direction) {
        // Overrides apply before the counterpart is required.
        let target_name = target.as_ref().map_or(source, |t| *t);
        return Ok(resolved(
            target_name,
            ConversionDescriptor::user_function(&found.function),
        ));
    }

    let target = target?;
    if let Some(found) = target.override_for(direction) {
        return Ok(resolved(target, ConversionDescriptor::user_function(&found.function)));
    }

    let descriptor = decide(source, target, destination, direction);
    Ok(resolved(target, descriptor))
}

fn decide(
    source: &ModelField,
    target: &ModelField,
    destination: &ModelMetadata,
    direction: Direction,
) -> ConversionDescriptor {
    let source_shape = source.shape();
    let target_shape = target.shape();
    let (src, src_ptr) = source_shape.unwrap_pointer();
    let (dst, dst_ptr) = target_shape.unwrap_pointer();

    match (src, dst) {
        (Shape::Scalar { kind: from }, Shape::Scalar { kind: to }) => {
            if from != to && from.converts_to(*to) {
                ConversionDescriptor::NumericCast {
                    from: *from,
                    to: *to,
                }
                .bridged(src_ptr, dst_ptr)
            } else {
                ConversionDescriptor::assign(src_ptr, dst_ptr)
            }
        }
        (
            Shape::Named {
                name: src_name,
                external: src_external,
            },
            Shape::Named {
                name: dst_name,
                external: dst_external,
            },
        ) => {
            if src.is_timestamp() && dst.is_soft_delete_marker() {
                return ConversionDescriptor::TimeSoftDeleteBridge {
                    bridge: SoftDeleteBridge::TimeToMarker,
                    source_optional: src_ptr,
                    destination_optional: dst_ptr,
                };
            }
            if src.is_soft_delete_marker() && dst.is_timestamp() {
                return ConversionDescriptor::TimeSoftDeleteBridge {
                    bridge: SoftDeleteBridge::MarkerToTime,
                    source_optional: src_ptr,
                    destination_optional: dst_ptr,
                };
            }
            let same_type = src_name == dst_name
                && (*src_external || source.owner.namespace == target.owner.namespace);
            if same_type || *dst_external {
                return ConversionDescriptor::assign(src_ptr, dst_ptr);
            }
            ConversionDescriptor::NestedMapperCall {
                mapper: mapper_name(dst_name, destination.is_wire_model),
                direction,
                addressing: Addressing::between(src_ptr, dst_ptr),
            }
        }
        (Shape::Slice { elem: src_elem }, Shape::Slice { elem: dst_elem }) => {
            let (src_item, src_item_ptr) = src_elem.unwrap_pointer();
            let (dst_item, dst_item_ptr) = dst_elem.unwrap_pointer();
            match (src_item, dst_item) {
                (
                    Shape::Named { name: src_name, .. },
                    Shape::Named {
                        name: dst_name,
                        external: false,
                    },
                ) if !(src_name == dst_name
                    && source.owner.namespace == target.owner.namespace) =>
                {
                    let source_wrapping = CollectionWrapping {
                        collection: src_ptr,
                        element: src_item_ptr,
                    };
                    let destination_wrapping = CollectionWrapping {
                        collection: dst_ptr,
                        element: dst_item_ptr,
                    };
                    ConversionDescriptor::CollectionMapperCall {
                        mapper: mapper_name(dst_name, destination.is_wire_model),
                        direction,
                        entry_point: CollectionEntryPoint::producing(destination_wrapping),
                        source: source_wrapping,
                        destination: destination_wrapping,
                        guarded: source_wrapping.is_optional()
                            || destination_wrapping.is_optional(),
                    }
                }
                _ => ConversionDescriptor::assign(src_ptr, dst_ptr),
            }
        }
        (
            Shape::Scalar { .. },
            Shape::Named { .. } | Shape::Slice { .. } | Shape::Pointer { .. },
        )
        | (
            Shape::Named { .. },
            Shape::Scalar { .. } | Shape::Slice { .. } | Shape::Pointer { .. },
        )
        | (
            Shape::Slice { .. },
            Shape::Scalar { .. } | Shape::Named { .. } | Shape::Pointer { .. },
        )
        | (
            Shape::Pointer { .. },
            Shape::Scalar { .. } | Shape::Named { .. } | Shape::Slice { .. } | Shape::Pointer { .. },
        ) => ConversionDescriptor::assign(src_ptr, dst_ptr),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn domain(fields: Vec<ModelField>) -> ModelMetadata {
        fields
            .into_iter()
            .fold(ModelMetadata::new("model", "Vehicle"), ModelMetadata::with_field)
    }

    fn wire(fields: Vec<ModelField>) -> ModelMetadata {
        let mut model = fields
            .into_iter()
            .fold(ModelMetadata::new("api", "Vehicle"), ModelMetadata::with_field);
        model.is_wire_model = true;
        model
    }

    fn only(model: &ModelMetadata) -> &ModelField {
        &model.fields()[0]
    }

    #[test]
    fn test_user_function_per_direction() {
        let d = domain(vec![ModelField::new("Amount", "decimal.Decimal")
            .with_tag(r#"goalesce:"map:ParseAmount;map_api:FormatAmount""#)]);
        let w = wire(vec![ModelField::new("Amount", "string")]);

        assert_eq!(
            synthesize(only(&d), &w, Direction::ToWire).unwrap(),
            ConversionDescriptor::user_function("FormatAmount")
        );
        assert_eq!(
            synthesize(only(&w), &d, Direction::ToDomain).unwrap(),
            ConversionDescriptor::user_function("ParseAmount")
        );
    }

    #[test]
    fn test_one_directional_override_leaves_other_direction() {
        let d = domain(vec![
            ModelField::new("Count", "int").with_tag(r#"goalesce:"map_api:FormatCount""#)
        ]);
        let w = wire(vec![ModelField::new("Count", "int")]);
        assert_eq!(
            synthesize(only(&w), &d, Direction::ToDomain).unwrap(),
            ConversionDescriptor::DirectAssign
        );
    }

    #[test]
    fn test_field_not_found() {
        let d = domain(vec![ModelField::new("Color", "string")]);
        let w = wire(vec![ModelField::new("Name", "string")]);
        assert_eq!(
            synthesize(only(&d), &w, Direction::ToWire).unwrap_err(),
            AppError::FieldNotFound {
                field: "Color".into(),
                model: "Vehicle".into()
            }
        );
    }

    #[test]
    fn test_optional_numeric_cast() {
        let d = domain(vec![ModelField::new("PersonID", "*int")]);
        let w = wire(vec![ModelField::new("PersonId", "*uint")]);
        let conversion = convert_field(only(&d), &w, Direction::ToWire).unwrap();
        assert_eq!(conversion.destination, "PersonId");
        assert_eq!(
            conversion.descriptor,
            ConversionDescriptor::PointerBridge {
                inner: Box::new(ConversionDescriptor::NumericCast {
                    from: ScalarKind::Int,
                    to: ScalarKind::Uint
                }),
                source_optional: true,
                destination_optional: true,
            }
        );
    }

    #[test]
    fn test_pointer_discipline_for_identical_scalars() {
        let d = domain(vec![ModelField::new("Name", "string")]);
        let w = wire(vec![ModelField::new("Name", "*string")]);
        assert_eq!(
            synthesize(only(&d), &w, Direction::ToWire).unwrap(),
            ConversionDescriptor::DirectAssign.bridged(false, true)
        );
        assert_eq!(
            synthesize(only(&w), &d, Direction::ToDomain).unwrap(),
            ConversionDescriptor::DirectAssign.bridged(true, false)
        );

        let both = wire(vec![ModelField::new("Name", "*string")]);
        assert_eq!(
            synthesize(only(&both), &wire(vec![ModelField::new("Name", "*string")]), Direction::ToWire)
                .unwrap(),
            ConversionDescriptor::DirectAssign
        );
    }

    #[test]
    fn test_non_convertible_scalars_assign() {
        let d = domain(vec![ModelField::new("Amount", "decimal.Decimal")]);
        let w = wire(vec![ModelField::new("Amount", "float64")]);
        assert_eq!(
            synthesize(only(&d), &w, Direction::ToWire).unwrap(),
            ConversionDescriptor::DirectAssign
        );
    }

    #[test]
    fn test_soft_delete_bridge_both_ways() {
        let d = domain(vec![ModelField::new("DeletedAt", "gorm.DeletedAt")]);
        let w = wire(vec![ModelField::new("DeletedAt", "*time.Time")]);
        assert_eq!(
            synthesize(only(&d), &w, Direction::ToWire).unwrap(),
            ConversionDescriptor::TimeSoftDeleteBridge {
                bridge: SoftDeleteBridge::MarkerToTime,
                source_optional: false,
                destination_optional: true,
            }
        );
        assert_eq!(
            synthesize(only(&w), &d, Direction::ToDomain).unwrap(),
            ConversionDescriptor::TimeSoftDeleteBridge {
                bridge: SoftDeleteBridge::TimeToMarker,
                source_optional: true,
                destination_optional: false,
            }
        );
    }

    #[test]
    fn test_nested_mapper_addressing() {
        let d = domain(vec![ModelField::new("Owner", "*Person")]);
        let w = wire(vec![ModelField::new("Owner", "Person")]);
        assert_eq!(
            synthesize(only(&d), &w, Direction::ToWire).unwrap(),
            ConversionDescriptor::NestedMapperCall {
                mapper: "PersonApi".into(),
                direction: Direction::ToWire,
                addressing: Addressing::Dereference,
            }
        );
        assert_eq!(
            synthesize(only(&w), &d, Direction::ToDomain).unwrap(),
            ConversionDescriptor::NestedMapperCall {
                mapper: "Person".into(),
                direction: Direction::ToDomain,
                addressing: Addressing::AddressOf,
            }
        );
        assert!(Addressing::Dereference.is_guarded());
        assert!(!Addressing::AddressOf.is_guarded());
    }

    #[test]
    fn test_nested_mapper_addressing_table() {
        let cases = [
            ("Person", "Person", Addressing::Value, false),
            ("Person", "*Person", Addressing::AddressOf, false),
            ("*Person", "*Person", Addressing::Pointer, true),
            ("*Person", "Person", Addressing::Dereference, true),
        ];
        for (src, dst, addressing, guarded) in cases {
            let d = domain(vec![ModelField::new("Owner", src)]);
            let w = wire(vec![ModelField::new("Owner", dst)]);
            assert_eq!(
                synthesize(only(&d), &w, Direction::ToWire).unwrap(),
                ConversionDescriptor::NestedMapperCall {
                    mapper: "PersonApi".into(),
                    direction: Direction::ToWire,
                    addressing,
                },
                "{} -> {}",
                src,
                dst
            );
            assert_eq!(addressing.is_guarded(), guarded, "{:?}", addressing);
        }
    }

    #[test]
    fn test_soft_delete_bridge_both_optional() {
        let d = domain(vec![ModelField::new("DeletedAt", "*gorm.DeletedAt")]);
        let w = wire(vec![ModelField::new("DeletedAt", "*time.Time")]);
        assert_eq!(
            synthesize(only(&d), &w, Direction::ToWire).unwrap(),
            ConversionDescriptor::TimeSoftDeleteBridge {
                bridge: SoftDeleteBridge::MarkerToTime,
                source_optional: true,
                destination_optional: true,
            }
        );
        assert_eq!(
            synthesize(only(&w), &d, Direction::ToDomain).unwrap(),
            ConversionDescriptor::TimeSoftDeleteBridge {
                bridge: SoftDeleteBridge::TimeToMarker,
                source_optional: true,
                destination_optional: true,
            }
        );
    }

    #[test]
    fn test_same_namespace_named_assigns() {
        let d = domain(vec![ModelField::new("Status", "Status")]);
        let other = domain(vec![ModelField::new("Status", "Status")]);
        assert_eq!(
            synthesize(only(&d), &other, Direction::ToWire).unwrap(),
            ConversionDescriptor::DirectAssign
        );
    }

    #[test]
    fn test_collection_entry_points() {
        let cases = [
            ("[]Part", "[]PartApi", CollectionEntryPoint::MapSlice, false),
            ("[]Part", "[]*PartApi", CollectionEntryPoint::MapSlicePtrs, true),
            ("[]Part", "*[]PartApi", CollectionEntryPoint::MapPtrSlice, true),
            ("*[]*Part", "*[]*PartApi", CollectionEntryPoint::MapPtrSlicePtrs, true),
        ];
        for (src, dst, entry_point, guarded) in cases {
            let d = domain(vec![ModelField::new("Parts", src)]);
            let w = wire(vec![ModelField::new("Parts", dst)]);
            match synthesize(only(&d), &w, Direction::ToWire).unwrap() {
                ConversionDescriptor::CollectionMapperCall {
                    mapper,
                    entry_point: chosen,
                    guarded: is_guarded,
                    ..
                } => {
                    assert_eq!(mapper, "PartApi");
                    assert_eq!(chosen, entry_point, "{} -> {}", src, dst);
                    assert_eq!(is_guarded, guarded, "{} -> {}", src, dst);
                }
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn test_scalar_slices_assign() {
        let d = domain(vec![ModelField::new("Tags", "[]string")]);
        let w = wire(vec![ModelField::new("Tags", "*[]string")]);
        assert_eq!(
            synthesize(only(&d), &w, Direction::ToWire).unwrap(),
            ConversionDescriptor::DirectAssign.bridged(false, true)
        );
    }

    #[test]
    fn test_mapper_name() {
        assert_eq!(mapper_name("Part", true), "PartApi");
        assert_eq!(mapper_name("PartApi", true), "PartApi");
        assert_eq!(mapper_name("Part", false), "Part");
    }
}
