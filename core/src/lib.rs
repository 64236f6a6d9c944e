#![deny(missing_docs)]

//! # Goalesce Core
//!
//! Introspects persistence models, projects their wire types and synthesizes the
//! field-by-field conversions between domain models and generated wire models.
//!
//! The pipeline is pure and synchronous:
//!
//! 1. [`read_package`] (or any host reflection facility) yields [`PackageDescription`]s.
//! 2. [`introspect_batch`] turns them into [`ModelMetadata`].
//! 3. [`IntrospectedBatch::bind_overrides`] runs the batch-wide override binding.
//! 4. [`synthesize`] and [`project`] are then free to run per field, in any order.

/// Shared error types.
pub mod error;

/// Case conversion.
pub mod naming;

/// Introspection options.
pub mod config;

/// Structural input descriptions.
pub mod description;

/// Go source declaration reader.
pub mod declarations;

/// Field tag annotations.
pub mod annotations;

/// Type shape classification.
pub mod shape;

/// Normalized model metadata.
pub mod schema;

/// Model introspection.
pub mod introspect;

/// Batch-wide override binding.
pub mod binding;

/// Conversion synthesis.
pub mod synthesize;

/// Wire type projection.
pub mod projection;

/// Mapper planning across a domain and a wire batch.
pub mod plan;

pub use annotations::Annotations;
pub use binding::{IntrospectedBatch, ModelBatch, RejectedModel};
pub use config::{BaseTypeConvention, IntrospectOptions};
pub use declarations::read_package;
pub use description::{
    FunctionDescription, MemberDescription, PackageDescription, TypeDescription, TypeExpr,
};
pub use error::{AppError, AppResult};
pub use introspect::{introspect_batch, Introspector};
pub use naming::{to_camel_case, to_kebab_case, to_pascal_case, to_snake_case};
pub use plan::{plan_mappers, MapperPlan};
pub use projection::{project, project_shape, property_name, WireKind, WireTypeDescriptor};
pub use schema::{FieldOverride, ModelField, ModelMetadata, OverrideSource};
pub use shape::{classify, ScalarKind, Shape};
pub use synthesize::{
    convert_field, synthesize, Addressing, CollectionEntryPoint, CollectionWrapping,
    ConversionDescriptor, Direction, FieldConversion, SoftDeleteBridge,
};
