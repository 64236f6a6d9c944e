//! # Introspector
//!
//! Walks the structural description of a model and produces its [`ModelMetadata`]:
//! embedded bases are flattened into owned sub-models, the base-type convention is
//! substituted by its fixed synthetic fields, and tags are parsed into annotations.

use crate::annotations::Annotations;
use crate::binding::{IntrospectedBatch, RejectedModel};
use crate::config::{BaseTypeConvention, IntrospectOptions};
use crate::description::{MemberDescription, PackageDescription, TypeDescription, TypeExpr};
use crate::error::{AppError, AppResult};
use crate::schema::{
    ModelField, ModelMetadata, CREATED_AT_FIELD, DELETED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD,
};
use crate::shape::{SOFT_DELETE_TYPE, TIMESTAMP_TYPE};

/// Introspects the types of one package.
pub struct Introspector<'a> {
    options: &'a IntrospectOptions,
    package: &'a PackageDescription,
}

impl<'a> Introspector<'a> {
    /// Creates an introspector over `package`.
    pub fn new(options: &'a IntrospectOptions, package: &'a PackageDescription) -> Self {
        Self { options, package }
    }

    /// Introspects one declared type.
    ///
    /// # Errors
    ///
    /// * `NotAModel` if the type is not a struct, or lacks the base-type convention
    ///   while custom models are not allowed.
    /// * `TypeResolution` if a member cannot be classified.
    /// * `DuplicateField` if a field name repeats.
    /// * `AnnotationSyntax` on a malformed tag, in strict mode only.
    pub fn introspect(&self, ty: &TypeDescription) -> AppResult<ModelMetadata> {
        let base = &self.options.base_type;
        let members = ty.members().ok_or_else(|| AppError::NotAModel {
            model: ty.name.clone(),
            base: base.qualified(),
        })?;

        let mut visiting = vec![ty.name.clone()];
        let mut model = self.build(&ty.name, members, &mut visiting)?;

        if !model.has_base_type() {
            if !self.options.allow_custom_models {
                return Err(AppError::NotAModel {
                    model: ty.name.clone(),
                    base: base.qualified(),
                });
            }
            tracing::warn!(
                model = %ty.name,
                base = %base.qualified(),
                "accepting custom model without base type"
            );
        }

        model.is_wire_model = self.options.wire_models;
        tracing::debug!(
            model = %model.name,
            fields = model.all_fields().len(),
            "introspected model"
        );
        Ok(model)
    }

    fn build(
        &self,
        name: &str,
        members: &[MemberDescription],
        visiting: &mut Vec<String>,
    ) -> AppResult<ModelMetadata> {
        let mut model = ModelMetadata::new(&self.package.name, name);

        for member in members {
            if member.embedded {
                let base = self.embedded_base(name, member, visiting)?;
                model.push_embedded(base);
                continue;
            }
            if !member.is_exported() {
                tracing::trace!(model = name, member = %member.name, "skipping unexported member");
                continue;
            }
            if model.fields().iter().any(|f| f.name == member.name) {
                return Err(AppError::DuplicateField {
                    model: name.to_string(),
                    field: member.name.clone(),
                });
            }
            model.push_field(self.field(name, member)?);
        }

        Ok(model)
    }

    fn embedded_base(
        &self,
        owner: &str,
        member: &MemberDescription,
        visiting: &mut Vec<String>,
    ) -> AppResult<ModelMetadata> {
        let unresolved = || AppError::TypeResolution {
            model: owner.to_string(),
            field: member.name.clone(),
            descriptor: self.render(&member.ty),
        };

        let target = match &member.ty {
            TypeExpr::Pointer { elem } => elem.as_ref(),
            other => other,
        };
        let TypeExpr::Named { package, name } = target else {
            return Err(unresolved());
        };

        if self.options.base_type.matches(package.as_deref(), name) {
            return Ok(synthetic_base(&self.options.base_type));
        }

        if !self.package.is_local(package.as_deref()) || visiting.contains(name) {
            return Err(unresolved());
        }
        let members = self
            .package
            .find_type(name)
            .and_then(TypeDescription::members)
            .ok_or_else(unresolved)?;

        visiting.push(name.clone());
        let base = self.build(name, members, visiting);
        visiting.pop();
        base
    }

    fn field(&self, owner: &str, member: &MemberDescription) -> AppResult<ModelField> {
        let annotations = match Annotations::parse(&member.tag) {
            Ok(annotations) => annotations,
            Err(segment) if self.options.strict_annotations => {
                return Err(AppError::AnnotationSyntax {
                    model: owner.to_string(),
                    field: member.name.clone(),
                    segment,
                });
            }
            Err(segment) => {
                tracing::warn!(
                    model = owner,
                    field = %member.name,
                    segment = %segment,
                    "malformed annotation, falling back to defaults"
                );
                Annotations::default()
            }
        };

        let raw_type = self.render(&member.ty);
        if !member.ty.is_classifiable() && !annotations.is_escape_hatch() {
            return Err(AppError::TypeResolution {
                model: owner.to_string(),
                field: member.name.clone(),
                descriptor: raw_type,
            });
        }

        let mut field = ModelField::new(&member.name, &raw_type);
        field.tag = member.tag.clone();
        field.apply_annotations(annotations);
        Ok(field)
    }

    fn render(&self, ty: &TypeExpr) -> String {
        ty.render(self.package.import_path(), self.options)
    }
}

/// The embedded base substituted for the base-type convention: `ID`, `CreatedAt`,
/// `UpdatedAt` and `DeletedAt`, in that order.
pub fn synthetic_base(convention: &BaseTypeConvention) -> ModelMetadata {
    let synthetic = |name: &str, raw_type: &str, tag: &str| {
        let mut field = ModelField::new(name, raw_type).with_tag(tag);
        field.synthetic = true;
        field
    };

    let mut base = ModelMetadata::new(convention.namespace(), &convention.name)
        .with_field(synthetic(ID_FIELD, "uint", r#"gorm:"primarykey""#))
        .with_field(synthetic(CREATED_AT_FIELD, TIMESTAMP_TYPE, ""))
        .with_field(synthetic(UPDATED_AT_FIELD, TIMESTAMP_TYPE, ""))
        .with_field(synthetic(DELETED_AT_FIELD, SOFT_DELETE_TYPE, r#"gorm:"index""#));
    base.has_base_type = true;
    base
}

/// Introspects every struct type of every package.
///
/// Never aborts: a type failing introspection is logged and recorded as rejected
/// while its siblings continue. Top-level functions are collected for the
/// override-binding pass.
pub fn introspect_batch(
    packages: &[PackageDescription],
    options: &IntrospectOptions,
) -> IntrospectedBatch {
    let mut models = Vec::new();
    let mut rejected = Vec::new();
    let mut functions = Vec::new();

    for package in packages {
        let introspector = Introspector::new(options, package);
        for ty in &package.types {
            if ty.members().is_none() {
                tracing::trace!(package = %package.name, ty = %ty.name, "skipping non-struct type");
                continue;
            }
            match introspector.introspect(ty) {
                Ok(model) => models.push(model),
                Err(error) => {
                    tracing::warn!(
                        package = %package.name,
                        model = %ty.name,
                        error = %error,
                        "rejecting input"
                    );
                    rejected.push(RejectedModel::new(&package.name, &ty.name, error));
                }
            }
        }
        functions.extend(package.functions.iter().map(|f| f.name.clone()));
    }

    IntrospectedBatch::new(models, rejected, functions)
}
