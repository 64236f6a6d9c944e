//! # Schema Model
//!
//! The normalized in-memory shape of a model: its own fields, its embedded bases,
//! and the declaration order interleaving the two.

use crate::annotations::{orm_settings, Annotations};
use crate::naming::same_concept;
use crate::shape::{classify, ScalarKind, Shape};
use crate::synthesize::Direction;
use serde::Serialize;

/// Name of the identity field injected by the base-type convention.
pub const ID_FIELD: &str = "ID";
/// Creation timestamp injected by the base-type convention.
pub const CREATED_AT_FIELD: &str = "CreatedAt";
/// Update timestamp injected by the base-type convention.
pub const UPDATED_AT_FIELD: &str = "UpdatedAt";
/// Soft-delete marker injected by the base-type convention.
pub const DELETED_AT_FIELD: &str = "DeletedAt";

/// How an override came to be bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideSource {
    /// Declared in the field's `goalesce` tag.
    Tag,
    /// Matched from a `Map<Concept>` / `MapApi<Concept>` function name.
    NameConvention,
}

/// A user function replacing generated conversion logic for one direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldOverride {
    /// Function name.
    pub function: String,
    /// Where the binding came from.
    pub source: OverrideSource,
}

impl FieldOverride {
    /// An override declared in a tag.
    pub fn tag(function: &str) -> Self {
        Self {
            function: function.to_string(),
            source: OverrideSource::Tag,
        }
    }

    /// An override matched by name convention.
    pub fn name_convention(function: &str) -> Self {
        Self {
            function: function.to_string(),
            source: OverrideSource::NameConvention,
        }
    }
}

/// Non-owning reference to the model that declared a field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OwnerRef {
    /// Package of the owner.
    pub namespace: String,
    /// Name of the owner.
    pub name: String,
}

/// One field of a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelField {
    /// Field name.
    pub name: String,
    /// Rendered type (`*[]Part`, `time.Time`).
    pub raw_type: String,
    /// Raw struct tag, possibly empty.
    pub tag: String,
    /// The declaring model.
    pub owner: OwnerRef,
    /// Parsed `goalesce` annotations.
    pub annotations: Annotations,
    /// Override used when converting this field towards the wire model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_to_wire: Option<FieldOverride>,
    /// Override used when converting this field towards the domain model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_to_domain: Option<FieldOverride>,
    /// Injected by the base-type convention rather than declared.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub synthetic: bool,
}

impl ModelField {
    /// A field without tag or overrides.
    pub fn new(name: &str, raw_type: &str) -> Self {
        Self {
            name: name.to_string(),
            raw_type: raw_type.to_string(),
            tag: String::new(),
            owner: OwnerRef::default(),
            annotations: Annotations::default(),
            override_to_wire: None,
            override_to_domain: None,
            synthetic: false,
        }
    }

    /// Sets the raw tag, keeping annotations in sync when the tag parses.
    ///
    /// A malformed `goalesce` tag leaves the annotations untouched.
    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tag = tag.to_string();
        match Annotations::parse(tag) {
            Ok(annotations) => self.apply_annotations(annotations),
            Err(segment) => tracing::warn!(
                field = %self.name,
                segment = %segment,
                "malformed annotation, keeping previous annotations"
            ),
        }
        self
    }

    /// Installs parsed annotations, binding tag-declared overrides.
    pub fn apply_annotations(&mut self, annotations: Annotations) {
        if let Some(function) = &annotations.map {
            self.override_to_domain = Some(FieldOverride::tag(function));
        }
        if let Some(function) = &annotations.map_api {
            self.override_to_wire = Some(FieldOverride::tag(function));
        }
        self.annotations = annotations;
    }

    /// The shape of the field's type.
    pub fn shape(&self) -> Shape {
        classify(&self.raw_type)
    }

    /// The override bound for `direction`, if any.
    pub fn override_for(&self, direction: Direction) -> Option<&FieldOverride> {
        match direction {
            Direction::ToWire => self.override_to_wire.as_ref(),
            Direction::ToDomain => self.override_to_domain.as_ref(),
        }
    }

    /// Mutable slot of the override for `direction`.
    pub fn override_slot(&mut self, direction: Direction) -> &mut Option<FieldOverride> {
        match direction {
            Direction::ToWire => &mut self.override_to_wire,
            Direction::ToDomain => &mut self.override_to_domain,
        }
    }

    /// Key used by name-convention override binding: the enclosing top-level
    /// model name plus the field name (`VehicleForSale` + `Amount`). Inherited
    /// fields are keyed by the model that embeds them, not by their base.
    pub fn concept(&self, model: &str) -> String {
        format!("{}{}", model, self.name)
    }

    /// Whether the server assigns the value (excluded from create/update payloads).
    ///
    /// True for primary keys and auto timestamps, and for every field injected by
    /// the base-type convention.
    pub fn is_server_managed(&self) -> bool {
        self.synthetic
            || orm_settings(&self.tag).iter().any(|setting| {
                setting.eq_ignore_ascii_case("primaryKey")
                    || setting.starts_with("autoCreateTime")
                    || setting.starts_with("autoUpdateTime")
            })
    }
}

/// One slot of a model's declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Member {
    Field(usize),
    Embedded(usize),
}

/// The normalized description of a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelMetadata {
    /// Package of the model.
    pub namespace: String,
    /// Model name.
    pub name: String,
    /// Whether this is a generated wire model rather than a domain model.
    pub is_wire_model: bool,
    /// Fields declared on the model itself.
    fields: Vec<ModelField>,
    /// Embedded bases, owned.
    embedded_bases: Vec<ModelMetadata>,
    /// Whether the base-type convention was embedded (directly or through a base).
    #[serde(skip)]
    pub(crate) has_base_type: bool,
    #[serde(skip)]
    layout: Vec<Member>,
}

impl ModelMetadata {
    /// An empty model.
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            is_wire_model: false,
            fields: Vec::new(),
            embedded_bases: Vec::new(),
            has_base_type: false,
            layout: Vec::new(),
        }
    }

    /// Builder form of [`ModelMetadata::push_field`].
    pub fn with_field(mut self, field: ModelField) -> Self {
        self.push_field(field);
        self
    }

    /// Builder form of [`ModelMetadata::push_embedded`].
    pub fn with_embedded(mut self, base: ModelMetadata) -> Self {
        self.push_embedded(base);
        self
    }

    /// Appends an own field, taking ownership of its owner reference.
    pub fn push_field(&mut self, mut field: ModelField) {
        field.owner = OwnerRef {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
        };
        self.layout.push(Member::Field(self.fields.len()));
        self.fields.push(field);
    }

    /// Appends an embedded base at the current declaration position.
    pub fn push_embedded(&mut self, base: ModelMetadata) {
        self.has_base_type |= base.has_base_type;
        self.layout.push(Member::Embedded(self.embedded_bases.len()));
        self.embedded_bases.push(base);
    }

    /// Fields declared on the model itself.
    pub fn fields(&self) -> &[ModelField] {
        &self.fields
    }

    /// Embedded bases in declaration order.
    pub fn embedded_bases(&self) -> &[ModelMetadata] {
        &self.embedded_bases
    }

    /// Whether the model embeds the base-type convention.
    pub fn has_base_type(&self) -> bool {
        self.has_base_type
    }

    /// Own fields interleaved with flattened bases, in declaration order.
    pub fn all_fields(&self) -> Vec<&ModelField> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a ModelField>) {
        for member in &self.layout {
            match *member {
                Member::Field(i) => out.push(&self.fields[i]),
                Member::Embedded(i) => self.embedded_bases[i].collect_fields(out),
            }
        }
    }

    /// Every field, own and inherited, mutably. Order is unspecified.
    pub(crate) fn all_fields_mut(&mut self) -> Vec<&mut ModelField> {
        let mut out: Vec<&mut ModelField> = self.fields.iter_mut().collect();
        for base in &mut self.embedded_bases {
            out.extend(base.all_fields_mut());
        }
        out
    }

    /// Finds a field by exact name: own fields first, then bases depth-first.
    pub fn get_field(&self, name: &str) -> Option<&ModelField> {
        self.fields.iter().find(|f| f.name == name).or_else(|| {
            self.embedded_bases
                .iter()
                .find_map(|base| base.get_field(name))
        })
    }

    /// Finds the counterpart of `name`: exact match, else equal modulo casing.
    pub fn find_field(&self, name: &str) -> Option<&ModelField> {
        self.get_field(name).or_else(|| {
            self.all_fields()
                .into_iter()
                .find(|f| same_concept(&f.name, name))
        })
    }

    /// The identity field, if any.
    pub fn id_field(&self) -> Option<&ModelField> {
        self.get_field(ID_FIELD)
    }

    /// Scalar kind of the identity field, for lossless casts of path ids.
    pub fn id_kind(&self) -> Option<ScalarKind> {
        match self.id_field()?.shape() {
            Shape::Scalar { kind } if kind.is_integer() => Some(kind),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn base() -> ModelMetadata {
        ModelMetadata::new("gorm", "Model")
            .with_field(ModelField::new("ID", "uint").with_tag(r#"gorm:"primarykey""#))
            .with_field(ModelField::new("CreatedAt", "time.Time"))
    }

    #[test]
    fn test_all_fields_interleaves_in_declaration_order() {
        let model = ModelMetadata::new("model", "User")
            .with_field(ModelField::new("Name", "string"))
            .with_embedded(base())
            .with_field(ModelField::new("Email", "string"));

        let names: Vec<&str> = model.all_fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Name", "ID", "CreatedAt", "Email"]);
        assert_eq!(model.fields().len(), 2);
        assert_eq!(model.embedded_bases().len(), 1);
    }

    #[test]
    fn test_owner_is_declaring_model() {
        let model = ModelMetadata::new("model", "User").with_embedded(base());
        let id = model.get_field("ID").unwrap();
        assert_eq!(id.owner.name, "Model");
        assert_eq!(id.concept(&model.name), "UserID");
    }

    #[test]
    fn test_find_field_falls_back_to_casing() {
        let model = ModelMetadata::new("api", "Vehicle").with_field(ModelField::new("PersonId", "*int"));
        assert!(model.get_field("PersonID").is_none());
        assert_eq!(model.find_field("PersonID").unwrap().name, "PersonId");
    }

    #[test]
    fn test_id_kind() {
        let model = ModelMetadata::new("model", "User").with_embedded(base());
        assert_eq!(model.id_kind(), Some(ScalarKind::Uint));
        let custom = ModelMetadata::new("model", "Key").with_field(ModelField::new("ID", "string"));
        assert_eq!(custom.id_kind(), None);
    }

    #[test]
    fn test_tag_overrides_are_bound() {
        let field = ModelField::new("Amount", "decimal.Decimal")
            .with_tag(r#"goalesce:"map:ParseAmount;map_api:FormatAmount""#);
        assert_eq!(
            field.override_for(Direction::ToDomain),
            Some(&FieldOverride::tag("ParseAmount"))
        );
        assert_eq!(
            field.override_for(Direction::ToWire).map(|o| o.function.as_str()),
            Some("FormatAmount")
        );
    }

    #[test]
    fn test_malformed_tag_keeps_annotations() {
        let field = ModelField::new("Amount", "decimal.Decimal")
            .with_tag(r#"goalesce:"map:ParseAmount""#)
            .with_tag(r#"goalesce:"map""#);
        assert_eq!(field.tag, r#"goalesce:"map""#);
        assert_eq!(
            field.override_for(Direction::ToDomain),
            Some(&FieldOverride::tag("ParseAmount"))
        );
    }

    #[test]
    fn test_server_managed() {
        assert!(ModelField::new("ID", "uint").with_tag(r#"gorm:"primaryKey""#).is_server_managed());
        assert!(ModelField::new("Stamp", "int64")
            .with_tag(r#"gorm:"autoUpdateTime:milli""#)
            .is_server_managed());
        assert!(!ModelField::new("Name", "string").is_server_managed());
    }
}
