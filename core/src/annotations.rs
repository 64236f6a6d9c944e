//! # Annotations
//!
//! Reads field tags: the `goalesce:"key1:value1;key2:value2"` mini-grammar feeding the
//! Projector and the Synthesizer, and the `gorm:"..."` settings used to spot
//! server-managed columns.

use crate::projection::{WireKind, WireTypeDescriptor};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Tag key carrying the annotation mini-grammar.
pub const ANNOTATION_KEY: &str = "goalesce";

/// Tag key carrying ORM settings.
pub const ORM_KEY: &str = "gorm";

/// Parsed `goalesce` annotations of one field. Unknown keys are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Annotations {
    /// `openapi_type`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openapi_type: Option<WireKind>,
    /// `openapi_ref`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openapi_ref: Option<String>,
    /// `openapi_format`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openapi_format: Option<String>,
    /// `openapi_nullable`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openapi_nullable: Option<bool>,
    /// `map`: user function converting wire to domain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map: Option<String>,
    /// `map_api`: user function converting domain to wire.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_api: Option<String>,
}

impl Annotations {
    /// Parses the `goalesce` entry of a raw struct tag.
    ///
    /// Returns the offending segment when a `key:value` pair lacks its colon, an
    /// `openapi_type` value is not a wire kind, or the `openapi_*` keys do not
    /// describe a complete wire type (see [`Annotations::wire_override`]).
    pub fn parse(tag: &str) -> Result<Self, String> {
        let mut annotations = Annotations::default();
        let Some(settings) = tag_value(tag, ANNOTATION_KEY) else {
            return Ok(annotations);
        };
        let mut type_segment = None;
        let mut wire_segment = None;

        for segment in settings.split(';') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let (key, value) = segment
                .split_once(':')
                .ok_or_else(|| segment.to_string())?;
            let value = value.trim();
            let key = key.trim();
            if key.starts_with("openapi_") && wire_segment.is_none() {
                wire_segment = Some(segment);
            }

            match key {
                "openapi_type" => {
                    let kind = value.parse().map_err(|_| segment.to_string())?;
                    annotations.openapi_type = Some(kind);
                    type_segment = Some(segment);
                }
                "openapi_ref" => annotations.openapi_ref = Some(value.to_string()),
                "openapi_format" => annotations.openapi_format = Some(value.to_string()),
                "openapi_nullable" => {
                    annotations.openapi_nullable = Some(value.eq_ignore_ascii_case("true"))
                }
                "map" => annotations.map = Some(value.to_string()),
                "map_api" => annotations.map_api = Some(value.to_string()),
                other => tracing::trace!(key = other, "ignoring unknown annotation key"),
            }
        }

        if annotations.has_wire_override() && annotations.wire_override().is_none() {
            let segment = type_segment.or(wire_segment).unwrap_or_default();
            return Err(segment.to_string());
        }
        Ok(annotations)
    }

    /// The wire type declared by the `openapi_*` keys, replacing the structural
    /// projection outright.
    ///
    /// The kind comes from `openapi_type`, or is an object reference when only
    /// `openapi_ref` is given; `nullable` defaults to false. `None` when no such
    /// key is present, or when the keys cannot form a complete descriptor: an
    /// `array` (items cannot be declared), an `object` without `openapi_ref`, a
    /// scalar kind with a ref, or format/nullable without a kind.
    pub fn wire_override(&self) -> Option<WireTypeDescriptor> {
        let mut descriptor = match (self.openapi_type, &self.openapi_ref) {
            (None | Some(WireKind::ObjectRef), Some(reference)) => {
                WireTypeDescriptor::object_ref(reference)
            }
            (Some(kind), None) if !matches!(kind, WireKind::Array | WireKind::ObjectRef) => {
                WireTypeDescriptor::of(kind)
            }
            _ => return None,
        };
        descriptor.format = self.openapi_format.clone();
        descriptor.nullable = self.openapi_nullable.unwrap_or(false);
        Some(descriptor)
    }

    /// Whether any `openapi_*` key is present.
    pub fn has_wire_override(&self) -> bool {
        self.openapi_type.is_some()
            || self.openapi_ref.is_some()
            || self.openapi_format.is_some()
            || self.openapi_nullable.is_some()
    }

    /// Whether the field declares its own handling, so an unclassifiable type is tolerable.
    pub fn is_escape_hatch(&self) -> bool {
        self.map.is_some() || self.map_api.is_some() || self.has_wire_override()
    }
}

/// Looks up `key` in a Go-style struct tag (`` `a:"x" b:"y"` ``).
pub fn tag_value<'a>(tag: &'a str, key: &str) -> Option<&'a str> {
    static TAG_ENTRY_RE: OnceLock<Regex> = OnceLock::new();
    let entry_re = TAG_ENTRY_RE
        .get_or_init(|| Regex::new(r#"([A-Za-z0-9_]+):"((?:[^"\\]|\\.)*)""#).expect("Invalid regex"));

    let tag = tag.trim().trim_matches('`');
    entry_re
        .captures_iter(tag)
        .find(|caps| caps.get(1).is_some_and(|k| k.as_str() == key))
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str())
}

/// The `;`-separated settings of the `gorm` tag entry.
pub fn orm_settings(tag: &str) -> Vec<&str> {
    tag_value(tag, ORM_KEY)
        .map(|settings| {
            settings
                .split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
