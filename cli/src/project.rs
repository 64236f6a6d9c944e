#![deny(missing_docs)]

//! # Project Command
//!
//! Prints the wire property and abstract wire type of every field, the input the
//! OpenAPI document assembler works from.

use crate::config::GoalesceConfig;
use crate::error::CliResult;
use crate::input::{load_batch, OutputFormat};
use goalesce_core::{project, property_name, ModelMetadata, WireTypeDescriptor};
use serde::Serialize;
use std::path::PathBuf;

/// Arguments for the project command.
#[derive(clap::Args, Debug, Clone)]
pub struct ProjectArgs {
    /// Go model source (or a JSON/YAML structural description).
    pub models: PathBuf,

    /// Output encoding.
    #[clap(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

/// Projection of one model.
#[derive(Debug, Serialize)]
pub struct ModelProjection {
    /// Model name.
    pub model: String,
    /// Properties in field order.
    pub properties: Vec<PropertyProjection>,
}

/// Projection of one field.
#[derive(Debug, Serialize)]
pub struct PropertyProjection {
    /// Wire property name.
    pub property: String,
    /// Source field name.
    pub field: String,
    /// Assigned by the server, so absent from create/update payloads.
    pub read_only: bool,
    /// Belongs in the schema's `required` list.
    pub required: bool,
    /// `$ref` target for object references.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fragment_ref: Option<String>,
    /// The wire type.
    pub wire_type: WireTypeDescriptor,
}

/// Projects every field of `model`.
pub fn project_model(model: &ModelMetadata) -> ModelProjection {
    let properties = model
        .all_fields()
        .into_iter()
        .map(|field| {
            let wire_type = project(field);
            PropertyProjection {
                property: property_name(field),
                field: field.name.clone(),
                read_only: field.is_server_managed(),
                required: wire_type.is_required(),
                fragment_ref: wire_type
                    .items
                    .as_deref()
                    .unwrap_or(&wire_type)
                    .fragment_ref(),
                wire_type,
            }
        })
        .collect();

    ModelProjection {
        model: model.name.clone(),
        properties,
    }
}

/// Renders the projections of every model in the file.
pub fn render(args: &ProjectArgs, config: &GoalesceConfig) -> CliResult<String> {
    let batch = load_batch(&args.models, &config.domain)?;
    let projections: Vec<ModelProjection> = batch.models().iter().map(project_model).collect();
    args.format.render(&projections)
}

/// Executes the project command.
pub fn execute(args: &ProjectArgs, config: &GoalesceConfig) -> CliResult<()> {
    println!("{}", render(args, config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn test_project_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models.go");
        fs::write(
            &path,
            r#"package model
import "gorm.io/gorm"
type Vehicle struct {
	gorm.Model
	Parts []*Part
	Price float64 `goalesce:"openapi_type:number;openapi_format:double"`
}
"#,
        )
        .unwrap();

        let args = ProjectArgs {
            models: path,
            format: OutputFormat::Json,
        };
        let out = render(&args, &GoalesceConfig::default()).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&out).unwrap();
        let props = &doc[0]["properties"];

        assert_eq!(props[0]["property"], "id");
        assert_eq!(props[0]["read_only"], true);
        assert_eq!(props[3]["property"], "deleted_at");
        assert_eq!(props[3]["required"], false);
        assert_eq!(props[4]["wire_type"]["kind"], "array");
        assert_eq!(props[4]["fragment_ref"], "./part.gen.yaml#/components/schemas/Part");
        assert_eq!(props[5]["wire_type"]["format"], "double");
        assert_eq!(props[5]["read_only"], false);
    }
}
