#![deny(missing_docs)]

//! # Input Loading
//!
//! Reads a model file into a bound [`ModelBatch`]. Go sources go through the
//! declaration reader; `.json`/`.yaml` files hold a structural description produced
//! by some other reflection facility.

use crate::error::CliResult;
use goalesce_core::{introspect_batch, read_package, IntrospectOptions, ModelBatch, PackageDescription};
use std::fs;
use std::path::Path;

/// Output encodings.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    #[default]
    Json,
    /// YAML.
    Yaml,
}

impl OutputFormat {
    /// Serializes `value` in this format.
    pub fn render<T: serde::Serialize>(self, value: &T) -> CliResult<String> {
        Ok(match self {
            OutputFormat::Json => serde_json::to_string_pretty(value)?,
            OutputFormat::Yaml => serde_yaml::to_string(value)?,
        })
    }
}

/// Reads the package description stored at `path`.
pub fn read_description(path: &Path) -> CliResult<PackageDescription> {
    let source = fs::read_to_string(path)?;
    let package: PackageDescription = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&source)?,
        Some("yaml" | "yml") => serde_yaml::from_str(&source)?,
        _ => read_package(&source, "")?,
    };
    Ok(package)
}

/// Introspects the file at `path` and binds its overrides.
pub fn load_batch(path: &Path, options: &IntrospectOptions) -> CliResult<ModelBatch> {
    let package = read_description(path)?;
    let batch = introspect_batch(std::slice::from_ref(&package), options).bind_overrides();
    tracing::info!(
        path = %path.display(),
        models = batch.models().len(),
        rejected = batch.rejected().len(),
        "loaded models"
    );
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;

    #[test]
    fn test_reads_json_description() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        fs::write(
            &path,
            r#"{"name": "model", "types": [{"name": "Tag", "ty": {"kind": "struct", "members": [
                {"name": "Label", "ty": {"kind": "basic", "name": "string"}}
            ]}}]}"#,
        )
        .unwrap();

        let options = IntrospectOptions {
            allow_custom_models: true,
            ..Default::default()
        };
        let batch = load_batch(&path, &options).unwrap();
        assert_eq!(batch.models()[0].fields()[0].name, "Label");
    }

    #[test]
    fn test_go_syntax_error_surfaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.go");
        fs::write(&path, "package model\ntype X struct {\n").unwrap();
        assert!(matches!(
            load_batch(&path, &IntrospectOptions::default()),
            Err(CliError::App(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let missing = Path::new("/nonexistent/models.go");
        assert!(matches!(read_description(missing), Err(CliError::Io(_))));
    }
}
