#![deny(missing_docs)]

//! # Configuration
//!
//! Loads the YAML configuration steering introspection of both sides.

use crate::error::CliResult;
use goalesce_core::IntrospectOptions;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Options for the domain and wire batches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalesceConfig {
    /// Options for domain model sources.
    pub domain: IntrospectOptions,
    /// Options for generated wire model sources.
    pub wire: IntrospectOptions,
}

impl Default for GoalesceConfig {
    fn default() -> Self {
        Self {
            domain: IntrospectOptions::default(),
            wire: IntrospectOptions::wire(),
        }
    }
}

/// Raw sections of the configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    domain: serde_yaml::Value,
    wire: serde_yaml::Value,
}

impl GoalesceConfig {
    /// Loads `path`, or the defaults when no path is given.
    ///
    /// Each section is layered over its own defaults: keys a section leaves out
    /// keep the domain or wire default respectively.
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let yaml = fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&yaml)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parses a configuration document.
    pub fn from_yaml_str(yaml: &str) -> CliResult<Self> {
        let file: Option<ConfigFile> = serde_yaml::from_str(yaml)?;
        let file = file.unwrap_or_default();
        let defaults = Self::default();
        Ok(Self {
            domain: defaults.domain.overlay_yaml(file.domain)?,
            wire: defaults.wire.overlay_yaml(file.wire)?,
        })
    }
}
