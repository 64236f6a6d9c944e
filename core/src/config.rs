//! # Configuration
//!
//! Options steering introspection of one input batch.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// The embedded base type that injects identity and audit-timestamp fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BaseTypeConvention {
    /// Import path of the package declaring the base type.
    pub package: String,
    /// Bare name of the base type.
    pub name: String,
}

impl Default for BaseTypeConvention {
    fn default() -> Self {
        Self {
            package: "gorm.io/gorm".to_string(),
            name: "Model".to_string(),
        }
    }
}

impl BaseTypeConvention {
    /// Whether `package.name` denotes the base type.
    pub fn matches(&self, package: Option<&str>, name: &str) -> bool {
        name == self.name && package == Some(self.package.as_str())
    }

    /// Package qualifier of the base type (`gorm.io/gorm` -> `gorm`).
    pub fn namespace(&self) -> &str {
        package_qualifier(&self.package)
    }

    /// Qualified rendering used in diagnostics (`gorm.Model`).
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.namespace(), self.name)
    }
}

/// Options for one introspection batch.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntrospectOptions {
    /// Module prefix whose packages render as bare names in type descriptors.
    pub module_name: String,
    /// Accept types that do not embed the base type (permissive mode).
    pub allow_custom_models: bool,
    /// Fail the whole model on a malformed annotation instead of falling back.
    pub strict_annotations: bool,
    /// Mark every model of the batch as a wire model.
    pub wire_models: bool,
    /// The base-type convention.
    pub base_type: BaseTypeConvention,
}

impl IntrospectOptions {
    /// Options for a batch of generated wire models: no base type, flagged as wire.
    pub fn wire() -> Self {
        Self {
            allow_custom_models: true,
            wire_models: true,
            ..Self::default()
        }
    }

    /// Layers the keys of a YAML options section over `self`.
    ///
    /// Absent keys keep their current value, so a section naming only
    /// `module_name` over [`IntrospectOptions::wire`] still yields wire options.
    /// A null section changes nothing.
    ///
    /// # Errors
    ///
    /// `General` on unknown keys or mistyped values.
    pub fn overlay_yaml(self, section: serde_yaml::Value) -> AppResult<Self> {
        let invalid =
            |e: serde_yaml::Error| AppError::General(format!("Invalid introspection options: {}", e));
        let mut merged = serde_yaml::to_value(&self).map_err(invalid)?;
        merge_yaml(&mut merged, section);
        serde_yaml::from_value(merged).map_err(invalid)
    }

    /// Whether a package path belongs to the configured module.
    pub fn is_module_package(&self, package: &str) -> bool {
        let module = self.module_name.trim_end_matches('/');
        !module.is_empty()
            && (package == module
                || package
                    .strip_prefix(module)
                    .is_some_and(|rest| rest.starts_with('/')))
    }
}

fn merge_yaml(base: &mut serde_yaml::Value, overlay: serde_yaml::Value) {
    match (base, overlay) {
        (_, serde_yaml::Value::Null) => {}
        (serde_yaml::Value::Mapping(base), serde_yaml::Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                if let Some(slot) = base.get_mut(&key) {
                    merge_yaml(slot, value);
                } else {
                    base.insert(key, value);
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// The identifier a package is referred to by (`github.com/a/b/v2` -> `b`).
pub fn package_qualifier(path: &str) -> &str {
    let mut segments = path.rsplit('/');
    let last = segments.next().unwrap_or(path);
    let is_major_version = last.len() > 1
        && last.starts_with('v')
        && last[1..].chars().all(|c| c.is_ascii_digit());
    if is_major_version {
        segments.next().unwrap_or(last)
    } else {
        last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_convention() {
        let base = BaseTypeConvention::default();
        assert!(base.matches(Some("gorm.io/gorm"), "Model"));
        assert!(!base.matches(None, "Model"));
        assert!(!base.matches(Some("gorm.io/gorm"), "DeletedAt"));
        assert_eq!(base.qualified(), "gorm.Model");
    }

    #[test]
    fn test_package_qualifier() {
        assert_eq!(package_qualifier("gorm.io/gorm"), "gorm");
        assert_eq!(package_qualifier("github.com/shopspring/decimal"), "decimal");
        assert_eq!(package_qualifier("github.com/foo/bar/v2"), "bar");
        assert_eq!(package_qualifier("time"), "time");
    }

    #[test]
    fn test_module_package() {
        let opts = IntrospectOptions {
            module_name: "example.com/app".into(),
            ..Default::default()
        };
        assert!(opts.is_module_package("example.com/app"));
        assert!(opts.is_module_package("example.com/app/model"));
        assert!(!opts.is_module_package("example.com/application"));
        assert!(!IntrospectOptions::default().is_module_package("anything"));
    }

    fn section(yaml: &str) -> serde_yaml::Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_overlay_keeps_unset_keys() {
        let opts = IntrospectOptions::wire()
            .overlay_yaml(section("module_name: example.com/app\nbase_type:\n  name: Base\n"))
            .unwrap();
        assert_eq!(opts.module_name, "example.com/app");
        assert!(opts.wire_models);
        assert!(opts.allow_custom_models);
        assert_eq!(opts.base_type.name, "Base");
        assert_eq!(opts.base_type.package, "gorm.io/gorm");
    }

    #[test]
    fn test_overlay_null_section() {
        let opts = IntrospectOptions::wire()
            .overlay_yaml(serde_yaml::Value::Null)
            .unwrap();
        assert_eq!(opts, IntrospectOptions::wire());
    }

    #[test]
    fn test_overlay_rejects_unknown_keys() {
        let err = IntrospectOptions::default()
            .overlay_yaml(section("prune_yaml: true\n"))
            .unwrap_err();
        assert!(matches!(err, AppError::General(_)));
    }
}
