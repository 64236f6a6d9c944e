//! # Override Binding
//!
//! The single batch-wide mutation window between introspection and synthesis.
//! [`IntrospectedBatch::bind_overrides`] consumes the freshly introspected models and
//! returns a read-only [`ModelBatch`]; nothing can synthesize from a batch whose
//! overrides are still unbound.

use crate::error::AppError;
use crate::schema::{FieldOverride, ModelField, ModelMetadata, OverrideSource};
use crate::synthesize::Direction;
use indexmap::IndexSet;
use serde::Serialize;

/// Prefix of name-convention functions converting wire to domain.
pub const TO_DOMAIN_PREFIX: &str = "Map";
/// Prefix of name-convention functions converting domain to wire.
pub const TO_WIRE_PREFIX: &str = "MapApi";

/// An input that failed introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedModel {
    /// Package of the input.
    pub namespace: String,
    /// Type name of the input.
    pub name: String,
    /// Rendered error.
    pub reason: String,
    #[serde(skip)]
    error: AppError,
}

impl RejectedModel {
    /// Records `error` against `namespace.name`.
    pub fn new(namespace: &str, name: &str, error: AppError) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            reason: error.to_string(),
            error,
        }
    }

    /// The error that rejected the input.
    pub fn error(&self) -> &AppError {
        &self.error
    }
}

/// Models introspected together, awaiting override binding.
#[derive(Debug, Clone)]
pub struct IntrospectedBatch {
    models: Vec<ModelMetadata>,
    rejected: Vec<RejectedModel>,
    functions: Vec<String>,
}

impl IntrospectedBatch {
    /// Assembles a batch.
    pub fn new(models: Vec<ModelMetadata>, rejected: Vec<RejectedModel>, functions: Vec<String>) -> Self {
        Self {
            models,
            rejected,
            functions,
        }
    }

    /// Introspected models.
    pub fn models(&self) -> &[ModelMetadata] {
        &self.models
    }

    /// Inputs that failed introspection.
    pub fn rejected(&self) -> &[RejectedModel] {
        &self.rejected
    }

    /// Top-level function names seen across the batch.
    pub fn functions(&self) -> &[String] {
        &self.functions
    }

    /// Binds name-convention overrides across the whole batch.
    ///
    /// `Map<Model><Field>` binds the ToDomain override and `MapApi<Model><Field>`
    /// the ToWire override of the field named `<Field>` in the top-level model
    /// `<Model>`, inherited fields included. A tag-declared override is never
    /// replaced; a disagreeing candidate is logged and dropped.
    pub fn bind_overrides(mut self) -> ModelBatch {
        let functions: IndexSet<&str> = self
            .functions
            .iter()
            .map(String::as_str)
            .filter(|name| name.starts_with(TO_DOMAIN_PREFIX))
            .collect();
        let mut used: IndexSet<String> = IndexSet::new();

        for model in &mut self.models {
            let model_name = model.name.clone();
            for field in model.all_fields_mut() {
                let concept = field.concept(&model_name);
                for direction in [Direction::ToDomain, Direction::ToWire] {
                    let candidate = format!("{}{}", convention_prefix(direction), concept);
                    if functions.contains(candidate.as_str()) {
                        bind(&model_name, field, direction, &candidate);
                        used.insert(candidate);
                    }
                }
            }
        }

        for unmatched in functions.iter().filter(|f| !used.contains(**f)) {
            tracing::debug!(function = unmatched, "mapping function matches no field");
        }

        ModelBatch {
            models: self.models,
            rejected: self.rejected,
        }
    }
}

fn convention_prefix(direction: Direction) -> &'static str {
    match direction {
        Direction::ToWire => TO_WIRE_PREFIX,
        Direction::ToDomain => TO_DOMAIN_PREFIX,
    }
}

fn bind(model: &str, field: &mut ModelField, direction: Direction, function: &str) {
    let name = field.name.clone();
    let slot = field.override_slot(direction);

    if let Some(existing) = slot.as_ref().filter(|o| o.source == OverrideSource::Tag) {
        if existing.function != function {
            tracing::warn!(
                model,
                field = %name,
                tag = %existing.function,
                convention = function,
                "tag override takes precedence over name-convention function"
            );
        }
        return;
    }

    tracing::trace!(model, field = %name, function, "bound override");
    *slot = Some(FieldOverride::name_convention(function));
}

/// A batch after override binding. Read-only: every [`ModelField`] reachable from it
/// carries its final overrides, so synthesis over it may run in parallel freely.
#[derive(Debug, Clone, Serialize)]
pub struct ModelBatch {
    models: Vec<ModelMetadata>,
    rejected: Vec<RejectedModel>,
}

impl ModelBatch {
    /// Bound models in input order.
    pub fn models(&self) -> &[ModelMetadata] {
        &self.models
    }

    /// Inputs that failed introspection.
    pub fn rejected(&self) -> &[RejectedModel] {
        &self.rejected
    }

    /// Looks up a model by name.
    pub fn find(&self, name: &str) -> Option<&ModelMetadata> {
        self.models.iter().find(|m| m.name == name)
    }
}
