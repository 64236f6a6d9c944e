//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.
//!
//! Every failure in the pipeline is a pure function of its input: recovery means
//! fixing the schema, tag or override and re-running, never retrying unchanged.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Clone, PartialEq, Eq, Display, From)]
pub enum AppError {
    /// The type does not embed the base-type convention and custom models are not allowed.
    #[from(ignore)]
    #[display("Not a model: '{model}' does not embed {base}")]
    NotAModel {
        /// The offending type name.
        model: String,
        /// The qualified base type that was expected.
        base: String,
    },

    /// A member's shape cannot be classified (map, chan, func, ...).
    #[from(ignore)]
    #[display("Type resolution error: {model}.{field} has unsupported type '{descriptor}'")]
    TypeResolution {
        /// Model owning the member.
        model: String,
        /// Member name.
        field: String,
        /// Rendered type of the member.
        descriptor: String,
    },

    /// A `goalesce:"..."` tag segment could not be parsed.
    #[from(ignore)]
    #[display("Annotation syntax error on {model}.{field}: malformed segment '{segment}'")]
    AnnotationSyntax {
        /// Model owning the field.
        model: String,
        /// Field name.
        field: String,
        /// The segment that failed to parse.
        segment: String,
    },

    /// The destination model has no counterpart for a source field.
    #[from(ignore)]
    #[display("Field not found: '{field}' does not exist on '{model}'")]
    FieldNotFound {
        /// Source field name.
        field: String,
        /// Destination model name.
        model: String,
    },

    /// A model declares the same field name twice.
    #[from(ignore)]
    #[display("Duplicate field: '{field}' is declared more than once on '{model}'")]
    DuplicateField {
        /// Model name.
        model: String,
        /// Duplicated field name.
        field: String,
    },

    /// Model source could not be read.
    #[from(ignore)]
    #[display("Declaration error at line {line}: {message}")]
    Declaration {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

impl AppError {
    /// Name of the model the error is scoped to, if any.
    pub fn model(&self) -> Option<&str> {
        match self {
            AppError::NotAModel { model, .. }
            | AppError::TypeResolution { model, .. }
            | AppError::AnnotationSyntax { model, .. }
            | AppError::FieldNotFound { model, .. }
            | AppError::DuplicateField { model, .. } => Some(model.as_str()),
            AppError::Declaration { .. } | AppError::General(_) => None,
        }
    }
}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;
