//! # Mapper Planning
//!
//! Pairs every domain model with its wire counterpart and synthesizes both mapper
//! bodies field by field.

use crate::binding::ModelBatch;
use crate::error::AppResult;
use crate::schema::ModelMetadata;
use crate::synthesize::{convert_field, Direction, FieldConversion};
use serde::Serialize;

/// Both conversions of one model pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapperPlan {
    /// Shared model name.
    pub model: String,
    /// Domain fields onto the wire model.
    pub to_wire: Vec<FieldConversion>,
    /// Wire fields onto the domain model.
    pub to_domain: Vec<FieldConversion>,
}

/// Synthesizes every field of `source` onto `destination`.
pub fn plan_direction(
    source: &ModelMetadata,
    destination: &ModelMetadata,
    direction: Direction,
) -> AppResult<Vec<FieldConversion>> {
    source
        .all_fields()
        .into_iter()
        .map(|field| convert_field(field, destination, direction))
        .collect()
}

/// Plans the mappers of every domain model that has a wire counterpart.
///
/// A domain model without counterpart is skipped with a warning.
///
/// # Errors
///
/// `FieldNotFound` on the first field without counterpart.
pub fn plan_mappers(domain: &ModelBatch, wire: &ModelBatch) -> AppResult<Vec<MapperPlan>> {
    let mut plans = Vec::new();
    for model in domain.models() {
        let Some(counterpart) = wire.find(&model.name) else {
            tracing::warn!(model = %model.name, "no wire model found, skipping mapper");
            continue;
        };
        plans.push(MapperPlan {
            model: model.name.clone(),
            to_wire: plan_direction(model, counterpart, Direction::ToWire)?,
            to_domain: plan_direction(counterpart, model, Direction::ToDomain)?,
        });
    }
    Ok(plans)
}
