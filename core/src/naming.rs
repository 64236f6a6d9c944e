//! # Naming
//!
//! Deterministic case conversion for names that cross the domain/wire boundary.

use heck::{ToKebabCase, ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};

/// Converts a name to `camelCase` (`PersonID` -> `personId`).
pub fn to_camel_case(s: &str) -> String {
    s.trim().to_lower_camel_case()
}

/// Converts a name to `snake_case` (`PersonID` -> `person_id`).
pub fn to_snake_case(s: &str) -> String {
    s.trim().to_snake_case()
}

/// Converts a name to `PascalCase` (`person_id` -> `PersonId`).
pub fn to_pascal_case(s: &str) -> String {
    s.trim().to_upper_camel_case()
}

/// Converts a name to `kebab-case`, used for route segments (`VehicleModel` -> `vehicle-model`).
pub fn to_kebab_case(s: &str) -> String {
    s.trim().to_kebab_case()
}

/// True when two names denote the same concept modulo casing (`PersonId` ~ `PersonID`).
pub fn same_concept(a: &str, b: &str) -> bool {
    to_snake_case(a) == to_snake_case(b)
}
