use std::sync::Arc;

use crate::meals::Meal;

use super::preferences::DietaryPreference;

/// Keeps meals tagged with the preference (exact, case-sensitive match).
/// `None` returns the catalog untouched. An empty result is not an error.
pub fn filter_by_diet(catalog: &[Arc<Meal>], preference: &DietaryPreference) -> Vec<Arc<Meal>> {
    match preference {
        DietaryPreference::None => catalog.to_vec(),
        DietaryPreference::Tag(tag) => catalog
            .iter()
            .filter(|m| m.has_tag(tag))
            .cloned()
            .collect(),
    }
}
