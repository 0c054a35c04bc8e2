use crate::meals::MealType;

use MealType::{Breakfast, Dinner, Lunch, Snack};

const FIVE: [MealType; 5] = [Breakfast, Snack, Lunch, Snack, Dinner];
const FOUR: [MealType; 4] = [Breakfast, Snack, Lunch, Dinner];
const THREE: [MealType; 3] = [Breakfast, Lunch, Dinner];
const TWO: [MealType; 2] = [Breakfast, Dinner];

/// Fixed slot sequence for a day. Same for every day of the week and
/// independent of what the catalog contains.
pub fn slot_template(meals_per_day: u32) -> &'static [MealType] {
    match meals_per_day {
        n if n >= 5 => &FIVE,
        4 => &FOUR,
        3 => &THREE,
        _ => &TWO,
    }
}
