pub mod catalog;
pub mod model;

pub use catalog::{static_meals, MealCatalog};
pub use model::{Ingredient, Meal, MealType};
