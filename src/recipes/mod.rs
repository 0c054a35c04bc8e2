pub mod dto;
pub mod handlers;
pub mod memory;
pub mod normalize;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use dto::{Comment, Recipe, RecipeStatus, RecipeType};
pub use handlers::router;
pub use memory::InMemoryRecipeRepository;
pub use normalize::recipe_to_meal;
pub use repo::{PgRecipeRepository, RecipeRepository};
