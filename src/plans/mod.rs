pub mod dto;
pub mod handlers;
pub mod memory;
pub mod repo;
pub mod services;

pub use dto::{GeneratePlanRequest, GeneratePlanResponse, StoredPlan};
pub use handlers::router;
pub use memory::InMemoryPlanRepository;
pub use repo::{PgPlanRepository, PlanRepository};
