pub mod error;
pub mod plan_repo;

pub use error::{RepoError, RepoResult};
pub use plan_repo::{InMemoryPlanRepo, PgPlanRepo, PlanChanges, PlanRepo, PlanRow};
