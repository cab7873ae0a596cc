/*
 * Responsibility
 * - course plan ストアのインターフェース (PlanRepo)
 * - 実装は postgres (本番) と memory (開発・テスト) の 2 つ
 * - 所有者チェックはここではなく services::plans の責務
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::repos::error::RepoResult;

mod memory;
mod postgres;

pub use memory::InMemoryPlanRepo;
pub use postgres::PgPlanRepo;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PlanRow {
    #[sqlx(rename = "planId")]
    pub plan_id: i64,

    #[sqlx(rename = "ownerId")]
    pub owner_id: String,

    pub name: Option<String>,

    #[sqlx(rename = "createdDate")]
    pub created_date: DateTime<Utc>,

    #[sqlx(rename = "modifiedDate")]
    pub modified_date: DateTime<Utc>,
}

/// Fields a caller is allowed to change after creation.
///
/// `None` means "leave as is". Owner and creation date are deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanChanges {
    pub name: Option<String>,
    pub modified_date: Option<DateTime<Utc>>,
}

impl PlanChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.modified_date.is_none()
    }
}

/// Plan persistence.
///
/// Implementations are shared behind `Arc<dyn PlanRepo>`; every method is a
/// single store round trip.
#[async_trait]
pub trait PlanRepo: Send + Sync + 'static {
    // Returns the store backend name (for logging/health).
    fn backend_name(&self) -> &'static str;

    // Cheap liveness probe.
    async fn ping(&self) -> RepoResult<()>;

    // Plan ids owned by `owner_id`, in creation order.
    async fn list_ids_by_owner(&self, owner_id: &str) -> RepoResult<Vec<i64>>;

    // Full plans owned by `owner_id`, in creation order.
    async fn list_by_owner(&self, owner_id: &str) -> RepoResult<Vec<PlanRow>>;

    // Insert an empty plan (owner + timestamps only).
    async fn create(&self, owner_id: &str) -> RepoResult<PlanRow>;

    async fn get(&self, plan_id: i64) -> RepoResult<Option<PlanRow>>;

    // Returns `None` if the plan does not exist.
    async fn update(&self, plan_id: i64, changes: &PlanChanges) -> RepoResult<Option<PlanRow>>;

    // Returns `true` if a plan was removed.
    async fn delete(&self, plan_id: i64) -> RepoResult<bool>;
}
