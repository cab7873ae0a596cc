/*
 * Responsibility
 * - DATABASE_URL なしで動かすためのインメモリ実装 (開発・テスト用)
 * - id は postgres の BIGSERIAL と同じく 1 から採番
 */
use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::repos::error::RepoResult;
use crate::repos::plan_repo::{PlanChanges, PlanRepo, PlanRow};

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    // BTreeMap keeps creation order for free (ids are monotonic).
    plans: BTreeMap<i64, PlanRow>,
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryPlanRepo {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryPlanRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlanRepo for InMemoryPlanRepo {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> RepoResult<()> {
        Ok(())
    }

    async fn list_ids_by_owner(&self, owner_id: &str) -> RepoResult<Vec<i64>> {
        let inner = self.inner.read().await;
        Ok(inner
            .plans
            .values()
            .filter(|p| p.owner_id == owner_id)
            .map(|p| p.plan_id)
            .collect())
    }

    async fn list_by_owner(&self, owner_id: &str) -> RepoResult<Vec<PlanRow>> {
        let inner = self.inner.read().await;
        Ok(inner
            .plans
            .values()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn create(&self, owner_id: &str) -> RepoResult<PlanRow> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;

        let now = Utc::now();
        let row = PlanRow {
            plan_id: inner.next_id,
            owner_id: owner_id.to_string(),
            name: None,
            created_date: now,
            modified_date: now,
        };
        inner.plans.insert(row.plan_id, row.clone());

        Ok(row)
    }

    async fn get(&self, plan_id: i64) -> RepoResult<Option<PlanRow>> {
        let inner = self.inner.read().await;
        Ok(inner.plans.get(&plan_id).cloned())
    }

    async fn update(&self, plan_id: i64, changes: &PlanChanges) -> RepoResult<Option<PlanRow>> {
        let mut inner = self.inner.write().await;
        let Some(row) = inner.plans.get_mut(&plan_id) else {
            return Ok(None);
        };

        if let Some(name) = &changes.name {
            row.name = Some(name.clone());
        }
        if let Some(modified_date) = changes.modified_date {
            row.modified_date = modified_date;
        }

        Ok(Some(row.clone()))
    }

    async fn delete(&self, plan_id: i64) -> RepoResult<bool> {
        let mut inner = self.inner.write().await;
        Ok(inner.plans.remove(&plan_id).is_some())
    }
}
