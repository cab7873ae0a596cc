/*
 * Responsibility
 * - course plan のユースケース (一覧 / 作成 / 取得 / 更新 / 削除)
 * - 所有者チェック: principal == plan.owner_id でなければ Forbidden
 * - 更新内容の検証 (modifiedDate は現在値より前に戻せない = createdDate より前にもならない)
 */
use std::fmt;
use std::sync::Arc;

use crate::error::AppError;
use crate::repos::plan_repo::{PlanChanges, PlanRepo, PlanRow};

#[derive(Clone)]
pub struct PlanService {
    repo: Arc<dyn PlanRepo>,
}

impl fmt::Debug for PlanService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlanService")
            .field("backend", &self.repo.backend_name())
            .finish()
    }
}

impl PlanService {
    pub fn new(repo: Arc<dyn PlanRepo>) -> Self {
        Self { repo }
    }

    pub fn backend_name(&self) -> &'static str {
        self.repo.backend_name()
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        Ok(self.repo.ping().await?)
    }

    pub async fn list_ids(&self, principal: &str) -> Result<Vec<i64>, AppError> {
        Ok(self.repo.list_ids_by_owner(principal).await?)
    }

    pub async fn list(&self, principal: &str) -> Result<Vec<PlanRow>, AppError> {
        Ok(self.repo.list_by_owner(principal).await?)
    }

    pub async fn create(&self, principal: &str) -> Result<PlanRow, AppError> {
        let row = self.repo.create(principal).await?;
        tracing::info!(plan_id = row.plan_id, owner = %principal, "course plan created");
        Ok(row)
    }

    /// `Ok(None)` when no plan has this id; `Forbidden` when it belongs to someone else.
    pub async fn find(&self, principal: &str, plan_id: i64) -> Result<Option<PlanRow>, AppError> {
        match self.repo.get(plan_id).await? {
            Some(row) => {
                ensure_owner(principal, &row)?;
                Ok(Some(row))
            }
            None => Ok(None),
        }
    }

    pub async fn update(
        &self,
        principal: &str,
        plan_id: i64,
        changes: PlanChanges,
    ) -> Result<PlanRow, AppError> {
        let current = self.owned(principal, plan_id).await?;

        if let Some(modified_date) = changes.modified_date
            && modified_date < current.modified_date
        {
            return Err(AppError::bad_request(
                "INVALID_MODIFIED_DATE",
                "modifiedDate cannot move backwards",
            ));
        }

        // The plan can disappear between the ownership check and the write.
        self.repo
            .update(plan_id, &changes)
            .await?
            .ok_or(AppError::not_found("course plan"))
    }

    pub async fn delete(&self, principal: &str, plan_id: i64) -> Result<(), AppError> {
        self.owned(principal, plan_id).await?;

        if !self.repo.delete(plan_id).await? {
            return Err(AppError::not_found("course plan"));
        }
        tracing::info!(plan_id, owner = %principal, "course plan deleted");
        Ok(())
    }

    async fn owned(&self, principal: &str, plan_id: i64) -> Result<PlanRow, AppError> {
        let row = self
            .repo
            .get(plan_id)
            .await?
            .ok_or(AppError::not_found("course plan"))?;
        ensure_owner(principal, &row)?;
        Ok(row)
    }
}

fn ensure_owner(principal: &str, row: &PlanRow) -> Result<(), AppError> {
    if row.owner_id == principal {
        Ok(())
    } else {
        tracing::warn!(
            plan_id = row.plan_id,
            principal = %principal,
            "access to another owner's course plan denied"
        );
        Err(AppError::Forbidden)
    }
}
