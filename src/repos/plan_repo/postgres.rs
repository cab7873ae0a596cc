/*
 * Responsibility
 * - course_plans テーブル向け SQLx 操作
 * - スキーマは sql/course_plans.sql (マイグレーションはしない)
 */
use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::repos::error::RepoResult;
use crate::repos::plan_repo::{PlanChanges, PlanRepo, PlanRow};

#[derive(Clone, Debug)]
pub struct PgPlanRepo {
    pool: PgPool,
}

impl PgPlanRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> RepoResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl PlanRepo for PgPlanRepo {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> RepoResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_ids_by_owner(&self, owner_id: &str) -> RepoResult<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT "planId"
            FROM course_plans
            WHERE "ownerId" = $1
            ORDER BY "planId" ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn list_by_owner(&self, owner_id: &str) -> RepoResult<Vec<PlanRow>> {
        let rows = sqlx::query_as::<_, PlanRow>(
            r#"
            SELECT "planId", "ownerId", name, "createdDate", "modifiedDate"
            FROM course_plans
            WHERE "ownerId" = $1
            ORDER BY "planId" ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn create(&self, owner_id: &str) -> RepoResult<PlanRow> {
        let row = sqlx::query_as::<_, PlanRow>(
            r#"
            INSERT INTO course_plans ("ownerId")
            VALUES ($1)
            RETURNING "planId", "ownerId", name, "createdDate", "modifiedDate"
            "#,
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn get(&self, plan_id: i64) -> RepoResult<Option<PlanRow>> {
        let row = sqlx::query_as::<_, PlanRow>(
            r#"
            SELECT "planId", "ownerId", name, "createdDate", "modifiedDate"
            FROM course_plans
            WHERE "planId" = $1
            "#,
        )
        .bind(plan_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update(&self, plan_id: i64, changes: &PlanChanges) -> RepoResult<Option<PlanRow>> {
        // "ownerId" / "createdDate" are never part of the SET list.
        let row = sqlx::query_as::<_, PlanRow>(
            r#"
            UPDATE course_plans
            SET
                name = COALESCE($2, name),
                "modifiedDate" = COALESCE($3, "modifiedDate")
            WHERE "planId" = $1
            RETURNING "planId", "ownerId", name, "createdDate", "modifiedDate"
            "#,
        )
        .bind(plan_id)
        .bind(changes.name.as_deref())
        .bind(changes.modified_date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn delete(&self, plan_id: i64) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM course_plans
            WHERE "planId" = $1
            "#,
        )
        .bind(plan_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
