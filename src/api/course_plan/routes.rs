/*
 * Responsibility
 * - /api/coursePlan の URL 構造を定義
 * - 認証 (access middleware) は app.rs 側でこの Router 全体に掛ける
 * - :planID が無い URL は 400 (Missing Plan ID) を返すために明示的に登録する
 * - :userID が無い URL (末尾スラッシュ含む) は principal 自身の一覧 / 作成として扱う
 */
use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

use crate::api::course_plan::handlers::plans::{
    create_plan, create_plan_for_owner, delete_plan, get_plan, list_plan_ids,
    list_plan_ids_for_owner, list_plans, missing_plan_id, update_plan,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/allPlansByID", get(list_plan_ids))
        .route("/allPlansByID/", get(list_plan_ids))
        .route("/allPlansByID/{user_id}", get(list_plan_ids_for_owner))
        .route("/allPlans", get(list_plans))
        .route("/createPlan", post(create_plan).put(create_plan))
        .route("/createPlan/", post(create_plan).put(create_plan))
        .route(
            "/createPlan/{user_id}",
            post(create_plan_for_owner).put(create_plan_for_owner),
        )
        .route("/updatePlan/{plan_id}", post(update_plan))
        .route("/getPlan/{plan_id}", get(get_plan))
        .route("/deletePlan/{plan_id}", delete(delete_plan))
        .route("/updatePlan", post(missing_plan_id))
        .route("/updatePlan/", post(missing_plan_id))
        .route("/getPlan", get(missing_plan_id))
        .route("/getPlan/", get(missing_plan_id))
        .route("/deletePlan", delete(missing_plan_id))
        .route("/deletePlan/", delete(missing_plan_id))
}
