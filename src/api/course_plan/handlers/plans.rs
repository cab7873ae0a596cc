/*
 * Responsibility
 * - /api/coursePlan 系 handler
 * - 所有者は常に AuthCtx (token の user.id) から決める
 * - 旧 URL の :userID は AuthCtx と一致しなければ 403
 * - Path の :planID は公開 ID → extractor で復号化して内部 ID に変換して受け取る
 */
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::{
    api::course_plan::{
        dto::plans::{PlanIdResponse, PlanResponse, UpdatePlanRequest},
        extractors::{AuthCtx, AuthCtxExtractor, PublicPlanId},
    },
    error::AppError,
    repos::plan_repo::PlanRow,
    state::AppState,
};

fn row_to_response(state: &AppState, row: PlanRow) -> Result<PlanResponse, AppError> {
    Ok(PlanResponse {
        id: state.id_codec.encode(row.plan_id)?,
        owner_id: row.owner_id,
        name: row.name,
        created_date: row.created_date,
        modified_date: row.modified_date,
    })
}

fn ensure_path_owner(auth: &AuthCtx, user_id: &str) -> Result<(), AppError> {
    if user_id == auth.principal() {
        Ok(())
    } else {
        tracing::warn!(
            principal = %auth.principal(),
            requested_owner = %user_id,
            "owner in path does not match token"
        );
        Err(AppError::Forbidden)
    }
}

pub async fn list_plan_ids(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
) -> Result<Json<Vec<PlanIdResponse>>, AppError> {
    let ids = state.plans.list_ids(auth.principal()).await?;

    let mut res = Vec::with_capacity(ids.len());
    for id in ids {
        res.push(PlanIdResponse {
            id: state.id_codec.encode(id)?,
        });
    }

    Ok(Json(res))
}

pub async fn list_plan_ids_for_owner(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<PlanIdResponse>>, AppError> {
    ensure_path_owner(&auth, &user_id)?;
    list_plan_ids(State(state), AuthCtxExtractor(auth)).await
}

/// Full plans of the caller in one round trip (dashboard table).
pub async fn list_plans(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
) -> Result<Json<Vec<PlanResponse>>, AppError> {
    let rows = state.plans.list(auth.principal()).await?;

    let mut res = Vec::with_capacity(rows.len());
    for row in rows {
        res.push(row_to_response(&state, row)?);
    }

    Ok(Json(res))
}

pub async fn create_plan(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
) -> Result<Response, AppError> {
    let row = state.plans.create(auth.principal()).await?;
    let public_id = state.id_codec.encode(row.plan_id)?;

    // Body stays plain text; the new id travels in Location for the follow-up update.
    Ok((
        StatusCode::OK,
        [(header::LOCATION, format!("/api/coursePlan/getPlan/{public_id}"))],
        "Created course plan",
    )
        .into_response())
}

pub async fn create_plan_for_owner(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    Path(user_id): Path<String>,
) -> Result<Response, AppError> {
    ensure_path_owner(&auth, &user_id)?;
    create_plan(State(state), AuthCtxExtractor(auth)).await
}

pub async fn update_plan(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    plan_id: PublicPlanId,
    body: Result<Json<UpdatePlanRequest>, JsonRejection>,
) -> Result<&'static str, AppError> {
    let Json(req) = body.map_err(|e| AppError::bad_request("INVALID_BODY", e.body_text()))?;
    req.validate()
        .map_err(|msg| AppError::bad_request("INVALID_BODY", msg))?;

    state
        .plans
        .update(auth.principal(), plan_id.id, req.into_changes())
        .await?;

    Ok("Updated Course Plan")
}

/// Zero or one element; an unknown id is `[]`, not 404.
pub async fn get_plan(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    plan_id: PublicPlanId,
) -> Result<Json<Vec<PlanResponse>>, AppError> {
    let found = state.plans.find(auth.principal(), plan_id.id).await?;

    let res = match found {
        Some(row) => vec![row_to_response(&state, row)?],
        None => Vec::new(),
    };

    Ok(Json(res))
}

pub async fn delete_plan(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    plan_id: PublicPlanId,
) -> Result<&'static str, AppError> {
    state.plans.delete(auth.principal(), plan_id.id).await?;
    Ok("Deleted course plan")
}

pub async fn missing_plan_id(AuthCtxExtractor(_): AuthCtxExtractor) -> AppError {
    AppError::bad_request("MISSING_PLAN_ID", "Missing Plan ID")
}
