//! access token (JWT) 検証 → AuthCtx を extensions に入れる
//!
//! - 資格情報は `x-auth-token` ヘッダから取る (API クライアント向けに
//!   `Authorization: Bearer <jwt>` もフォールバックとして受け付ける)
//! - 失敗理由 (ヘッダなし / 署名不一致 / 期限切れ / claim 不足) は区別せず 401
//! - 失敗理由はサーバーログ (warn) にだけ出す

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::course_plan::extractors::AuthCtx;
use crate::error::AppError;
use crate::state::AppState;

pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// `/api/coursePlan/*` に認証を掛けるための middleware を適用する。
///
/// 例：
/// ```ignore
/// let plans = api::course_plan::routes();
/// let plans = middleware::auth::access::apply(plans, state.clone());
/// app = app.nest("/api/coursePlan", plans);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = credential_from_headers(req.headers()) else {
        tracing::warn!(path = %req.uri().path(), "missing access token");
        return Err(AppError::Unauthorized);
    };

    let identity = match state.auth.verify_identity(token) {
        Ok(identity) => identity,
        Err(err) => {
            tracing::warn!(
                error = %err,
                path = %req.uri().path(),
                "access token verification failed"
            );
            return Err(AppError::Unauthorized);
        }
    };

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(AuthCtx::new(identity.user_id));

    Ok(next.run(req).await)
}

fn credential_from_headers(headers: &HeaderMap) -> Option<&str> {
    let from_custom = headers
        .get(AUTH_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty());

    from_custom.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|s| !s.is_empty())
    })
}
