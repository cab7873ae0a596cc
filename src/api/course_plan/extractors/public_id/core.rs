/*
 * Responsibility
 *  - Path の公開 ID 文字列を decode して内部 ID (i64) に変換する
 *  - sqids codec を使った decode
 *  - Axum の FromRequestParts 実装
 *  - 失敗時は 400 (AppError::BadRequest)
 * 置かないもの
 *  - Plan などの具体リソース名 (types.rs 側)
 */
use std::marker::PhantomData;

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Clone, Copy)]
pub struct PublicId<T> {
    pub id: i64,
    _marker: PhantomData<T>,
}

impl<T> PublicId<T> {
    fn new(id: i64) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }
}

fn decode_or_bad_request(state: &AppState, public_id: &str) -> Result<i64, AppError> {
    if public_id.trim().is_empty() {
        return Err(AppError::bad_request("MISSING_PLAN_ID", "Missing Plan ID"));
    }
    Ok(state.id_codec.decode(public_id)?)
}

impl<T> FromRequestParts<AppState> for PublicId<T>
where
    T: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Path(public_id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::bad_request("MISSING_PLAN_ID", "Missing Plan ID"))?;
        let id = decode_or_bad_request(state, &public_id)?;
        Ok(Self::new(id))
    }
}

impl<T> std::fmt::Debug for PublicId<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicId").field("id", &self.id).finish()
    }
}
