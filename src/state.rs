/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - plans: PlanService, id_codec: IdCodec, auth: TokenVerifier
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::{auth::TokenVerifier, id_codec::IdCodec, plans::PlanService};

#[derive(Clone, Debug)]
pub struct AppState {
    pub plans: PlanService,
    pub id_codec: IdCodec,
    pub auth: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(plans: PlanService, id_codec: IdCodec, auth: Arc<TokenVerifier>) -> Self {
        Self {
            plans,
            id_codec,
            auth,
        }
    }
}
