/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 */

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `user_id` は token の `user.id` (plan の ownerID と突き合わせる値)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCtx {
    pub user_id: String,
}

impl AuthCtx {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    pub fn principal(&self) -> &str {
        &self.user_id
    }
}
