#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::json;
use tokio::task::JoinHandle;

use course_plan_api::app::build_router;
use course_plan_api::config::Config;
use course_plan_api::repos::plan_repo::{InMemoryPlanRepo, PlanChanges, PlanRepo, PlanRow};
use course_plan_api::repos::{RepoError, RepoResult};
use course_plan_api::services::auth::build_token_verifier;
use course_plan_api::services::id_codec::IdCodec;
use course_plan_api::services::plans::PlanService;
use course_plan_api::state::AppState;

pub const SECRET: &str = "integration-test-secret";

pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn test_config() -> Config {
    let env: HashMap<&str, &str> = HashMap::from([("JWT_SECRET", SECRET)]);
    Config::from_lookup(|key: &str| env.get(key).map(|v| v.to_string())).expect("test config")
}

pub fn codec() -> IdCodec {
    let config = test_config();
    IdCodec::new(config.sqids_min_length, &config.sqids_alphabet).expect("id codec")
}

/// Public id the server would hand out for internal id `n`.
pub fn public_id(n: i64) -> String {
    codec().encode(n).expect("encode")
}

/// Start the real router on an ephemeral port, backed by the given store.
pub async fn spawn_with_repo(repo: Arc<dyn PlanRepo>) -> Result<TestServer> {
    let config = test_config();
    let state = AppState::new(PlanService::new(repo), codec(), build_token_verifier(&config)?);
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(TestServer {
        base_url: format!("http://{}", addr),
        client: reqwest::Client::new(),
        handle,
    })
}

pub async fn spawn() -> Result<TestServer> {
    spawn_with_repo(Arc::new(InMemoryPlanRepo::new())).await
}

pub fn token_with_secret(user_id: &str, secret: &str) -> String {
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &json!({ "user": { "id": user_id } }),
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("sign token")
}

pub fn token_for(user_id: &str) -> String {
    token_with_secret(user_id, SECRET)
}

/// Store wrapper that counts every call that reaches it.
#[derive(Default)]
pub struct CountingRepo {
    inner: InMemoryPlanRepo,
    calls: AtomicUsize,
}

impl CountingRepo {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl PlanRepo for CountingRepo {
    fn backend_name(&self) -> &'static str {
        "counting"
    }

    async fn ping(&self) -> RepoResult<()> {
        self.inner.ping().await
    }

    async fn list_ids_by_owner(&self, owner_id: &str) -> RepoResult<Vec<i64>> {
        self.hit();
        self.inner.list_ids_by_owner(owner_id).await
    }

    async fn list_by_owner(&self, owner_id: &str) -> RepoResult<Vec<PlanRow>> {
        self.hit();
        self.inner.list_by_owner(owner_id).await
    }

    async fn create(&self, owner_id: &str) -> RepoResult<PlanRow> {
        self.hit();
        self.inner.create(owner_id).await
    }

    async fn get(&self, plan_id: i64) -> RepoResult<Option<PlanRow>> {
        self.hit();
        self.inner.get(plan_id).await
    }

    async fn update(&self, plan_id: i64, changes: &PlanChanges) -> RepoResult<Option<PlanRow>> {
        self.hit();
        self.inner.update(plan_id, changes).await
    }

    async fn delete(&self, plan_id: i64) -> RepoResult<bool> {
        self.hit();
        self.inner.delete(plan_id).await
    }
}

/// Store whose every operation fails like an unreachable database.
pub struct FailingRepo;

fn unavailable<T>() -> RepoResult<T> {
    Err(RepoError::Db(sqlx::Error::PoolTimedOut))
}

#[async_trait]
impl PlanRepo for FailingRepo {
    fn backend_name(&self) -> &'static str {
        "failing"
    }

    async fn ping(&self) -> RepoResult<()> {
        unavailable()
    }

    async fn list_ids_by_owner(&self, _owner_id: &str) -> RepoResult<Vec<i64>> {
        unavailable()
    }

    async fn list_by_owner(&self, _owner_id: &str) -> RepoResult<Vec<PlanRow>> {
        unavailable()
    }

    async fn create(&self, _owner_id: &str) -> RepoResult<PlanRow> {
        unavailable()
    }

    async fn get(&self, _plan_id: i64) -> RepoResult<Option<PlanRow>> {
        unavailable()
    }

    async fn update(&self, _plan_id: i64, _changes: &PlanChanges) -> RepoResult<Option<PlanRow>> {
        unavailable()
    }

    async fn delete(&self, _plan_id: i64) -> RepoResult<bool> {
        unavailable()
    }
}
