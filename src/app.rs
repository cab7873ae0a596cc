/*
 * Responsibility
 * - tracing 初期化 → Config 読み込み → 依存生成 → Router 組み立て
 * - Middleware の適用 (認証 / CORS / security headers / HTTP 共通)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, redact_database_url};
use crate::repos::plan_repo::{InMemoryPlanRepo, PgPlanRepo, PlanRepo};
use crate::services::{auth::build_token_verifier, id_codec::IdCodec, plans::PlanService};
use crate::state::AppState;
use crate::{api, middleware};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,course_plan_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development: crash the whole process so we notice immediately.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env().context("failed to load configuration")?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting course plan API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Build process-level services and inject them into the shared application state.
pub async fn build_state(config: &Config) -> Result<AppState> {
    let id_codec = IdCodec::new(config.sqids_min_length, &config.sqids_alphabet)
        .context("invalid SQIDS_* configuration")?;

    let auth = build_token_verifier(config).context("invalid JWT_SECRET")?;
    tracing::info!(secret_fingerprint = %auth.fingerprint(), "access token verifier ready");

    let repo: Arc<dyn PlanRepo> = match &config.database_url {
        Some(url) => {
            tracing::info!(database = %redact_database_url(url), "connecting to postgres");
            let repo = PgPlanRepo::connect(url, config.database_max_connections)
                .await
                .context("failed to connect to DATABASE_URL")?;
            Arc::new(repo)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; course plans are kept in memory only");
            Arc::new(InMemoryPlanRepo::new())
        }
    };

    Ok(AppState::new(PlanService::new(repo), id_codec, auth))
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let plans = middleware::auth::access::apply(api::course_plan::routes(), state.clone());

    let router = Router::new()
        .route("/health", get(api::health::health))
        .nest("/api/coursePlan", plans)
        .with_state(state);

    let router = middleware::security_headers::apply(router);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router, config)
}
