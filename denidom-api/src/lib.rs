//! denidom-api library - estimating service
//!
//! JSON REST API over the DeniDom database: accounts, clients, projects,
//! estimates, the public calculator, reference lookups, CSV documents and
//! AI-assisted flows.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod ai;
pub mod api;
pub mod db;
pub mod error;
pub mod extract;

use ai::AiClient;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    /// HS256 signing secret for bearer tokens
    pub jwt_secret: Arc<str>,
    pub token_ttl_hours: i64,
    /// `None` runs the AI flows in fallback mode
    pub ai: Option<Arc<AiClient>>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(db: SqlitePool, jwt_secret: &str, token_ttl_hours: i64) -> Self {
        Self {
            db,
            jwt_secret: Arc::from(jwt_secret),
            token_ttl_hours,
            ai: None,
            started_at: Instant::now(),
        }
    }

    pub fn with_ai(mut self, client: AiClient) -> Self {
        self.ai = Some(Arc::new(client));
        self
    }
}

/// Build application router
///
/// Health, auth entry points, the calculator and reference lookups are
/// public. Everything touching a user's rows goes through
/// [`api::middleware::require_auth`].
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    let protected = Router::new()
        .route("/api/auth/me", get(api::auth::me))
        .route(
            "/api/clients",
            get(api::clients::list_clients).post(api::clients::create_client),
        )
        .route(
            "/api/clients/:id",
            get(api::clients::get_client)
                .put(api::clients::update_client)
                .delete(api::clients::delete_client),
        )
        .route(
            "/api/projects",
            get(api::projects::list_projects).post(api::projects::create_project),
        )
        .route(
            "/api/projects/:id",
            get(api::projects::get_project)
                .put(api::projects::update_project)
                .delete(api::projects::delete_project),
        )
        .route(
            "/api/projects/:id/estimates",
            get(api::estimates::list_estimates).post(api::estimates::create_estimate),
        )
        .route(
            "/api/estimates/:id",
            get(api::estimates::get_estimate)
                .put(api::estimates::update_estimate)
                .delete(api::estimates::delete_estimate),
        )
        .route(
            "/api/export/estimates/:id/:kind",
            get(api::export::export_estimate).post(api::export::export_with_actuals),
        )
        .route("/api/ai/generate-estimate", post(api::ai::generate_estimate))
        .route("/api/ai/advice", post(api::ai::cost_advice))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::middleware::require_auth,
        ));

    let public = Router::new()
        .merge(api::health_routes())
        .route("/api/auth/register", post(api::auth::register))
        .route("/api/auth/login", post(api::auth::login))
        .merge(api::calculator::calculator_routes())
        .route("/api/normatives", get(api::reference::search_normatives))
        .route("/api/normatives/bases", get(api::reference::list_bases))
        .route("/api/materials", get(api::reference::list_materials));

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
