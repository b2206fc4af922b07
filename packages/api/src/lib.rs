// ABOUTME: HTTP API layer for the sprint bulletin providing REST endpoints and routing
// ABOUTME: Integration layer that wires the backlog store, sprint content, and chat assistant

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post},
    Router,
};
use bulletin_ai::ChatAssistant;
use bulletin_backlog::BacklogStore;
use bulletin_content::SprintSource;
use tower_http::services::ServeDir;

pub mod access_gate;
pub mod access_handlers;
pub mod content_handlers;
pub mod ideas_handlers;
pub mod initiatives_handlers;
pub mod response;
pub mod uploads_handlers;

pub use response::{ApiResponse, AppError};

/// Largest multipart body accepted by the upload endpoints (25 MiB)
const UPLOAD_BODY_LIMIT: usize = 25 * 1024 * 1024;

/// Settings the handlers need at request time
#[derive(Debug, Clone, Default)]
pub struct ApiSettings {
    /// Key for access-request administration; `None` disables it
    pub admin_key: Option<String>,
    /// Mark the access cookie `Secure`
    pub cookie_secure: bool,
    /// Directory served under `/uploads`
    pub upload_dir: PathBuf,
}

/// Shared state for all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: BacklogStore,
    pub sprints: SprintSource,
    pub assistant: ChatAssistant,
    pub settings: Arc<ApiSettings>,
}

impl AppState {
    pub fn new(
        store: BacklogStore,
        sprints: SprintSource,
        assistant: ChatAssistant,
        settings: ApiSettings,
    ) -> Self {
        Self {
            store,
            sprints,
            assistant,
            settings: Arc::new(settings),
        }
    }
}

/// Creates the initiatives API router
fn create_initiatives_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(initiatives_handlers::list_initiatives).post(initiatives_handlers::create_initiative),
        )
        .route(
            "/{id}",
            get(initiatives_handlers::get_initiative)
                .patch(initiatives_handlers::patch_initiative)
                .delete(initiatives_handlers::delete_initiative),
        )
}

/// Creates the ideas API router
fn create_ideas_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(ideas_handlers::list_ideas).post(ideas_handlers::create_idea),
        )
        .route(
            "/{id}",
            patch(ideas_handlers::patch_idea).delete(ideas_handlers::delete_idea),
        )
        .route("/{id}/vote", post(ideas_handlers::vote_idea))
}

/// Creates the access API router
fn create_access_router() -> Router<AppState> {
    Router::new()
        .route("/request", post(access_handlers::request_access))
        .route("/verify", post(access_handlers::verify_access))
        .route("/admin/requests", get(access_handlers::list_requests))
        .route("/admin/approve", post(access_handlers::approve_request))
        .route("/admin/reject", post(access_handlers::reject_request))
}

/// Creates the admin API router
fn create_admin_router() -> Router<AppState> {
    Router::new()
        .route("/reseed", post(uploads_handlers::reseed))
        .route(
            "/import-roadmap",
            post(uploads_handlers::import_roadmap).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
}

/// Build the full application router behind the access gate
pub fn create_router(state: AppState) -> Router {
    let uploads = ServeDir::new(&state.settings.upload_dir);

    Router::new()
        .route("/api/health", get(content_handlers::health_check))
        .nest("/api/initiatives", create_initiatives_router())
        .route("/api/roadmap/board", get(initiatives_handlers::roadmap_board))
        .nest("/api/ideas", create_ideas_router())
        .nest("/api/access", create_access_router())
        .nest("/api/admin", create_admin_router())
        .route(
            "/api/uploads",
            post(uploads_handlers::upload_file).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/api/chat", post(content_handlers::chat))
        .route("/api/sprints", get(content_handlers::list_sprints))
        .route("/api/sprints/{slug}", get(content_handlers::get_sprint))
        .nest_service("/uploads", uploads)
        .fallback(content_handlers::not_found)
        .layer(middleware::from_fn(access_gate::access_gate))
        .with_state(state)
}
