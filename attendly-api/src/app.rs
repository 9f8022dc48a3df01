/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use attendly_api::{app::AppState, config::Config};
/// use attendly_shared::storage::Storage;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let storage = Storage::new(&config.storage)?;
/// let state = AppState::new(storage, config);
/// let app = attendly_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use attendly_shared::services::Services;
use attendly_shared::storage::Storage;
use attendly_shared::tenant::TenantContext;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Every field is a cheap handle.
#[derive(Clone)]
pub struct AppState {
    /// Storage facade (local or remote)
    pub storage: Storage,

    /// Active-organization tracker
    pub tenant: TenantContext,

    /// Domain services over `storage`
    pub services: Services,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(storage: Storage, config: Config) -> Self {
        Self {
            tenant: TenantContext::new(&storage),
            services: Services::new(storage.clone()),
            storage,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                                  # Health check
/// └── /v1/organizations
///     ├── GET  POST /
///     └── /:org_id
///         ├── GET PATCH DELETE /
///         ├── /groups              GET POST, /:id PATCH DELETE
///         ├── /members             GET POST, /:id PATCH DELETE
///         └── /event-dates         GET POST, /:id PATCH DELETE
///             ├── /:id/attendances GET PUT
///             └── /:id/summary     GET
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let organization_routes = Router::new()
        .route(
            "/",
            get(routes::organizations::list_organizations)
                .post(routes::organizations::create_organization),
        )
        .route(
            "/:org_id",
            get(routes::organizations::get_organization)
                .patch(routes::organizations::update_organization)
                .delete(routes::organizations::delete_organization),
        )
        .route(
            "/:org_id/groups",
            get(routes::groups::list_groups).post(routes::groups::create_group),
        )
        .route(
            "/:org_id/groups/:id",
            get(routes::groups::get_group)
                .patch(routes::groups::update_group)
                .delete(routes::groups::delete_group),
        )
        .route(
            "/:org_id/members",
            get(routes::members::list_members).post(routes::members::create_member),
        )
        .route(
            "/:org_id/members/:id",
            get(routes::members::get_member)
                .patch(routes::members::update_member)
                .delete(routes::members::delete_member),
        )
        .route(
            "/:org_id/event-dates",
            get(routes::event_dates::list_event_dates).post(routes::event_dates::create_event_date),
        )
        .route(
            "/:org_id/event-dates/:id",
            get(routes::event_dates::get_event_date)
                .patch(routes::event_dates::update_event_date)
                .delete(routes::event_dates::delete_event_date),
        )
        .route(
            "/:org_id/event-dates/:id/attendances",
            put(routes::attendances::record_attendance).get(routes::attendances::list_attendances),
        )
        .route(
            "/:org_id/event-dates/:id/summary",
            get(routes::attendances::get_summary),
        );

    let v1_routes = Router::new().nest("/organizations", organization_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE])
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
