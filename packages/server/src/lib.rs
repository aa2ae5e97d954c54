pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod records;
pub mod routes;
pub mod seed;
pub mod state;
pub mod store;

use std::time::Duration;

use axum::http::HeaderValue;
use axum::{Json, routing::get};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as ScalarServable};

use crate::config::CorsConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Kiosk API",
        version = "1.0.0",
        description = "RFID video triggers, screen layouts and users for the kiosk display"
    ),
    nest((path = "/api/v1", api = V1Api)),
    tags(
        (name = "RFID", description = "RFID codes and their videos"),
        (name = "Layouts", description = "Active layout per kiosk screen"),
        (name = "Users", description = "User CRUD operations"),
    ),
)]
struct ApiDoc;

#[derive(OpenApi)]
#[openapi(paths(
    handlers::rfid::create_rfid,
    handlers::rfid::list_rfid,
    handlers::rfid::get_rfid,
    handlers::rfid::get_rfid_by_code,
    handlers::rfid::update_rfid,
    handlers::rfid::delete_rfid,
    handlers::layout::create_layout,
    handlers::layout::list_layouts,
    handlers::layout::get_layout,
    handlers::layout::update_layout,
    handlers::layout::delete_layout,
    handlers::layout::get_layout_by_screen,
    handlers::layout::update_layout_by_screen,
    handlers::layout::delete_layout_by_screen,
    handlers::user::create_user,
    handlers::user::list_users,
    handlers::user::get_user,
    handlers::user::get_user_by_email,
    handlers::user::update_user,
    handlers::user::delete_user,
))]
struct V1Api;

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let api = ApiDoc::openapi();
    let cors = build_cors(&state.config.server.cors);

    let mut router = axum::Router::new().nest("/api", routes::api_routes(&state.config));

    let prefix = state.config.storage.public_prefix.trim_end_matches('/');
    if prefix.starts_with('/') && prefix.len() > 1 {
        router = router.nest_service(prefix, ServeDir::new(&state.config.storage.upload_dir));
    } else {
        tracing::warn!(prefix, "Public prefix is not a sub-path; uploads are not served");
    }

    let spec = api.clone();
    router
        .with_state(state)
        .route(
            "/api-docs/openapi.json",
            get(move || {
                let spec = spec.clone();
                async move { Json(spec) }
            }),
        )
        .merge(Scalar::with_url("/scalar", api))
        .layer(cors)
}

fn build_cors(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allow_origins
        .iter()
        .filter(|o| o.as_str() != "*")
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() || config.allow_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    let layer = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any);

    if config.max_age > 0 {
        layer.max_age(Duration::from_secs(config.max_age))
    } else {
        layer
    }
}
