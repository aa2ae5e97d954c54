use axum::{Router, routing::get};

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> Router<AppState> {
    Router::new()
        .nest("/rfid", rfid_routes(config))
        .nest("/layouts", layout_routes())
        .nest("/users", user_routes())
}

fn rfid_routes(config: &AppConfig) -> Router<AppState> {
    let upload = Router::new()
        .route(
            "/",
            get(handlers::rfid::list_rfid).post(handlers::rfid::create_rfid),
        )
        .route(
            "/{id}",
            get(handlers::rfid::get_rfid)
                .put(handlers::rfid::update_rfid)
                .delete(handlers::rfid::delete_rfid),
        )
        .layer(handlers::rfid::upload_body_limit(
            config.storage.max_upload_size,
        ));

    let lookup = Router::new().route("/code/{rfid_code}", get(handlers::rfid::get_rfid_by_code));

    upload.merge(lookup)
}

fn layout_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::layout::list_layouts).post(handlers::layout::create_layout),
        )
        .route(
            "/{id}",
            get(handlers::layout::get_layout)
                .patch(handlers::layout::update_layout)
                .delete(handlers::layout::delete_layout),
        )
        .route(
            "/screen/{screen_name}",
            get(handlers::layout::get_layout_by_screen)
                .patch(handlers::layout::update_layout_by_screen)
                .delete(handlers::layout::delete_layout_by_screen),
        )
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::user::list_users).post(handlers::user::create_user),
        )
        .route(
            "/{id}",
            get(handlers::user::get_user)
                .patch(handlers::user::update_user)
                .delete(handlers::user::delete_user),
        )
        .route("/email/{email}", get(handlers::user::get_user_by_email))
}
