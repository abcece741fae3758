pub mod health;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::certificate::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Sessions
        .route("/api/v1/certificates", post(handlers::handle_create))
        .route(
            "/api/v1/certificates/:id",
            get(handlers::handle_get)
                .put(handlers::handle_load)
                .delete(handlers::handle_delete),
        )
        // Page geometry
        .route(
            "/api/v1/certificates/:id/page/format",
            patch(handlers::handle_set_format),
        )
        .route(
            "/api/v1/certificates/:id/page/unit",
            patch(handlers::handle_set_unit),
        )
        .route(
            "/api/v1/certificates/:id/page/margin",
            patch(handlers::handle_set_margin),
        )
        .route(
            "/api/v1/certificates/:id/page/linked",
            patch(handlers::handle_set_linked),
        )
        .route(
            "/api/v1/certificates/:id/page/dimensions",
            patch(handlers::handle_set_dimensions),
        )
        // Sections
        .route(
            "/api/v1/certificates/:id/sections",
            post(handlers::handle_add_section),
        )
        .route(
            "/api/v1/certificates/:id/sections/heights",
            put(handlers::handle_update_heights),
        )
        .route(
            "/api/v1/certificates/:id/sections/:section_id",
            patch(handlers::handle_rename_section).delete(handlers::handle_remove_section),
        )
        .route(
            "/api/v1/certificates/:id/sections/:section_id/position",
            patch(handlers::handle_reorder_section),
        )
        .route(
            "/api/v1/certificates/:id/sections/:section_id/height",
            patch(handlers::handle_update_height),
        )
        // Pagination & payload
        .route(
            "/api/v1/certificates/:id/pagination",
            patch(handlers::handle_set_pagination),
        )
        .route(
            "/api/v1/certificates/:id/pagination/current",
            patch(handlers::handle_set_current_page),
        )
        .route(
            "/api/v1/certificates/:id/data",
            patch(handlers::handle_set_data),
        )
        .route(
            "/api/v1/certificates/:id/metadata",
            patch(handlers::handle_set_metadata),
        )
        .with_state(state)
}
