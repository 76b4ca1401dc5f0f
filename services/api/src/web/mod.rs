pub mod protocol;
pub mod rest;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use rest::ApiDoc;
pub use state::AppState;

/// Builds the complete application router: API routes, CORS, upload limit and Swagger UI.
pub fn build_router(app_state: Arc<AppState>) -> Router {
    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);
    match app_state.config.cors_origin.parse::<HeaderValue>() {
        Ok(origin) => cors = cors.allow_origin(origin),
        Err(_) => warn!(
            "CORS_ORIGIN '{}' is not a valid header value; cross-origin requests are disabled",
            app_state.config.cors_origin
        ),
    }

    let api_router = Router::new()
        .route(
            "/sources",
            post(rest::upload_source_handler).get(rest::list_sources_handler),
        )
        .route("/sources/text", post(rest::text_source_handler))
        .route("/sources/{id}/toggle", post(rest::toggle_source_handler))
        .route("/tools", get(rest::list_tools_handler))
        .route("/tools/{kind}", post(rest::run_tool_handler))
        .route("/projects", get(rest::list_projects_handler))
        .route("/projects/{id}", get(rest::get_project_handler))
        .route(
            "/chat",
            post(rest::submit_chat_handler).get(rest::transcript_handler),
        )
        .route("/view", get(rest::view_state_handler))
        .route("/view/open/{id}", post(rest::open_view_handler))
        .route("/view/close", post(rest::close_view_handler))
        .route("/view/chat", post(rest::chat_view_handler))
        .route("/images/edit", post(rest::edit_image_handler))
        .layer(DefaultBodyLimit::max(app_state.config.max_upload_bytes))
        .layer(cors)
        .with_state(app_state);

    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
