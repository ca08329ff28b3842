use axum::extract::State;
use axum::response::Response;
use axum::routing::{any, get, post};
use axum::{Router, middleware};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::error::ErrorInfo;
use crate::run::AppState;
use crate::web::security_headers::add_security_headers;
use crate::web::{
    download_log_handler, error_handler, health_live_handler, health_ready_handler, index_handler,
    post_add_tokens_handler, post_delete_token_handler, post_run_all_handler,
    post_test_token_handler,
};

use super::handle_error;

/// Pasted token lists are the largest bodies we accept
const MAX_BODY_SIZE: usize = 1024 * 1024;

pub fn all_routes(state: AppState) -> Router {
    Router::new()
        .merge(health_routes(state.clone()))
        .merge(panel_routes(state.clone()))
        .fallback(any(error_handler))
        .layer(middleware::map_response_with_state(
            state.clone(),
            response_mapper,
        ))
        .layer(middleware::from_fn(add_security_headers))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn health_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/health/liveness", get(health_live_handler))
        .route("/health/readiness", get(health_ready_handler))
        .with_state(state)
}

fn panel_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(index_handler))
        .route("/tokens", post(post_add_tokens_handler))
        .nest("/tokens/{index}", token_inner_routes(state.clone()))
        .route("/run", post(post_run_all_handler))
        .route("/logs/download", get(download_log_handler))
        .with_state(state)
}

fn token_inner_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/delete", post(post_delete_token_handler))
        .route("/test", post(post_test_token_handler))
        .with_state(state)
}

async fn response_mapper(State(state): State<AppState>, res: Response) -> Response {
    let error = res.extensions().get::<ErrorInfo>();
    if let Some(e) = error {
        if e.status_code.is_server_error() {
            error!("{}", e.message);
        }

        return handle_error(&state, e.clone());
    }
    res
}
