// src/routes.rs

use axum::{
    Router, http::Method,
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{self, auth, dashboard, mock_test},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, mock-test, dashboard).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (pool, config, session registry).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:5173".parse().unwrap(),
        "http://127.0.0.1:5173".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    // Everything touching a session or stored results requires a valid token.
    let mock_test_routes = Router::new()
        .route("/start", post(mock_test::start_test))
        .route("/submit-answer", post(mock_test::submit_answer))
        .route("/submit-result", post(mock_test::submit_result))
        .route("/results", get(mock_test::list_results))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let dashboard_routes = Router::new()
        .route("/stats", get(dashboard::get_stats))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/api/health", get(handlers::health))
        .nest("/api/auth", auth_routes)
        .nest("/api/mock-test", mock_test_routes)
        .nest("/api/dashboard", dashboard_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
