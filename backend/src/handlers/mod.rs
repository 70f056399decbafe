use std::str::FromStr;

use axum::{
    http::Method,
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{docs::ApiDoc, error::AppError, middleware, state::AppState};

pub mod balances;
pub mod coverage;
pub mod health;
pub mod leave_requests;
pub mod leave_types;

/// Parses a path or body identifier, naming the field on failure.
pub(crate) fn parse_id<T: FromStr>(field: &str, raw: &str) -> Result<T, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid {}: {}", field, raw)))
}

/// Ledger routes; every one of them requires an `x-actor-id` header.
pub fn ledger_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/leave-requests",
            post(leave_requests::submit_leave_request).get(leave_requests::list_leave_requests),
        )
        .route(
            "/api/leave-requests/bulk/approve",
            post(leave_requests::bulk_approve),
        )
        .route(
            "/api/leave-requests/bulk/reject",
            post(leave_requests::bulk_reject),
        )
        .route(
            "/api/leave-requests/{id}",
            get(leave_requests::get_leave_request),
        )
        .route(
            "/api/leave-requests/{id}/approve",
            put(leave_requests::approve_leave_request),
        )
        .route(
            "/api/leave-requests/{id}/reject",
            put(leave_requests::reject_leave_request),
        )
        .route(
            "/api/leave-requests/{id}/cancel",
            put(leave_requests::cancel_leave_request),
        )
        .route(
            "/api/leave-requests/{id}/status",
            put(leave_requests::transition_leave_request),
        )
        .route(
            "/api/leave-requests/{id}/conflicts",
            get(leave_requests::get_leave_request_conflicts),
        )
        .route(
            "/api/teams/{team_id}/coverage",
            get(coverage::get_team_coverage),
        )
        .route(
            "/api/employees/{employee_id}/balances",
            get(balances::get_employee_balances),
        )
        .route(
            "/api/employees/{employee_id}/balances/{leave_type_id}",
            put(balances::set_employee_allocation),
        )
        .route("/api/leave-types", get(leave_types::list_leave_types))
        .route_layer(axum_middleware::from_fn(middleware::require_actor))
}

/// The complete application: routes, docs and shared layers.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .merge(ledger_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(axum_middleware::from_fn(middleware::request_id))
                .layer(TraceLayer::new_for_http())
                .layer(axum_middleware::from_fn(middleware::log_error_responses))
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([
                            Method::GET,
                            Method::POST,
                            Method::PUT,
                            Method::OPTIONS,
                        ])
                        .allow_headers(Any)
                        .max_age(std::time::Duration::from_secs(24 * 60 * 60)),
                ),
        )
        .with_state(state)
}
