use axum::{
    http::Method,
    middleware as axum_middleware,
    routing::{get, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{docs, handlers, middleware, state::AppState};

/// Builds the HTTP application with every route, middleware and the shared state.
pub fn app(state: AppState) -> Router {
    // Public routes (no auth)
    let public_routes = Router::new().merge(
        SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", docs::ApiDoc::openapi()),
    );

    // Any authenticated user; ownership is checked by the service
    let user_routes = Router::new()
        .route(
            "/api/artisans/{id}/availability",
            put(handlers::artisans::set_availability),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth,
        ));

    let admin_routes = Router::new()
        .route(
            "/api/admin/artisans/{id}/approve",
            put(handlers::admin::approve_artisan),
        )
        .route(
            "/api/admin/artisans/{id}/reject",
            put(handlers::admin::reject_artisan),
        )
        .route(
            "/api/admin/artisans/{id}/suspend",
            put(handlers::admin::suspend_artisan),
        )
        .route(
            "/api/admin/artisans/{id}/activate",
            put(handlers::admin::activate_artisan),
        )
        .route(
            "/api/admin/reviews/{id}/approve",
            put(handlers::admin::approve_review),
        )
        .route(
            "/api/admin/reviews/{id}/reject",
            put(handlers::admin::reject_review),
        )
        .route("/api/admin/audit-logs", get(handlers::admin::list_audit_logs))
        .route("/api/admin/activity", get(handlers::admin::recent_activity))
        .route(
            "/api/admin/activity/stream",
            get(handlers::admin::activity_stream),
        )
        .route("/api/admin/export/{kind}", get(handlers::admin::export_csv))
        .route(
            "/api/admin/reports/monthly",
            get(handlers::admin::monthly_report),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_admin,
        ));

    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(admin_routes)
        .layer(
            ServiceBuilder::new()
                .layer(axum_middleware::from_fn(middleware::request_id))
                .layer(TraceLayer::new_for_http())
                .layer(axum_middleware::from_fn(middleware::log_error_responses))
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([Method::GET, Method::PUT, Method::OPTIONS])
                        .allow_headers(Any)
                        .expose_headers(Any)
                        .max_age(std::time::Duration::from_secs(24 * 60 * 60)),
                ),
        )
        .with_state(state)
}
