use axum::{
    Router,
    http::Request,
    middleware,
    routing::{IntoMakeService, get},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{DeploymentImpl, middleware as app_middleware};

pub mod health;
pub mod lines;
pub mod pages;
pub mod sections;
pub mod stations;

/// The full application: JSON API under `/api`, admin pages at the root.
pub fn app(deployment: DeploymentImpl) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health::health_check))
        .merge(stations::router())
        .merge(lines::router())
        .merge(sections::router())
        .with_state(deployment);

    Router::new()
        .merge(pages::router())
        .nest("/api", api_routes)
        .layer(middleware::from_fn(app_middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .layer(CorsLayer::permissive())
}

pub fn router(deployment: DeploymentImpl) -> IntoMakeService<Router> {
    app(deployment).into_make_service()
}
