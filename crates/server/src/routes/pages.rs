use axum::{
    Router,
    body::Body,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "templates"]
pub struct AdminPages;

async fn serve_page(file: &str) -> Response {
    match AdminPages::get(file) {
        Some(content) => {
            let mime = mime_guess::from_path(file).first_or_octet_stream();
            Response::builder()
                .status(StatusCode::OK)
                .header(
                    header::CONTENT_TYPE,
                    HeaderValue::from_str(mime.as_ref())
                        .unwrap_or(HeaderValue::from_static("text/html")),
                )
                .body(Body::from(content.data.into_owned()))
                .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
        None => {
            tracing::warn!("Admin page {} is missing from the build", file);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

pub async fn index() -> Response {
    serve_page("index.html").await
}

pub async fn admin_line() -> Response {
    serve_page("admin-line.html").await
}

pub async fn admin_edge() -> Response {
    serve_page("admin-edge.html").await
}

pub async fn admin_station() -> Response {
    serve_page("admin-station.html").await
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(index))
        .route("/admin-line", get(admin_line))
        .route("/admin-edge", get(admin_edge))
        .route("/admin-station", get(admin_station))
}

#[cfg(test)]
mod tests {
    use axum::http::{StatusCode, header};

    use crate::routes::test_support::{send, test_app};

    #[tokio::test]
    async fn admin_pages_are_served_as_html() {
        let app = test_app().await;
        for uri in ["/", "/admin-line", "/admin-edge", "/admin-station"] {
            let response = send(&app, "GET", uri, None).await;
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
            assert!(content_type.starts_with("text/html"), "{uri}: {content_type}");
        }
    }

    #[tokio::test]
    async fn unknown_pages_are_not_found() {
        let app = test_app().await;
        let response = send(&app, "GET", "/admin-depot", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
