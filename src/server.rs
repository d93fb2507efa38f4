//! HTTP surface: `POST /augment` and `GET /health`.

use crate::core::error::AugmentError;
use crate::service::{AugmentRequest, AugmentResponse, Augmentor};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorMessage,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorMessage {
    pub code: String,
    pub message: String,
}

/// Error rendered as a JSON response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<AugmentError> for ApiError {
    fn from(error: AugmentError) -> Self {
        let status = if error.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self::new(status, error.code(), error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: ApiErrorMessage {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

/// Build the application router.
pub fn router(service: Augmentor) -> Router {
    Router::new()
        .route("/augment", post(augment))
        .route("/health", get(health))
        .with_state(service)
}

async fn augment(
    State(service): State<Augmentor>,
    Json(request): Json<AugmentRequest>,
) -> Result<Json<AugmentResponse>, ApiError> {
    // Pixel work is CPU bound; keep it off the async workers.
    let response = tokio::task::spawn_blocking(move || service.handle(&request))
        .await
        .map_err(|e| ApiError::internal(format!("worker failed: {e}")))??;
    Ok(Json(response))
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// Serve `service` on `listener` until Ctrl-C.
pub async fn serve(listener: TcpListener, service: Augmentor) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        log::info!("listening on http://{addr}");
    }
    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to install Ctrl-C handler: {e}");
        std::future::pending::<()>().await;
    }
    log::info!("shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::FetchError;
    use crate::effects::test_support::textured;
    use crate::generator::VariantGenerator;
    use crate::io::MemorySource;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use std::io::Cursor;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        let mut png = Vec::new();
        textured(40, 24)
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        let source = MemorySource::new().with("http://images.test/a.png", png);
        router(Augmentor::new(Arc::new(source), VariantGenerator::default()))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.expect("router should respond");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should collect");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    fn post_json(body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/augment")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request should build")
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .expect("request should build");
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn test_augment_success() {
        let request = post_json(json!({
            "srcUrl": "http://images.test/a.png",
            "recipe": "rain_heavy",
            "count": 2,
            "seed": 5
        }));
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::OK);
        let outputs = body["outputsBase64"].as_array().expect("outputs array");
        assert_eq!(outputs.len(), 2);
        assert!(outputs
            .iter()
            .all(|o| o.as_str().is_some_and(|s| s.starts_with("data:image/jpeg;base64,"))));
    }

    #[tokio::test]
    async fn test_augment_count_out_of_range() {
        let request = post_json(json!({ "srcUrl": "http://images.test/a.png", "count": 15 }));
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "invalid_request");
    }

    #[tokio::test]
    async fn test_augment_unknown_recipe() {
        let request = post_json(json!({ "srcUrl": "http://images.test/a.png", "recipe": "snow" }));
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "unknown_recipe");
        assert_eq!(body["error"]["message"], "unknown recipe 'snow'");
    }

    #[tokio::test]
    async fn test_augment_fetch_failure() {
        let request = post_json(json!({ "srcUrl": "http://images.test/missing.png", "count": 1 }));
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "fetch_failed");
    }

    #[test]
    fn test_error_status_mapping() {
        let client = ApiError::from(AugmentError::Fetch(FetchError::EmptyImage));
        assert_eq!(client.status(), StatusCode::BAD_REQUEST);

        let server = ApiError::from(AugmentError::InvalidEffect(
            crate::core::error::EffectError::InvalidProbability(2.0),
        ));
        assert_eq!(server.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
