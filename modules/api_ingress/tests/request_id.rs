use axum::{
    body::Body,
    extract::Extension,
    http::{Request, StatusCode},
    routing::get,
    Router,
};
use http_body_util::BodyExt;
use tower::util::ServiceExt; // for `oneshot`
use utoipa::openapi::OpenApiBuilder;

use api_ingress::request_id::XRequestId;
use api_ingress::{ApiIngress, ApiIngressConfig, RestModule};

fn test_app() -> Router {
    let module = Router::new()
        .route("/echo-id", get(|Extension(rid): Extension<XRequestId>| async move { rid.0 }));
    ApiIngress::new(ApiIngressConfig::default())
        .with_module(RestModule {
            name: "echo",
            router: module,
            openapi: OpenApiBuilder::new().build(),
        })
        .build_router()
        .unwrap()
}

#[tokio::test]
async fn generates_request_id_when_missing() {
    let app = test_app();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok());
    assert!(request_id.is_some(), "x-request-id should be generated");
    assert!(
        !request_id.unwrap().is_empty(),
        "request_id should not be empty"
    );
}

#[tokio::test]
async fn preserves_incoming_request_id() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok());
    assert_eq!(request_id, Some("abc-123"));
}

#[tokio::test]
async fn handlers_see_request_id_extension() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/echo-id")
                .header("x-request-id", "ext-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"ext-42");
}

#[tokio::test]
async fn includes_request_id_in_error_json() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nowhere")
                .header("x-request-id", "error-test-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    assert_eq!(request_id.as_deref(), Some("error-test-123"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["traceId"], "error-test-123");
}
