use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    routing::{get, post},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::util::ServiceExt;
use utoipa::OpenApi;

use api_ingress::{ApiIngress, ApiIngressConfig, RestModule};

#[utoipa::path(get, path = "/things", responses((status = 200, description = "All things")))]
async fn list_things() -> &'static str {
    "things"
}

#[derive(OpenApi)]
#[openapi(paths(list_things))]
struct ThingsDoc;

async fn echo_len(body: axum::body::Bytes) -> String {
    body.len().to_string()
}

fn things_module() -> RestModule {
    RestModule {
        name: "things",
        router: Router::new()
            .route("/things", get(list_things))
            .route("/upload", post(echo_len))
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                    "late"
                }),
            ),
        openapi: ThingsDoc::openapi(),
    }
}

fn app(config: ApiIngressConfig) -> Router {
    ApiIngress::new(config)
        .with_module(things_module())
        .build_router()
        .unwrap()
}

async fn call(router: Router, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let resp = router.oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes().to_vec();
    (status, headers, bytes)
}

fn get_req(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_reports_healthy() {
    let (status, _, body) = call(app(ApiIngressConfig::default()), get_req("/health")).await;
    assert_eq!(status, StatusCode::OK);
    let v: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(v["status"], "healthy");
    assert!(v["timestamp"].is_string());
}

#[tokio::test]
async fn module_routes_are_mounted_under_prefix() {
    let (status, _, body) = call(app(ApiIngressConfig::default()), get_req("/api/things")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"things");

    let (status, _, _) = call(app(ApiIngressConfig::default()), get_req("/things")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let cfg = ApiIngressConfig {
        api_prefix: "/".into(),
        ..ApiIngressConfig::default()
    };
    let (status, _, _) = call(app(cfg), get_req("/things")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_route_is_problem_404() {
    let req = Request::builder()
        .method(Method::DELETE)
        .uri("/api/missing")
        .body(Body::empty())
        .unwrap();
    let (status, headers, body) = call(app(ApiIngressConfig::default()), req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    let v: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(v["status"], 404);
    assert_eq!(v["message"], "Page not found: /api/missing via: DELETE");
    assert_eq!(v["instance"], "/api/missing");
}

#[tokio::test]
async fn openapi_is_served_with_prefixed_paths() {
    let (status, headers, body) =
        call(app(ApiIngressConfig::default()), get_req("/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CACHE_CONTROL], "no-store");
    let v: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(v["info"]["title"], "Userdesk API");
    assert!(v["paths"].get("/api/things").is_some());

    let (status, _, _) = call(app(ApiIngressConfig::default()), get_req("/docs")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn docs_can_be_disabled() {
    let cfg = ApiIngressConfig {
        enable_docs: false,
        ..ApiIngressConfig::default()
    };
    let (status, _, _) = call(app(cfg), get_req("/openapi.json")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let cfg = ApiIngressConfig {
        body_limit_bytes: 16,
        ..ApiIngressConfig::default()
    };
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/upload")
        .header("x-request-id", "big-1")
        .body(Body::from(vec![b'x'; 64]))
        .unwrap();
    let (status, headers, body) = call(app(cfg.clone()), req).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    let v: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(v["status"], 413);
    assert_eq!(v["message"], "Request body is too large");
    assert_eq!(v["instance"], "/api/upload");
    assert_eq!(v["traceId"], "big-1");
    assert_eq!(headers["x-request-id"], "big-1");

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/upload")
        .body(Body::from(vec![b'x'; 8]))
        .unwrap();
    let (status, _, body) = call(app(cfg), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"8");
}

#[tokio::test]
async fn bodies_above_two_mib_pass_under_the_configured_limit() {
    let size = 3 * 1024 * 1024;
    let cfg = ApiIngressConfig::default();
    assert!(cfg.body_limit_bytes > size);

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/upload")
        .body(Body::from(vec![b'x'; size]))
        .unwrap();
    let (status, _, body) = call(app(cfg), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, size.to_string().into_bytes());
}

#[tokio::test]
async fn slow_handlers_time_out() {
    let cfg = ApiIngressConfig {
        request_timeout_secs: 1,
        ..ApiIngressConfig::default()
    };
    let (status, headers, body) = call(app(cfg), get_req("/api/slow")).await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    let v: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(v["status"], 408);
    assert_eq!(v["message"], "Request timed out");
    assert_eq!(v["instance"], "/api/slow");
    assert!(v["traceId"].is_string());
}

#[tokio::test]
async fn json_errors_from_handlers_are_left_alone() {
    let module = RestModule {
        name: "teapot",
        router: Router::new().route(
            "/full",
            get(|| async {
                (
                    StatusCode::PAYLOAD_TOO_LARGE,
                    [(header::CONTENT_TYPE, "application/json")],
                    r#"{"status":413,"message":"own"}"#,
                )
            }),
        ),
        openapi: ThingsDoc::openapi(),
    };
    let router = ApiIngress::new(ApiIngressConfig::default())
        .with_module(module)
        .build_router()
        .unwrap();
    let (status, _, body) = call(router, get_req("/api/full")).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    let v: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(v["message"], "own");
}

#[tokio::test]
async fn cors_headers_only_when_enabled() {
    let preflight = || {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/things")
            .header(header::ORIGIN, "https://example.com")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap()
    };

    let cfg = ApiIngressConfig {
        cors_enabled: true,
        ..ApiIngressConfig::default()
    };
    let (_, headers, _) = call(app(cfg), preflight()).await;
    assert!(headers.contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));

    let (_, headers, _) = call(app(ApiIngressConfig::default()), preflight()).await;
    assert!(!headers.contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn serve_stops_on_cancel() {
    let ingress = ApiIngress::new(ApiIngressConfig::default()).with_module(things_module());
    let cancel = tokio_util::sync::CancellationToken::new();
    cancel.cancel();
    ingress.serve("127.0.0.1:0", cancel).await.unwrap();
}

#[tokio::test]
async fn serve_rejects_bad_address() {
    let ingress = ApiIngress::new(ApiIngressConfig::default());
    let err = ingress
        .serve("not-an-address", tokio_util::sync::CancellationToken::new())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Invalid bind address"));
}
