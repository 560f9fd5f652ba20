use api_problem::{
    not_found, payload_too_large, request_timeout, ProblemResponse, RequestContext,
};
use axum::{
    extract::Request,
    http::{header, Method, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Json, Response},
};
use serde_json::{json, Value};

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Fallback for every unrouted request.
pub async fn page_not_found(method: Method, ctx: RequestContext) -> ProblemResponse {
    tracing::warn!(method = %method, path = %ctx.instance, "no route matched");
    let message = format!("Page not found: {} via: {}", ctx.instance, method);
    let mut resp = not_found(message);
    resp.0 = resp.0.in_context(&ctx);
    resp
}

/// Re-render the bare 408 and 413 answers of the timeout and body-limit
/// layers as problem bodies. JSON responses pass through untouched.
pub async fn problem_for_bare_errors(req: Request, next: Next) -> Response {
    let (parts, body) = req.into_parts();
    let ctx = RequestContext::from_parts(&parts);
    let res = next.run(Request::from_parts(parts, body)).await;

    let is_json = res
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));
    if is_json {
        return res;
    }

    let status = res.status();
    let ProblemResponse(problem) = match status {
        StatusCode::PAYLOAD_TOO_LARGE => payload_too_large("Request body is too large"),
        StatusCode::REQUEST_TIMEOUT => request_timeout("Request timed out"),
        _ => return res,
    };
    tracing::warn!(status = status.as_u16(), path = %ctx.instance, "request rejected at ingress");

    let (mut head, _) = res.into_parts();
    for name in [
        header::CONTENT_TYPE,
        header::CONTENT_LENGTH,
        header::CONTENT_ENCODING,
    ] {
        head.headers.remove(name);
    }
    let mut out = ProblemResponse(problem.in_context(&ctx)).into_response();
    out.headers_mut().extend(head.headers);
    out
}

pub async fn serve_docs() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8"/>
  <title>Userdesk API Docs</title>
  <script src="https://unpkg.com/@stoplight/elements@latest/web-components.min.js"></script>
  <link rel="stylesheet" href="https://unpkg.com/@stoplight/elements@latest/styles.min.css">
</head>
<body>
  <elements-api apiDescriptionUrl="/openapi.json" router="hash" layout="sidebar"></elements-api>
</body>
</html>"#,
    )
}
