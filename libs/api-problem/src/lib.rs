//! Uniform JSON error body for the HTTP API and its axum renderer.
//!
//! Every failure that reaches a client is a [`Problem`]. Handlers never write
//! error bodies themselves; they map their error into a [`ProblemResponse`].

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::{header, request::Parts, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The error body returned for every failed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(title = "Problem", description = "Error body returned by every failing endpoint")]
pub struct Problem {
    /// HTTP status code of this response.
    pub status: u16,
    /// Human readable explanation of this occurrence.
    pub message: String,
    /// Stable machine-readable error code.
    pub code: String,
    /// RFC 3339 time at which the error was rendered.
    pub timestamp: String,
    /// The offending input value for validation failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub invalid_value: Option<serde_json::Value>,
    /// Request path that produced the error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    /// Request id, when the ingress assigned one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

impl Problem {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            message: message.into(),
            code: String::new(),
            timestamp: now_rfc3339(),
            invalid_value: None,
            instance: None,
            trace_id: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_invalid_value(mut self, value: serde_json::Value) -> Self {
        self.invalid_value = Some(value);
        self
    }

    /// Attach the request path and id of `ctx`.
    pub fn in_context(mut self, ctx: &RequestContext) -> Self {
        if !ctx.instance.is_empty() {
            self.instance = Some(ctx.instance.clone());
        }
        if let Some(id) = &ctx.request_id {
            self.trace_id = Some(id.clone());
        }
        self
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Header carrying the per-request id assigned at the ingress.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Where an error happened: request path and request id.
///
/// Usable as an axum extractor; it never rejects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub instance: String,
    pub request_id: Option<String>,
}

impl RequestContext {
    pub fn from_parts(parts: &Parts) -> Self {
        let request_id = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_owned);
        // Nested routers see a stripped uri; prefer the one the client sent.
        let instance = parts
            .extensions
            .get::<OriginalUri>()
            .map_or_else(|| parts.uri.path(), |uri| uri.0.path())
            .to_string();
        Self {
            instance,
            request_id,
        }
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Static entry of an error catalog: the status and code of one error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrDef {
    pub status: u16,
    pub code: &'static str,
}

impl ErrDef {
    #[inline]
    pub fn to_problem(&self, message: impl Into<String>) -> Problem {
        Problem::new(
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            message,
        )
        .with_code(self.code)
    }
}

/// Axum response wrapper rendering a [`Problem`] with its status code.
#[derive(Debug, Clone)]
pub struct ProblemResponse(pub Problem);

impl From<Problem> for ProblemResponse {
    fn from(p: Problem) -> Self {
        Self(p)
    }
}

impl IntoResponse for ProblemResponse {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let mut resp = axum::Json(self.0).into_response();
        *resp.status_mut() = status;
        resp.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        resp
    }
}

pub fn not_found(message: impl Into<String>) -> ProblemResponse {
    Problem::new(StatusCode::NOT_FOUND, message)
        .with_code("NOT_FOUND")
        .into()
}

pub fn payload_too_large(message: impl Into<String>) -> ProblemResponse {
    Problem::new(StatusCode::PAYLOAD_TOO_LARGE, message)
        .with_code("PAYLOAD_TOO_LARGE")
        .into()
}

pub fn request_timeout(message: impl Into<String>) -> ProblemResponse {
    Problem::new(StatusCode::REQUEST_TIMEOUT, message)
        .with_code("REQUEST_TIMEOUT")
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn problem_response_carries_status_and_json_body() {
        let ctx = RequestContext {
            instance: "/api/users".into(),
            request_id: None,
        };
        let p = Problem::new(StatusCode::CONFLICT, "taken")
            .with_code("USERS_EMAIL_CONFLICT")
            .in_context(&ctx);
        let resp = ProblemResponse(p).into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], 409);
        assert_eq!(body["message"], "taken");
        assert_eq!(body["code"], "USERS_EMAIL_CONFLICT");
        assert_eq!(body["instance"], "/api/users");
        assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
        assert!(body.get("invalidValue").is_none());
        assert!(body.get("traceId").is_none());
    }

    #[test]
    fn optional_fields_serialize_in_camel_case() {
        let p = Problem::new(StatusCode::BAD_REQUEST, "\"age\" must be a number")
            .with_invalid_value(serde_json::json!("abc"))
            .in_context(&RequestContext {
                instance: String::new(),
                request_id: Some("req-1".into()),
            });
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["invalidValue"], "abc");
        assert_eq!(v["traceId"], "req-1");
        assert!(v.get("instance").is_none());
    }

    #[test]
    fn request_context_reads_path_and_request_id() {
        let (parts, _) = axum::http::Request::builder()
            .uri("/api/users/abc?x=1")
            .header(REQUEST_ID_HEADER, "rid-9")
            .body(())
            .unwrap()
            .into_parts();
        let ctx = RequestContext::from_parts(&parts);
        assert_eq!(ctx.instance, "/api/users/abc");
        assert_eq!(ctx.request_id.as_deref(), Some("rid-9"));

        let p = Problem::new(StatusCode::NOT_FOUND, "gone").in_context(&ctx);
        assert_eq!(p.instance.as_deref(), Some("/api/users/abc"));
        assert_eq!(p.trace_id.as_deref(), Some("rid-9"));
    }

    #[test]
    fn err_def_to_problem_copies_status_and_code() {
        let def = ErrDef {
            status: 404,
            code: "TEST_NOT_FOUND",
        };
        let p = def.to_problem("missing");
        assert_eq!(p.status, 404);
        assert_eq!(p.code, "TEST_NOT_FOUND");
        assert_eq!(p.message, "missing");
    }

    #[test]
    fn convenience_constructors() {
        assert_eq!(not_found("x").0.status, 404);
        assert_eq!(not_found("x").0.code, "NOT_FOUND");
        assert_eq!(payload_too_large("x").0.status, 413);
        assert_eq!(request_timeout("x").0.code, "REQUEST_TIMEOUT");
    }

    #[test]
    fn unknown_status_falls_back_to_500() {
        let mut p = Problem::new(StatusCode::OK, "odd");
        p.status = 1000;
        assert_eq!(p.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
