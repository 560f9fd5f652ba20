//! HTTP host: mounts module routers under one prefix, wraps them in the shared
//! middleware stack and runs the server until cancelled.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, StatusCode},
    middleware::from_fn,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::openapi::{InfoBuilder, OpenApi, OpenApiBuilder};

pub mod config;
pub mod request_id;
pub mod web;

pub use config::ApiIngressConfig;

/// A module's REST surface: its router (paths relative to the prefix) and
/// the OpenAPI description of those paths.
pub struct RestModule {
    pub name: &'static str,
    pub router: Router,
    pub openapi: OpenApi,
}

/// Main API Ingress: owns the HTTP server and the modules mounted on it.
pub struct ApiIngress {
    config: ApiIngressConfig,
    modules: Vec<RestModule>,
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self {
            config,
            modules: Vec::new(),
        }
    }

    pub fn with_module(mut self, module: RestModule) -> Self {
        tracing::debug!(module = module.name, "registering REST module");
        self.modules.push(module);
        self
    }

    /// Merge every module document under the API prefix.
    pub fn build_openapi(&self) -> OpenApi {
        let prefix = self.config.normalized_prefix();
        let base = OpenApiBuilder::new()
            .info(
                InfoBuilder::new()
                    .title("Userdesk API")
                    .version(env!("CARGO_PKG_VERSION"))
                    .build(),
            )
            .build();
        self.modules
            .iter()
            .fold(base, |doc, m| doc.nest(prefix.as_str(), m.openapi.clone()))
    }

    pub fn build_router(&self) -> Result<Router> {
        tracing::debug!("Building router");
        let prefix = self.config.normalized_prefix();

        let mut api = Router::new();
        for m in &self.modules {
            api = api.merge(m.router.clone());
        }

        let mut router = Router::new().route("/health", get(web::health_check));
        router = if prefix.is_empty() {
            router.merge(api)
        } else {
            router.nest(&prefix, api)
        };

        if self.config.enable_docs {
            let openapi_value = Arc::new(
                serde_json::to_value(self.build_openapi()).context("failed to render OpenAPI")?,
            );
            tracing::info!(
                paths = openapi_value["paths"].as_object().map_or(0, |p| p.len()),
                "serving OpenAPI document"
            );
            router = router
                .route(
                    "/openapi.json",
                    get(move || {
                        let v = openapi_value.clone();
                        async move {
                            ([(header::CACHE_CONTROL, "no-store")], Json((*v).clone()))
                                .into_response()
                        }
                    }),
                )
                .route("/docs", get(web::serve_docs));
        }

        router = router.fallback(web::page_not_found);

        // Innermost first: compression, body limit, CORS.
        // Extractors must not apply their own 2 MiB cap on top of the configured limit.
        router = router
            .layer(CompressionLayer::new())
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(self.config.body_limit_bytes));
        if self.config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }

        // Outermost to innermost:
        // PropagateRequestId -> SetRequestId -> push_req_id_to_extensions
        //   -> problem_for_bare_errors -> Trace -> Timeout
        let x_request_id = request_id::header();
        router = router.layer(
            ServiceBuilder::new()
                .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
                .layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId))
                .layer(from_fn(request_id::push_req_id_to_extensions))
                .layer(from_fn(web::problem_for_bare_errors))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(request_id::make_request_span)
                        .on_response(request_id::record_response),
                )
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    Duration::from_secs(self.config.request_timeout_secs),
                )),
        );

        Ok(router)
    }

    /// Bind `addr`, serve until `cancel` fires, then drain in-flight requests.
    pub async fn serve(&self, addr: &str, cancel: CancellationToken) -> Result<()> {
        let addr: SocketAddr = addr
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address '{}': {}", addr, e))?;
        let router = self.build_router()?;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        tracing::info!("HTTP server bound on {}", addr);

        let shutdown = async move {
            cancel.cancelled().await;
            tracing::info!("HTTP server shutting down gracefully (cancellation)");
        };

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }
}
