use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use tracing::{info, warn};
use url::Url;
use utoipa::OpenApi;

use crate::api::rest::routes::{self, UsersApiDoc};
use crate::config::UsersInfoConfig;
use crate::domain::ids::{IdGenerator, RandomIdGenerator, SeededIdGenerator};
use crate::domain::service::Service;
use crate::domain::store::UserStore;
use crate::infra::randomuser::HttpRandomUserClient;

/// The users module: store, service and REST surface wired together.
#[derive(Clone)]
pub struct UsersInfo {
    config: UsersInfoConfig,
    service: Arc<Service>,
}

impl UsersInfo {
    pub fn new(config: UsersInfoConfig) -> anyhow::Result<Self> {
        let base_url = Url::parse(&config.random_user_base_url).with_context(|| {
            format!(
                "invalid random_user_base_url '{}'",
                config.random_user_base_url
            )
        })?;
        let source = HttpRandomUserClient::new(
            base_url,
            Duration::from_millis(config.upstream_timeout_ms),
        )
        .context("failed to build random user client")?;

        let ids: Arc<dyn IdGenerator> = match config.id_seed {
            Some(seed) => Arc::new(SeededIdGenerator::new(seed)),
            None => Arc::new(RandomIdGenerator),
        };

        let service = Service::new(Arc::new(UserStore::new()), Arc::new(source), ids);
        info!(
            base_url = %config.random_user_base_url,
            seed_on_start = config.seed_on_start,
            "users_info module initialized"
        );
        Ok(Self::from_service(config, service))
    }

    /// Wrap an already assembled service.
    pub fn from_service(config: UsersInfoConfig, service: Service) -> Self {
        Self {
            config,
            service: Arc::new(service),
        }
    }

    pub fn service(&self) -> &Arc<Service> {
        &self.service
    }

    pub fn router(&self) -> Router {
        routes::router(self.service.clone())
    }

    pub fn openapi(&self) -> utoipa::openapi::OpenApi {
        UsersApiDoc::openapi()
    }

    /// Load the initial users when `seed_on_start` is set.
    ///
    /// A failure is logged and the store stays empty.
    pub async fn seed(&self) -> usize {
        if !self.config.seed_on_start {
            info!("startup seeding disabled");
            return 0;
        }
        match self.service.seed_from_source(self.config.seed_count).await {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(error = %e, "startup seeding failed, starting with an empty store");
                0
            }
        }
    }
}
