use std::sync::Arc;

use listing::ListQuery;
use tracing::{debug, info, instrument, warn};

use crate::contract::model::{NewUser, User, UserPatch};
use crate::domain::error::DomainError;
use crate::domain::ids::IdGenerator;
use crate::domain::mapper::map_external;
use crate::domain::ports::RandomUserSource;
use crate::domain::schema::EXTERNAL_FIELDS;
use crate::domain::store::UserStore;

/// Domain service with business rules for user management.
/// Depends on the store and the random-user port, not on transport types.
#[derive(Clone)]
pub struct Service {
    store: Arc<UserStore>,
    source: Arc<dyn RandomUserSource>,
    ids: Arc<dyn IdGenerator>,
}

impl Service {
    pub fn new(
        store: Arc<UserStore>,
        source: Arc<dyn RandomUserSource>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self { store, source, ids }
    }

    pub fn store(&self) -> &Arc<UserStore> {
        &self.store
    }

    #[instrument(
        name = "users_info.service.list_users",
        skip(self, query),
        fields(page_number = query.page_number, page_size = query.page_size, sort_by = %query.sort_by)
    )]
    pub async fn list_users(&self, query: ListQuery) -> Result<Vec<User>, DomainError> {
        let page = self.store.list(&query);
        debug!("Listed {} users", page.len());
        Ok(page)
    }

    #[instrument(name = "users_info.service.get_user", skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: &str) -> Result<User, DomainError> {
        debug!("Getting user by id");
        self.store.get(id)
    }

    #[instrument(
        name = "users_info.service.create_user",
        skip(self, new_user),
        fields(email = %new_user.email)
    )]
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, DomainError> {
        info!("Creating new user");
        let user = self.store.create(new_user, self.ids.as_ref())?;
        info!("Successfully created user with id={}", user.id);
        Ok(user)
    }

    #[instrument(name = "users_info.service.update_user", skip(self, patch), fields(user_id = %id))]
    pub async fn update_user(&self, id: &str, patch: UserPatch) -> Result<User, DomainError> {
        info!("Updating user");
        let user = self.store.update(id, patch)?;
        info!("Successfully updated user");
        Ok(user)
    }

    #[instrument(name = "users_info.service.delete_user", skip(self), fields(user_id = %id))]
    pub async fn delete_user(&self, id: &str) -> Result<User, DomainError> {
        info!("Deleting user");
        let user = self.store.remove(id)?;
        info!("Successfully deleted user");
        Ok(user)
    }

    /// Fetch one external record and map it. The record is not stored.
    #[instrument(name = "users_info.service.create_random_user", skip(self))]
    pub async fn create_random_user(&self) -> Result<User, DomainError> {
        let records = self.source.fetch(1).await?;
        let record = records
            .first()
            .ok_or_else(|| DomainError::gateway("random user service returned no users"))?;

        let flat = map_external(record, EXTERNAL_FIELDS, self.ids.as_ref());
        User::try_from(&flat).map_err(|e| {
            warn!(error = %e, "random user record could not be mapped");
            DomainError::gateway(format!("random user service returned an unusable record: {e}"))
        })
    }

    /// Replace the store contents with `count` freshly fetched records.
    #[instrument(name = "users_info.service.seed", skip(self))]
    pub async fn seed_from_source(&self, count: u32) -> Result<usize, DomainError> {
        let records = self.source.fetch(count).await?;
        let loaded = self.store.seed(&records, self.ids.as_ref());
        info!(fetched = records.len(), loaded, "Seeded user store");
        Ok(loaded)
    }
}
