use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, warn};

use listing::ListQuery;

use crate::contract::model::{normalize_email, NewUser, User, UserPatch};
use crate::domain::error::DomainError;
use crate::domain::ids::IdGenerator;
use crate::domain::mapper::map_external;
use crate::domain::schema::EXTERNAL_FIELDS;

const MAX_ID_DRAWS: usize = 16;

/// In-memory user collection.
///
/// Ids are unique and emails are unique after normalization. Every mutation
/// checks and applies under a single write lock, so a failed call leaves the
/// collection untouched.
#[derive(Debug, Default)]
pub struct UserStore {
    users: RwLock<Vec<User>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }

    /// Filter, sort and page a snapshot of the collection.
    pub fn list(&self, query: &ListQuery) -> Vec<User> {
        let snapshot = self.users.read().clone();
        listing::paginate(snapshot, query)
    }

    pub fn get(&self, id: &str) -> Result<User, DomainError> {
        self.users
            .read()
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| DomainError::user_not_found(id))
    }

    pub fn create(&self, new: NewUser, ids: &dyn IdGenerator) -> Result<User, DomainError> {
        let email = normalize_email(&new.email);
        let mut users = self.users.write();

        if users.iter().any(|u| u.email == email) {
            return Err(DomainError::email_already_exists(email));
        }

        let id = match new.id.clone() {
            Some(id) if users.iter().any(|u| u.id == id) => {
                return Err(DomainError::id_already_exists(id));
            }
            Some(id) => id,
            None => fresh_id(&users, ids)?,
        };

        let user = User::from_new(id, new);
        users.push(user.clone());
        Ok(user)
    }

    pub fn update(&self, id: &str, patch: UserPatch) -> Result<User, DomainError> {
        let mut users = self.users.write();

        let idx = users
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| DomainError::user_not_found(id))?;

        if let Some(email) = patch.email.as_deref().map(normalize_email) {
            if users.iter().any(|u| u.id != id && u.email == email) {
                return Err(DomainError::email_already_exists(email));
            }
        }

        let user = &mut users[idx];
        user.apply(patch);
        Ok(user.clone())
    }

    pub fn remove(&self, id: &str) -> Result<User, DomainError> {
        let mut users = self.users.write();
        let idx = users
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| DomainError::user_not_found(id))?;
        Ok(users.remove(idx))
    }

    /// Replace the whole collection with the mappable records of `records`.
    ///
    /// Records that fail to map, or that repeat an id or email already
    /// loaded, are skipped. Returns the number of users loaded.
    pub fn seed(&self, records: &[Value], ids: &dyn IdGenerator) -> usize {
        let mut loaded: Vec<User> = Vec::with_capacity(records.len());

        for (index, record) in records.iter().enumerate() {
            let flat = map_external(record, EXTERNAL_FIELDS, ids);
            let user = match User::try_from(&flat) {
                Ok(user) => user,
                Err(e) => {
                    warn!(index, error = %e, "skipping unmappable seed record");
                    continue;
                }
            };
            if loaded
                .iter()
                .any(|u| u.id == user.id || u.email == user.email)
            {
                warn!(index, id = %user.id, "skipping duplicate seed record");
                continue;
            }
            loaded.push(user);
        }

        let count = loaded.len();
        *self.users.write() = loaded;
        debug!(count, "user store seeded");
        count
    }
}

fn fresh_id(users: &[User], ids: &dyn IdGenerator) -> Result<String, DomainError> {
    for _ in 0..MAX_ID_DRAWS {
        let candidate = ids.next_id();
        if !users.iter().any(|u| u.id == candidate) {
            return Ok(candidate);
        }
    }
    Err(DomainError::internal("could not allocate a unique user id"))
}
