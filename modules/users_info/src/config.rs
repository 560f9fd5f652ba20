use serde::{Deserialize, Serialize};

/// Configuration for the users_info module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UsersInfoConfig {
    /// Endpoint of the random-user generator, queried with `?results=<n>`.
    #[serde(default = "default_random_user_base_url")]
    pub random_user_base_url: String,
    /// Number of external records fetched at startup.
    #[serde(default = "default_seed_count")]
    pub seed_count: u32,
    #[serde(default = "default_seed_on_start")]
    pub seed_on_start: bool,
    #[serde(default = "default_upstream_timeout_ms")]
    pub upstream_timeout_ms: u64,
    /// Fixed seed for id synthesis; unset draws from the thread RNG.
    #[serde(default)]
    pub id_seed: Option<u64>,
}

impl Default for UsersInfoConfig {
    fn default() -> Self {
        Self {
            random_user_base_url: default_random_user_base_url(),
            seed_count: default_seed_count(),
            seed_on_start: default_seed_on_start(),
            upstream_timeout_ms: default_upstream_timeout_ms(),
            id_seed: None,
        }
    }
}

fn default_random_user_base_url() -> String {
    "https://randomuser.me/api/".to_string()
}

fn default_seed_count() -> u32 {
    100
}

fn default_seed_on_start() -> bool {
    true
}

fn default_upstream_timeout_ms() -> u64 {
    5000
}
