//! Users module: user records, their REST API and the random-user upstream.

// === PUBLIC CONTRACT ===
pub mod contract;
pub use contract::model::{Gender, NewUser, User, UserPatch};

pub mod errors;

// === MODULE DEFINITION ===
pub mod module;
pub use module::UsersInfo;

pub mod config;
pub use config::UsersInfoConfig;

// === INTERNAL MODULES ===
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
