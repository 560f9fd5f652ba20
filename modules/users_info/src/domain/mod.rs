pub mod error;
pub mod ids;
pub mod mapper;
pub mod ports;
pub mod schema;
pub mod service;
pub mod store;
