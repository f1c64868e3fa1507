pub mod auth;
pub mod category;
pub mod config;
pub mod errors;
pub mod extractors;
pub mod openapi;
pub mod routes;
pub mod stats;
pub mod transaction;
