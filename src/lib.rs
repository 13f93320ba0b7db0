// Library exports for the kokkai server.
// Integration tests and the binary build on these modules.

pub mod auth;
pub mod civic;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;
