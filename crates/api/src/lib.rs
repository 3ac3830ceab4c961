//! HTTP API: configuration, guard enforcement and the access endpoints.

pub mod app;
pub mod authz;
pub mod config;
pub mod middleware;
