//! HTTP API: the rooms and sales services, their routing and request/response mapping.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
