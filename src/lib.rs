//! Layered health service with ambient, transaction-scoped database sessions.
//!
//! - `api`: HTTP adapters (routers, handlers, DTOs)
//! - `services`: use cases
//! - `domain`: plain domain types
//! - `db`: session provider, backends, base record columns
//! - `repos`: SQL on top of the ambient session
pub mod api;
pub mod app;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod middleware;
pub mod repos;
pub mod services;
pub mod state;
