//! # Taskboard Shared Library
//!
//! Domain core of the Taskboard task tracker: entities, storage, and the
//! request-processing pieces the API server composes.
//!
//! ## Module Organization
//!
//! - `models`: Entities, their SQL operations and request shapes
//! - `store`: Storage trait with PostgreSQL and in-memory backends
//! - `patch`: Tri-state fields for partial updates
//! - `resolver`: External keys (status slug, label ids, assignee id) to rows
//! - `merge`: Validate, resolve and apply partial updates
//! - `filter`: Task filter predicates
//! - `services`: Per-entity orchestration
//! - `seed`: Default data
//! - `auth`: Passwords, JWTs and the request auth context
//! - `db`: Pool and migrations
//! - `error`: Core error type

pub mod auth;
pub mod db;
pub mod error;
pub mod filter;
pub mod merge;
pub mod models;
pub mod patch;
pub mod resolver;
pub mod seed;
pub mod services;
pub mod store;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
