//! Persistence module: a SQLite-backed key-value store behind an actor.
//!
//! Layout:
//! - `actor.rs`: store actor, its message protocol and `StoreHandle`
//! - `schema.rs`: SQL DDL and the fixed storage keys

pub mod actor;
pub mod schema;

pub use actor::{StoreHandle, spawn};
pub use schema::{ACTIVE_PROJECT_KEY, MODEL_CONFIGS_KEY, PROJECTS_KEY, SQLITE_INIT};
