//! Database module: models, schema and the store actor.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows and API records
//! - `input.rs`: create/update payloads and their defaults
//! - `schema.rs`: SQL DDL for initializing the database (SQLite)
//! - `dashboard.rs`: aggregate queries
//! - `actor.rs`: the actor owning the connection pool

pub mod actor;
pub mod dashboard;
pub mod input;
pub mod models;
pub mod schema;

pub use actor::{DbActorHandle, spawn};
pub use dashboard::{DeadlineWindows, UPCOMING_LIMIT};
pub use input::{GrantFields, GrantInput};
pub use models::{
    Dashboard, DbGrant, Grant, STATUS_APPLIED, STATUS_AWARDED, STATUS_TRACKING,
};
pub use schema::SQLITE_INIT;
