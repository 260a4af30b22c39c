//! # Pulse Database Crate
//!
//! This crate is the read path over the `users` and `heart_rates` tables.
//! It owns the schema declarations, composes the two aggregation statements
//! and executes them through a `sqlx` connection pool.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** All SQL lives here. Callers pass typed parameters
//!   (`UserFilter`, `TimeWindow`) and get rows or a `QueryError` back.
//! - **Read-only:** Apart from the idempotent schema step run at startup,
//!   nothing in this crate writes to the database.
//! - **Two dialects:** PostgreSQL is the production target; SQLite serves
//!   local runs and the test suite. The dialect follows the URL scheme.
//!
//! ## Public API
//!
//! - `connect`: establishes the connection pool from `DatabaseSettings`.
//! - `materialize_schema`: creates missing tables and indexes.
//! - `QueryEngine`: `query_users` and `query_for_user`.
//! - `DbError` for startup failures, `QueryError` for query failures.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod dialect;
pub mod error;
pub mod query;
pub mod repository;
pub mod schema;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{DbPool, connect};
pub use dialect::Dialect;
pub use error::{DbError, QueryError};
pub use repository::QueryEngine;
pub use schema::{Entity, materialize_schema};
