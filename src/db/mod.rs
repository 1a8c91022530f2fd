//! Database layer
//!
//! This module provides database abstraction for the Daybook service.
//! It supports:
//! - SQLite (default, for single-binary deployment and tests)
//! - MySQL (for larger deployments)
//!
//! The database driver is selected based on configuration. Repositories
//! receive a `DynDatabasePool` and dispatch to the concrete backend.

pub mod migrations;
pub mod pool;
pub mod repositories;
pub mod update;

pub use pool::{
    create_pool, create_test_pool, DatabasePool, DynDatabasePool, MysqlDatabase, SqliteDatabase,
};
pub use update::{SqlValue, UpdateBuilder};
