//! # Data Model
//!
//! Database-backed model layer: connection pool, entities, and repositories.

pub mod store;
