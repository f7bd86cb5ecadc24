//! Store capability used by the migrator.
//!
//! The migrator never talks to a concrete backend. It needs exactly five
//! operations from the target store, expressed by [`MigrationStoreProvider`]:
//!
//! - `has_ledger` / `create_ledger` to bootstrap the ledger
//! - `read_all` / `append` to read and extend it
//! - `run` to execute a script (used by the default executor)
//!
//! Relational and document backends implement the trait in their own crates
//! and are wrapped in a [`MigrationStore`] before being handed to the migrator.
//!
//! # In-memory store
//!
//! [`memory::InMemoryStore`] is a complete provider that keeps ledgers and
//! executed scripts in memory. It is meant for tests and for trying out a
//! scripts directory without a live database.

pub mod memory;
mod migration_store;

pub use migration_store::*;
