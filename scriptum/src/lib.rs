//! # Scriptum - Versioned Script Migrations
//!
//! Scriptum applies a directory of versioned data-store scripts to a target
//! store exactly once each, in file name order, and remembers what it applied
//! in a ledger kept inside that same store.
//!
//! ## Key Features
//!
//! - **Exactly once**: every applied script is recorded with its fingerprint
//! - **Drift detection**: a script edited after it was applied aborts the run
//! - **Ordering guard**: a new script sorting before an applied one is rejected
//!   unless tolerant ordering is configured
//! - **Fail fast**: the first error stops the run; re-running is the recovery
//! - **Pluggable stores**: anything implementing [`MigrationStoreProvider`]
//!   can host a ledger
//! - **Multi-tenant ledgers**: a suffix keeps several script sets apart in one store
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scriptum::store::MigrationStore;
//! use scriptum::store::memory::InMemoryStore;
//!
//! # fn main() -> scriptum::errors::MigrationResult<()> {
//! let store = MigrationStore::new(InMemoryStore::new());
//!
//! // Apply everything under db/migrations, strict ordering
//! store.migrate("db/migrations", None)?;
//!
//! for record in store.history(None)? {
//!     println!("{}", record);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`common`] - Ledger naming rules and shared constants
//! - [`errors`] - Error types and result definitions
//! - [`event`] - Progress listeners
//! - [`executor`] - Script execution, overridable per migrator
//! - [`fingerprint`] - Content fingerprints of script files
//! - [`ledger`] - Ledger records and their field layout
//! - [`migrator`] - The migration engine
//! - [`migrator_builder`] - Migrator builder
//! - [`migrator_config`] - Migrator configuration
//! - [`scanner`] - Data directory listing
//! - [`store`] - Store capability and the in-memory store
//!
//! [`MigrationStoreProvider`]: store::MigrationStoreProvider

pub mod common;
pub mod errors;
pub mod event;
pub mod executor;
pub mod fingerprint;
pub mod ledger;
pub mod migrator;
pub mod migrator_builder;
pub mod migrator_config;
pub mod scanner;
pub mod store;

pub use errors::{ErrorKind, MigrationError, MigrationResult};
pub use ledger::MigrationRecord;
pub use migrator::Migrator;
pub use store::{MigrationStore, MigrationStoreProvider};
