//! The persisted history of applied scripts.
//!
//! A ledger is a store-resident collection of [`MigrationRecord`]s, one per
//! successfully applied script. The migrator only ever reads it and appends to
//! it; a record is never updated or removed once written.
//!
//! Stores receive a [`RecordShape`] when asked to create a ledger, so
//! backends that need a schema (tables, typed collections) can derive one.

mod record;
mod shape;

pub use record::MigrationRecord;
pub use shape::{FieldShape, FieldType, RecordShape};
