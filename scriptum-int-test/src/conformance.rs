//! Contract checks for [`MigrationStoreProvider`](scriptum::store::MigrationStoreProvider)
//! implementations.
//!
//! Adapter authors can call [`check_provider`] from their own test suite to
//! make sure a backend behaves the way the migrator expects.

use crate::test_util::random_suffix;
use chrono::{TimeZone, Utc};
use scriptum::common::ledger_name;
use scriptum::errors::{MigrationError, MigrationResult};
use scriptum::ledger::MigrationRecord;
use scriptum::store::MigrationStore;

fn violation(message: &str) -> MigrationError {
    log::error!("Provider contract violated: {}", message);
    MigrationError::from(format!("Provider contract violated: {}", message))
}

/// Exercises every capability of `store` against a fresh, randomly named
/// ledger. Returns the first contract violation found.
pub fn check_provider(store: &MigrationStore) -> MigrationResult<()> {
    let ledger = ledger_name(Some(&random_suffix()));
    let shape = MigrationRecord::shape();

    if store.has_ledger(&ledger)? {
        return Err(violation("has_ledger reports a ledger that was never created"));
    }

    store.create_ledger(&ledger, &shape)?;
    if !store.has_ledger(&ledger)? {
        return Err(violation("has_ledger does not see a created ledger"));
    }
    if !store.read_all(&ledger)?.is_empty() {
        return Err(violation("a new ledger is not empty"));
    }

    let at = Utc
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| violation("invalid fixture timestamp"))?;
    let second = MigrationRecord::new("002_b.sql", "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb", at);
    let first = MigrationRecord::new("001_a.sql", "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", at);
    store.append(&ledger, second.clone())?;
    store.append(&ledger, first.clone())?;

    if store.read_all(&ledger)? != vec![first.clone(), second.clone()] {
        return Err(violation("read_all does not return records ascending by script id"));
    }

    let replacement = MigrationRecord::new("001_a.sql", "cccccccccccccccccccccccccccccccc", at);
    if store.append(&ledger, replacement).is_ok() {
        return Err(violation("append overwrote an existing record"));
    }
    if store.read_all(&ledger)?[0] != first {
        return Err(violation("a rejected append changed the ledger"));
    }

    // creating an existing ledger must leave its records alone
    store.create_ledger(&ledger, &shape)?;
    if store.read_all(&ledger)?.len() != 2 {
        return Err(violation("create_ledger on an existing ledger lost records"));
    }

    store.run("-- conformance probe")?;
    Ok(())
}
