//! Settings of a migrator.

use crate::common::ledger_name;
use crate::event::MigrationEventListener;
use crate::executor::ScriptExecutor;
use crate::store::MigrationStore;
use std::fmt::{Debug, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Immutable configuration of a [`Migrator`](crate::migrator::Migrator).
///
/// Built by [`MigratorBuilder`](crate::migrator_builder::MigratorBuilder).
/// Cloning is cheap; all clones share the same settings. Nothing in here
/// changes during a run, so one config can back any number of `migrate`
/// calls.
#[derive(Clone)]
pub struct MigratorConfig {
    /// The pointer to implementation. Uses Arc for cheap cloning and thread safety.
    inner: Arc<MigratorConfigInner>,
}

impl MigratorConfig {
    pub(crate) fn new(
        store: MigrationStore,
        data_dir: PathBuf,
        fail_on_order_mismatch: bool,
        repo_suffix: Option<String>,
        executor_override: Option<ScriptExecutor>,
        listeners: Vec<MigrationEventListener>,
    ) -> Self {
        MigratorConfig {
            inner: Arc::new(MigratorConfigInner {
                store,
                data_dir,
                fail_on_order_mismatch,
                repo_suffix,
                executor_override,
                listeners,
            }),
        }
    }

    /// The target store.
    pub fn store(&self) -> &MigrationStore {
        &self.inner.store
    }

    /// Directory holding the scripts.
    pub fn data_dir(&self) -> &Path {
        &self.inner.data_dir
    }

    /// Whether an unapplied script sorting before an applied one aborts the run.
    pub fn fail_on_order_mismatch(&self) -> bool {
        self.inner.fail_on_order_mismatch
    }

    pub fn repo_suffix(&self) -> Option<&str> {
        self.inner.repo_suffix.as_deref()
    }

    /// `_migration`, or `_migration_<suffix>` when a suffix is configured.
    pub fn ledger_name(&self) -> String {
        ledger_name(self.repo_suffix())
    }

    /// The executor pending scripts go through: the override when one was
    /// configured, the store's own runner otherwise.
    pub fn executor(&self) -> ScriptExecutor {
        match &self.inner.executor_override {
            Some(executor) => executor.clone(),
            None => ScriptExecutor::for_store(self.inner.store.clone()),
        }
    }

    pub fn has_executor_override(&self) -> bool {
        self.inner.executor_override.is_some()
    }

    pub fn listeners(&self) -> &[MigrationEventListener] {
        &self.inner.listeners
    }
}

impl Debug for MigratorConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigratorConfig")
            .field("data_dir", &self.inner.data_dir)
            .field("fail_on_order_mismatch", &self.inner.fail_on_order_mismatch)
            .field("repo_suffix", &self.inner.repo_suffix)
            .field("executor_override", &self.inner.executor_override.is_some())
            .field("listeners", &self.inner.listeners.len())
            .finish()
    }
}

struct MigratorConfigInner {
    store: MigrationStore,
    data_dir: PathBuf,
    fail_on_order_mismatch: bool,
    repo_suffix: Option<String>,
    executor_override: Option<ScriptExecutor>,
    listeners: Vec<MigrationEventListener>,
}
