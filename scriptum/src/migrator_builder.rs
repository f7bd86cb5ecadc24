use crate::common::DEFAULT_FAIL_ON_ORDER_MISMATCH;
use crate::errors::{ErrorKind, MigrationError, MigrationResult};
use crate::event::MigrationEventListener;
use crate::executor::ScriptExecutor;
use crate::migrator::Migrator;
use crate::migrator_config::MigratorConfig;
use crate::store::MigrationStore;
use std::path::{Path, PathBuf};

/// Builder for creating and configuring a [`Migrator`].
///
/// Setters can be chained in any order; missing required settings are
/// reported by [`build`](MigratorBuilder::build).
///
/// # Examples
///
/// ```rust
/// use scriptum::migrator::Migrator;
/// use scriptum::store::MigrationStore;
/// use scriptum::store::memory::InMemoryStore;
///
/// # fn main() -> scriptum::errors::MigrationResult<()> {
/// let migrator = Migrator::builder()
///     .store(MigrationStore::new(InMemoryStore::new()))
///     .data_dir("db/migrations")
///     .fail_on_order_mismatch(false)
///     .repo_suffix("billing")
///     .build()?;
///
/// assert_eq!(migrator.config().ledger_name(), "_migration_billing");
/// # Ok(())
/// # }
/// ```
pub struct MigratorBuilder {
    store: Option<MigrationStore>,
    data_dir: Option<PathBuf>,
    fail_on_order_mismatch: bool,
    repo_suffix: Option<String>,
    executor_override: Option<ScriptExecutor>,
    listeners: Vec<MigrationEventListener>,
}

impl Default for MigratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MigratorBuilder {
    /// Creates a builder with strict ordering, no suffix, the store's own
    /// script runner and no listeners.
    pub fn new() -> Self {
        MigratorBuilder {
            store: None,
            data_dir: None,
            fail_on_order_mismatch: DEFAULT_FAIL_ON_ORDER_MISMATCH,
            repo_suffix: None,
            executor_override: None,
            listeners: Vec::new(),
        }
    }

    /// Sets the target store. Required.
    pub fn store(mut self, store: MigrationStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the directory the scripts are read from. Required.
    pub fn data_dir<P: AsRef<Path>>(mut self, data_dir: P) -> Self {
        self.data_dir = Some(data_dir.as_ref().to_path_buf());
        self
    }

    /// Chooses whether an unapplied script that sorts before an applied one
    /// aborts the run. Defaults to `true`.
    pub fn fail_on_order_mismatch(mut self, fail: bool) -> Self {
        self.fail_on_order_mismatch = fail;
        self
    }

    /// Tracks progress in `_migration_<suffix>` so several services can share
    /// one store. An empty suffix means no suffix.
    pub fn repo_suffix(mut self, suffix: &str) -> Self {
        self.repo_suffix = if suffix.is_empty() {
            None
        } else {
            Some(suffix.to_string())
        };
        self
    }

    /// Runs scripts through `executor` instead of the store's `run`.
    pub fn script_executor(mut self, executor: ScriptExecutor) -> Self {
        self.executor_override = Some(executor);
        self
    }

    /// Registers a progress listener. Can be called more than once.
    pub fn add_listener(mut self, listener: MigrationEventListener) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Validates the settings and creates the migrator.
    pub fn build(self) -> MigrationResult<Migrator> {
        let store = self.store.ok_or_else(|| {
            log::error!("A migrator needs a target store");
            MigrationError::new("A migrator needs a target store", ErrorKind::InvalidConfiguration)
        })?;

        let data_dir = self.data_dir.ok_or_else(|| {
            log::error!("A migrator needs a data directory");
            MigrationError::new("A migrator needs a data directory", ErrorKind::InvalidConfiguration)
        })?;

        let config = MigratorConfig::new(
            store,
            data_dir,
            self.fail_on_order_mismatch,
            self.repo_suffix,
            self.executor_override,
            self.listeners,
        );
        Ok(Migrator::new(config))
    }
}
