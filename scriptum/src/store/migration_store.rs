use crate::errors::MigrationResult;
use crate::ledger::{MigrationRecord, RecordShape};
use crate::migrator::Migrator;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

/// The narrow capability a target store must offer to be migrated.
///
/// # Purpose
/// Defines the contract every backend adapter follows. The migrator relies on
/// nothing else, so SQL tables, document collections or an in-memory map can
/// all host a ledger.
///
/// # Contract
/// - `has_ledger` is a pure existence check.
/// - `create_ledger` is only called when `has_ledger` returned `false`; it
///   should still be safe to call on an existing ledger.
/// - `read_all` returns every record, sorted ascending by script id.
/// - `append` adds exactly one record. It must never overwrite an existing one.
/// - `run` executes opaque script text. What the text means (SQL statements, a
///   server-side function body, ...) is up to the store.
///
/// # Thread Safety
/// Implementers must be `Send + Sync`. The migrator itself calls the provider
/// from a single thread, one operation at a time.
pub trait MigrationStoreProvider: Send + Sync {
    /// Checks whether the ledger resource exists.
    ///
    /// # Arguments
    /// * `name` - Logical ledger name, e.g. `_migration` or `_migration_billing`
    fn has_ledger(&self, name: &str) -> MigrationResult<bool>;

    /// Creates the ledger resource.
    ///
    /// # Arguments
    /// * `name` - Logical ledger name
    /// * `shape` - Field layout of [`MigrationRecord`], for stores that need a schema
    fn create_ledger(&self, name: &str, shape: &RecordShape) -> MigrationResult<()>;

    /// Reads every record of the ledger, ordered by script id ascending.
    fn read_all(&self, name: &str) -> MigrationResult<Vec<MigrationRecord>>;

    /// Appends a single record to the ledger.
    fn append(&self, name: &str, record: MigrationRecord) -> MigrationResult<()>;

    /// Executes a script against the store.
    fn run(&self, script: &str) -> MigrationResult<()>;
}

/// Cheaply clonable handle to a [`MigrationStoreProvider`].
///
/// Dereferences to `Arc<dyn MigrationStoreProvider>`, so every capability
/// operation can be called on it directly. It also carries the
/// database-level entry points [`migrate`](MigrationStore::migrate) and
/// [`history`](MigrationStore::history).
///
/// # Examples
///
/// ```rust
/// use scriptum::store::{MigrationStore, MigrationStoreProvider};
/// use scriptum::store::memory::InMemoryStore;
///
/// let store = MigrationStore::new(InMemoryStore::new());
/// assert!(!store.has_ledger("_migration").unwrap());
/// assert!(store.history(None).unwrap().is_empty());
/// ```
#[derive(Clone)]
pub struct MigrationStore {
    inner: Arc<dyn MigrationStoreProvider>,
}

impl MigrationStore {
    /// Wraps a provider implementation.
    pub fn new<T: MigrationStoreProvider + 'static>(inner: T) -> Self {
        MigrationStore { inner: Arc::new(inner) }
    }

    /// Wraps a provider that is already shared.
    pub fn from_arc(inner: Arc<dyn MigrationStoreProvider>) -> Self {
        MigrationStore { inner }
    }

    /// Applies the scripts in `data_dir` using the store's own script runner
    /// and the default ledger.
    ///
    /// `fail_on_order_mismatch` defaults to `true` when `None`.
    pub fn migrate<P: AsRef<Path>>(
        &self,
        data_dir: P,
        fail_on_order_mismatch: Option<bool>,
    ) -> MigrationResult<()> {
        self.migrate_with_suffix(data_dir, fail_on_order_mismatch, None)
    }

    /// Same as [`migrate`](MigrationStore::migrate), tracking progress in
    /// `_migration_<repo_suffix>` instead of the default ledger.
    pub fn migrate_with_suffix<P: AsRef<Path>>(
        &self,
        data_dir: P,
        fail_on_order_mismatch: Option<bool>,
        repo_suffix: Option<&str>,
    ) -> MigrationResult<()> {
        let mut builder = Migrator::builder().store(self.clone()).data_dir(data_dir);
        if let Some(fail) = fail_on_order_mismatch {
            builder = builder.fail_on_order_mismatch(fail);
        }
        if let Some(suffix) = repo_suffix {
            builder = builder.repo_suffix(suffix);
        }
        builder.build()?.migrate()
    }

    /// Returns the applied records of a ledger, ascending by script id.
    ///
    /// A ledger that was never created has no history and yields an empty list.
    pub fn history(&self, repo_suffix: Option<&str>) -> MigrationResult<Vec<MigrationRecord>> {
        let name = crate::common::ledger_name(repo_suffix);
        if !self.inner.has_ledger(&name)? {
            return Ok(Vec::new());
        }
        self.inner.read_all(&name)
    }
}

impl Deref for MigrationStore {
    type Target = Arc<dyn MigrationStoreProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
