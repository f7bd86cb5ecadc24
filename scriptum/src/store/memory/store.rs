use crate::errors::{ErrorKind, MigrationError, MigrationResult};
use crate::ledger::{MigrationRecord, RecordShape};
use crate::store::memory::InMemoryStoreConfig;
use crate::store::MigrationStoreProvider;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// In-memory implementation of [`MigrationStoreProvider`].
///
/// # Characteristics
/// - **Ledgers**: kept per name, keyed and ordered by script id
/// - **Append-only**: appending a record whose script id is already present fails
/// - **Script journal**: every script accepted by `run` is remembered in order
/// - **No Persistence**: everything is lost when the last clone is dropped
///
/// Clones share state, so a test can hand one clone to the migrator and
/// inspect the other afterwards.
///
/// ```rust
/// use scriptum::store::memory::InMemoryStore;
/// use scriptum::store::{MigrationStore, MigrationStoreProvider};
///
/// let memory = InMemoryStore::new();
/// let store = MigrationStore::new(memory.clone());
/// store.run("db.users.createIndex({email: 1})").unwrap();
/// assert_eq!(memory.executed_scripts().len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<InMemoryStoreInner>,
}

impl InMemoryStore {
    pub fn new() -> InMemoryStore {
        InMemoryStore::with_config(InMemoryStoreConfig::new())
    }

    pub fn with_config(store_config: InMemoryStoreConfig) -> InMemoryStore {
        InMemoryStore {
            inner: Arc::new(InMemoryStoreInner::new(store_config)),
        }
    }

    /// Scripts accepted by `run`, in execution order.
    pub fn executed_scripts(&self) -> Vec<String> {
        self.inner.journal.read().clone()
    }

    /// Names of all ledgers created so far, sorted.
    pub fn ledger_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .inner
            .ledgers
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }
}

impl MigrationStoreProvider for InMemoryStore {
    fn has_ledger(&self, name: &str) -> MigrationResult<bool> {
        Ok(self.inner.ledgers.contains_key(name))
    }

    fn create_ledger(&self, name: &str, _shape: &RecordShape) -> MigrationResult<()> {
        self.inner.create_ledger(name)
    }

    fn read_all(&self, name: &str) -> MigrationResult<Vec<MigrationRecord>> {
        self.inner.read_all(name)
    }

    fn append(&self, name: &str, record: MigrationRecord) -> MigrationResult<()> {
        self.inner.append(name, record)
    }

    fn run(&self, script: &str) -> MigrationResult<()> {
        self.inner.run(script)
    }
}

#[derive(Default)]
struct InMemoryStoreInner {
    store_config: InMemoryStoreConfig,
    ledgers: DashMap<String, BTreeMap<String, MigrationRecord>>,
    journal: RwLock<Vec<String>>,
}

impl InMemoryStoreInner {
    fn new(store_config: InMemoryStoreConfig) -> InMemoryStoreInner {
        InMemoryStoreInner {
            store_config,
            ledgers: DashMap::new(),
            journal: RwLock::new(Vec::new()),
        }
    }

    fn create_ledger(&self, name: &str) -> MigrationResult<()> {
        if name.is_empty() {
            log::error!("Ledger name cannot be empty");
            return Err(MigrationError::new(
                "Ledger name cannot be empty",
                ErrorKind::LedgerOperationError,
            ));
        }
        self.ledgers.entry(name.to_string()).or_default();
        Ok(())
    }

    fn read_all(&self, name: &str) -> MigrationResult<Vec<MigrationRecord>> {
        match self.ledgers.get(name) {
            Some(ledger) => Ok(ledger.values().cloned().collect()),
            None => Err(missing_ledger(name)),
        }
    }

    fn append(&self, name: &str, record: MigrationRecord) -> MigrationResult<()> {
        let mut ledger = self.ledgers.get_mut(name).ok_or_else(|| missing_ledger(name))?;
        if ledger.contains_key(record.script_id()) {
            log::error!("Ledger {} already has a record for {}", name, record.script_id());
            return Err(MigrationError::new(
                &format!(
                    "Ledger {} already has a record for {}",
                    name,
                    record.script_id()
                ),
                ErrorKind::LedgerOperationError,
            ));
        }
        ledger.insert(record.script_id().to_string(), record);
        Ok(())
    }

    fn run(&self, script: &str) -> MigrationResult<()> {
        self.store_config.check_script(script)?;
        self.journal.write().push(script.to_string());
        Ok(())
    }
}

fn missing_ledger(name: &str) -> MigrationError {
    MigrationError::new(
        &format!("Ledger {} does not exist", name),
        ErrorKind::LedgerAccessError,
    )
}
