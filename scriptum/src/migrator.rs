//! The migration engine.

use crate::errors::{ErrorKind, MigrationError, MigrationResult};
use crate::event::{publish, MigrationEvent};
use crate::fingerprint::fingerprint;
use crate::ledger::MigrationRecord;
use crate::migrator_builder::MigratorBuilder;
use crate::migrator_config::MigratorConfig;
use crate::scanner::{ScriptFile, ScriptScanner};
use std::collections::HashMap;
use std::fs;

/// A script found during the scan that has no ledger record yet.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingScript {
    script: ScriptFile,
    hash: String,
}

/// Applies a directory of scripts to a store, each exactly once.
///
/// A run has two passes. The reconciliation pass fingerprints every script
/// and checks it against the ledger; ordering and drift problems anywhere in
/// the directory are reported before anything executes. The apply pass then
/// runs the pending scripts in file name order, recording each one in the
/// ledger right after it succeeds.
///
/// # Concurrency
///
/// The migrator takes no lock. Running it from several processes against
/// the same ledger at once can apply a script twice; serialize runs outside
/// (a one-off job, leader election, a store-level advisory lock).
///
/// # Examples
///
/// ```rust,no_run
/// use scriptum::migrator::Migrator;
/// use scriptum::store::MigrationStore;
/// use scriptum::store::memory::InMemoryStore;
///
/// # fn main() -> scriptum::errors::MigrationResult<()> {
/// let migrator = Migrator::builder()
///     .store(MigrationStore::new(InMemoryStore::new()))
///     .data_dir("db/migrations")
///     .build()?;
///
/// migrator.migrate()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Migrator {
    config: MigratorConfig,
}

impl Migrator {
    pub fn new(config: MigratorConfig) -> Self {
        Migrator { config }
    }

    pub fn builder() -> MigratorBuilder {
        MigratorBuilder::new()
    }

    pub fn config(&self) -> &MigratorConfig {
        &self.config
    }

    /// Runs one migration.
    ///
    /// Every failure aborts the run at once. Nothing is retried; calling
    /// `migrate` again is the recovery path, and with an unchanged directory
    /// and ledger it applies nothing.
    ///
    /// A script's ledger record is written after the script ran. If the
    /// process dies in between, or the write fails, the next run executes
    /// that script again, so scripts should be safe to re-apply.
    ///
    /// # Errors
    ///
    /// Every error matches one or more [`ErrorKind`]s:
    ///
    /// - ledger bootstrap or read: `LedgerAccessError` + `LedgerOperationError`
    /// - data directory listing: `FileAccessError`
    /// - fingerprinting or reading a script: `FileAccessError` + `MigrationFailed`
    /// - strict ordering violated: `OrderMismatchError` + `MigrationFailed`
    /// - applied script changed on disk: `HashMismatchError` + `MigrationFailed`
    /// - script execution: `ExecutionError` + `MigrationFailed`
    /// - ledger append: `PersistError` + `LedgerAccessError` + `LedgerOperationError`
    pub fn migrate(&self) -> MigrationResult<()> {
        let ledger = self.config.ledger_name();
        log::info!(
            "Migrating scripts from {} using ledger {}",
            self.config.data_dir().display(),
            ledger
        );

        self.ensure_ledger(&ledger)?;
        let records = self.read_ledger(&ledger)?;
        let scripts = ScriptScanner::new(self.config.data_dir()).list()?;

        publish(
            self.config.listeners(),
            &ledger,
            MigrationEvent::Started {
                ledger: ledger.clone(),
                data_dir: self.config.data_dir().to_path_buf(),
            },
        );

        let pending = self.reconcile(&ledger, &records, &scripts)?;
        let applied = self.apply(&ledger, &pending)?;

        log::info!("Migration finished, {} script(s) applied", applied);
        publish(
            self.config.listeners(),
            &ledger,
            MigrationEvent::Completed { applied },
        );
        Ok(())
    }

    /// Creates the ledger if the store does not have it yet.
    fn ensure_ledger(&self, ledger: &str) -> MigrationResult<()> {
        let store = self.config.store();
        let exists = store
            .has_ledger(ledger)
            .map_err(|e| ledger_bootstrap_error(ledger, e))?;

        if !exists {
            log::debug!("Creating ledger {}", ledger);
            store
                .create_ledger(ledger, &MigrationRecord::shape())
                .map_err(|e| ledger_bootstrap_error(ledger, e))?;
        }
        Ok(())
    }

    fn read_ledger(&self, ledger: &str) -> MigrationResult<Vec<MigrationRecord>> {
        let records = self.config.store().read_all(ledger).map_err(|e| {
            log::error!("Unable to read ledger {}: {}", ledger, e);
            MigrationError::new_with_cause(
                &format!("Unable to read Database info. {}", e),
                ErrorKind::LedgerAccessError,
                e,
            )
            .also(ErrorKind::LedgerOperationError)
        })?;
        log::debug!("Ledger {} holds {} record(s)", ledger, records.len());
        Ok(records)
    }

    /// Checks every script against the ledger and collects the pending ones,
    /// in scan order. Nothing is executed here.
    fn reconcile(
        &self,
        ledger: &str,
        records: &[MigrationRecord],
        scripts: &[ScriptFile],
    ) -> MigrationResult<Vec<PendingScript>> {
        let applied: HashMap<&str, &MigrationRecord> =
            records.iter().map(|r| (r.script_id(), r)).collect();

        let mut saw_pending = false;
        let mut pending = Vec::new();

        for script in scripts {
            let script_id = script.script_id();
            log::info!("Migrating file {}", script_id);

            let hash = fingerprint(script.path()).map_err(|e| {
                log::error!("Error computing hash for file {}: {}", script_id, e);
                MigrationError::new_with_cause(
                    &format!(
                        "Error computing hash for file '{}': {}, aborting migration.",
                        script_id, e
                    ),
                    ErrorKind::FileAccessError,
                    e,
                )
                .also(ErrorKind::MigrationFailed)
                .for_script(script_id)
            })?;
            log::debug!("Fingerprint of {} is {}", script_id, hash);

            match applied.get(script_id) {
                Some(record) => {
                    if saw_pending && self.config.fail_on_order_mismatch() {
                        let message = format!(
                            "Non-Migrated file found before '{}' which has been migrated. Order import failed, unable to proceed.",
                            script_id
                        );
                        log::error!("{}", message);
                        return Err(MigrationError::new(&message, ErrorKind::OrderMismatchError)
                            .also(ErrorKind::MigrationFailed)
                            .for_script(script_id));
                    }

                    if !record.matches_hash(&hash) {
                        let message = format!(
                            "File '{}' was previously migrated but hashes don't match.",
                            script_id
                        );
                        log::error!("{} (recorded {}, found {})", message, record.hash(), hash);
                        return Err(MigrationError::new(&message, ErrorKind::HashMismatchError)
                            .also(ErrorKind::MigrationFailed)
                            .for_script(script_id));
                    }

                    log::info!("File '{}' previously migrated, continuing", script_id);
                    publish(
                        self.config.listeners(),
                        ledger,
                        MigrationEvent::Verified {
                            script_id: script_id.to_string(),
                        },
                    );
                }
                None => {
                    saw_pending = true;
                    publish(
                        self.config.listeners(),
                        ledger,
                        MigrationEvent::Pending {
                            script_id: script_id.to_string(),
                        },
                    );
                    pending.push(PendingScript {
                        script: script.clone(),
                        hash,
                    });
                }
            }
        }

        Ok(pending)
    }

    /// Runs and records the pending scripts in order. Returns how many were applied.
    fn apply(&self, ledger: &str, pending: &[PendingScript]) -> MigrationResult<usize> {
        let store = self.config.store();
        let executor = self.config.executor();

        for entry in pending {
            let script_id = entry.script.script_id();
            let content = read_script(&entry.script)?;

            executor.run(&content).map_err(|e| {
                log::error!("Unable to run {}: {}", script_id, e);
                MigrationError::new_with_cause(
                    &format!("Unable to run command '{}'. {}", script_id, e),
                    ErrorKind::ExecutionError,
                    e,
                )
                .also(ErrorKind::MigrationFailed)
                .for_script(script_id)
            })?;

            let record = MigrationRecord::applied_now(script_id, &entry.hash);
            store.append(ledger, record).map_err(|e| {
                log::error!("Unable to save migration info for {}: {}", script_id, e);
                MigrationError::new_with_cause(
                    &format!("Unable to save migration info for '{}'. {}", script_id, e),
                    ErrorKind::PersistError,
                    e,
                )
                .also(ErrorKind::LedgerAccessError)
                .also(ErrorKind::LedgerOperationError)
                .for_script(script_id)
            })?;

            log::info!("Applied {}", script_id);
            publish(
                self.config.listeners(),
                ledger,
                MigrationEvent::Applied {
                    script_id: script_id.to_string(),
                },
            );
        }

        Ok(pending.len())
    }
}

fn ledger_bootstrap_error(ledger: &str, cause: MigrationError) -> MigrationError {
    log::error!("Unable to create ledger {}: {}", ledger, cause);
    MigrationError::new_with_cause(
        &format!("Unable to create the required migration repository. {}", cause),
        ErrorKind::LedgerAccessError,
        cause,
    )
    .also(ErrorKind::LedgerOperationError)
}

fn read_script(script: &ScriptFile) -> MigrationResult<String> {
    let script_id = script.script_id();
    fs::read(script.path())
        .map_err(MigrationError::from)
        .and_then(|bytes| String::from_utf8(bytes).map_err(MigrationError::from))
        .map_err(|e| {
            log::error!("Unable to read data file {}: {}", script_id, e);
            MigrationError::new_with_cause(
                &format!("Unable to read data file '{}': {}", script_id, e),
                ErrorKind::FileAccessError,
                e,
            )
            .also(ErrorKind::MigrationFailed)
            .for_script(script_id)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::MigrationEventListener;
    use crate::executor::ScriptExecutor;
    use crate::fingerprint::fingerprint_bytes;
    use crate::ledger::RecordShape;
    use crate::store::memory::InMemoryStore;
    use crate::store::{MigrationStore, MigrationStoreProvider};
    use chrono::Utc;
    use parking_lot::Mutex;
    use std::path::Path;
    use std::sync::Arc;

    const SCRIPT_001: &str = "db.users.insert({name: 'admin'});\n";
    const SCRIPT_002: &str = "db.users.createIndex({name: 1});\n";

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Op {
        HasLedger,
        CreateLedger,
        ReadAll,
        Append,
        Run,
    }

    /// Counts calls per capability and fails the ones it is told to.
    #[derive(Clone, Default)]
    struct RecordingStore {
        memory: InMemoryStore,
        calls: Arc<Mutex<HashMap<Op, usize>>>,
        failing: Arc<Mutex<HashMap<Op, usize>>>,
    }

    impl RecordingStore {
        fn new() -> Self {
            Self::default()
        }

        /// Fails the `nth` call (1-based) of `op`.
        fn fail_on(&self, op: Op, nth: usize) {
            self.failing.lock().insert(op, nth);
        }

        fn times(&self, op: Op) -> usize {
            self.calls.lock().get(&op).copied().unwrap_or(0)
        }

        fn record(&self, op: Op) -> MigrationResult<()> {
            let count = {
                let mut calls = self.calls.lock();
                let count = calls.entry(op).or_insert(0);
                *count += 1;
                *count
            };
            if self.failing.lock().get(&op) == Some(&count) {
                return Err(MigrationError::new("some error", ErrorKind::LedgerOperationError));
            }
            Ok(())
        }

        fn seed(&self, script_id: &str, hash: &str) {
            self.memory
                .create_ledger("_migration", &MigrationRecord::shape())
                .unwrap();
            self.memory
                .append("_migration", MigrationRecord::new(script_id, hash, Utc::now()))
                .unwrap();
        }
    }

    impl MigrationStoreProvider for RecordingStore {
        fn has_ledger(&self, name: &str) -> MigrationResult<bool> {
            self.record(Op::HasLedger)?;
            self.memory.has_ledger(name)
        }

        fn create_ledger(&self, name: &str, shape: &RecordShape) -> MigrationResult<()> {
            self.record(Op::CreateLedger)?;
            self.memory.create_ledger(name, shape)
        }

        fn read_all(&self, name: &str) -> MigrationResult<Vec<MigrationRecord>> {
            self.record(Op::ReadAll)?;
            self.memory.read_all(name)
        }

        fn append(&self, name: &str, record: MigrationRecord) -> MigrationResult<()> {
            self.record(Op::Append)?;
            self.memory.append(name, record)
        }

        fn run(&self, script: &str) -> MigrationResult<()> {
            self.record(Op::Run)?;
            self.memory.run(script)
        }
    }

    fn write_scripts(dir: &Path, scripts: &[(&str, &str)]) {
        for (name, content) in scripts {
            fs::write(dir.join(name), content).unwrap();
        }
    }

    fn default_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        write_scripts(
            dir.path(),
            &[("script_001.js", SCRIPT_001), ("script_002.js", SCRIPT_002)],
        );
        dir
    }

    fn migrator(store: &RecordingStore, dir: &Path, fail_on_order_mismatch: bool) -> Migrator {
        Migrator::builder()
            .store(MigrationStore::new(store.clone()))
            .data_dir(dir)
            .fail_on_order_mismatch(fail_on_order_mismatch)
            .build()
            .unwrap()
    }

    fn ledger_ids(store: &RecordingStore) -> Vec<String> {
        store
            .memory
            .read_all("_migration")
            .unwrap()
            .iter()
            .map(|r| r.script_id().to_string())
            .collect()
    }

    #[test]
    fn test_migrate_success() {
        let dir = default_dir();
        let store = RecordingStore::new();

        migrator(&store, dir.path(), true).migrate().unwrap();

        assert_eq!(store.times(Op::HasLedger), 1);
        assert_eq!(store.times(Op::CreateLedger), 1);
        assert_eq!(store.times(Op::ReadAll), 1);
        assert_eq!(store.times(Op::Run), 2);
        assert_eq!(store.times(Op::Append), 2);
        assert_eq!(store.memory.executed_scripts(), vec![SCRIPT_001, SCRIPT_002]);
        assert_eq!(ledger_ids(&store), vec!["script_001.js", "script_002.js"]);
    }

    #[test]
    fn test_records_carry_fresh_fingerprint_and_time() {
        let dir = default_dir();
        let store = RecordingStore::new();
        let started = Utc::now();

        migrator(&store, dir.path(), true).migrate().unwrap();

        let records = store.memory.read_all("_migration").unwrap();
        assert_eq!(records[0].hash(), fingerprint_bytes(SCRIPT_001.as_bytes()));
        assert_eq!(records[1].hash(), fingerprint_bytes(SCRIPT_002.as_bytes()));
        assert!(records.iter().all(|r| r.applied_at() >= started));
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let dir = default_dir();
        let store = RecordingStore::new();
        let migrator = migrator(&store, dir.path(), true);

        migrator.migrate().unwrap();
        migrator.migrate().unwrap();

        assert_eq!(store.times(Op::CreateLedger), 1);
        assert_eq!(store.times(Op::Run), 2);
        assert_eq!(store.times(Op::Append), 2);
        assert_eq!(ledger_ids(&store).len(), 2);
    }

    #[test]
    fn test_existing_ledger_is_not_recreated() {
        let dir = default_dir();
        let store = RecordingStore::new();
        store.seed("script_001.js", &fingerprint_bytes(SCRIPT_001.as_bytes()));

        migrator(&store, dir.path(), true).migrate().unwrap();

        assert_eq!(store.times(Op::CreateLedger), 0);
    }

    #[test]
    fn test_previous_data_success() {
        let dir = default_dir();
        let store = RecordingStore::new();
        store.seed("script_001.js", &fingerprint_bytes(SCRIPT_001.as_bytes()));

        migrator(&store, dir.path(), true).migrate().unwrap();

        assert_eq!(store.times(Op::Run), 1);
        assert_eq!(store.times(Op::Append), 1);
        assert_eq!(store.memory.executed_scripts(), vec![SCRIPT_002]);
        assert_eq!(ledger_ids(&store), vec!["script_001.js", "script_002.js"]);
    }

    #[test]
    fn test_previous_data_failed_hash() {
        let dir = default_dir();
        let store = RecordingStore::new();
        store.seed("script_001.js", "1234");

        let err = migrator(&store, dir.path(), true).migrate().unwrap_err();

        assert!(err.matches(&ErrorKind::HashMismatchError));
        assert!(err.matches(&ErrorKind::MigrationFailed));
        assert_eq!(
            err.to_string(),
            "File 'script_001.js' was previously migrated but hashes don't match."
        );
        assert_eq!(err.script_id(), Some("script_001.js"));
        assert_eq!(store.times(Op::Run), 0);
        assert_eq!(store.times(Op::Append), 0);
        assert_eq!(ledger_ids(&store), vec!["script_001.js"]);
    }

    #[test]
    fn test_hash_mismatch_after_pending_blocks_everything() {
        let dir = default_dir();
        let store = RecordingStore::new();
        store.seed("script_002.js", "1234");

        let err = migrator(&store, dir.path(), false).migrate().unwrap_err();

        // script_001 is pending, but nothing runs because script_002 drifted
        assert_eq!(err.kind(), &ErrorKind::HashMismatchError);
        assert_eq!(store.times(Op::Run), 0);
    }

    #[test]
    fn test_hash_comparison_is_case_sensitive() {
        let dir = default_dir();
        let store = RecordingStore::new();
        let upper = fingerprint_bytes(SCRIPT_001.as_bytes()).to_uppercase();
        store.seed("script_001.js", &upper);

        let err = migrator(&store, dir.path(), true).migrate().unwrap_err();

        assert_eq!(err.kind(), &ErrorKind::HashMismatchError);
        assert_eq!(err.script_id(), Some("script_001.js"));
        assert_eq!(store.times(Op::Run), 0);
    }

    #[test]
    fn test_order_mismatch_strict() {
        let dir = default_dir();
        let store = RecordingStore::new();
        store.seed("script_002.js", &fingerprint_bytes(SCRIPT_002.as_bytes()));

        let err = migrator(&store, dir.path(), true).migrate().unwrap_err();

        assert_eq!(err.kind(), &ErrorKind::OrderMismatchError);
        assert!(err.matches(&ErrorKind::MigrationFailed));
        assert_eq!(
            err.to_string(),
            "Non-Migrated file found before 'script_002.js' which has been migrated. Order import failed, unable to proceed."
        );
        assert_eq!(store.times(Op::Run), 0);
        assert_eq!(store.times(Op::Append), 0);
    }

    #[test]
    fn test_order_mismatch_tolerated() {
        let dir = default_dir();
        let store = RecordingStore::new();
        store.seed("script_002.js", &fingerprint_bytes(SCRIPT_002.as_bytes()));

        migrator(&store, dir.path(), false).migrate().unwrap();

        assert_eq!(store.memory.executed_scripts(), vec![SCRIPT_001]);
        assert_eq!(ledger_ids(&store), vec!["script_001.js", "script_002.js"]);
    }

    #[test]
    fn test_order_checked_before_hash() {
        let dir = default_dir();
        let store = RecordingStore::new();
        store.seed("script_002.js", "1234");

        let err = migrator(&store, dir.path(), true).migrate().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::OrderMismatchError);
    }

    #[test]
    fn test_readme_is_never_touched() {
        let dir = default_dir();
        write_scripts(dir.path(), &[("README.md", "# how to write scripts")]);
        let store = RecordingStore::new();
        // a recorded readme with a bogus hash would fail the run if it were compared
        store.seed("README.md", "1234");

        migrator(&store, dir.path(), false).migrate().unwrap();

        assert_eq!(store.memory.executed_scripts(), vec![SCRIPT_001, SCRIPT_002]);
        assert_eq!(ledger_ids(&store), vec!["README.md", "script_001.js", "script_002.js"]);
    }

    #[test]
    fn test_sub_directories_are_skipped() {
        let dir = default_dir();
        fs::create_dir(dir.path().join("script_000_archive")).unwrap();
        let store = RecordingStore::new();

        migrator(&store, dir.path(), true).migrate().unwrap();

        assert_eq!(ledger_ids(&store), vec!["script_001.js", "script_002.js"]);
    }

    #[test]
    fn test_ledger_read_failure() {
        let dir = default_dir();
        let store = RecordingStore::new();
        store.fail_on(Op::ReadAll, 1);

        let err = migrator(&store, dir.path(), true).migrate().unwrap_err();

        assert!(err.matches(&ErrorKind::LedgerAccessError));
        assert!(err.matches(&ErrorKind::LedgerOperationError));
        assert_eq!(err.to_string(), "Unable to read Database info. some error");
        assert_eq!(store.times(Op::Run), 0);
        assert_eq!(store.times(Op::Append), 0);
    }

    #[test]
    fn test_ledger_existence_check_failure() {
        let dir = default_dir();
        let store = RecordingStore::new();
        store.fail_on(Op::HasLedger, 1);

        let err = migrator(&store, dir.path(), true).migrate().unwrap_err();

        assert_eq!(err.kind(), &ErrorKind::LedgerAccessError);
        assert_eq!(store.times(Op::CreateLedger), 0);
        assert_eq!(store.times(Op::ReadAll), 0);
    }

    #[test]
    fn test_ledger_creation_failure() {
        let dir = default_dir();
        let store = RecordingStore::new();
        store.fail_on(Op::CreateLedger, 1);

        let err = migrator(&store, dir.path(), true).migrate().unwrap_err();

        assert!(err.matches(&ErrorKind::LedgerAccessError));
        assert!(err.matches(&ErrorKind::LedgerOperationError));
        assert_eq!(
            err.to_string(),
            "Unable to create the required migration repository. some error"
        );
        assert_eq!(store.times(Op::ReadAll), 0);
    }

    #[test]
    fn test_missing_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordingStore::new();

        let err = migrator(&store, &dir.path().join("some-invalid-path"), true)
            .migrate()
            .unwrap_err();

        assert_eq!(err.kind(), &ErrorKind::FileAccessError);
        assert!(err.to_string().starts_with("Unable to access scripts path."));
        // the ledger is bootstrapped and read before the directory is listed
        assert_eq!(store.times(Op::ReadAll), 1);
        assert_eq!(store.times(Op::Run), 0);
    }

    #[test]
    fn test_run_failure_stops_the_run() {
        let dir = default_dir();
        let store = RecordingStore::new();
        store.fail_on(Op::Run, 1);

        let err = migrator(&store, dir.path(), true).migrate().unwrap_err();

        assert!(err.matches(&ErrorKind::ExecutionError));
        assert_eq!(err.to_string(), "Unable to run command 'script_001.js'. some error");
        assert_eq!(err.script_id(), Some("script_001.js"));
        assert_eq!(store.times(Op::Run), 1);
        assert_eq!(store.times(Op::Append), 0);
    }

    #[test]
    fn test_run_failure_keeps_earlier_records() {
        let dir = default_dir();
        let store = RecordingStore::new();
        store.fail_on(Op::Run, 2);

        let err = migrator(&store, dir.path(), true).migrate().unwrap_err();

        assert_eq!(err.script_id(), Some("script_002.js"));
        assert_eq!(ledger_ids(&store), vec!["script_001.js"]);
    }

    #[test]
    fn test_append_failure() {
        let dir = default_dir();
        let store = RecordingStore::new();
        store.fail_on(Op::Append, 1);

        let err = migrator(&store, dir.path(), true).migrate().unwrap_err();

        assert_eq!(err.kind(), &ErrorKind::PersistError);
        assert!(err.matches(&ErrorKind::LedgerAccessError));
        assert!(err.matches(&ErrorKind::LedgerOperationError));
        assert_eq!(
            err.to_string(),
            "Unable to save migration info for 'script_001.js'. some error"
        );
        // the script did run; the next script is not attempted
        assert_eq!(store.times(Op::Run), 1);
        assert!(ledger_ids(&store).is_empty());
    }

    #[test]
    fn test_rerun_after_append_failure_reapplies_script() {
        let dir = default_dir();
        let store = RecordingStore::new();
        store.fail_on(Op::Append, 1);
        let migrator = migrator(&store, dir.path(), true);

        assert!(migrator.migrate().is_err());
        migrator.migrate().unwrap();

        assert_eq!(
            store.memory.executed_scripts(),
            vec![SCRIPT_001, SCRIPT_001, SCRIPT_002]
        );
        assert_eq!(ledger_ids(&store), vec!["script_001.js", "script_002.js"]);
    }

    #[test]
    fn test_non_utf8_script_is_file_access_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("001.bin"), [0xffu8, 0xfe, 0x00]).unwrap();
        let store = RecordingStore::new();

        let err = migrator(&store, dir.path(), true).migrate().unwrap_err();

        assert!(err.matches(&ErrorKind::FileAccessError));
        assert!(err.matches(&ErrorKind::MigrationFailed));
        assert!(err.to_string().starts_with("Unable to read data file '001.bin'"));
        assert_eq!(store.times(Op::Run), 0);
    }

    #[test]
    fn test_executor_override_replaces_store_run() {
        let dir = default_dir();
        let store = RecordingStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        Migrator::builder()
            .store(MigrationStore::new(store.clone()))
            .data_dir(dir.path())
            .script_executor(ScriptExecutor::new(move |script: &str| {
                sink.lock().push(script.to_string());
                Ok(())
            }))
            .build()
            .unwrap()
            .migrate()
            .unwrap();

        assert_eq!(store.times(Op::Run), 0);
        assert_eq!(*seen.lock(), vec![SCRIPT_001, SCRIPT_002]);
        assert_eq!(store.times(Op::Append), 2);
    }

    #[test]
    fn test_repo_suffix_selects_ledger() {
        let dir = default_dir();
        let store = RecordingStore::new();

        Migrator::builder()
            .store(MigrationStore::new(store.clone()))
            .data_dir(dir.path())
            .repo_suffix("billing")
            .build()
            .unwrap()
            .migrate()
            .unwrap();

        assert_eq!(store.memory.ledger_names(), vec!["_migration_billing"]);
        assert_eq!(store.memory.read_all("_migration_billing").unwrap().len(), 2);
    }

    #[test]
    fn test_events_follow_the_run() {
        let dir = default_dir();
        let store = RecordingStore::new();
        store.seed("script_001.js", &fingerprint_bytes(SCRIPT_001.as_bytes()));
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();

        Migrator::builder()
            .store(MigrationStore::new(store.clone()))
            .data_dir(dir.path())
            .add_listener(MigrationEventListener::new(move |info| {
                sink.lock().push(info.event().clone())
            }))
            .build()
            .unwrap()
            .migrate()
            .unwrap();

        let events = events.lock();
        assert_eq!(
            *events,
            vec![
                MigrationEvent::Started {
                    ledger: "_migration".to_string(),
                    data_dir: dir.path().to_path_buf(),
                },
                MigrationEvent::Verified { script_id: "script_001.js".to_string() },
                MigrationEvent::Pending { script_id: "script_002.js".to_string() },
                MigrationEvent::Applied { script_id: "script_002.js".to_string() },
                MigrationEvent::Completed { applied: 1 },
            ]
        );
    }

    #[test]
    fn test_failed_run_sends_no_completed_event() {
        let dir = default_dir();
        let store = RecordingStore::new();
        store.fail_on(Op::Run, 2);
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();

        let result = Migrator::builder()
            .store(MigrationStore::new(store.clone()))
            .data_dir(dir.path())
            .add_listener(MigrationEventListener::new(move |info| {
                sink.lock().push(info.event().clone())
            }))
            .build()
            .unwrap()
            .migrate();

        assert!(result.is_err());
        let events = events.lock();
        assert!(events.contains(&MigrationEvent::Applied { script_id: "script_001.js".to_string() }));
        assert!(!events.iter().any(|e| matches!(e, MigrationEvent::Completed { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_script_stops_before_anything_runs() {
        let dir = tempfile::tempdir().unwrap();
        write_scripts(dir.path(), &[("001.js", SCRIPT_001)]);
        std::os::unix::fs::symlink(dir.path().join("gone.js"), dir.path().join("002.js")).unwrap();
        let store = RecordingStore::new();

        let err = migrator(&store, dir.path(), true).migrate().unwrap_err();

        assert_eq!(
            err.kinds(),
            &[ErrorKind::FileAccessError, ErrorKind::MigrationFailed]
        );
        assert!(err
            .to_string()
            .starts_with("Error computing hash for file '002.js': "));
        assert!(err.to_string().ends_with(", aborting migration."));
        assert_eq!(err.script_id(), Some("002.js"));
        assert!(err.cause().is_some());
        // 001.js was pending but the scan never finished
        assert_eq!(store.times(Op::Run), 0);
        assert_eq!(store.times(Op::Append), 0);
    }
}
