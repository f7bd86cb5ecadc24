use scriptum::errors::{MigrationError, MigrationResult};
use scriptum::store::memory::InMemoryStore;
use scriptum::store::MigrationStore;
use std::backtrace::Backtrace;
use std::path::{Path, PathBuf};
use std::time::Instant;
use std::{env, fs};

/// Runs a test between a setup and a teardown step.
///
/// `after` runs even when the test fails, so the data directory is always
/// removed. A failure in any step panics with the error and a backtrace.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> MigrationResult<()>,
    B: Fn() -> MigrationResult<TestContext>,
    A: Fn(TestContext) -> MigrationResult<()>,
{
    let start_time = Instant::now();
    let backtrace = Backtrace::capture();

    let result = match before() {
        Ok(ctx) => match test(ctx.clone()) {
            Ok(_) => after(ctx).map_err(|e| format!("After run failed: {:?}", e)),
            Err(e) => {
                let _ = after(ctx);
                Err(format!("Test failed: {:?}", e))
            }
        },
        Err(e) => Err(format!("Before run failed: {:?}", e)),
    };

    if let Err(e) = result {
        eprintln!("\n==================== TEST FAILED ====================");
        eprintln!("Took {:?}", start_time.elapsed());
        eprintln!("{}", e);
        let bt = backtrace.to_string();
        if !bt.is_empty() && !bt.contains("disabled") {
            eprintln!("\nBacktrace:\n{}", bt);
        }
        eprintln!("=====================================================\n");
        panic!("{}", e);
    }
}

/// A data directory plus an in-memory store to migrate.
#[derive(Clone)]
pub struct TestContext {
    data_dir: PathBuf,
    memory: InMemoryStore,
}

impl TestContext {
    pub fn new(data_dir: PathBuf, memory: InMemoryStore) -> Self {
        Self { data_dir, memory }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// The concrete store, for journal assertions.
    pub fn memory(&self) -> InMemoryStore {
        self.memory.clone()
    }

    pub fn store(&self) -> MigrationStore {
        MigrationStore::new(self.memory.clone())
    }

    /// Writes (or overwrites) a script in the data directory.
    pub fn write_script(&self, name: &str, content: &str) -> MigrationResult<()> {
        fs::write(self.data_dir.join(name), content)?;
        Ok(())
    }

    pub fn remove_script(&self, name: &str) -> MigrationResult<()> {
        fs::remove_file(self.data_dir.join(name))?;
        Ok(())
    }

    /// Script ids recorded in a ledger, in ledger order.
    pub fn applied(&self, repo_suffix: Option<&str>) -> MigrationResult<Vec<String>> {
        Ok(self
            .store()
            .history(repo_suffix)?
            .iter()
            .map(|r| r.script_id().to_string())
            .collect())
    }
}

pub fn random_path() -> PathBuf {
    let id = uuid::Uuid::new_v4();
    env::temp_dir().join(format!("scriptum-{}", id))
}

/// A ledger suffix that no other test uses.
pub fn random_suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

pub fn create_test_context() -> MigrationResult<TestContext> {
    let path = random_path();
    fs::create_dir_all(&path).map_err(|e| {
        MigrationError::from(format!("Failed to create data directory {}: {}", path.display(), e))
    })?;
    Ok(TestContext::new(path, InMemoryStore::new()))
}

pub fn cleanup(ctx: TestContext) -> MigrationResult<()> {
    if ctx.data_dir().exists() {
        fs::remove_dir_all(ctx.data_dir())?;
    }
    Ok(())
}
