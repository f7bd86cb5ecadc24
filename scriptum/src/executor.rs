//! Runs script content against the target store.

use crate::errors::MigrationResult;
use crate::store::MigrationStore;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// A callable that runs one script's text.
///
/// Automatically implemented for any `Fn(&str) -> MigrationResult<()>` that is
/// `Send + Sync`.
pub trait ScriptRunner: Send + Sync + Fn(&str) -> MigrationResult<()> {}

impl<F> ScriptRunner for F where F: Send + Sync + Fn(&str) -> MigrationResult<()> {}

/// Runs pending scripts for the migrator.
///
/// The default executor delegates to the store's own `run` capability. An
/// override is useful when the store cannot run migration scripts through its
/// generic path, for example a document database with server-side evaluation
/// disabled, where scripts have to go through a driver or an admin shell.
///
/// # Examples
///
/// ```rust
/// use scriptum::executor::ScriptExecutor;
/// use std::sync::{Arc, Mutex};
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = seen.clone();
/// let executor = ScriptExecutor::new(move |script: &str| {
///     sink.lock().unwrap().push(script.to_string());
///     Ok(())
/// });
///
/// executor.run("db.users.drop()").unwrap();
/// assert_eq!(seen.lock().unwrap().len(), 1);
/// ```
#[derive(Clone)]
pub struct ScriptExecutor {
    runner: Arc<dyn ScriptRunner>,
    custom: bool,
}

impl ScriptExecutor {
    /// Creates an executor from a custom runner.
    pub fn new(runner: impl ScriptRunner + 'static) -> Self {
        ScriptExecutor {
            runner: Arc::new(runner),
            custom: true,
        }
    }

    /// The default executor, backed by the store's `run` capability.
    pub fn for_store(store: MigrationStore) -> Self {
        ScriptExecutor {
            runner: Arc::new(move |script: &str| store.run(script)),
            custom: false,
        }
    }

    /// Runs one script.
    pub fn run(&self, script: &str) -> MigrationResult<()> {
        (self.runner)(script)
    }

    /// Returns `true` when this executor overrides the store's runner.
    pub fn is_custom(&self) -> bool {
        self.custom
    }
}

impl Debug for ScriptExecutor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptExecutor")
            .field("custom", &self.custom)
            .finish()
    }
}
