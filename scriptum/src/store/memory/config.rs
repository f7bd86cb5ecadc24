use crate::errors::MigrationResult;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Check applied by [`InMemoryStore`](super::InMemoryStore) to every script it is asked to run.
pub trait ScriptCheck: Send + Sync + Fn(&str) -> MigrationResult<()> {}

impl<F> ScriptCheck for F where F: Send + Sync + Fn(&str) -> MigrationResult<()> {}

/// Configuration for an in-memory store.
///
/// By default every script runs successfully. A script check can be installed
/// to make the store reject some scripts, the way a real database would reject
/// malformed statements.
///
/// ```rust
/// use scriptum::errors::{ErrorKind, MigrationError};
/// use scriptum::store::memory::{InMemoryStore, InMemoryStoreConfig};
///
/// let config = InMemoryStoreConfig::new().script_check(|script| {
///     if script.contains("syntax error") {
///         return Err(MigrationError::new("bad script", ErrorKind::ExecutionError));
///     }
///     Ok(())
/// });
/// let store = InMemoryStore::with_config(config);
/// ```
#[derive(Default, Clone)]
pub struct InMemoryStoreConfig {
    script_check: Option<Arc<dyn ScriptCheck>>,
}

impl InMemoryStoreConfig {
    pub fn new() -> InMemoryStoreConfig {
        InMemoryStoreConfig { script_check: None }
    }

    /// Installs a check that runs before a script is accepted.
    pub fn script_check(mut self, check: impl ScriptCheck + 'static) -> Self {
        self.script_check = Some(Arc::new(check));
        self
    }

    pub(crate) fn check_script(&self, script: &str) -> MigrationResult<()> {
        match &self.script_check {
            Some(check) => check(script),
            None => Ok(()),
        }
    }
}

impl Debug for InMemoryStoreConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStoreConfig")
            .field("script_check", &self.script_check.is_some())
            .finish()
    }
}
