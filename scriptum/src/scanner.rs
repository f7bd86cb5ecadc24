//! Lists the candidate scripts of a data directory.

use crate::common::is_readme;
use crate::errors::{ErrorKind, MigrationError, MigrationResult};
use itertools::Itertools;
use std::fs;
use std::path::{Path, PathBuf};

/// A candidate script found in the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptFile {
    script_id: String,
    path: PathBuf,
}

impl ScriptFile {
    pub fn new(script_id: &str, path: PathBuf) -> Self {
        ScriptFile {
            script_id: script_id.to_string(),
            path,
        }
    }

    /// The file name, which is the script's permanent identity.
    pub fn script_id(&self) -> &str {
        &self.script_id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Lists script files in a flat directory.
///
/// Sub-directories are skipped and a file named `readme.md` (any case) is
/// left out entirely. The result is sorted ascending by file name, compared
/// byte-wise, so `"10_x"` sorts before `"2_x"`. Zero-pad numeric prefixes to
/// get numeric order.
#[derive(Debug, Clone)]
pub struct ScriptScanner {
    data_dir: PathBuf,
}

impl ScriptScanner {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        ScriptScanner {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Returns the scripts of the data directory in processing order.
    pub fn list(&self) -> MigrationResult<Vec<ScriptFile>> {
        let entries = fs::read_dir(&self.data_dir).map_err(|err| {
            log::error!("Unable to access scripts path {}: {}", self.data_dir.display(), err);
            MigrationError::new_with_cause(
                &format!("Unable to access scripts path. {}", err),
                ErrorKind::FileAccessError,
                err.into(),
            )
        })?;

        let mut scripts = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| {
                log::error!("Unable to read entry in {}: {}", self.data_dir.display(), err);
                MigrationError::new_with_cause(
                    &format!("Unable to access scripts path. {}", err),
                    ErrorKind::FileAccessError,
                    err.into(),
                )
            })?;

            let file_name = entry.file_name().to_string_lossy().into_owned();
            if is_readme(&file_name) {
                log::debug!("Ignoring {}", file_name);
                continue;
            }

            // follows symlinks, so a link to a directory is skipped as well
            let path = entry.path();
            if path.is_dir() {
                log::debug!("Skipping directory {}", file_name);
                continue;
            }

            scripts.push(ScriptFile::new(&file_name, path));
        }

        Ok(sort_scripts(scripts))
    }
}

/// Orders scripts ascending by script id.
pub fn sort_scripts(scripts: Vec<ScriptFile>) -> Vec<ScriptFile> {
    scripts
        .into_iter()
        .sorted_by(|a, b| a.script_id.cmp(&b.script_id))
        .collect()
}
