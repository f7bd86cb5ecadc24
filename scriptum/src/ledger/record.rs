use chrono::{DateTime, Utc};
use std::fmt::{Display, Formatter};

use super::RecordShape;

/// One entry per successfully applied script.
///
/// `script_id` is the script's file name and is unique within a ledger.
/// `hash` is the lowercase hex fingerprint of the file content at the time it
/// was read, and `applied_at` is set when the script finished executing.
///
/// With the `serde` feature the record serializes as
/// `{"script_id": .., "hash": .., "timestamp": ..}`.
///
/// # Examples
///
/// ```rust
/// use scriptum::ledger::MigrationRecord;
///
/// let record = MigrationRecord::applied_now("001_init.js", "b280f134425a4153026cf227069d4cc1");
/// assert_eq!(record.script_id(), "001_init.js");
/// assert!(record.matches_hash("b280f134425a4153026cf227069d4cc1"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MigrationRecord {
    script_id: String,
    hash: String,
    #[cfg_attr(feature = "serde", serde(rename = "timestamp"))]
    applied_at: DateTime<Utc>,
}

impl MigrationRecord {
    pub fn new(script_id: &str, hash: &str, applied_at: DateTime<Utc>) -> Self {
        MigrationRecord {
            script_id: script_id.to_string(),
            hash: hash.to_string(),
            applied_at,
        }
    }

    /// Creates a record stamped with the current time.
    pub fn applied_now(script_id: &str, hash: &str) -> Self {
        MigrationRecord::new(script_id, hash, Utc::now())
    }

    pub fn script_id(&self) -> &str {
        &self.script_id
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn applied_at(&self) -> DateTime<Utc> {
        self.applied_at
    }

    /// Compares the recorded fingerprint with a freshly computed one.
    /// Any difference, including letter case, is a mismatch.
    pub fn matches_hash(&self, hash: &str) -> bool {
        self.hash == hash
    }

    /// The schema hint handed to stores when a ledger is created.
    pub fn shape() -> RecordShape {
        RecordShape::migration_record()
    }
}

impl Display for MigrationRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}) applied at {}",
            self.script_id,
            self.hash,
            self.applied_at.to_rfc3339()
        )
    }
}
