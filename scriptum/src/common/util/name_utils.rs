use crate::common::{LEDGER_SUFFIX_SEPARATOR, MIGRATION_LEDGER, README_FILE};

/// Derives the ledger's logical name: `_migration`, or `_migration_<suffix>`
/// when a non-empty suffix is given.
///
/// The suffix is taken as is. Stores that cannot hold a given name report it
/// from `create_ledger`.
pub fn ledger_name(suffix: Option<&str>) -> String {
    match suffix {
        Some(s) if !s.is_empty() => {
            let mut result =
                String::with_capacity(MIGRATION_LEDGER.len() + LEDGER_SUFFIX_SEPARATOR.len() + s.len());
            result.push_str(MIGRATION_LEDGER);
            result.push_str(LEDGER_SUFFIX_SEPARATOR);
            result.push_str(s);
            result
        }
        _ => MIGRATION_LEDGER.to_string(),
    }
}

/// Returns `true` for the readme file that lives next to the scripts.
pub fn is_readme(file_name: &str) -> bool {
    file_name.eq_ignore_ascii_case(README_FILE)
}
