// ledger constants
pub const MIGRATION_LEDGER: &str = "_migration";
pub const LEDGER_SUFFIX_SEPARATOR: &str = "_";

// record field names
pub const FIELD_SCRIPT_ID: &str = "script_id";
pub const FIELD_HASH: &str = "hash";
pub const FIELD_TIMESTAMP: &str = "timestamp";

// scan constants
pub const README_FILE: &str = "readme.md";

// fingerprint constants
pub const FINGERPRINT_HEX_LEN: usize = 32;

// config constants
pub const DEFAULT_FAIL_ON_ORDER_MISMATCH: bool = true;
