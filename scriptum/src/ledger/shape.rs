use crate::common::{FIELD_HASH, FIELD_SCRIPT_ID, FIELD_TIMESTAMP};

/// Storage type of a ledger field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Text,
    Timestamp,
}

/// Describes one field of a ledger record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldShape {
    name: &'static str,
    field_type: FieldType,
    unique: bool,
}

impl FieldShape {
    pub const fn new(name: &'static str, field_type: FieldType, unique: bool) -> Self {
        FieldShape {
            name,
            field_type,
            unique,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Whether the store should enforce uniqueness on this field.
    pub fn is_unique(&self) -> bool {
        self.unique
    }
}

/// Schema hint passed to [`MigrationStoreProvider::create_ledger`].
///
/// Stores that are schemaless may ignore it. Relational stores can map it to a
/// table definition with a unique constraint on `script_id`.
///
/// [`MigrationStoreProvider::create_ledger`]: crate::store::MigrationStoreProvider::create_ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordShape {
    name: &'static str,
    fields: Vec<FieldShape>,
}

impl RecordShape {
    pub(crate) fn migration_record() -> Self {
        RecordShape {
            name: "MigrationRecord",
            fields: vec![
                FieldShape::new(FIELD_SCRIPT_ID, FieldType::Text, true),
                FieldShape::new(FIELD_HASH, FieldType::Text, false),
                FieldShape::new(FIELD_TIMESTAMP, FieldType::Timestamp, false),
            ],
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &[FieldShape] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldShape> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The field records are identified and ordered by.
    pub fn key_field(&self) -> Option<&FieldShape> {
        self.fields.iter().find(|f| f.unique)
    }
}
