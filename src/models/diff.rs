use std::fmt;

use serde::Serialize;

/// What kind of check a [`DiffRecord`] reports on.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiffType {
    TableExistsInComparison,
    TableExistsInPrimary,
    ColumnExistsInComparison,
    ColumnExistsInPrimary,
    ColumnStructure,
    TableIndexExists,
    TableIndex,
    TableForeignKeyExists,
    TableForeignKey,
}

impl DiffType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiffType::TableExistsInComparison => "table_exists_in_comparison",
            DiffType::TableExistsInPrimary => "table_exists_in_primary",
            DiffType::ColumnExistsInComparison => "column_exists_in_comparison",
            DiffType::ColumnExistsInPrimary => "column_exists_in_primary",
            DiffType::ColumnStructure => "column_structure",
            DiffType::TableIndexExists => "table_index_exists",
            DiffType::TableIndex => "table_index",
            DiffType::TableForeignKeyExists => "table_foreign_key_exists",
            DiffType::TableForeignKey => "table_foreign_key",
        }
    }
}

impl fmt::Display for DiffType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The attribute a structural check compared.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Type,
    Length,
    Nullable,
    Default,
    Unsigned,
    AutoIncrement,
    PrimaryIndex,
    UniqueIndex,
    IndexColumns,
    IndexFlags,
    IndexOptions,
    ForeignKeyName,
    ForeignTableName,
    ForeignKeyLocalColumns,
    ForeignKeyForeignColumns,
    ForeignKeyOnUpdate,
    ForeignKeyOnDelete,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Type => "type",
            Field::Length => "length",
            Field::Nullable => "nullable",
            Field::Default => "default",
            Field::Unsigned => "unsigned",
            Field::AutoIncrement => "auto_increment",
            Field::PrimaryIndex => "primary_index",
            Field::UniqueIndex => "unique_index",
            Field::IndexColumns => "index_columns",
            Field::IndexFlags => "index_flags",
            Field::IndexOptions => "index_options",
            Field::ForeignKeyName => "foreign_key_name",
            Field::ForeignTableName => "foreign_table_name",
            Field::ForeignKeyLocalColumns => "foreign_key_local_columns",
            Field::ForeignKeyForeignColumns => "foreign_key_foreign_columns",
            Field::ForeignKeyOnUpdate => "foreign_key_on_update",
            Field::ForeignKeyOnDelete => "foreign_key_on_delete",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one atomic comparison.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct DiffRecord {
    pub database: String,
    pub table: String,
    pub column: Option<String>,
    pub diff_type: DiffType,
    pub field: Option<Field>,
    pub passed: bool,
    pub message: Option<String>,
}

/// Builds the records of one table (or one table-set direction).
///
/// `mismatch` is `None` when the check passed, otherwise the message
/// explaining the failure.
#[derive(Debug, Clone, Copy)]
pub struct RecordScope<'a> {
    pub database: &'a str,
    pub table: &'a str,
}

impl<'a> RecordScope<'a> {
    pub fn new(database: &'a str, table: &'a str) -> Self {
        Self { database, table }
    }

    pub fn record(
        &self,
        column: Option<&str>,
        diff_type: DiffType,
        field: Option<Field>,
        mismatch: Option<String>,
    ) -> DiffRecord {
        DiffRecord {
            database: self.database.to_string(),
            table: self.table.to_string(),
            column: column.map(str::to_string),
            diff_type,
            field,
            passed: mismatch.is_none(),
            message: mismatch,
        }
    }

    /// Record for a structural check on a column, index or foreign key.
    pub fn field(
        &self,
        column: &str,
        diff_type: DiffType,
        field: Field,
        mismatch: Option<String>,
    ) -> DiffRecord {
        self.record(Some(column), diff_type, Some(field), mismatch)
    }

    /// `<database>:<table>:<name>` prefix used by structural messages.
    pub fn path(&self, database: &str, name: &str) -> String {
        format!("{}:{}:{}", database, self.table, name)
    }
}
