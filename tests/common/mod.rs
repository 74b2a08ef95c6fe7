#![allow(dead_code)]
#![allow(unused_imports)]

pub use dbdiff::compare::Diff;
pub use dbdiff::db::dump::SchemaDump;
pub use dbdiff::models::diff::{DiffRecord, DiffType, Field};
pub use dbdiff::models::schema::{
    ColumnDescriptor, ForeignKeyDescriptor, IndexDescriptor, Platform, ReferentialAction,
    TableDescriptor,
};
pub use dbdiff::output::CollectingOutput;

pub fn column(column_type: &str) -> ColumnDescriptor {
    ColumnDescriptor::new(column_type)
}

pub fn string(length: u32) -> ColumnDescriptor {
    ColumnDescriptor {
        length: Some(length),
        ..ColumnDescriptor::new("string")
    }
}

pub fn index(columns: &[&str]) -> IndexDescriptor {
    IndexDescriptor {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        ..IndexDescriptor::default()
    }
}

pub fn foreign_key(
    local: &str,
    columns: &[&str],
    foreign: &str,
    foreign_columns: &[&str],
) -> ForeignKeyDescriptor {
    ForeignKeyDescriptor {
        local_table_name: local.to_string(),
        foreign_table_name: foreign.to_string(),
        local_columns: columns.iter().map(|c| c.to_string()).collect(),
        foreign_columns: foreign_columns.iter().map(|c| c.to_string()).collect(),
        on_update: None,
        on_delete: None,
    }
}

pub fn table(name: &str) -> TableDescriptor {
    TableDescriptor::new(name)
}

pub fn with_column(
    mut table: TableDescriptor,
    name: &str,
    column: ColumnDescriptor,
) -> TableDescriptor {
    table.columns.insert(name.to_string(), column);
    table
}

pub fn with_index(
    mut table: TableDescriptor,
    name: &str,
    index: IndexDescriptor,
) -> TableDescriptor {
    table.indexes.insert(name.to_string(), index);
    table
}

pub fn with_foreign_key(
    mut table: TableDescriptor,
    name: &str,
    foreign_key: ForeignKeyDescriptor,
) -> TableDescriptor {
    table.foreign_keys.insert(name.to_string(), foreign_key);
    table
}

pub async fn run(primary: &SchemaDump, comparison: &SchemaDump) -> Vec<DiffRecord> {
    let mut output = CollectingOutput::new();
    Diff::new()
        .run(primary, comparison, &mut output)
        .await
        .unwrap();
    output.into_records()
}

pub fn of_type(records: &[DiffRecord], diff_type: DiffType) -> Vec<&DiffRecord> {
    records.iter().filter(|r| r.diff_type == diff_type).collect()
}
