use async_trait::async_trait;

use crate::{
    errors::{DiffError, OutputError},
    models::{
        diff::{DiffType, RecordScope},
        schema::SchemaSnapshot,
    },
    output::Output,
};

use super::{Comparator, DiffContext};

/// Reports tables that exist on only one side.
pub struct TableNames;

#[async_trait]
impl Comparator for TableNames {
    fn name(&self) -> &'static str {
        "table names"
    }

    async fn run(&self, ctx: &DiffContext<'_>, output: &mut dyn Output) -> Result<(), DiffError> {
        check_table_sets(&ctx.primary_snapshot, &ctx.comparison_snapshot, output)?;
        Ok(())
    }
}

/// Emit one existence record per listed table on each side.
pub fn check_table_sets(
    primary: &SchemaSnapshot,
    comparison: &SchemaSnapshot,
    output: &mut dyn Output,
) -> Result<(), OutputError> {
    check_tables(primary, comparison, DiffType::TableExistsInComparison, output)?;
    check_tables(comparison, primary, DiffType::TableExistsInPrimary, output)
}

/// [`check_table_sets`], then return the tables both sides list, in the
/// primary's order.
pub fn compare_table_sets(
    primary: &SchemaSnapshot,
    comparison: &SchemaSnapshot,
    output: &mut dyn Output,
) -> Result<Vec<String>, OutputError> {
    check_table_sets(primary, comparison, output)?;
    Ok(primary.common_tables(comparison))
}

fn check_tables(
    own: &SchemaSnapshot,
    other: &SchemaSnapshot,
    diff_type: DiffType,
    output: &mut dyn Output,
) -> Result<(), OutputError> {
    for table in &own.tables {
        let scope = RecordScope::new(&own.database_name, table);
        let mismatch = (!other.contains(table)).then(|| {
            format!(
                "Table \"{}\" was found in \"{}\" but not in \"{}\".",
                table, own.database_name, other.database_name
            )
        });

        output.write(&scope.record(None, diff_type, None, mismatch))?;
    }

    Ok(())
}
