use std::fmt::Display;

use async_trait::async_trait;

use crate::{
    errors::{DiffError, OutputError},
    models::{
        diff::RecordScope,
        schema::{Platform, TableDescriptor},
    },
    output::Output,
};

use super::{columns, foreign_keys, indexes, Comparator, DiffContext};

/// Compares columns, indexes and foreign keys of the tables both sides have.
pub struct TableStructure;

#[async_trait]
impl Comparator for TableStructure {
    fn name(&self) -> &'static str {
        "table structure"
    }

    async fn run(&self, ctx: &DiffContext<'_>, output: &mut dyn Output) -> Result<(), DiffError> {
        compare_table_structures(ctx, &ctx.common_tables, output).await
    }
}

/// Fetch each table from both providers, in order, and compare them.
pub async fn compare_table_structures(
    ctx: &DiffContext<'_>,
    tables: &[String],
    output: &mut dyn Output,
) -> Result<(), DiffError> {
    for table in tables {
        log::debug!("Comparing structure of {}", table);

        let primary = ctx.primary.describe_table(table).await?;
        let comparison = ctx.comparison.describe_table(table).await?;

        let pair = TablePair {
            scope: RecordScope::new(&ctx.primary_snapshot.database_name, table),
            comparison_database: &ctx.comparison_snapshot.database_name,
            primary_platform: ctx.primary_snapshot.platform,
            comparison_platform: ctx.comparison_snapshot.platform,
            primary: &primary,
            comparison: &comparison,
        };
        diff_table(&pair, output)?;
    }

    Ok(())
}

/// Runs the column, index and foreign key checks for one table, in that order.
pub fn diff_table(pair: &TablePair<'_>, output: &mut dyn Output) -> Result<(), OutputError> {
    columns::diff_column_names(pair, output)?;
    columns::diff_column_structure(pair, output)?;
    indexes::diff_indexes(pair, output)?;
    foreign_keys::diff_foreign_keys(pair, output)?;
    Ok(())
}

/// The two descriptors of one table plus what the checks need to word
/// their messages.
#[derive(Debug, Clone, Copy)]
pub struct TablePair<'a> {
    /// Records are always reported against the primary database.
    pub scope: RecordScope<'a>,
    pub comparison_database: &'a str,
    pub primary_platform: Platform,
    pub comparison_platform: Platform,
    pub primary: &'a TableDescriptor,
    pub comparison: &'a TableDescriptor,
}

impl<'a> TablePair<'a> {
    pub fn primary_database(&self) -> &'a str {
        self.scope.database
    }

    pub(crate) fn primary_path(&self, name: &str) -> String {
        self.scope.path(self.primary_database(), name)
    }

    pub(crate) fn comparison_path(&self, name: &str) -> String {
        self.scope.path(self.comparison_database, name)
    }

    /// `<A>:<table>:<name><sep><a> vs <B>:<table>:<name><sep><b>`
    pub(crate) fn versus(&self, name: &str, sep: &str, a: impl Display, b: impl Display) -> String {
        format!(
            "{}{}{} vs {}{}{}",
            self.primary_path(name),
            sep,
            a,
            self.comparison_path(name),
            sep,
            b
        )
    }

    /// `<B>:<table>:<name> is [NOT ]<attribute>.`
    pub(crate) fn comparison_state(&self, name: &str, holds: bool, attribute: &str) -> String {
        let verb = if holds { "is" } else { "is NOT" };
        format!("{} {} {}.", self.comparison_path(name), verb, attribute)
    }
}

pub(crate) fn or_null<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "null".to_string(), |v| v.to_string())
}

/// `(a, b, c)`
pub(crate) fn parenthesized<I, T>(items: I) -> String
where
    I: IntoIterator<Item = T>,
    T: Display,
{
    let items: Vec<String> = items.into_iter().map(|item| item.to_string()).collect();
    format!("({})", items.join(", "))
}
