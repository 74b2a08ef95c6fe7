use std::collections::BTreeMap;

use serde_json::Value;

use crate::{
    errors::OutputError,
    models::{
        diff::{DiffType, Field},
        schema::IndexDescriptor,
    },
    output::Output,
};

use super::table_structure::{parenthesized, TablePair};

/// Compares A's indexes against B's. Indexes only B has are not reported.
pub fn diff_indexes(pair: &TablePair<'_>, output: &mut dyn Output) -> Result<(), OutputError> {
    for (name, primary) in &pair.primary.indexes {
        let Some(comparison) = pair.comparison.indexes.get(name) else {
            output.write(&pair.scope.record(
                Some(name),
                DiffType::TableIndexExists,
                None,
                Some(format!(
                    "Index \"{}\" does not exist in \"{}\".",
                    name, pair.comparison_database
                )),
            ))?;
            continue;
        };

        output.write(&pair.scope.record(Some(name), DiffType::TableIndexExists, None, None))?;

        for (field, mismatch) in index_checks(pair, name, primary, comparison) {
            output.write(&pair.scope.field(name, DiffType::TableIndex, field, mismatch))?;
        }
    }

    Ok(())
}

fn index_checks(
    pair: &TablePair<'_>,
    name: &str,
    primary: &IndexDescriptor,
    comparison: &IndexDescriptor,
) -> [(Field, Option<String>); 5] {
    [
        (
            Field::PrimaryIndex,
            (primary.is_primary != comparison.is_primary)
                .then(|| pair.comparison_state(name, comparison.is_primary, "primary index")),
        ),
        (
            Field::UniqueIndex,
            (primary.is_unique != comparison.is_unique)
                .then(|| pair.comparison_state(name, comparison.is_unique, "unique index")),
        ),
        (
            Field::IndexColumns,
            (primary.columns != comparison.columns).then(|| {
                pair.versus(
                    name,
                    " columns ",
                    parenthesized(&primary.columns),
                    parenthesized(&comparison.columns),
                )
            }),
        ),
        (
            Field::IndexFlags,
            (primary.flags != comparison.flags).then(|| {
                pair.versus(
                    name,
                    " flags ",
                    parenthesized(&primary.flags),
                    parenthesized(&comparison.flags),
                )
            }),
        ),
        (
            Field::IndexOptions,
            (primary.options != comparison.options).then(|| {
                pair.versus(
                    name,
                    " options ",
                    render_options(&primary.options),
                    render_options(&comparison.options),
                )
            }),
        ),
    ]
}

fn render_options(options: &BTreeMap<String, Value>) -> String {
    parenthesized(options.iter().map(|(key, value)| match value {
        Value::String(text) => format!("{}={}", key, text),
        other => format!("{}={}", key, other),
    }))
}
