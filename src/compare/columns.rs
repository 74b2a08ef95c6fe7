use crate::{
    errors::OutputError,
    models::{
        diff::{DiffType, Field},
        schema::ColumnDescriptor,
    },
    output::Output,
};

use super::table_structure::{or_null, TablePair};

/// Existence of every column, A's columns first, then B's.
pub fn diff_column_names(pair: &TablePair<'_>, output: &mut dyn Output) -> Result<(), OutputError> {
    for column in pair.primary.columns.keys() {
        let mismatch = (!pair.comparison.columns.contains_key(column)).then(|| {
            format!(
                "{} was not found in database \"{}\".",
                pair.primary_path(column),
                pair.comparison_database
            )
        });
        output.write(&pair.scope.record(
            Some(column),
            DiffType::ColumnExistsInComparison,
            None,
            mismatch,
        ))?;
    }

    for column in pair.comparison.columns.keys() {
        let mismatch = (!pair.primary.columns.contains_key(column)).then(|| {
            format!(
                "{} was not found in database \"{}\".",
                pair.comparison_path(column),
                pair.primary_database()
            )
        });
        output.write(&pair.scope.record(
            Some(column),
            DiffType::ColumnExistsInPrimary,
            None,
            mismatch,
        ))?;
    }

    Ok(())
}

/// Six attribute checks for every column both sides have, driven by A.
pub fn diff_column_structure(
    pair: &TablePair<'_>,
    output: &mut dyn Output,
) -> Result<(), OutputError> {
    for (name, primary) in &pair.primary.columns {
        let Some(comparison) = pair.comparison.columns.get(name) else {
            continue;
        };

        for (field, mismatch) in column_checks(pair, name, primary, comparison) {
            output.write(&pair.scope.field(name, DiffType::ColumnStructure, field, mismatch))?;
        }
    }

    Ok(())
}

fn column_checks(
    pair: &TablePair<'_>,
    name: &str,
    primary: &ColumnDescriptor,
    comparison: &ColumnDescriptor,
) -> [(Field, Option<String>); 6] {
    // Both sides resolve their default length from A's logical type.
    let primary_length = primary
        .length
        .or_else(|| pair.primary_platform.default_length(&primary.column_type));
    let comparison_length = comparison
        .length
        .or_else(|| pair.comparison_platform.default_length(&primary.column_type));

    [
        (
            Field::Type,
            (primary.column_type != comparison.column_type).then(|| {
                pair.versus(name, ":", &primary.column_type, &comparison.column_type)
            }),
        ),
        (
            Field::Length,
            (primary_length != comparison_length).then(|| {
                pair.versus(name, ":", or_null(primary_length), or_null(comparison_length))
            }),
        ),
        (
            Field::Nullable,
            (primary.nullable != comparison.nullable)
                .then(|| pair.comparison_state(name, comparison.nullable, "nullable")),
        ),
        (
            Field::Default,
            (!defaults_equal(primary.default.as_deref(), comparison.default.as_deref())).then(
                || {
                    pair.versus(
                        name,
                        ":",
                        or_null(primary.default.as_deref()),
                        or_null(comparison.default.as_deref()),
                    )
                },
            ),
        ),
        (
            Field::Unsigned,
            (primary.unsigned != comparison.unsigned)
                .then(|| pair.comparison_state(name, comparison.unsigned, "unsigned")),
        ),
        (
            Field::AutoIncrement,
            (primary.auto_increment != comparison.auto_increment).then(|| {
                pair.comparison_state(name, comparison.auto_increment, "auto_incrementable")
            }),
        ),
    ]
}

/// Loose equality of two column defaults.
///
/// Absent equals absent or the empty string, numbers compare by value
/// (`0` equals `0.0`), anything else must match exactly.
pub fn defaults_equal(primary: Option<&str>, comparison: Option<&str>) -> bool {
    match (primary, comparison) {
        (None, None) => true,
        (None, Some(value)) | (Some(value), None) => value.is_empty(),
        (Some(a), Some(b)) if a == b => true,
        (Some(a), Some(b)) => match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
            (Ok(x), Ok(y)) if x.is_finite() && y.is_finite() => x == y,
            _ => false,
        },
    }
}
