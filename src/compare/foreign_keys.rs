use crate::{
    errors::OutputError,
    models::{
        diff::{DiffType, Field},
        schema::ForeignKeyDescriptor,
    },
    output::Output,
};

use super::table_structure::{or_null, parenthesized, TablePair};

/// Compares A's foreign keys against B's. Constraints only B has are not
/// reported.
pub fn diff_foreign_keys(
    pair: &TablePair<'_>,
    output: &mut dyn Output,
) -> Result<(), OutputError> {
    for (name, primary) in &pair.primary.foreign_keys {
        let Some(comparison) = pair.comparison.foreign_keys.get(name) else {
            output.write(&pair.scope.record(
                Some(name),
                DiffType::TableForeignKeyExists,
                None,
                Some(format!(
                    "Foreign Key \"{}\" does not exist in \"{}\".",
                    name, pair.comparison_database
                )),
            ))?;
            continue;
        };

        output.write(&pair.scope.record(
            Some(name),
            DiffType::TableForeignKeyExists,
            None,
            None,
        ))?;

        for (field, mismatch) in foreign_key_checks(pair, name, primary, comparison) {
            output.write(&pair.scope.field(name, DiffType::TableForeignKey, field, mismatch))?;
        }
    }

    Ok(())
}

fn foreign_key_checks(
    pair: &TablePair<'_>,
    name: &str,
    primary: &ForeignKeyDescriptor,
    comparison: &ForeignKeyDescriptor,
) -> [(Field, Option<String>); 6] {
    [
        (
            Field::ForeignKeyName,
            (primary.local_table_name != comparison.local_table_name).then(|| {
                pair.versus(
                    name,
                    " local table ",
                    &primary.local_table_name,
                    &comparison.local_table_name,
                )
            }),
        ),
        (
            Field::ForeignTableName,
            (primary.foreign_table_name != comparison.foreign_table_name).then(|| {
                pair.versus(
                    name,
                    " foreign table ",
                    &primary.foreign_table_name,
                    &comparison.foreign_table_name,
                )
            }),
        ),
        (
            Field::ForeignKeyLocalColumns,
            (primary.local_columns != comparison.local_columns).then(|| {
                pair.versus(
                    name,
                    " local columns ",
                    parenthesized(&primary.local_columns),
                    parenthesized(&comparison.local_columns),
                )
            }),
        ),
        (
            Field::ForeignKeyForeignColumns,
            (primary.foreign_columns != comparison.foreign_columns).then(|| {
                pair.versus(
                    name,
                    " foreign columns ",
                    parenthesized(&primary.foreign_columns),
                    parenthesized(&comparison.foreign_columns),
                )
            }),
        ),
        (
            Field::ForeignKeyOnUpdate,
            (primary.on_update != comparison.on_update).then(|| {
                pair.versus(
                    name,
                    " on update ",
                    or_null(primary.on_update),
                    or_null(comparison.on_update),
                )
            }),
        ),
        (
            Field::ForeignKeyOnDelete,
            (primary.on_delete != comparison.on_delete).then(|| {
                pair.versus(
                    name,
                    " on delete ",
                    or_null(primary.on_delete),
                    or_null(comparison.on_delete),
                )
            }),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        compare::fixtures::pair,
        models::{
            diff::DiffRecord,
            schema::{ReferentialAction, TableDescriptor},
        },
        output::CollectingOutput,
    };

    fn user_fk() -> ForeignKeyDescriptor {
        ForeignKeyDescriptor {
            local_table_name: "orders".to_string(),
            foreign_table_name: "users".to_string(),
            local_columns: vec!["user_id".to_string()],
            foreign_columns: vec!["id".to_string()],
            on_update: None,
            on_delete: Some(ReferentialAction::Cascade),
        }
    }

    fn table(foreign_keys: Vec<(&str, ForeignKeyDescriptor)>) -> TableDescriptor {
        let mut table = TableDescriptor::new("orders");
        for (name, fk) in foreign_keys {
            table.foreign_keys.insert(name.to_string(), fk);
        }
        table
    }

    fn run(primary: &TableDescriptor, comparison: &TableDescriptor) -> Vec<DiffRecord> {
        let mut output = CollectingOutput::new();
        diff_foreign_keys(&pair(primary, comparison), &mut output).unwrap();
        output.into_records()
    }

    #[test]
    fn identical_foreign_keys_yield_seven_passing_records() {
        let a = table(vec![("fk_orders_user", user_fk())]);

        let records = run(&a, &a.clone());

        assert_eq!(records.len(), 7);
        assert!(records.iter().all(|r| r.passed));
        assert_eq!(records[0].diff_type, DiffType::TableForeignKeyExists);
        assert!(records[1..]
            .iter()
            .all(|r| r.diff_type == DiffType::TableForeignKey));
        let fields: Vec<Field> = records.iter().filter_map(|r| r.field).collect();
        assert_eq!(
            fields,
            vec![
                Field::ForeignKeyName,
                Field::ForeignTableName,
                Field::ForeignKeyLocalColumns,
                Field::ForeignKeyForeignColumns,
                Field::ForeignKeyOnUpdate,
                Field::ForeignKeyOnDelete,
            ]
        );
    }

    #[test]
    fn missing_foreign_key_short_circuits() {
        let a = table(vec![("fk_orders_user", user_fk())]);
        let b = table(vec![]);

        let records = run(&a, &b);

        assert_eq!(records.len(), 1);
        assert!(!records[0].passed);
        assert_eq!(
            records[0].message.as_deref(),
            Some("Foreign Key \"fk_orders_user\" does not exist in \"db2\".")
        );
    }

    #[test]
    fn foreign_keys_only_in_comparison_are_not_reported() {
        let a = table(vec![]);
        let b = table(vec![("fk_orders_user", user_fk())]);

        assert!(run(&a, &b).is_empty());
    }

    #[test]
    fn reordered_columns_fail() {
        let composite = ForeignKeyDescriptor {
            local_columns: vec!["tenant_id".to_string(), "user_id".to_string()],
            foreign_columns: vec!["tenant_id".to_string(), "id".to_string()],
            ..user_fk()
        };
        let reordered = ForeignKeyDescriptor {
            local_columns: vec!["user_id".to_string(), "tenant_id".to_string()],
            ..composite.clone()
        };
        let a = table(vec![("fk_orders_user", composite)]);
        let b = table(vec![("fk_orders_user", reordered)]);

        let failures: Vec<DiffRecord> = run(&a, &b).into_iter().filter(|r| !r.passed).collect();

        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].field, Some(Field::ForeignKeyLocalColumns));
        assert_eq!(
            failures[0].message.as_deref(),
            Some("db1:users:fk_orders_user local columns (tenant_id, user_id) vs db2:users:fk_orders_user local columns (user_id, tenant_id)")
        );
    }

    #[test]
    fn actions_render_absent_as_null() {
        let a = table(vec![("fk_orders_user", user_fk())]);
        let b = table(vec![(
            "fk_orders_user",
            ForeignKeyDescriptor {
                on_update: Some(ReferentialAction::Cascade),
                on_delete: Some(ReferentialAction::SetNull),
                ..user_fk()
            },
        )]);

        let messages: Vec<String> = run(&a, &b).into_iter().filter_map(|r| r.message).collect();

        assert_eq!(
            messages,
            vec![
                "db1:users:fk_orders_user on update null vs db2:users:fk_orders_user on update CASCADE",
                "db1:users:fk_orders_user on delete CASCADE vs db2:users:fk_orders_user on delete SET NULL",
            ]
        );
    }
}
