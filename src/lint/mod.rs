use crate::model::{Expression, IndexOptions};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintOptions {
    pub allow_destructive: bool,
    pub is_production: bool,
    /// Statements will run inside a transaction.
    pub transactional: bool,
}

impl Default for LintOptions {
    fn default() -> Self {
        Self {
            allow_destructive: false,
            is_production: std::env::var("POLYMOLD_PROD")
                .map(|v| v == "1")
                .unwrap_or(false),
            transactional: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintResult {
    pub rule: String,
    pub severity: LintSeverity,
    pub message: String,
}

impl LintResult {
    fn error(rule: &str, message: String) -> Self {
        Self {
            rule: rule.to_string(),
            severity: LintSeverity::Error,
            message,
        }
    }

    fn warning(rule: &str, message: String) -> Self {
        Self {
            rule: rule.to_string(),
            severity: LintSeverity::Warning,
            message,
        }
    }
}

pub fn lint_expressions(expressions: &[Expression], options: &LintOptions) -> Vec<LintResult> {
    expressions
        .iter()
        .flat_map(|expression| lint_expression(expression, options))
        .collect()
}

pub fn has_errors(results: &[LintResult]) -> bool {
    results
        .iter()
        .any(|r| matches!(r.severity, LintSeverity::Error))
}

fn qualified(schema: &Option<String>, name: &str) -> String {
    match schema {
        Some(schema) => format!("{schema}.{name}"),
        None => name.to_string(),
    }
}

fn deny_destructive(
    results: &mut Vec<LintResult>,
    options: &LintOptions,
    rule: &str,
    what: String,
) {
    if !options.allow_destructive {
        results.push(LintResult::error(
            rule,
            format!("{what} requires --allow-destructive flag"),
        ));
    }
}

fn lint_expression(expression: &Expression, options: &LintOptions) -> Vec<LintResult> {
    let mut results = Vec::new();

    match expression {
        Expression::DropTable(drop) => {
            let name = qualified(&drop.schema, &drop.name);
            if options.is_production {
                results.push(LintResult::error(
                    "deny_drop_table_in_prod",
                    format!(
                        "Dropping table {name} is not allowed in production (POLYMOLD_PROD=1)"
                    ),
                ));
            } else {
                deny_destructive(
                    &mut results,
                    options,
                    "deny_drop_table",
                    format!("Dropping table {name}"),
                );
            }
        }

        Expression::DropColumn(drop) => {
            let table = qualified(&drop.schema, &drop.table);
            for column in &drop.columns {
                deny_destructive(
                    &mut results,
                    options,
                    "deny_drop_column",
                    format!("Dropping column {table}.{column}"),
                );
            }
        }

        Expression::DropSchema(drop) => deny_destructive(
            &mut results,
            options,
            "deny_drop_schema",
            format!("Dropping schema {}", drop.name),
        ),

        Expression::DropSequence(drop) => deny_destructive(
            &mut results,
            options,
            "deny_drop_sequence",
            format!("Dropping sequence {}", qualified(&drop.schema, &drop.name)),
        ),

        Expression::DeleteData(delete) if delete.all_rows => deny_destructive(
            &mut results,
            options,
            "deny_delete_all_rows",
            format!(
                "Deleting every row of {}",
                qualified(&delete.schema, &delete.table)
            ),
        ),

        Expression::AlterColumn(alter) => {
            if !alter.column.nullable {
                results.push(LintResult::warning(
                    "warn_set_not_null",
                    format!(
                        "Setting column {}.{} to NOT NULL may fail if existing rows have NULL values",
                        qualified(&alter.schema, &alter.table),
                        alter.column.name
                    ),
                ));
            }
        }

        Expression::CreateColumn(create) => {
            if !create.column.nullable && create.column.default.is_none() {
                results.push(LintResult::warning(
                    "warn_add_not_null_without_default",
                    format!(
                        "Adding NOT NULL column {}.{} without a default fails on non-empty tables",
                        qualified(&create.schema, &create.table),
                        create.column.name
                    ),
                ));
            }
        }

        Expression::UpdateData(update) if update.all_rows => {
            results.push(LintResult::warning(
                "warn_update_all_rows",
                format!(
                    "Updating every row of {} may lock the table",
                    qualified(&update.schema, &update.table)
                ),
            ));
        }

        Expression::CreateIndex(index) => {
            if is_concurrent(&index.options) && options.transactional {
                results.push(LintResult::error(
                    "deny_concurrent_index_in_transaction",
                    format!(
                        "CREATE INDEX CONCURRENTLY on {} cannot run inside a transaction",
                        qualified(&index.schema, &index.table)
                    ),
                ));
            }
        }

        Expression::ExecuteSql(_) => {
            results.push(LintResult::warning(
                "warn_raw_sql",
                "Raw SQL is executed as-is and is not checked or reversed".to_string(),
            ));
        }

        _ => {}
    }

    results
}

fn is_concurrent(options: &IndexOptions) -> bool {
    options.concurrently
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;

    fn options(allow_destructive: bool, is_production: bool) -> LintOptions {
        LintOptions {
            allow_destructive,
            is_production,
            transactional: true,
        }
    }

    fn drop_table() -> Expression {
        Expression::DropTable(DropTable {
            schema: Some("app".into()),
            name: "users".into(),
            if_exists: false,
            cascade: false,
        })
    }

    #[test]
    fn blocks_drop_table_without_flag() {
        let results = lint_expressions(&[drop_table()], &options(false, false));
        assert!(has_errors(&results));
        assert_eq!(results[0].rule, "deny_drop_table");
        assert!(results[0].message.contains("app.users"));
    }

    #[test]
    fn allows_drop_table_with_flag() {
        let results = lint_expressions(&[drop_table()], &options(true, false));
        assert!(!has_errors(&results));
    }

    #[test]
    fn blocks_drop_table_in_production_even_with_flag() {
        let results = lint_expressions(&[drop_table()], &options(true, true));
        assert!(has_errors(&results));
        assert_eq!(results[0].rule, "deny_drop_table_in_prod");
    }

    #[test]
    fn blocks_each_dropped_column() {
        let expressions = vec![Expression::DropColumn(DropColumn {
            schema: None,
            table: "users".into(),
            columns: vec!["a".into(), "b".into()],
        })];
        let results = lint_expressions(&expressions, &options(false, false));
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.rule == "deny_drop_column"));
    }

    #[test]
    fn delete_all_rows_is_destructive_but_filtered_delete_is_not() {
        let all = Expression::DeleteData(DeleteData {
            schema: None,
            table: "events".into(),
            rows: vec![],
            all_rows: true,
        });
        let one = Expression::DeleteData(DeleteData {
            schema: None,
            table: "events".into(),
            rows: vec![Row::from([("id".to_string(), SqlValue::Integer(1))])],
            all_rows: false,
        });
        let results = lint_expressions(&[all, one], &options(false, false));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].rule, "deny_delete_all_rows");
    }

    #[test]
    fn warns_on_set_not_null() {
        let expressions = vec![Expression::AlterColumn(AlterColumn {
            schema: None,
            table: "users".into(),
            column: ColumnDefinition::new("email", DbType::String).not_null(),
        })];
        let results = lint_expressions(&expressions, &options(false, false));
        assert!(!has_errors(&results));
        assert_eq!(results[0].rule, "warn_set_not_null");
        assert_eq!(results[0].severity, LintSeverity::Warning);
    }

    #[test]
    fn concurrent_index_only_fails_in_a_transaction() {
        let mut index = CreateIndex::new("users", "ix_users_email", vec![IndexColumn::new("email")]);
        index.options.concurrently = true;
        let expressions = vec![Expression::CreateIndex(index)];

        let results = lint_expressions(&expressions, &options(false, false));
        assert_eq!(results[0].rule, "deny_concurrent_index_in_transaction");

        let outside = LintOptions {
            transactional: false,
            ..options(false, false)
        };
        assert!(lint_expressions(&expressions, &outside).is_empty());
    }

    #[test]
    fn raw_sql_is_a_warning() {
        let expressions = vec![Expression::ExecuteSql(ExecuteSql {
            sql: "VACUUM".into(),
        })];
        let results = lint_expressions(&expressions, &options(false, false));
        assert!(!has_errors(&results));
        assert_eq!(results[0].rule, "warn_raw_sql");
    }
}
