//! Default schema and object naming applied to expressions before generation.

use crate::model::{
    ConstraintKind, Direction, Expression, ForeignKeyDefinition, IndexColumn, Migration,
};
use crate::util::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conventions {
    /// Schema given to every expression that does not name one.
    pub default_schema: Option<String>,
}

impl Conventions {
    pub fn with_default_schema(schema: impl Into<String>) -> Self {
        Self {
            default_schema: Some(schema.into()),
        }
    }
}

pub fn primary_key_name(table: &str) -> String {
    format!("PK_{table}")
}

pub fn foreign_key_name(foreign_key: &ForeignKeyDefinition) -> String {
    format!(
        "FK_{}_{}_{}_{}",
        foreign_key.foreign_table,
        foreign_key.foreign_columns.join("_"),
        foreign_key.primary_table,
        foreign_key.primary_columns.join("_")
    )
}

pub fn index_name(table: &str, columns: &[IndexColumn]) -> String {
    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    format!("IX_{}_{}", table, names.join("_"))
}

pub fn unique_constraint_name(table: &str, columns: &[String]) -> String {
    format!("UC_{}_{}", table, columns.join("_"))
}

pub fn constraint_name(kind: ConstraintKind, table: &str, columns: &[String]) -> String {
    match kind {
        ConstraintKind::PrimaryKey => primary_key_name(table),
        ConstraintKind::Unique => unique_constraint_name(table, columns),
    }
}

/// SQL Server names every default; the name is needed again to drop it.
pub fn default_constraint_name(table: &str, column: &str) -> String {
    format!("DF_{table}_{column}")
}

pub fn apply_conventions(expressions: &mut [Expression], conventions: &Conventions) {
    for expression in expressions.iter_mut() {
        apply_to_expression(expression, conventions);
    }
}

/// Expressions of `migration` for `direction`. Conventions complete the written
/// expressions first, so an automatic Down is derived from the finished names
/// and schemas.
pub fn migration_expressions(
    migration: &Migration,
    direction: Direction,
    conventions: &Conventions,
) -> Result<Vec<Expression>> {
    let mut migration = migration.clone();
    apply_conventions(&mut migration.up, conventions);
    if let Some(down) = migration.down.as_mut() {
        apply_conventions(down, conventions);
    }
    migration.expressions(direction)
}

fn apply_to_expression(expression: &mut Expression, conventions: &Conventions) {
    if let Some(slot) = schema_slot(expression) {
        fill_schema(slot, conventions);
    }

    match expression {
        Expression::CreateTable(table) => {
            for foreign_key in &mut table.foreign_keys {
                if foreign_key.foreign_schema.is_none() {
                    foreign_key.foreign_schema = table.schema.clone();
                }
                complete_foreign_key(foreign_key, conventions);
            }
        }
        Expression::CreateForeignKey(foreign_key) => complete_foreign_key(foreign_key, conventions),
        Expression::CreateIndex(index) => {
            if index.name.is_none() {
                index.name = Some(index_name(&index.table, &index.columns));
            }
        }
        Expression::CreateConstraint(constraint) => {
            if constraint.name.is_none() {
                constraint.name = Some(constraint_name(
                    constraint.kind,
                    &constraint.table,
                    &constraint.columns,
                ));
            }
        }
        _ => {}
    }
}

fn complete_foreign_key(foreign_key: &mut ForeignKeyDefinition, conventions: &Conventions) {
    fill_schema(&mut foreign_key.foreign_schema, conventions);
    fill_schema(&mut foreign_key.primary_schema, conventions);
    if foreign_key.name.is_none() {
        foreign_key.name = Some(foreign_key_name(foreign_key));
    }
}

fn fill_schema(slot: &mut Option<String>, conventions: &Conventions) {
    if slot.is_none() {
        slot.clone_from(&conventions.default_schema);
    }
}

fn schema_slot(expression: &mut Expression) -> Option<&mut Option<String>> {
    match expression {
        Expression::CreateTable(e) => Some(&mut e.schema),
        Expression::AlterTable(e) => Some(&mut e.schema),
        Expression::DropTable(e) => Some(&mut e.schema),
        Expression::RenameTable(e) => Some(&mut e.schema),
        Expression::MoveTable(e) => Some(&mut e.schema),
        Expression::CreateColumn(e) => Some(&mut e.schema),
        Expression::AlterColumn(e) => Some(&mut e.schema),
        Expression::DropColumn(e) => Some(&mut e.schema),
        Expression::RenameColumn(e) => Some(&mut e.schema),
        Expression::CreateIndex(e) => Some(&mut e.schema),
        Expression::DropIndex(e) => Some(&mut e.schema),
        Expression::DropForeignKey(e) => Some(&mut e.schema),
        Expression::CreateConstraint(e) => Some(&mut e.schema),
        Expression::DropConstraint(e) => Some(&mut e.schema),
        Expression::AlterDefault(e) => Some(&mut e.schema),
        Expression::DropDefault(e) => Some(&mut e.schema),
        Expression::CreateSequence(e) => Some(&mut e.schema),
        Expression::DropSequence(e) => Some(&mut e.schema),
        Expression::InsertData(e) => Some(&mut e.schema),
        Expression::UpdateData(e) => Some(&mut e.schema),
        Expression::DeleteData(e) => Some(&mut e.schema),
        Expression::CreateSchema(_)
        | Expression::DropSchema(_)
        | Expression::CreateForeignKey(_)
        | Expression::ExecuteSql(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        ColumnDefinition, CreateConstraint, CreateIndex, CreateTable, DbType, DropIndex, DropTable,
        MoveTable, Rule,
    };

    fn orders_fk() -> ForeignKeyDefinition {
        ForeignKeyDefinition {
            name: None,
            foreign_schema: None,
            foreign_table: "orders".into(),
            foreign_columns: vec!["user_id".into()],
            primary_schema: None,
            primary_table: "users".into(),
            primary_columns: vec!["id".into()],
            on_delete: Rule::None,
            on_update: Rule::None,
        }
    }

    #[test]
    fn default_names() {
        assert_eq!(primary_key_name("users"), "PK_users");
        assert_eq!(foreign_key_name(&orders_fk()), "FK_orders_user_id_users_id");
        assert_eq!(
            index_name("users", &[IndexColumn::new("a"), IndexColumn::new("b")]),
            "IX_users_a_b"
        );
        assert_eq!(
            unique_constraint_name("users", &["email".to_string()]),
            "UC_users_email"
        );
        assert_eq!(default_constraint_name("users", "created"), "DF_users_created");
    }

    #[test]
    fn fills_missing_schema_only() {
        let mut expressions = vec![
            Expression::DropTable(DropTable {
                schema: None,
                name: "a".into(),
                if_exists: false,
                cascade: false,
            }),
            Expression::DropTable(DropTable {
                schema: Some("other".into()),
                name: "b".into(),
                if_exists: false,
                cascade: false,
            }),
        ];
        apply_conventions(&mut expressions, &Conventions::with_default_schema("app"));

        let schemas: Vec<Option<&str>> = expressions
            .iter()
            .map(|e| match e {
                Expression::DropTable(t) => t.schema.as_deref(),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(schemas, vec![Some("app"), Some("other")]);
    }

    #[test]
    fn without_default_schema_leaves_schema_empty() {
        let mut expressions = vec![Expression::CreateIndex(CreateIndex {
            schema: None,
            table: "users".into(),
            name: None,
            columns: vec![IndexColumn::new("email")],
            unique: false,
            options: Default::default(),
        })];
        apply_conventions(&mut expressions, &Conventions::default());

        let Expression::CreateIndex(index) = &expressions[0] else {
            unreachable!()
        };
        assert!(index.schema.is_none());
        assert_eq!(index.name.as_deref(), Some("IX_users_email"));
    }

    #[test]
    fn names_table_foreign_keys_and_inherits_table_schema() {
        let mut table = CreateTable::new(
            "orders",
            vec![ColumnDefinition::new("user_id", DbType::Int32)],
        )
        .in_schema("sales");
        table.foreign_keys.push(orders_fk());
        let mut expressions = vec![Expression::CreateTable(table)];

        apply_conventions(&mut expressions, &Conventions::with_default_schema("app"));

        let Expression::CreateTable(table) = &expressions[0] else {
            unreachable!()
        };
        let fk = &table.foreign_keys[0];
        assert_eq!(fk.name.as_deref(), Some("FK_orders_user_id_users_id"));
        assert_eq!(fk.foreign_schema.as_deref(), Some("sales"));
        assert_eq!(fk.primary_schema.as_deref(), Some("app"));
    }

    #[test]
    fn names_constraints_by_kind() {
        let mut expressions = vec![Expression::CreateConstraint(CreateConstraint {
            schema: None,
            table: "users".into(),
            name: None,
            kind: ConstraintKind::PrimaryKey,
            columns: vec!["id".into()],
            clustered: None,
        })];
        apply_conventions(&mut expressions, &Conventions::default());
        let Expression::CreateConstraint(constraint) = &expressions[0] else {
            unreachable!()
        };
        assert_eq!(constraint.name.as_deref(), Some("PK_users"));
    }

    #[test]
    fn down_reverses_after_default_schema_is_filled() {
        let migration = Migration::new(3, "archive").with_up(vec![Expression::MoveTable(
            MoveTable {
                schema: None,
                table: "orders".into(),
                destination_schema: "archive".into(),
            },
        )]);
        let conventions = Conventions::with_default_schema("staging");

        let down = migration_expressions(&migration, Direction::Down, &conventions).unwrap();
        assert_eq!(
            down,
            vec![Expression::MoveTable(MoveTable {
                schema: Some("archive".into()),
                table: "orders".into(),
                destination_schema: "staging".into(),
            })]
        );

        assert!(migration_expressions(&migration, Direction::Down, &Conventions::default()).is_err());
    }

    #[test]
    fn down_drops_the_conventional_index_name_in_the_default_schema() {
        let migration = Migration::new(4, "index").with_up(vec![Expression::CreateIndex(
            CreateIndex {
                schema: None,
                table: "users".into(),
                name: None,
                columns: vec![IndexColumn::new("email")],
                unique: false,
                options: Default::default(),
            },
        )]);

        let down = migration_expressions(
            &migration,
            Direction::Down,
            &Conventions::with_default_schema("app"),
        )
        .unwrap();
        let Expression::DropIndex(DropIndex { schema, name, .. }) = &down[0] else {
            panic!("expected drop_index");
        };
        assert_eq!(schema.as_deref(), Some("app"));
        assert_eq!(name, "IX_users_email");
    }
}
