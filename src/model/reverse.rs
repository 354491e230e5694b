use super::{
    CreateIndex, DeleteData, DropColumn, DropConstraint, DropForeignKey, DropIndex, DropSchema,
    DropSequence, DropTable, Expression, MoveTable, RenameColumn, RenameTable,
};
use crate::conventions;
use crate::util::{MigrationError, Result};

/// Builds the rollback of an expression list: each expression is inverted and
/// the order is flipped so later changes are undone first.
pub fn reverse(expressions: &[Expression]) -> Result<Vec<Expression>> {
    expressions.iter().rev().map(reverse_expression).collect()
}

pub fn reverse_expression(expression: &Expression) -> Result<Expression> {
    let reversed = match expression {
        Expression::CreateSchema(create) => Expression::DropSchema(DropSchema {
            name: create.name.clone(),
            cascade: false,
        }),

        Expression::CreateTable(table) => Expression::DropTable(DropTable {
            schema: table.schema.clone(),
            name: table.name.clone(),
            if_exists: false,
            cascade: false,
        }),

        Expression::RenameTable(rename) => Expression::RenameTable(RenameTable {
            schema: rename.schema.clone(),
            old_name: rename.new_name.clone(),
            new_name: rename.old_name.clone(),
        }),

        Expression::MoveTable(MoveTable {
            schema: Some(source),
            table,
            destination_schema,
        }) => Expression::MoveTable(MoveTable {
            schema: Some(destination_schema.clone()),
            table: table.clone(),
            destination_schema: source.clone(),
        }),

        Expression::CreateColumn(create) => Expression::DropColumn(DropColumn {
            schema: create.schema.clone(),
            table: create.table.clone(),
            columns: vec![create.column.name.clone()],
        }),

        Expression::RenameColumn(rename) => Expression::RenameColumn(RenameColumn {
            schema: rename.schema.clone(),
            table: rename.table.clone(),
            old_name: rename.new_name.clone(),
            new_name: rename.old_name.clone(),
        }),

        Expression::CreateIndex(index) => Expression::DropIndex(DropIndex {
            schema: index.schema.clone(),
            table: index.table.clone(),
            name: index_name(index),
            if_exists: false,
        }),

        Expression::CreateForeignKey(foreign_key) => Expression::DropForeignKey(DropForeignKey {
            schema: foreign_key.foreign_schema.clone(),
            table: foreign_key.foreign_table.clone(),
            name: foreign_key
                .name
                .clone()
                .unwrap_or_else(|| conventions::foreign_key_name(foreign_key)),
        }),

        Expression::CreateConstraint(constraint) => Expression::DropConstraint(DropConstraint {
            schema: constraint.schema.clone(),
            table: constraint.table.clone(),
            name: constraint.name.clone().unwrap_or_else(|| {
                conventions::constraint_name(constraint.kind, &constraint.table, &constraint.columns)
            }),
            kind: constraint.kind,
        }),

        Expression::CreateSequence(sequence) => Expression::DropSequence(DropSequence {
            schema: sequence.schema.clone(),
            name: sequence.name.clone(),
        }),

        Expression::InsertData(insert) => Expression::DeleteData(DeleteData {
            schema: insert.schema.clone(),
            table: insert.table.clone(),
            rows: insert.rows.clone(),
            all_rows: false,
        }),

        other => return Err(MigrationError::Irreversible(other.kind().to_string())),
    };

    Ok(reversed)
}

fn index_name(index: &CreateIndex) -> String {
    index
        .name
        .clone()
        .unwrap_or_else(|| conventions::index_name(&index.table, &index.columns))
}
