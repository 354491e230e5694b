use super::Generator;
use crate::model::ColumnDefinition;
use crate::util::Result;

/// One clause of a column definition, in the order a dialect emits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnClause {
    Type,
    Collation,
    Identity,
    Nullability,
    Default,
    PrimaryKey,
    Unique,
}

pub const ANSI_CLAUSE_ORDER: &[ColumnClause] = &[
    ColumnClause::Type,
    ColumnClause::Collation,
    ColumnClause::Identity,
    ColumnClause::Nullability,
    ColumnClause::Default,
    ColumnClause::PrimaryKey,
    ColumnClause::Unique,
];

/// Where a column definition is being rendered.
#[derive(Debug, Clone, Copy)]
pub struct ColumnContext<'a> {
    pub schema: Option<&'a str>,
    pub table: &'a str,
    /// The column's primary key is emitted inline rather than as a table constraint.
    pub inline_primary_key: bool,
    /// Redefining an existing column: identity, key and unique clauses are omitted.
    pub alter: bool,
}

impl<'a> ColumnContext<'a> {
    pub fn create(schema: Option<&'a str>, table: &'a str, inline_primary_key: bool) -> Self {
        Self {
            schema,
            table,
            inline_primary_key,
            alter: false,
        }
    }

    pub fn alter(schema: Option<&'a str>, table: &'a str) -> Self {
        Self {
            schema,
            table,
            inline_primary_key: false,
            alter: true,
        }
    }
}

pub(crate) fn render_column<G: Generator + ?Sized>(
    generator: &G,
    column: &ColumnDefinition,
    ctx: &ColumnContext<'_>,
) -> Result<String> {
    let mut parts = vec![generator.quoter().quote_column_name(&column.name)];

    for clause in generator.column_clause_order() {
        let rendered = match clause {
            ColumnClause::Type => Some(generator.format_column_type(column)?),
            ColumnClause::Collation => column
                .collation
                .as_deref()
                .map(|collation| generator.format_collation(collation)),
            ColumnClause::Identity => match column.identity {
                Some(ref identity) if !ctx.alter => generator.format_identity(column, identity, ctx)?,
                _ => None,
            },
            ColumnClause::Nullability => generator.format_nullability(column, ctx),
            ColumnClause::Default => generator.format_default_clause(column, ctx)?,
            ColumnClause::PrimaryKey => {
                if column.primary_key && ctx.inline_primary_key && !ctx.alter {
                    Some(generator.format_inline_primary_key(column))
                } else {
                    None
                }
            }
            ColumnClause::Unique => {
                if column.unique && !column.primary_key && !ctx.alter {
                    Some("UNIQUE".to_string())
                } else {
                    None
                }
            }
        };
        parts.extend(rendered);
    }

    Ok(parts.join(" "))
}
