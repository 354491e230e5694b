use crate::conventions::{migration_expressions, Conventions};
use crate::generator::{generator_for, GeneratorOptions};
use crate::lint::{has_errors, lint_expressions, LintOptions, LintResult};
use crate::model::{Direction, Expression, Migration};
use crate::processor::Processor;
use crate::util::Result;
use crate::validate::{into_error, validate_expressions};
use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    pub dry_run: bool,
    pub allow_destructive: bool,
    pub direction: Direction,
    pub conventions: Conventions,
    pub generator: GeneratorOptions,
}

#[derive(Debug, Clone)]
pub struct ApplyResult {
    pub version: u32,
    pub expressions: Vec<Expression>,
    pub sql_statements: Vec<String>,
    pub lint_results: Vec<LintResult>,
    pub applied: bool,
}

/// Expressions for `direction` with conventions applied, validated for the
/// processor's dialect.
pub fn prepare_expressions(
    migration: &Migration,
    direction: Direction,
    conventions: &Conventions,
    dialect: crate::dialect::Dialect,
) -> Result<Vec<Expression>> {
    let expressions = migration_expressions(migration, direction, conventions)?;

    let errors = validate_expressions(&expressions, dialect);
    if !errors.is_empty() {
        return Err(into_error(&errors));
    }
    Ok(expressions)
}

pub async fn apply_migration(
    migration: &Migration,
    processor: &mut dyn Processor,
    options: &ApplyOptions,
) -> Result<ApplyResult> {
    let dialect = processor.dialect();
    info!(
        version = migration.version,
        description = %migration.description,
        direction = %options.direction,
        %dialect,
        "Applying migration"
    );

    let expressions = prepare_expressions(migration, options.direction, &options.conventions, dialect)?;

    let lint_options = LintOptions {
        allow_destructive: options.allow_destructive,
        ..LintOptions::default()
    };
    let lint_results = lint_expressions(&expressions, &lint_options);

    if has_errors(&lint_results) {
        warn!(version = migration.version, "Migration blocked by lint errors");
        return Ok(ApplyResult {
            version: migration.version,
            expressions,
            sql_statements: Vec::new(),
            lint_results,
            applied: false,
        });
    }

    let sql = generator_for(dialect, options.generator).generate_all(&expressions)?;

    if options.dry_run {
        return Ok(ApplyResult {
            version: migration.version,
            expressions,
            sql_statements: sql,
            lint_results,
            applied: false,
        });
    }

    processor.begin().await?;
    for statement in &sql {
        if let Err(e) = processor.execute(statement).await {
            if let Err(rollback) = processor.rollback().await {
                warn!(version = migration.version, error = %rollback, "Rollback failed");
            }
            return Err(e);
        }
    }
    processor.commit().await?;

    Ok(ApplyResult {
        version: migration.version,
        expressions,
        sql_statements: sql,
        lint_results,
        applied: true,
    })
}

/// Applies migrations in order (reverse order when going down), stopping at
/// the first one that is blocked or fails.
pub async fn apply_migrations(
    migrations: &[Migration],
    processor: &mut dyn Processor,
    options: &ApplyOptions,
) -> Result<Vec<ApplyResult>> {
    let ordered: Vec<&Migration> = match options.direction {
        Direction::Up => migrations.iter().collect(),
        Direction::Down => migrations.iter().rev().collect(),
    };

    let mut results = Vec::new();
    for migration in ordered {
        let result = apply_migration(migration, processor, options).await?;
        let blocked = has_errors(&result.lint_results);
        results.push(result);
        if blocked {
            break;
        }
    }
    Ok(results)
}
