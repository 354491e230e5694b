//! High-level API for embedding polymold in other applications.
//!
//! This module provides functions that mirror CLI commands with structured
//! inputs and outputs. Rendering and validation are synchronous; applying
//! has async and blocking variants.
//!
//! # Example
//!
//! ```no_run
//! use polymold::api::{generate, GenerateOptions};
//! use polymold::dialect::Dialect;
//!
//! let result = generate(GenerateOptions::new(
//!     vec!["migrations".into()],
//!     Dialect::SqlServer,
//! )).unwrap();
//!
//! print!("{}", result.script);
//! ```
//!
//! Note: [`apply_blocking`] creates a new tokio runtime per call. For
//! high-frequency usage, prefer the async API with a shared runtime.

mod error;
mod options;
mod results;

pub use error::{Error, ValidationError};
pub use options::{ApplyOptions, GenerateOptions, ValidateOptions};
pub use results::{ApplyResult, GenerateResult, GeneratedMigration, ValidateResult};

use crate::apply::{apply_migration, ApplyOptions as RunOptions};
use crate::conventions::{migration_expressions, Conventions};
use crate::dialect::Dialect;
use crate::generator::{generator_for, GeneratorOptions};
use crate::lint::{lint_expressions, LintOptions, LintSeverity};
use crate::migrate::{check_unique_versions, load_migration, load_migrations};
use crate::model::{Direction, Expression, Migration};
use crate::processor::{connect, Processor, ScriptProcessor};
use crate::util::MigrationError;
use crate::validate::validate_expressions;
use std::path::PathBuf;

// ============================================================================
// Helper functions to reduce duplication
// ============================================================================

/// Loads every source in ascending version order, optionally keeping one version.
/// Versions must be unique across all sources.
fn load_sources(sources: &[PathBuf], version: Option<u32>) -> Result<Vec<Migration>, Error> {
    let mut migrations = Vec::new();
    for source in sources {
        if source.is_dir() {
            migrations.extend(load_migrations(source)?);
        } else {
            migrations.push(load_migration(source)?);
        }
    }
    migrations.sort_by_key(|m| m.version);
    check_unique_versions(&migrations)?;
    if let Some(version) = version {
        migrations.retain(|m| m.version == version);
    }

    if migrations.is_empty() {
        let paths: Vec<String> = sources.iter().map(|p| p.display().to_string()).collect();
        return Err(Error::no_migrations(paths.join(", ")));
    }
    Ok(migrations)
}

fn in_direction(migrations: Vec<Migration>, direction: Direction) -> Vec<Migration> {
    match direction {
        Direction::Up => migrations,
        Direction::Down => migrations.into_iter().rev().collect(),
    }
}

fn conventions(default_schema: &Option<String>) -> Conventions {
    Conventions {
        default_schema: default_schema.clone(),
    }
}

/// Expressions for one migration, with conventions applied and validated.
fn prepared(
    migration: &Migration,
    direction: Direction,
    conventions: &Conventions,
    dialect: Dialect,
) -> Result<Vec<Expression>, Error> {
    let expressions = migration_expressions(migration, direction, conventions)?;
    let errors = validate_expressions(&expressions, dialect);
    if !errors.is_empty() {
        return Err(Error::validation(errors));
    }
    Ok(expressions)
}

// ============================================================================
// Public API functions
// ============================================================================

/// Render migrations to SQL for one dialect.
pub fn generate(options: GenerateOptions) -> Result<GenerateResult, Error> {
    let migrations = in_direction(
        load_sources(&options.sources, options.version)?,
        options.direction,
    );
    let conventions = conventions(&options.default_schema);
    let generator = generator_for(
        options.dialect,
        GeneratorOptions {
            compatibility: options.compatibility,
        },
    );

    let mut generated = Vec::new();
    let mut sections = Vec::new();
    for migration in &migrations {
        let expressions = prepared(migration, options.direction, &conventions, options.dialect)?;
        let statements = generator.generate_all(&expressions)?;

        sections.push(format!(
            "-- {:04} {} ({})\n{}",
            migration.version,
            migration.description,
            options.direction,
            generator.render_script(&statements)
        ));
        generated.push(GeneratedMigration {
            version: migration.version,
            description: migration.description.clone(),
            statements,
        });
    }

    Ok(GenerateResult {
        migrations: generated,
        script: sections.join("\n"),
    })
}

/// Check migrations for structural problems, generation failures and lint
/// issues. Structurally valid migrations are also rendered, so strict mode
/// reports every feature the dialect cannot express.
pub fn validate(options: ValidateOptions) -> Result<ValidateResult, Error> {
    let migrations = load_sources(&options.sources, None)?;
    let conventions = conventions(&options.default_schema);
    let lint_options = LintOptions {
        allow_destructive: options.allow_destructive,
        ..Default::default()
    };
    let generator = generator_for(
        options.dialect,
        GeneratorOptions {
            compatibility: options.compatibility,
        },
    );

    let mut errors = Vec::new();
    let mut issues = Vec::new();
    for migration in &migrations {
        let expressions = migration_expressions(migration, options.direction, &conventions)?;
        let structural = validate_expressions(&expressions, options.dialect);
        if structural.is_empty() {
            for (index, expression) in expressions.iter().enumerate() {
                if let Err(e) = generator.generate(expression) {
                    errors.push((
                        migration.version,
                        ValidationError {
                            index,
                            kind: expression.kind(),
                            message: e.to_string(),
                        },
                    ));
                }
            }
        }
        errors.extend(structural.into_iter().map(|e| (migration.version, e)));
        issues.extend(
            lint_expressions(&expressions, &lint_options)
                .into_iter()
                .map(|issue| (migration.version, issue)),
        );
    }

    Ok(ValidateResult { errors, issues })
}

/// Apply migrations to a database, one transaction per migration.
pub async fn apply(options: ApplyOptions) -> Result<ApplyResult, Error> {
    let migrations = in_direction(
        load_sources(&options.sources, options.version)?,
        options.direction,
    );
    let conventions = conventions(&options.default_schema);

    // Nothing runs unless every migration is valid.
    for migration in &migrations {
        prepared(migration, options.direction, &conventions, options.dialect)?;
    }

    let mut processor: Box<dyn Processor> = if options.dry_run {
        Box::new(ScriptProcessor::new(options.dialect))
    } else {
        connect(options.dialect, &options.database_url)
            .await
            .map_err(|e| Error::connection(e.to_string()))?
    };

    let run_options = RunOptions {
        dry_run: options.dry_run,
        allow_destructive: options.allow_destructive,
        direction: options.direction,
        conventions,
        generator: GeneratorOptions {
            compatibility: options.compatibility,
        },
    };

    let mut result = ApplyResult {
        versions: Vec::new(),
        statements_executed: 0,
        statements: Vec::new(),
        warnings: Vec::new(),
        dry_run: options.dry_run,
    };

    for migration in &migrations {
        let applied = apply_migration(migration, processor.as_mut(), &run_options)
            .await
            .map_err(|e| match e {
                MigrationError::DatabaseError(message) => Error::execution(migration.version, message),
                other => Error::from(other),
            })?;

        let (errors, warnings): (Vec<_>, Vec<_>) = applied
            .lint_results
            .into_iter()
            .partition(|r| r.severity == LintSeverity::Error);
        if !errors.is_empty() {
            return Err(Error::LintFailed {
                count: errors.len(),
                issues: errors,
            });
        }

        result.versions.push(migration.version);
        if applied.applied {
            result.statements_executed += applied.sql_statements.len();
        }
        result.statements.extend(applied.sql_statements);
        result.warnings.extend(warnings);
    }

    Ok(result)
}

// ============================================================================
// Blocking variants
// ============================================================================

fn create_runtime() -> Result<tokio::runtime::Runtime, Error> {
    tokio::runtime::Runtime::new().map_err(|e| Error::runtime(e.to_string()))
}

/// Blocking variant of [`apply`].
///
/// Creates a new tokio runtime for each call. For high-frequency usage,
/// prefer the async API with a shared runtime.
pub fn apply_blocking(options: ApplyOptions) -> Result<ApplyResult, Error> {
    create_runtime()?.block_on(apply(options))
}
