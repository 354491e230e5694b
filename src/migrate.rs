//! Migration documents on disk: `NNNN_name.json` files holding a [`Migration`].

use crate::model::{
    ColumnDefinition, CreateTable, DbType, DropTable, Expression, Migration,
};
use crate::util::{MigrationError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

fn migration_file_pattern() -> Regex {
    Regex::new(r"^(\d{4})_.*\.json$").unwrap()
}

/// Number encoded in a migration file name, if it follows the `NNNN_` scheme.
pub fn migration_number(path: &Path) -> Option<u32> {
    let filename = path.file_name()?.to_string_lossy();
    migration_file_pattern()
        .captures(&filename)
        .and_then(|captures| captures.get(1))
        .and_then(|number| number.as_str().parse().ok())
}

/// Scans a directory for migration files matching pattern NNNN_*.json
/// Returns the next available migration number (highest + 1, or 1 if none exist)
pub fn find_next_migration_number(dir: &Path) -> std::io::Result<u32> {
    let mut max_number = 0;

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if let Some(number) = migration_number(&entry.path()) {
            max_number = max_number.max(number);
        }
    }

    Ok(max_number + 1)
}

/// Generates migration filename like "0003_add_users.json"
/// Sanitizes name: lowercase, spaces and dashes to underscores, other special chars removed
pub fn generate_migration_filename(number: u32, name: &str) -> Result<String> {
    let sanitized: String = name
        .to_lowercase()
        .replace([' ', '-'], "_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();

    let sanitized = sanitized
        .split('_')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_");

    if sanitized.is_empty() {
        return Err(MigrationError::ValidationError(
            "Migration name must contain at least one alphanumeric character".to_string(),
        ));
    }

    Ok(format!("{number:04}_{sanitized}.json"))
}

/// Reads one migration document. A missing version is taken from the file name.
pub fn load_migration(path: &Path) -> Result<Migration> {
    let content = std::fs::read_to_string(path)?;
    let mut migration: Migration = serde_json::from_str(&content).map_err(|e| {
        MigrationError::ParseError(format!("{}: {e}", path.display()))
    })?;

    if migration.version == 0 {
        migration.version = migration_number(path).ok_or_else(|| {
            MigrationError::ParseError(format!(
                "{}: no version in the document or the file name",
                path.display()
            ))
        })?;
    }
    debug!(path = %path.display(), version = migration.version, "Loaded migration");
    Ok(migration)
}

/// Loads every `NNNN_*.json` file in `dir`, ordered by version.
pub fn load_migrations(dir: &Path) -> Result<Vec<Migration>> {
    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if migration_number(&path).is_some() {
            paths.push(path);
        }
    }

    let mut migrations = paths
        .iter()
        .map(|path| load_migration(path))
        .collect::<Result<Vec<_>>>()?;
    migrations.sort_by_key(|m| m.version);
    check_unique_versions(&migrations)?;

    info!(dir = %dir.display(), count = migrations.len(), "Loaded migrations");
    Ok(migrations)
}

/// Rejects two migrations with the same version. Expects `migrations` sorted.
pub fn check_unique_versions(migrations: &[Migration]) -> Result<()> {
    match migrations.windows(2).find(|w| w[0].version == w[1].version) {
        Some(pair) => Err(MigrationError::ValidationError(format!(
            "Duplicate migration version {}",
            pair[0].version
        ))),
        None => Ok(()),
    }
}

/// Writes a starter document for a new migration and returns its path.
pub fn write_migration_template(dir: &Path, name: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let number = find_next_migration_number(dir)?;
    let path = dir.join(generate_migration_filename(number, name)?);

    let table = "example";
    let template = Migration::new(number, name)
        .with_up(vec![Expression::CreateTable(CreateTable::new(
            table,
            vec![ColumnDefinition::new("id", DbType::Int64)
                .primary_key()
                .identity()],
        ))])
        .with_down(vec![Expression::DropTable(DropTable {
            schema: None,
            name: table.to_string(),
            if_exists: false,
            cascade: false,
        })]);

    let json = serde_json::to_string_pretty(&template)
        .map_err(|e| MigrationError::ParseError(e.to_string()))?;
    std::fs::write(&path, json + "\n")?;
    info!(path = %path.display(), "Created migration");
    Ok(path)
}
