use crate::dialect::Dialect;
use crate::generator::CompatibilityMode;
use crate::model::Direction;
use std::path::PathBuf;

/// Options for rendering migrations to a SQL script.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Migration files or directories of `NNNN_*.json` files
    pub sources: Vec<PathBuf>,
    /// Target database
    pub dialect: Dialect,
    /// Render `up` (default) or `down`
    pub direction: Direction,
    /// Fail instead of dropping features the dialect cannot express
    pub compatibility: CompatibilityMode,
    /// Schema for expressions that name none
    pub default_schema: Option<String>,
    /// Only this migration version
    pub version: Option<u32>,
}

impl GenerateOptions {
    /// Create new generate options with required fields.
    pub fn new(sources: Vec<PathBuf>, dialect: Dialect) -> Self {
        Self {
            sources,
            dialect,
            direction: Direction::Up,
            compatibility: CompatibilityMode::Loose,
            default_schema: None,
            version: None,
        }
    }

    /// Render the rollback direction.
    pub fn down(mut self) -> Self {
        self.direction = Direction::Down;
        self
    }

    /// Reject unsupported features.
    pub fn strict(mut self) -> Self {
        self.compatibility = CompatibilityMode::Strict;
        self
    }

    pub fn with_default_schema(mut self, schema: impl Into<String>) -> Self {
        self.default_schema = Some(schema.into());
        self
    }

    pub fn only_version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }
}

/// Options for applying migrations to a live database.
#[derive(Debug, Clone)]
pub struct ApplyOptions {
    /// Migration files or directories
    pub sources: Vec<PathBuf>,
    pub dialect: Dialect,
    /// Database connection URL
    pub database_url: String,
    pub direction: Direction,
    pub compatibility: CompatibilityMode,
    pub default_schema: Option<String>,
    pub version: Option<u32>,
    /// Allow destructive operations (DROP, DELETE of all rows)
    pub allow_destructive: bool,
    /// Preview only, don't execute
    pub dry_run: bool,
}

impl ApplyOptions {
    /// Create new apply options with required fields.
    pub fn new(sources: Vec<PathBuf>, dialect: Dialect, database_url: impl Into<String>) -> Self {
        Self {
            sources,
            dialect,
            database_url: database_url.into(),
            direction: Direction::Up,
            compatibility: CompatibilityMode::Loose,
            default_schema: None,
            version: None,
            allow_destructive: false,
            dry_run: false,
        }
    }

    pub fn down(mut self) -> Self {
        self.direction = Direction::Down;
        self
    }

    pub fn strict(mut self) -> Self {
        self.compatibility = CompatibilityMode::Strict;
        self
    }

    pub fn with_default_schema(mut self, schema: impl Into<String>) -> Self {
        self.default_schema = Some(schema.into());
        self
    }

    pub fn only_version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }

    /// Allow destructive operations.
    pub fn allow_destructive(mut self) -> Self {
        self.allow_destructive = true;
        self
    }

    /// Enable dry-run mode (preview only).
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }
}

/// Options for checking migrations without a database.
#[derive(Debug, Clone)]
pub struct ValidateOptions {
    pub sources: Vec<PathBuf>,
    pub dialect: Dialect,
    pub direction: Direction,
    /// Strict reports features the dialect cannot express as errors
    pub compatibility: CompatibilityMode,
    pub default_schema: Option<String>,
    pub allow_destructive: bool,
}

impl ValidateOptions {
    pub fn new(sources: Vec<PathBuf>, dialect: Dialect) -> Self {
        Self {
            sources,
            dialect,
            direction: Direction::Up,
            compatibility: CompatibilityMode::Loose,
            default_schema: None,
            allow_destructive: false,
        }
    }

    pub fn down(mut self) -> Self {
        self.direction = Direction::Down;
        self
    }

    pub fn strict(mut self) -> Self {
        self.compatibility = CompatibilityMode::Strict;
        self
    }

    pub fn allow_destructive(mut self) -> Self {
        self.allow_destructive = true;
        self
    }
}
