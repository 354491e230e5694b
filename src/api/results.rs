use crate::lint::LintResult as LintIssue;
use crate::validate::ValidationError;

/// SQL rendered for one migration.
#[derive(Debug, Clone)]
pub struct GeneratedMigration {
    pub version: u32,
    pub description: String,
    /// Statements without terminators
    pub statements: Vec<String>,
}

/// Result of rendering migrations.
#[derive(Debug, Clone)]
pub struct GenerateResult {
    pub migrations: Vec<GeneratedMigration>,
    /// Complete script with dialect terminators and a header per migration
    pub script: String,
}

impl GenerateResult {
    pub fn statement_count(&self) -> usize {
        self.migrations.iter().map(|m| m.statements.len()).sum()
    }
}

/// Result of applying migrations.
#[derive(Debug, Clone)]
pub struct ApplyResult {
    /// Versions whose statements ran (or would run, in a dry run)
    pub versions: Vec<u32>,
    /// Number of statements executed
    pub statements_executed: usize,
    /// Statements in execution order
    pub statements: Vec<String>,
    /// Lint warnings raised along the way
    pub warnings: Vec<LintIssue>,
    /// Whether this was a dry run
    pub dry_run: bool,
}

/// Result of validating migrations.
#[derive(Debug, Clone)]
pub struct ValidateResult {
    pub errors: Vec<(u32, ValidationError)>,
    pub issues: Vec<(u32, LintIssue)>,
}

impl ValidateResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && !crate::lint::has_errors(&self.lint_issues())
    }

    fn lint_issues(&self) -> Vec<LintIssue> {
        self.issues.iter().map(|(_, issue)| issue.clone()).collect()
    }
}
