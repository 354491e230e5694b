use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use polymold::api::{self, ApplyOptions, GenerateOptions, ValidateOptions};
use polymold::dialect::Dialect;
use polymold::generator::{generator_for, CompatibilityMode, GeneratorOptions};
use polymold::lint::LintSeverity;
use polymold::migrate::write_migration_template;
use polymold::model::Direction;
use polymold::typemap::UNBOUNDED;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "polymold")]
#[command(about = "Database-agnostic schema migrations", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Flags shared by every command that renders SQL.
#[derive(Args)]
struct Target {
    /// Target database: postgres, sqlserver, sqlite, oracle, firebird
    #[arg(long, env = "POLYMOLD_DIALECT", default_value = "postgres")]
    dialect: Dialect,

    /// Schema for expressions that name none
    #[arg(long, env = "POLYMOLD_DEFAULT_SCHEMA")]
    default_schema: Option<String>,

    /// Fail instead of skipping features the dialect cannot express
    #[arg(long, env = "POLYMOLD_STRICT", value_parser = clap::builder::FalseyValueParser::new())]
    strict: bool,

    /// Render the rollback direction
    #[arg(long)]
    down: bool,
}

impl Target {
    fn direction(&self) -> Direction {
        if self.down {
            Direction::Down
        } else {
            Direction::Up
        }
    }

    fn compatibility(&self) -> CompatibilityMode {
        if self.strict {
            CompatibilityMode::Strict
        } else {
            CompatibilityMode::Loose
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Render migrations to a SQL script
    Generate {
        /// Migration files or directories
        #[arg(default_value = "migrations")]
        sources: Vec<PathBuf>,
        #[command(flatten)]
        target: Target,
        /// Only this migration version
        #[arg(long)]
        only: Option<u32>,
        /// Write the script here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Apply migrations to a database
    Apply {
        #[arg(default_value = "migrations")]
        sources: Vec<PathBuf>,
        #[command(flatten)]
        target: Target,
        /// Database connection URL
        #[arg(long, env = "DATABASE_URL")]
        database: String,
        #[arg(long)]
        only: Option<u32>,
        #[arg(long)]
        dry_run: bool,
        #[arg(long)]
        allow_destructive: bool,
    },

    /// Check migrations without touching a database
    Validate {
        #[arg(default_value = "migrations")]
        sources: Vec<PathBuf>,
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        allow_destructive: bool,
    },

    /// Create a new migration file
    New {
        /// Migration name, e.g. "add users"
        name: String,
        /// Directory holding the migrations
        #[arg(long, default_value = "migrations")]
        dir: PathBuf,
    },

    /// Show how abstract column types map to a dialect
    Types {
        #[arg(long, env = "POLYMOLD_DIALECT", default_value = "postgres")]
        dialect: Dialect,
    },
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            sources,
            target,
            only,
            output,
        } => {
            let mut options = GenerateOptions::new(sources, target.dialect);
            options.direction = target.direction();
            options.compatibility = target.compatibility();
            options.default_schema = target.default_schema;
            options.version = only;

            let result = api::generate(options)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &result.script)?;
                    eprintln!(
                        "Wrote {} statement(s) to {}",
                        result.statement_count(),
                        path.display()
                    );
                }
                None => print!("{}", result.script),
            }
            Ok(())
        }
        Commands::Apply {
            sources,
            target,
            database,
            only,
            dry_run,
            allow_destructive,
        } => {
            let mut options = ApplyOptions::new(sources, target.dialect, database);
            options.direction = target.direction();
            options.compatibility = target.compatibility();
            options.default_schema = target.default_schema;
            options.version = only;
            options.dry_run = dry_run;
            options.allow_destructive = allow_destructive;

            let result = match api::apply(options).await {
                Ok(result) => result,
                Err(api::Error::LintFailed { issues, .. }) => {
                    for issue in &issues {
                        eprintln!("error [{}]: {}", issue.rule, issue.message);
                    }
                    bail!("Refusing to apply: {} lint error(s)", issues.len());
                }
                Err(e) => return Err(e.into()),
            };

            for warning in &result.warnings {
                eprintln!("warning [{}]: {}", warning.rule, warning.message);
            }
            if result.dry_run {
                for statement in &result.statements {
                    println!("{statement}");
                }
            } else {
                println!(
                    "Applied {} migration(s), {} statement(s)",
                    result.versions.len(),
                    result.statements_executed
                );
            }
            Ok(())
        }
        Commands::Validate {
            sources,
            target,
            allow_destructive,
        } => {
            let mut options = ValidateOptions::new(sources, target.dialect);
            options.direction = target.direction();
            options.compatibility = target.compatibility();
            options.default_schema = target.default_schema;
            options.allow_destructive = allow_destructive;

            let result = api::validate(options)?;
            for (version, error) in &result.errors {
                println!("{version:04} error: {error}");
            }
            for (version, issue) in &result.issues {
                let level = match issue.severity {
                    LintSeverity::Error => "error",
                    LintSeverity::Warning => "warning",
                };
                println!("{version:04} {level} [{}]: {}", issue.rule, issue.message);
            }

            if !result.is_valid() {
                bail!("Validation failed");
            }
            println!("OK");
            Ok(())
        }
        Commands::New { name, dir } => {
            let path = write_migration_template(&dir, &name)?;
            println!("{}", path.display());
            Ok(())
        }
        Commands::Types { dialect } => {
            let generator = generator_for(dialect, GeneratorOptions::default());
            for entry in generator.type_map().entries() {
                let size = match entry.max_size {
                    None => "-".to_string(),
                    Some(UNBOUNDED) => "max".to_string(),
                    Some(max) => max.to_string(),
                };
                println!("{}\t{}\t{}", entry.db_type, size, entry.template);
            }
            Ok(())
        }
    }
}
