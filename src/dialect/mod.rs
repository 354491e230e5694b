//! Target databases and their generator implementations.
//!
//! Each dialect module bundles the three lookup pieces a generator needs: a
//! [`Quoter`](crate::quoter::Quoter), a [`TypeMap`](crate::typemap::TypeMap)
//! and the [`Generator`](crate::generator::Generator) overrides.

pub mod firebird;
pub mod oracle;
pub mod postgres;
pub mod sqlite;
pub mod sqlserver;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Postgres,
    SqlServer,
    Sqlite,
    Oracle,
    Firebird,
}

impl Dialect {
    pub fn all() -> &'static [Dialect] {
        &[
            Dialect::Postgres,
            Dialect::SqlServer,
            Dialect::Sqlite,
            Dialect::Oracle,
            Dialect::Firebird,
        ]
    }

    /// Canonical lower-case name, as accepted on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::SqlServer => "sqlserver",
            Dialect::Sqlite => "sqlite",
            Dialect::Oracle => "oracle",
            Dialect::Firebird => "firebird",
        }
    }

    /// Whether a live processor is bundled for this dialect.
    pub fn has_driver(&self) -> bool {
        matches!(self, Dialect::Postgres | Dialect::Sqlite)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Dialect::Postgres => "PostgreSQL",
            Dialect::SqlServer => "SQL Server",
            Dialect::Sqlite => "SQLite",
            Dialect::Oracle => "Oracle",
            Dialect::Firebird => "Firebird",
        };
        f.write_str(label)
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "sqlserver" | "mssql" | "sql-server" | "tsql" => Ok(Dialect::SqlServer),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            "oracle" | "ora" => Ok(Dialect::Oracle),
            "firebird" | "fb" => Ok(Dialect::Firebird),
            other => Err(format!(
                "unknown dialect '{other}' (expected one of: {})",
                Dialect::all()
                    .iter()
                    .map(|d| d.name())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }
}
