//! Lookup of abstract column types in a dialect's type table.
//!
//! Each [`DbType`] has an optional default template, used when the column
//! carries no size, and any number of sized templates keyed by the largest
//! size they accept. A sized lookup takes the smallest entry that still fits,
//! so `VARCHAR($size)` up to 8000 and `VARCHAR(MAX)` above it can coexist.

use crate::dialect::Dialect;
use crate::model::DbType;
use crate::util::{MigrationError, Result};
use std::collections::BTreeMap;

/// Largest size any entry can accept; used for `MAX`-style types.
pub const UNBOUNDED: u32 = u32::MAX;

#[derive(Debug, Clone, Default)]
struct Templates {
    default: Option<String>,
    /// Keyed by maximum size; iteration order is ascending.
    sized: BTreeMap<u32, String>,
}

#[derive(Debug, Clone)]
pub struct TypeMap {
    dialect: Dialect,
    entries: BTreeMap<DbType, Templates>,
}

/// One row of a type table, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMapEntry {
    pub db_type: DbType,
    pub max_size: Option<u32>,
    pub template: String,
}

impl TypeMap {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            entries: BTreeMap::new(),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Template used when the column has no size.
    pub fn set(&mut self, db_type: DbType, template: &str) -> &mut Self {
        self.entries.entry(db_type).or_default().default = Some(template.to_string());
        self
    }

    /// Template used for sizes up to and including `max_size`.
    pub fn set_sized(&mut self, db_type: DbType, max_size: u32, template: &str) -> &mut Self {
        self.entries
            .entry(db_type)
            .or_default()
            .sized
            .insert(max_size, template.to_string());
        self
    }

    pub fn get(&self, db_type: &DbType, size: Option<u32>, scale: Option<u32>) -> Result<String> {
        if let DbType::Custom(name) = db_type {
            return Ok(name.clone());
        }

        let templates = self.entries.get(db_type).ok_or_else(|| {
            MigrationError::TypeMapError(format!(
                "{} has no mapping for type {db_type}",
                self.dialect
            ))
        })?;

        let template = match size {
            None => templates.default.as_deref().ok_or_else(|| {
                MigrationError::TypeMapError(format!(
                    "{} requires a size for type {db_type}",
                    self.dialect
                ))
            })?,
            Some(size) if templates.sized.is_empty() => templates.default.as_deref().ok_or_else(|| {
                MigrationError::TypeMapError(format!(
                    "{} has no mapping for type {db_type} with size {size}",
                    self.dialect
                ))
            })?,
            Some(size) => templates
                .sized
                .range(size..)
                .next()
                .map(|(_, template)| template.as_str())
                .ok_or_else(|| {
                    let max = templates.sized.keys().next_back().copied().unwrap_or(0);
                    MigrationError::TypeMapError(format!(
                        "size {size} exceeds the {} maximum of {max} for type {db_type}",
                        self.dialect
                    ))
                })?,
        };

        Ok(render(template, size, scale))
    }

    pub fn entries(&self) -> Vec<TypeMapEntry> {
        let mut rows = Vec::new();
        for (db_type, templates) in &self.entries {
            if let Some(ref template) = templates.default {
                rows.push(TypeMapEntry {
                    db_type: db_type.clone(),
                    max_size: None,
                    template: template.clone(),
                });
            }
            for (max_size, template) in &templates.sized {
                rows.push(TypeMapEntry {
                    db_type: db_type.clone(),
                    max_size: Some(*max_size),
                    template: template.clone(),
                });
            }
        }
        rows
    }
}

fn render(template: &str, size: Option<u32>, scale: Option<u32>) -> String {
    let mut rendered = template.to_string();
    if let Some(size) = size {
        rendered = rendered.replace("$size", &size.to_string());
    }
    rendered.replace("$scale", &scale.unwrap_or(0).to_string())
}
