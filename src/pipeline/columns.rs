// src/pipeline/columns.rs

//! Header detection.
//!
//! Each role takes the left-most header that contains one of its synonyms
//! (case-insensitive, trimmed). Roles are matched independently, so one
//! header can serve several roles: `Page Views` is both a `url` and a
//! `views` candidate. A role listed twice in the table keeps its first match.

use std::collections::HashMap;

use crate::error::{AppError, Result};
use crate::models::{Cell, ColumnRole, ColumnRule};

/// Column index per detected role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    indices: HashMap<ColumnRole, usize>,
}

impl ColumnMap {
    /// Match `header` against the ordered rule table.
    pub fn detect(header: &[Cell], rules: &[ColumnRule]) -> Self {
        let normalized: Vec<String> = header
            .iter()
            .map(|cell| cell.to_string().trim().to_lowercase())
            .collect();

        let mut indices = HashMap::new();
        for rule in rules {
            if indices.contains_key(&rule.role) {
                continue;
            }
            let synonyms: Vec<String> = rule.synonyms.iter().map(|s| s.to_lowercase()).collect();
            let found = normalized
                .iter()
                .position(|h| synonyms.iter().any(|s| h.contains(s.as_str())));
            if let Some(index) = found {
                indices.insert(rule.role, index);
            }
        }

        Self { indices }
    }

    pub fn get(&self, role: ColumnRole) -> Option<usize> {
        self.indices.get(&role).copied()
    }

    /// Index of a mandatory role, or a [`AppError::MissingColumn`] naming its synonyms.
    pub fn require(&self, role: ColumnRole, rules: &[ColumnRule]) -> Result<usize> {
        self.get(role).ok_or_else(|| {
            let synonyms: Vec<String> = rules
                .iter()
                .filter(|r| r.role == role)
                .flat_map(|r| r.synonyms.iter().cloned())
                .collect();
            AppError::missing_column(role.to_string().to_uppercase(), &synonyms)
        })
    }
}
