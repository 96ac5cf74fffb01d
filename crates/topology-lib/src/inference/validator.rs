//! Sanity checks on inferred links

use crate::models::LinkMap;

/// Flags structurally suspicious link groups
#[derive(Debug, Clone, Default)]
pub struct LinkValidator;

impl LinkValidator {
    pub fn new() -> Self {
        Self
    }

    /// One warning per single-cell link, in link order
    pub fn validate(&self, links: &LinkMap) -> Vec<String> {
        links
            .iter()
            .filter(|(_, cells)| cells.len() == 1)
            .map(|(label, _)| format!("{} has only one cell (low confidence group)", label))
            .collect()
    }
}
