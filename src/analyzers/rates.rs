//! Per-capita scaling and the population lookup it depends on.

use std::collections::BTreeMap;
use tracing::warn;

use crate::analyzers::types::Population;
use crate::analyzers::utility::close_matches;
use crate::error::{DataError, Result};

const SUGGESTIONS: usize = 3;
const SUGGESTION_CUTOFF: f64 = 0.3;

/// Population by entity name.
#[derive(Debug, Clone, Default)]
pub struct PopulationTable {
    entries: BTreeMap<String, Population>,
}

impl PopulationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, population: Population) {
        self.entries.insert(name.into(), population);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Returns the population of `name`.
    ///
    /// # Errors
    ///
    /// An unknown name logs the closest known names for whoever is fixing
    /// the configuration, then fails with [`DataError::UnknownEntity`].
    pub fn lookup(&self, name: &str) -> Result<&Population> {
        if let Some(population) = self.entries.get(name) {
            return Ok(population);
        }

        let suggestions = self.suggest(name);
        warn!(entity = name, ?suggestions, "Best matches for unknown entity");
        Err(DataError::UnknownEntity {
            name: name.to_string(),
            suggestions,
        })
    }

    /// Known names resembling `name`. An entity whose code equals `name`
    /// comes first.
    pub fn suggest(&self, name: &str) -> Vec<String> {
        let mut suggestions: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, p)| p.code.eq_ignore_ascii_case(name))
            .map(|(n, _)| n.clone())
            .collect();

        for candidate in close_matches(name, self.names(), SUGGESTIONS, SUGGESTION_CUTOFF) {
            if !suggestions.contains(&candidate) {
                suggestions.push(candidate);
            }
        }
        suggestions.truncate(SUGGESTIONS);
        suggestions
    }
}

/// Divides each count by the population in millions; missing stays missing.
pub fn per_million(values: &[Option<f64>], population: &Population) -> Vec<Option<f64>> {
    let millions = population.millions();
    values.iter().map(|v| v.map(|count| count / millions)).collect()
}
