//! Reference List
//!
//! The ordered list of entity names a user picks residence and destination
//! from. The list is produced once at startup from a [`ReferenceSource`] and
//! cached for the process lifetime; an empty list is a fatal startup condition.

use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::query::Selection;

const BUILTIN_COUNTRIES: &str = include_str!("../data/countries.txt");

/// Failures while producing the reference list. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ReferenceListError {
    #[error("Reference list is empty; there is nothing to select from")]
    Empty,
    #[error("Failed to read reference list from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Supplies raw entity names, possibly with duplicates.
pub trait ReferenceSource {
    fn names(&self) -> Result<Vec<String>, ReferenceListError>;
}

/// English country display names bundled with the crate.
pub struct BuiltinCountries;

impl ReferenceSource for BuiltinCountries {
    fn names(&self) -> Result<Vec<String>, ReferenceListError> {
        Ok(parse_lines(BUILTIN_COUNTRIES))
    }
}

/// Reads one name per line from a text file. Blank lines are skipped.
pub struct FileReferenceSource {
    path: PathBuf,
}

impl FileReferenceSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReferenceSource for FileReferenceSource {
    fn names(&self) -> Result<Vec<String>, ReferenceListError> {
        let content =
            std::fs::read_to_string(&self.path).map_err(|source| ReferenceListError::Read {
                path: self.path.clone(),
                source,
            })?;
        Ok(parse_lines(&content))
    }
}

fn parse_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// An ordered, de-duplicated, non-empty list of entity names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceList {
    entries: Vec<String>,
}

impl ReferenceList {
    /// Pulls names from `source` once, keeping the first occurrence of each.
    pub fn load(source: &dyn ReferenceSource) -> Result<Self, ReferenceListError> {
        Self::from_names(source.names()?)
    }

    /// Names are trimmed; blank ones are dropped before de-duplication.
    pub fn from_names<I, S>(names: I) -> Result<Self, ReferenceListError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let entries: Vec<String> = names
            .into_iter()
            .map(|name| {
                let name: String = name.into();
                name.trim().to_string()
            })
            .filter(|name| !name.is_empty() && seen.insert(name.clone()))
            .collect();

        if entries.is_empty() {
            return Err(ReferenceListError::Empty);
        }
        info!(count = entries.len(), "Reference list loaded");
        Ok(Self { entries })
    }

    pub fn list(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry == name)
    }

    /// The first two entries as residence and destination. A single-entry
    /// list yields the same entry for both.
    pub fn default_selection(&self) -> Selection {
        let residence = &self.entries[0];
        let destination = self.entries.get(1).unwrap_or(residence);
        Selection::new(residence.clone(), destination.clone())
    }

    /// Maps free-form picker input onto an entry.
    ///
    /// A 1-based number selects by position, then an exact case-insensitive
    /// name wins, then the best fuzzy match. Returns `None` when nothing fits.
    pub fn resolve(&self, query: &str) -> Option<&str> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        if let Ok(number) = query.parse::<usize>() {
            return number.checked_sub(1).and_then(|index| self.get(index));
        }

        let lowered = query.to_lowercase();
        if let Some(exact) = self
            .entries
            .iter()
            .find(|entry| entry.to_lowercase() == lowered)
        {
            return Some(exact.as_str());
        }

        let matcher = SkimMatcherV2::default();
        let best = self
            .entries
            .iter()
            .filter_map(|entry| matcher.fuzzy_match(entry, query).map(|score| (score, entry)))
            // Ties keep the earlier entry.
            .fold(None::<(i64, &String)>, |best, candidate| match best {
                Some((score, _)) if score >= candidate.0 => best,
                _ => Some(candidate),
            });
        debug!(query, matched = ?best.map(|(_, e)| e), "Fuzzy picker lookup");
        best.map(|(_, entry)| entry.as_str())
    }
}
