//! Bibliography records and the per-job citation lookup.
//!
//! [`Bibliography`] is the read-only collection handed in by the caller
//! (usually produced by [`crate::bibtex::parse`]). [`BibliographyLookup`]
//! wraps it for one conversion job and remembers which keys were actually
//! cited, in first-use order, so the reference list can be rendered later.

use indexmap::IndexSet;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Bibliographic category of an entry; decides how it is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryType {
    Article,
    Book,
    InProceedings,
    /// Any other `@type`, lower-cased.
    Other(String),
}

impl EntryType {
    /// Parse a BibTeX entry type name, case-insensitively.
    pub fn parse(name: &str) -> Self {
        let lower = name.trim().to_ascii_lowercase();
        match lower.as_str() {
            "article" => EntryType::Article,
            "book" => EntryType::Book,
            "inproceedings" | "conference" => EntryType::InProceedings,
            _ => EntryType::Other(lower),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EntryType::Article => "article",
            EntryType::Book => "book",
            EntryType::InProceedings => "inproceedings",
            EntryType::Other(name) => name,
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One bibliography record: key, type and free-form fields.
///
/// Field names are lower-case (`author`, `year`, `title`, `journal`,
/// `volume`, `number`, `pages`, `publisher`, `booktitle`, …).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibEntry {
    pub key: String,
    pub entry_type: EntryType,
    pub fields: BTreeMap<String, String>,
}

impl BibEntry {
    pub fn new(key: impl Into<String>, entry_type: EntryType) -> Self {
        Self {
            key: key.into(),
            entry_type,
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field setter; the name is lower-cased.
    pub fn with_field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// A field's value, or `None` when absent or blank.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn author(&self) -> Option<&str> {
        self.field("author")
    }

    pub fn year(&self) -> Option<&str> {
        self.field("year")
    }

    pub fn title(&self) -> Option<&str> {
        self.field("title")
    }
}

/// A citation database keyed by citation key.
#[derive(Debug, Clone, Default)]
pub struct Bibliography {
    entries: HashMap<String, BibEntry>,
}

impl Bibliography {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, replacing any earlier entry with the same key.
    pub fn insert(&mut self, entry: BibEntry) -> Option<BibEntry> {
        self.entries.insert(entry.key.clone(), entry)
    }

    pub fn get(&self, key: &str) -> Option<&BibEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<BibEntry> for Bibliography {
    fn from_iter<I: IntoIterator<Item = BibEntry>>(iter: I) -> Self {
        let mut bib = Bibliography::new();
        for entry in iter {
            bib.insert(entry);
        }
        bib
    }
}

/// Read-only view over a [`Bibliography`] that records cited keys.
#[derive(Debug)]
pub struct BibliographyLookup<'a> {
    db: &'a Bibliography,
    cited: IndexSet<String>,
}

impl<'a> BibliographyLookup<'a> {
    pub fn new(db: &'a Bibliography) -> Self {
        Self {
            db,
            cited: IndexSet::new(),
        }
    }

    /// Resolve a key for an inline citation. A hit is appended to the cited
    /// list on first use; a miss is never recorded.
    pub fn resolve(&mut self, key: &str) -> Option<&'a BibEntry> {
        let entry = self.db.get(key)?;
        if !self.cited.contains(key) {
            self.cited.insert(key.to_string());
        }
        Some(entry)
    }

    /// Fetch an entry without recording it.
    pub fn get(&self, key: &str) -> Option<&'a BibEntry> {
        self.db.get(key)
    }

    /// Cited keys in first-use order, deduplicated.
    pub fn cited(&self) -> impl Iterator<Item = &str> {
        self.cited.iter().map(String::as_str)
    }

    pub fn cited_count(&self) -> usize {
        self.cited.len()
    }
}
