//! Result types returned by the conversion entry points.

use serde::{Deserialize, Serialize};

/// The finished Markdown plus everything an operator may want to inspect.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// The transformed Markdown document.
    pub markdown: String,
    /// Sorted, distinct LaTeX command forms the residual pass had to erase.
    pub unconverted_commands: Vec<String>,
    pub stats: ConversionStats,
}

/// Counts gathered while the passes ran.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Numbered headings (starred sections are not counted).
    pub sections: usize,
    pub figures: usize,
    pub tables: usize,
    pub equations: usize,
    pub footnotes: usize,
    /// Label registrations, across all construct kinds.
    pub labels: usize,
    /// `\ref` targets that rendered as "Unknown <label>", in first-seen order.
    pub unresolved_refs: Vec<String>,
    /// Distinct citation keys that resolved against the bibliography.
    pub citations: usize,
    /// Citation keys absent from the bibliography, in first-seen order.
    pub unresolved_citation_keys: Vec<String>,
    /// Entries rendered in the reference list.
    pub references_listed: usize,
    /// Wall-clock time for the whole pipeline.
    pub duration_ms: u64,
}
