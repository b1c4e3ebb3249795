//! Error types for the tex2md library.
//!
//! Only conditions that make the output misleading are fatal. Everything a
//! pass can recover from locally (unknown `\ref` label, unknown citation key,
//! missing bibliography field, malformed LaTeX) is resolved inside the pass and
//! surfaces in [`crate::output::ConversionStats`] instead of here.
//!
//! * [`Tex2MdError`]: **Fatal**: the conversion cannot produce a trustworthy
//!   document (unreadable input, unreadable or malformed bibliography, a label
//!   collision under [`crate::config::LabelPolicy::Error`], failed export).
//!
//! * [`BibTexError`]: a syntax error from the `.bib` reader. Wrapped into
//!   [`Tex2MdError::BibliographyMalformed`] by
//!   [`crate::convert::load_bibliography`] once the file path is known.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the tex2md library.
#[derive(Debug, Error)]
pub enum Tex2MdError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("LaTeX file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists but could not be read as UTF-8 text.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Bibliography errors ───────────────────────────────────────────────
    /// The bibliography file could not be read at all.
    #[error("Bibliography '{path}' is unreadable: {source}\nCitations cannot be resolved without it.")]
    BibliographyUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bibliography file was read but is not valid BibTeX.
    #[error("Bibliography '{path}' is malformed at line {line}: {detail}")]
    BibliographyMalformed {
        path: PathBuf,
        line: usize,
        detail: String,
    },

    // ── Document errors ───────────────────────────────────────────────────
    /// The same label was registered twice under [`crate::config::LabelPolicy::Error`].
    #[error("Label '{label}' is defined twice (first as {first}, then as {second})")]
    LabelCollision {
        label: String,
        first: String,
        second: String,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The external document converter failed.
    #[error("Word export to '{path}' failed: {detail}")]
    ExportFailed { path: PathBuf, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A syntax error found while reading BibTeX source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {detail}")]
pub struct BibTexError {
    /// 1-indexed line of the offending character.
    pub line: usize,
    pub detail: String,
}
