//! # tex2md
//!
//! Convert LaTeX manuscripts to Markdown, with author-year citations
//! resolved against a BibTeX file and optional Word export through pandoc.
//!
//! ## Pipeline Overview
//!
//! ```text
//! .tex (+ .bib)
//!  │
//!  ├─ 1. Clean       comments, line endings
//!  ├─ 2. Inline      \textbf, \emph, \textit, \texttt
//!  ├─ 3. Blocks      figure / table / equation → placeholders, labels registered
//!  ├─ 4. Structure   headings, 1 / 1.1 / 1.1.1 numbers, section labels
//!  ├─ 5. Resolve     \ref, \autoref, \title, \author, footnotes
//!  ├─ 6. Cite        \citet / \citep / … + reference list (only with a .bib)
//!  ├─ 7. Residual    report and erase every remaining command
//!  └─ 8. Polish      whitespace, heading spacing, <> escaping
//! ```
//!
//! The conversion is a fixed sequence of text-rewriting passes. It does not
//! parse LaTeX into a tree and is intentionally lossy: commands it does not
//! know are reported in [`ConversionOutput::unconverted_commands`] and then
//! removed.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tex2md::{convert_file, ConversionConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let output = convert_file("paper.tex", Some(Path::new("refs.bib")), &config)?;
//!     println!("{}", output.markdown);
//!     eprintln!("{} sections, {} citations",
//!         output.stats.sections,
//!         output.stats.citations);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `tex2md` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! tex2md = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod bibliography;
pub mod bibtex;
pub mod config;
pub mod context;
pub mod convert;
pub mod error;
pub mod export;
pub mod output;
pub mod pipeline;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use bibliography::{BibEntry, Bibliography, BibliographyLookup, EntryType};
pub use config::{ConversionConfig, ConversionConfigBuilder, LabelPolicy};
pub use context::{DocumentContext, LabelKind, LabelRegistry, SectionCounter};
pub use convert::{convert, convert_file, convert_to_file, load_bibliography, write_atomic};
pub use error::{BibTexError, Tex2MdError};
pub use export::export_docx;
pub use output::{ConversionOutput, ConversionStats};
