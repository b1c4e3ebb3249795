//! Conversion entry points.
//!
//! [`convert`] is the pure core: LaTeX text in, Markdown plus stats out.
//! The file-based wrappers add input resolution, bibliography loading and an
//! atomic output write around it.

use crate::bibliography::Bibliography;
use crate::bibtex;
use crate::config::ConversionConfig;
use crate::error::Tex2MdError;
use crate::output::{ConversionOutput, ConversionStats};
use crate::pipeline;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Convert LaTeX source text to Markdown.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `latex`: the full LaTeX document (preamble included)
/// * `bibliography`: cited entries; `None` skips citation formatting
/// * `config`: conversion configuration
///
/// # Errors
/// Only [`Tex2MdError::LabelCollision`] under
/// [`crate::config::LabelPolicy::Error`]. Unknown labels, unknown citation
/// keys and unconverted commands are reported in the output instead.
pub fn convert(
    latex: &str,
    bibliography: Option<&Bibliography>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Tex2MdError> {
    info!(
        "Starting conversion: {} bytes, bibliography: {}",
        latex.len(),
        bibliography.map_or(0, Bibliography::len)
    );
    let output = pipeline::run(latex, bibliography, config)?;

    if !output.stats.unresolved_refs.is_empty() {
        warn!("Unresolved references: {:?}", output.stats.unresolved_refs);
    }
    info!(
        "Conversion complete: {} sections, {} figures, {} tables, {} citations, {}ms",
        output.stats.sections,
        output.stats.figures,
        output.stats.tables,
        output.stats.citations,
        output.stats.duration_ms
    );
    Ok(output)
}

/// Read and parse a BibTeX file.
///
/// An unreadable file is [`Tex2MdError::BibliographyUnreadable`]; a syntax
/// error is [`Tex2MdError::BibliographyMalformed`]. Both are fatal: a
/// document converted against a half-read bibliography would silently drop
/// citations.
pub fn load_bibliography(path: impl AsRef<Path>) -> Result<Bibliography, Tex2MdError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| Tex2MdError::BibliographyUnreadable {
        path: path.to_path_buf(),
        source: e,
    })?;
    let bib = bibtex::parse(&text).map_err(|e| Tex2MdError::BibliographyMalformed {
        path: path.to_path_buf(),
        line: e.line,
        detail: e.detail,
    })?;
    info!("Loaded {} bibliography entries from {}", bib.len(), path.display());
    Ok(bib)
}

/// Convert a LaTeX file, optionally against a BibTeX file.
///
/// A path without an extension that does not exist is retried with `.tex`
/// appended, so `tex2md paper` finds `paper.tex`.
pub fn convert_file(
    input: impl AsRef<Path>,
    bibliography: Option<&Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Tex2MdError> {
    let path = resolve_input(input.as_ref())?;
    let latex = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
        ErrorKind::PermissionDenied => Tex2MdError::PermissionDenied { path: path.clone() },
        _ => Tex2MdError::ReadFailed {
            path: path.clone(),
            source: e,
        },
    })?;

    let bib = bibliography.map(load_bibliography).transpose()?;
    convert(&latex, bib.as_ref(), config)
}

/// Convert a LaTeX file and write the Markdown directly to `output_path`.
///
/// Uses atomic write (temp file in the same directory + rename) to prevent
/// partial files.
pub fn convert_to_file(
    input: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    bibliography: Option<&Path>,
    config: &ConversionConfig,
) -> Result<ConversionStats, Tex2MdError> {
    let output = convert_file(input, bibliography, config)?;
    write_atomic(output_path.as_ref(), &output.markdown)?;
    Ok(output.stats)
}

/// Write `contents` to `path` via a sibling temp file and rename.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), Tex2MdError> {
    let write_err = |e: std::io::Error| Tex2MdError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(write_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(&parent).map_err(write_err)?;
    tmp.write_all(contents.as_bytes()).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Resolve a local LaTeX path, checking existence and read permission.
fn resolve_input(path: &Path) -> Result<PathBuf, Tex2MdError> {
    let path = if !path.exists() && path.extension().is_none() {
        path.with_extension("tex")
    } else {
        path.to_path_buf()
    };

    if !path.is_file() {
        return Err(Tex2MdError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            return Err(Tex2MdError::PermissionDenied { path });
        }
        Err(_) => return Err(Tex2MdError::FileNotFound { path }),
    }

    debug!("Resolved local LaTeX file: {}", path.display());
    Ok(path)
}
