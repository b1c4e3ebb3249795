//! Pipeline stages for LaTeX-to-Markdown conversion.
//!
//! Each submodule implements exactly one transformation step over the whole
//! document buffer. Stages share nothing but the buffer and the
//! [`DocumentContext`] threaded through [`run`], so each is testable on its
//! own.
//!
//! ## Data Flow
//!
//! ```text
//! source ──▶ comments ──▶ inline ──▶ environments ──▶ sections ──▶ references
//!                                    (fig/tab labels)  (numbers,   (\ref, \autoref)
//!                                                       sec labels)
//!        ──▶ front matter ──▶ footnotes ──▶ citations ──▶ specials ──▶ residual ──▶ postprocess
//!                                          (if .bib)                  (lossy)      (cleanup)
//! ```
//!
//! 1. [`comments`]:     drop `%` comments, keep `\%`
//! 2. [`inline`]:       bold / italic / code spans
//! 3. [`environments`]: figure, table and equation blocks → placeholders
//! 4. [`sections`]:     headings, hierarchical numbers, section labels
//! 5. [`references`]:   resolve against every registered label
//! 6. [`inline`]:       `\title` / `\author`, after numbering
//! 7. [`footnotes`]:    `[^n]` markers plus the definitions block
//! 8. [`citations`]:    author-year text plus the reference list
//! 9. [`inline`]:       escaped specials, `~`
//! 10. [`residual`]:    report and erase whatever LaTeX is left
//! 11. [`postprocess`]: whitespace, heading spacing, `<`/`>` escaping

pub mod citations;
pub mod comments;
pub mod environments;
pub mod footnotes;
pub mod inline;
pub mod postprocess;
pub mod references;
pub mod residual;
pub mod scan;
pub mod sections;

use crate::bibliography::{Bibliography, BibliographyLookup};
use crate::config::ConversionConfig;
use crate::context::DocumentContext;
use crate::error::Tex2MdError;
use crate::output::{ConversionOutput, ConversionStats};
use indexmap::IndexSet;
use std::time::Instant;
use tracing::debug;

/// Run every pass, in order, over one LaTeX document.
///
/// The citation pass (and with it the reference list) only runs when a
/// bibliography is supplied; without one, citation commands fall through to
/// the residual pass like any other unknown command.
pub fn run(
    source: &str,
    bibliography: Option<&Bibliography>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Tex2MdError> {
    let start = Instant::now();
    let mut ctx = DocumentContext::new(config.label_policy);

    let s = postprocess::normalise_line_endings(source);

    let s = comments::strip_comments(&s);
    debug!("comments stripped ({} bytes)", s.len());

    let s = inline::apply_formatting(&s);

    let s = environments::replace_environments(&s, &mut ctx)?;
    debug!(
        "environments: {} figures, {} tables, {} equations",
        ctx.counters.figures, ctx.counters.tables, ctx.counters.equations
    );

    let s = sections::rewrite_headings(&s);
    let s = sections::number_sections(&s, &mut ctx, config.number_headings)?;
    debug!(
        "sections: {} numbered, {} labels registered",
        ctx.numbered_headings,
        ctx.labels.registrations()
    );

    let s = references::resolve_references(&s, &mut ctx);
    let s = inline::apply_front_matter(&s);

    let s = footnotes::collect_footnotes(&s, &mut ctx, &config.footnotes_heading);
    debug!("footnotes: {}", ctx.footnotes.len());

    let mut unresolved_keys = IndexSet::new();
    let mut citations = 0;
    let mut references_listed = 0;
    let s = match bibliography {
        Some(db) => {
            let mut lookup = BibliographyLookup::new(db);
            let mut s = citations::format_citations(&s, &mut lookup, &mut unresolved_keys);
            if let Some((list, n)) =
                citations::render_reference_list(&lookup, &config.references_heading)
            {
                s.push_str(&list);
                references_listed = n;
            }
            citations = lookup.cited_count();
            debug!(
                "citations: {} resolved, {} unresolved",
                citations,
                unresolved_keys.len()
            );
            s
        }
        None => s,
    };

    let s = inline::unescape_specials(&s);
    let (s, unconverted_commands) = residual::strip_residual(&s);
    let markdown = postprocess::clean_markdown(&s, config.escape_angle_brackets);

    let stats = ConversionStats {
        sections: ctx.numbered_headings,
        figures: ctx.counters.figures as usize,
        tables: ctx.counters.tables as usize,
        equations: ctx.counters.equations as usize,
        footnotes: ctx.footnotes.len(),
        labels: ctx.labels.registrations(),
        unresolved_refs: ctx.unresolved_refs.into_iter().collect(),
        citations,
        unresolved_citation_keys: unresolved_keys.into_iter().collect(),
        references_listed,
        duration_ms: start.elapsed().as_millis() as u64,
    };

    Ok(ConversionOutput {
        markdown,
        unconverted_commands,
        stats,
    })
}
