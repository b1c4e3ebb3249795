//! Footnote collection: inline `[^n]` markers plus a definitions block.
//!
//! Bodies are captured with a single non-greedy brace match, like the inline
//! formatting rules; a footnote containing nested braces is cut at the first
//! `}`. Formatting and `\ref` are rewritten before this pass, so the usual
//! casualty is a citation: `\footnote{See \citet{smith2020}.}` yields the
//! body `See \citet{smith2020` and leaves `.}` in the running text. Any other
//! braced command left for the residual pass (`\url{…}`) is cut the same way.

use crate::context::DocumentContext;
use once_cell::sync::Lazy;
use regex::Regex;

static RE_FOOTNOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\\footnote\{(.*?)\}").unwrap());

/// Replace each `\footnote{body}` with `[^n]` (n from 1, document order)
/// and, when any were found, append a `heading` section listing
/// `[^n]: body` in order.
pub fn collect_footnotes(input: &str, ctx: &mut DocumentContext, heading: &str) -> String {
    let mut out = RE_FOOTNOTE
        .replace_all(input, |caps: &regex::Captures<'_>| {
            let n = ctx.footnotes.push(caps[1].trim());
            format!("[^{n}]")
        })
        .into_owned();

    if ctx.footnotes.is_empty() {
        return out;
    }

    out.push_str(&format!("\n\n# {heading}\n\n"));
    for (n, body) in ctx.footnotes.iter() {
        out.push_str(&format!("[^{n}]: {body}\n\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LabelPolicy;

    fn ctx() -> DocumentContext {
        DocumentContext::new(LabelPolicy::Overwrite)
    }

    #[test]
    fn markers_and_definitions_match() {
        let mut ctx = ctx();
        let out = collect_footnotes(
            r"One\footnote{First note.} two\footnote{Second note.} end.",
            &mut ctx,
            "Footnotes",
        );
        assert!(out.starts_with("One[^1] two[^2] end."));
        assert!(out.contains("\n\n# Footnotes\n\n"));
        assert!(out.contains("[^1]: First note.\n"));
        assert!(out.contains("[^2]: Second note.\n"));
        assert!(out.find("[^1]: ").unwrap() < out.find("[^2]: ").unwrap());
        assert_eq!(ctx.footnotes.len(), 2);
    }

    #[test]
    fn no_footnotes_no_block() {
        let mut ctx = ctx();
        assert_eq!(collect_footnotes("plain", &mut ctx, "Footnotes"), "plain");
    }

    #[test]
    fn multiline_body() {
        let mut ctx = ctx();
        let out = collect_footnotes("a\\footnote{spans\ntwo lines}", &mut ctx, "Notes");
        assert!(out.contains("# Notes"));
        assert!(out.contains("[^1]: spans\ntwo lines"));
    }

    #[test]
    fn nested_braces_cut_at_first_close() {
        let mut ctx = ctx();
        let out = collect_footnotes(r"x\footnote{See \citet{smith2020}.} y", &mut ctx, "Footnotes");
        assert!(out.starts_with("x[^1].} y"), "got: {out}");
        assert!(out.contains(r"[^1]: See \citet{smith2020"));
    }
}
