//! Residual command stripping: the blunt, lossy last pass.
//!
//! Whatever LaTeX survived the earlier passes is first reported (sorted,
//! distinct command forms, for the operator) and then erased: every
//! backslash plus the following run of non-whitespace, plus at most one
//! trailing space or tab. Newlines are never consumed, so headings and
//! paragraphs keep their line structure.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use tracing::warn;

static RE_COMMAND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\[a-zA-Z]+\*?(?:\[[^\]]*\])?(?:\{[^\}]*\})?").unwrap());

static RE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\\S*[ \t]?").unwrap());

/// Sorted, distinct command forms still present in `input`.
pub fn unconverted_commands(input: &str) -> Vec<String> {
    RE_COMMAND
        .find_iter(input)
        .map(|m| m.as_str().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Report and erase every remaining backslash token.
pub fn strip_residual(input: &str) -> (String, Vec<String>) {
    let report = unconverted_commands(input);
    if !report.is_empty() {
        warn!(
            "Remaining LaTeX commands that are not converted: {:?}",
            report
        );
    }
    (RE_TOKEN.replace_all(input, "").into_owned(), report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_is_sorted_and_distinct() {
        let input = r"\maketitle \usepackage[utf8]{inputenc} \maketitle \begin{itemize} \item x";
        assert_eq!(
            unconverted_commands(input),
            vec![
                r"\begin{itemize}",
                r"\item",
                r"\maketitle",
                r"\usepackage[utf8]{inputenc}",
            ]
        );
    }

    #[test]
    fn erases_tokens_up_to_whitespace() {
        let (out, _) = strip_residual("\\noindent Text \\hfill more\n\\maketitle\nEnd");
        assert_eq!(out, "Text more\n\nEnd");
    }

    #[test]
    fn erases_token_at_end_of_buffer() {
        let (out, report) = strip_residual(r"Body \end{document}");
        assert_eq!(out, "Body ");
        assert_eq!(report, vec![r"\end{document}"]);
    }

    #[test]
    fn lossy_on_spaced_arguments() {
        let (out, _) = strip_residual(r"see \href{http://x}{the site} now");
        assert_eq!(out, "see site} now");
    }

    #[test]
    fn idempotent() {
        let input = "\\documentclass{article}\n\\begin{document}\n# T\n\\\\ a \\x{b c} \\é\n\\end{document}";
        let (once, _) = strip_residual(input);
        let (twice, report) = strip_residual(&once);
        assert_eq!(once, twice);
        assert!(report.is_empty());
        assert!(!once.contains('\\'));
    }

    #[test]
    fn clean_input_untouched() {
        let (out, report) = strip_residual("# Heading\n\nPlain *text*.\n");
        assert_eq!(out, "# Heading\n\nPlain *text*.\n");
        assert!(report.is_empty());
    }
}
