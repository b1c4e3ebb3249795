//! Stateless inline rewrites: text formatting, front matter and escaped
//! special characters.
//!
//! Each rule is a single non-greedy substitution over one brace-delimited
//! argument. An argument that itself contains braces (`\textbf{a {b} c}`)
//! is cut at the first `}`; that is a known limitation of this pass, not a
//! bug to paper over here.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_TEXTBF: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\textbf\{(.*?)\}").unwrap());
static RE_EMPH: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\(?:emph|textit)\{(.*?)\}").unwrap());
static RE_TEXTTT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\texttt\{(.*?)\}").unwrap());

static RE_TITLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\title\{(.*?)\}").unwrap());
static RE_AUTHOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\author\{(.*?)\}").unwrap());

static RE_ESCAPED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\([&#$_])").unwrap());

/// `\textbf` → bold, `\emph` / `\textit` → italic, `\texttt` → code span.
pub fn apply_formatting(input: &str) -> String {
    let s = RE_TEXTBF.replace_all(input, "**${1}**");
    let s = RE_EMPH.replace_all(&s, "*${1}*");
    RE_TEXTTT.replace_all(&s, "`${1}`").into_owned()
}

/// `\title` → top-level heading, `\author` → bold "Author:" line.
///
/// Runs after section numbering so the title heading is never counted as
/// a section.
pub fn apply_front_matter(input: &str) -> String {
    let s = RE_TITLE.replace_all(input, "# ${1}\n");
    RE_AUTHOR
        .replace_all(&s, "**Author:** ${1}\n")
        .into_owned()
}

/// `\&`, `\#`, `\$`, `\_` → the bare character; `~` → space.
pub fn unescape_specials(input: &str) -> String {
    RE_ESCAPED
        .replace_all(input, "${1}")
        .replace('~', " ")
}
