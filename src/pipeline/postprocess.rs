//! Post-processing: deterministic cleanup of the rewritten buffer.
//!
//! The rewriting passes splice text in and out without caring about the
//! whitespace they leave behind: a removed `\label` leaves an empty line, an
//! environment placeholder is padded with blank lines, a stripped preamble
//! leaves a run of empty lines at the top. These rules turn that into tidy
//! Markdown without touching content.
//!
//! ## Rule Order
//!
//! Trim trailing whitespace before collapsing blank lines (a line of spaces
//! is not blank until trimmed), and space headings after collapsing so the
//! inserted blank line is not collapsed again.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all post-processing rules to the converted Markdown.
///
/// Rules (applied in order):
/// 1. Trim trailing whitespace per line
/// 2. Collapse runs of blank lines down to one
/// 3. Ensure heading lines have a blank line before them
/// 4. Escape `<` / `>` as HTML entities (when `escape_angle_brackets`)
/// 5. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens, etc.)
/// 6. Drop leading blank lines and end with exactly one newline
pub fn clean_markdown(input: &str, escape_angle_brackets: bool) -> String {
    let s = trim_trailing_whitespace(input);
    let s = collapse_blank_lines(&s);
    let s = normalise_heading_spacing(&s);
    let s = if escape_angle_brackets {
        escape_angles(&s)
    } else {
        s
    };
    let s = remove_invisible_chars(&s);
    trim_document(&s)
}

// ── Line endings (run before the first pass) ─────────────────────────────────

/// CRLF / CR → LF, so every pass can split on `'\n'` alone.
pub fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 1: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 2: Collapse excessive blank lines ───────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").to_string()
}

// ── Rule 3: Normalise heading spacing ────────────────────────────────────────

static RE_HEADING_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#{1,6} ").unwrap());

fn normalise_heading_spacing(input: &str) -> String {
    // Ensure a blank line before each heading (unless at the very start)
    let mut result = String::with_capacity(input.len() + 64);
    for (i, line) in input.lines().enumerate() {
        if RE_HEADING_LINE.is_match(line) && i > 0 {
            let trimmed = result.trim_end_matches('\n');
            result.truncate(trimmed.len());
            if !result.is_empty() {
                result.push_str("\n\n");
            }
        }
        result.push_str(line);
        result.push('\n');
    }
    result
}

// ── Rule 4: Escape angle brackets ────────────────────────────────────────────
//
// Placeholders such as `<Figure 1: caption>` look like HTML to a Markdown
// reader and would be dropped on export.

fn escape_angles(input: &str) -> String {
    input.replace('<', "&lt;").replace('>', "&gt;")
}

// ── Rule 5: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 6: Trim document ends ───────────────────────────────────────────────

fn trim_document(input: &str) -> String {
    let trimmed = input.trim_start_matches('\n').trim_end();
    if trimmed.is_empty() {
        String::from("\n")
    } else {
        format!("{}\n", trimmed)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
