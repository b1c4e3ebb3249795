//! Author-year citations and the reference list.
//!
//! | Command | Renders |
//! |---------|---------|
//! | `\citet{a,b}`, `\cite{a}` | `Smith (2020); Brown and Clark (2019)` |
//! | `\citep{a,b}` | `(Smith 2020; Brown and Clark 2019)` |
//! | `\citeauthor{a}` | `Smith` |
//! | `\citeyear{a}` | `2020` |
//!
//! natbib notes are honoured: one optional argument is a post-note, two are
//! pre- and post-note (`\citep[see][p. 4]{a}` → `(see Smith 2020, p. 4)`).
//!
//! A key missing from the bibliography is dropped from the rendered text
//! and never reaches the reference list. Every resolved key is recorded in
//! first-use order by [`BibliographyLookup`].

use crate::bibliography::{BibEntry, BibliographyLookup, EntryType};
use crate::pipeline::scan::{rewrite_commands, Command};
use indexmap::IndexSet;
use tracing::{debug, warn};

const CITATION_COMMANDS: [&str; 5] = ["citet", "citep", "cite", "citeauthor", "citeyear"];

/// Default shown when an inline citation's entry has no author.
const UNKNOWN_AUTHOR: &str = "Unknown Author";
/// Default shown in the reference list when an entry has no author.
const NO_AUTHOR: &str = "No Author";
const NO_YEAR: &str = "n.d.";

/// Rewrite every citation command. Keys absent from the bibliography are
/// added to `unresolved` and left out of the text.
pub fn format_citations(
    input: &str,
    lookup: &mut BibliographyLookup<'_>,
    unresolved: &mut IndexSet<String>,
) -> String {
    rewrite_commands::<()>(input, &CITATION_COMMANDS, |cmd| {
        let mut resolved = Vec::new();
        for key in cmd.arg.split(',').map(str::trim).filter(|k| !k.is_empty()) {
            match lookup.resolve(key) {
                Some(entry) => resolved.push(entry),
                None => {
                    warn!("Citation key '{}' not found in bibliography", key);
                    unresolved.insert(key.to_string());
                }
            }
        }
        Ok(render_citation(cmd, &resolved))
    })
    .unwrap_or_else(|()| input.to_string())
}

fn render_citation(cmd: &Command<'_>, entries: &[&BibEntry]) -> String {
    if entries.is_empty() {
        return String::new();
    }
    let (pre, post) = match cmd.optional.as_slice() {
        [] => (None, None),
        [post] => (None, Some(post.trim())),
        [pre, post, ..] => (Some(pre.trim()), Some(post.trim())),
    };
    let pre = pre.filter(|s| !s.is_empty());
    let post = post.filter(|s| !s.is_empty());
    let last = entries.len() - 1;

    match cmd.name {
        "citep" => {
            let body = entries
                .iter()
                .map(|e| format!("{} {}", inline_authors(e), inline_year(e)))
                .collect::<Vec<_>>()
                .join("; ");
            let mut out = String::from("(");
            if let Some(pre) = pre {
                out.push_str(pre);
                out.push(' ');
            }
            out.push_str(&body);
            if let Some(post) = post {
                out.push_str(", ");
                out.push_str(post);
            }
            out.push(')');
            out
        }
        "citeauthor" => entries
            .iter()
            .map(|e| inline_authors(e))
            .collect::<Vec<_>>()
            .join("; "),
        "citeyear" => entries
            .iter()
            .map(|e| inline_year(e).to_string())
            .collect::<Vec<_>>()
            .join("; "),
        // citet and natbib's plain \cite are narrative
        _ => entries
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let mut paren = String::new();
                if let (0, Some(pre)) = (i, pre) {
                    paren.push_str(pre);
                    paren.push(' ');
                }
                paren.push_str(inline_year(e));
                if let (true, Some(post)) = (i == last, post) {
                    paren.push_str(", ");
                    paren.push_str(post);
                }
                format!("{} ({})", inline_authors(e), paren)
            })
            .collect::<Vec<_>>()
            .join("; "),
    }
}

fn inline_authors(entry: &BibEntry) -> String {
    entry
        .author()
        .map(|a| join_last_names(&last_names(a)))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string())
}

fn inline_year(entry: &BibEntry) -> &str {
    entry.year().unwrap_or(NO_YEAR)
}

/// Last names from a BibTeX author field.
///
/// Authors are separated by a literal `" and "`. "Last, First" yields the
/// text before the comma; "First Last" yields the final word.
pub fn last_names(authors: &str) -> Vec<&str> {
    authors
        .split(" and ")
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(|a| match a.split_once(',') {
            Some((last, _)) => last.trim(),
            None => a.split_whitespace().last().unwrap_or(a),
        })
        .collect()
}

/// "Smith", "Smith and Jones", "Brown, Clark and Day".
pub fn join_last_names(names: &[&str]) -> String {
    match names {
        [] => String::new(),
        [one] => one.to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

// ── Reference list ───────────────────────────────────────────────────────

/// Render the reference list for every cited key, in first-use order.
///
/// Returns `None` when nothing was cited.
pub fn render_reference_list(lookup: &BibliographyLookup<'_>, heading: &str) -> Option<(String, usize)> {
    let entries: Vec<&BibEntry> = lookup.cited().filter_map(|key| lookup.get(key)).collect();
    if entries.is_empty() {
        return None;
    }
    debug!("Rendering {} reference-list entries", entries.len());

    let mut out = format!("\n\n# {heading}\n\n");
    for entry in &entries {
        out.push_str(&format_reference(entry));
        out.push_str("\n\n");
    }
    Some((out, entries.len()))
}

/// One reference-list entry, formatted by entry type.
///
/// Missing fields render empty; only author ("No Author") and year
/// ("n.d.") have defaults.
pub fn format_reference(entry: &BibEntry) -> String {
    let author = entry.author().unwrap_or(NO_AUTHOR);
    let year = entry.year().unwrap_or(NO_YEAR);
    let title = entry.title().unwrap_or_default();
    let field = |name: &str| entry.field(name).unwrap_or_default();

    match &entry.entry_type {
        EntryType::Article => {
            let issue = match field("number") {
                "" => String::new(),
                n => format!("({n})"),
            };
            format!(
                "{author} ({year}). {}. {}, {}{issue}: {}.",
                quoted(title),
                italic(field("journal")),
                field("volume"),
                field("pages"),
            )
        }
        EntryType::Book => format!(
            "{author} ({year}). {}. {}.",
            italic(title),
            field("publisher")
        ),
        EntryType::InProceedings => format!(
            "{author} ({year}). {}. In {}, pp. {}.",
            quoted(title),
            italic(field("booktitle")),
            field("pages")
        ),
        EntryType::Other(_) => format!("{author} ({year}). {}.", italic(title)),
    }
}

fn italic(s: &str) -> String {
    if s.is_empty() {
        String::new()
    } else {
        format!("*{s}*")
    }
}

fn quoted(s: &str) -> String {
    format!("\"{s}\"")
}
