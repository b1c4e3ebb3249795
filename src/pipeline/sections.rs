//! Sectioning commands → headings, then a numbering sweep over the emitted
//! headings that also binds every remaining `\label` to its section.
//!
//! The two steps are separate on purpose: numbers come from the heading
//! markers actually present in the buffer, in line order, so a label is
//! bound to whatever section precedes it in the output.

use crate::context::{DocumentContext, LabelKind};
use crate::error::Tex2MdError;
use crate::pipeline::scan::rewrite_commands;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Pandoc attribute marking a heading that takes no number.
pub const UNNUMBERED: &str = "{.unnumbered}";

const SECTION_COMMANDS: [&str; 3] = ["section", "subsection", "subsubsection"];

static RE_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#{1,3}) (.*)$").unwrap());

/// Rewrite `\section` / `\subsection` / `\subsubsection` to `#` / `##` /
/// `###` headings on their own line, preceded by a blank line.
///
/// Starred forms get the [`UNNUMBERED`] attribute. A `[short]` title is
/// ignored in favour of the full one.
pub fn rewrite_headings(input: &str) -> String {
    rewrite_commands::<()>(input, &SECTION_COMMANDS, |cmd| {
        let depth = match cmd.name {
            "section" => 1,
            "subsection" => 2,
            _ => 3,
        };
        let title = cmd.arg.split_whitespace().collect::<Vec<_>>().join(" ");
        let suffix = if cmd.starred {
            format!(" {UNNUMBERED}")
        } else {
            String::new()
        };
        Ok(format!("\n\n{} {}{}\n", "#".repeat(depth), title, suffix))
    })
    .unwrap_or_else(|()| input.to_string())
}

/// Walk the buffer line by line: advance the section counter at each
/// numbered heading and consume every `\label`, binding it to the current
/// section number.
///
/// A label that appears before the first numbered heading is dropped
/// without registration, so its `\ref` renders as unknown.
pub fn number_sections(
    input: &str,
    ctx: &mut DocumentContext,
    number_headings: bool,
) -> Result<String, Tex2MdError> {
    let mut out = String::with_capacity(input.len());

    for line in input.split_inclusive('\n') {
        let (body, newline) = match line.strip_suffix('\n') {
            Some(body) => (body, "\n"),
            None => (line, ""),
        };

        let mut body = body.to_string();
        if let Some(caps) = RE_HEADING.captures(&body) {
            let title = caps[2].to_string();
            if !title.trim_end().ends_with(UNNUMBERED) {
                let marker = &caps[1];
                let number = ctx.sections.advance(marker.len());
                debug!("Section {} {:?}", number, title);
                ctx.numbered_headings += 1;
                if number_headings {
                    body = format!("{marker} {number} {title}");
                }
                ctx.current_section = Some(number);
            }
        }

        let body = rewrite_commands(&body, &["label"], |cmd| {
            match ctx.current_section.clone() {
                Some(section) => ctx.labels.register(cmd.arg.trim(), LabelKind::Section, section)?,
                None => debug!("Label '{}' precedes any section; not registered", cmd.arg),
            }
            Ok::<_, Tex2MdError>(String::new())
        })?;

        out.push_str(&body);
        out.push_str(newline);
    }

    Ok(out)
}
