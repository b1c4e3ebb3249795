//! Figure, table and equation blocks → compact placeholders.
//!
//! Each block is found with a nesting-aware scan (a `figure` inside a
//! `figure` closes at the outer `\end{figure}`), replaced by a one-line
//! pseudo-tag, and, for figures and tables, its `\label` is registered
//! against the block's ordinal. Equations get a generic placeholder and take
//! no part in numbering or labelling.

use crate::context::{DocumentContext, LabelKind};
use crate::error::Tex2MdError;
use crate::pipeline::scan::{close_environment, find_command, next_begin, rewrite_commands};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnvKind {
    Figure,
    Table,
    Equation,
}

impl EnvKind {
    fn classify(name: &str) -> Option<Self> {
        match name {
            "figure" | "figure*" => Some(EnvKind::Figure),
            "table" | "table*" => Some(EnvKind::Table),
            "equation" | "equation*" | "align" | "align*" | "displaymath" => {
                Some(EnvKind::Equation)
            }
            _ => None,
        }
    }
}

/// Replace every recognised environment, registering figure/table labels.
///
/// An unterminated environment is left in place (the residual pass will
/// strip its commands) and reported with `warn!`.
pub fn replace_environments(
    input: &str,
    ctx: &mut DocumentContext,
) -> Result<String, Tex2MdError> {
    let mut out = String::with_capacity(input.len());
    let mut last = 0;
    let mut pos = 0;

    while let Some((start, name, body_start)) = next_begin(input, pos) {
        let Some(kind) = EnvKind::classify(name) else {
            pos = body_start;
            continue;
        };
        let Some(span) = close_environment(input, name, start, body_start) else {
            warn!("Unterminated \\begin{{{}}} at byte {}; left as is", name, start);
            pos = body_start;
            continue;
        };

        out.push_str(&input[last..start]);
        out.push_str("\n\n");
        out.push_str(&placeholder(kind, span.body, ctx)?);
        out.push_str("\n\n");
        last = span.end;
        pos = span.end;
    }

    out.push_str(&input[last..]);
    Ok(out)
}

fn placeholder(kind: EnvKind, body: &str, ctx: &mut DocumentContext) -> Result<String, Tex2MdError> {
    let (label_kind, title, ordinal) = match kind {
        EnvKind::Figure => (LabelKind::Figure, "Figure", ctx.counters.next_figure()),
        EnvKind::Table => (LabelKind::Table, "Table", ctx.counters.next_table()),
        EnvKind::Equation => {
            let n = ctx.counters.next_equation();
            debug!("Equation block {} replaced", n);
            return Ok("<Equation>".to_string());
        }
    };

    if let Some(label) = find_command(body, "label") {
        ctx.labels
            .register(label.arg.trim(), label_kind, ordinal.to_string())?;
    }

    let caption = find_command(body, "caption").map(|c| caption_text(c.arg));
    debug!("{} {} replaced (caption: {:?})", title, ordinal, caption);

    Ok(match caption {
        Some(text) if !text.is_empty() => format!("<{title} {ordinal}: {text}>"),
        _ => format!("<{title} {ordinal}>"),
    })
}

/// Caption without any embedded `\label`, on one line.
fn caption_text(raw: &str) -> String {
    let without_labels =
        rewrite_commands::<()>(raw, &["label"], |_| Ok(String::new())).unwrap_or_default();
    without_labels.split_whitespace().collect::<Vec<_>>().join(" ")
}
