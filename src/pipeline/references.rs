//! `\ref` / `\autoref` resolution against the label registry.
//!
//! Runs only after every structural pass has registered its labels, so a
//! forward reference resolves exactly like a backward one.

use crate::context::DocumentContext;
use crate::pipeline::scan::rewrite_commands;
use tracing::debug;

/// Replace `\ref{L}` with the label's value and `\autoref{L}` with
/// "Section 1.2" / "Figure 3" / "Table 1". An unknown label renders as
/// "Unknown L" and is recorded in the context.
pub fn resolve_references(input: &str, ctx: &mut DocumentContext) -> String {
    rewrite_commands::<()>(input, &["ref", "autoref"], |cmd| {
        let label = cmd.arg.trim();
        Ok(match ctx.labels.resolve(label) {
            Some(target) if cmd.name == "autoref" => format!("{} {}", target.kind.title(), target.value),
            Some(target) => target.value.clone(),
            None => {
                debug!("Unresolved reference '{}'", label);
                ctx.unresolved_refs.insert(label.to_string());
                format!("Unknown {label}")
            }
        })
    })
    .unwrap_or_else(|()| input.to_string())
}
