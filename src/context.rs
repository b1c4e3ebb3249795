//! Per-document state threaded through the passes.
//!
//! Counters, the label registry and the footnote store live in one
//! [`DocumentContext`] that is created fresh for every conversion job and
//! dropped once the final buffer is produced. Passes borrow it mutably one
//! after another; nothing here scans text.

use crate::config::LabelPolicy;
use crate::error::Tex2MdError;
use indexmap::{IndexMap, IndexSet};
use std::fmt;
use tracing::debug;

/// Deepest heading level that is numbered (`\subsubsection`).
pub const MAX_SECTION_DEPTH: usize = 3;

// ── Section counter ──────────────────────────────────────────────────────

/// Hierarchical `(section, subsection, subsubsection)` counter.
///
/// Advancing level *k* resets every level below it to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionCounter {
    levels: [u32; MAX_SECTION_DEPTH],
}

impl SectionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the counter at `depth` (1-indexed, clamped to 1..=3) and
    /// return the formatted number.
    pub fn advance(&mut self, depth: usize) -> String {
        let idx = depth.clamp(1, MAX_SECTION_DEPTH) - 1;
        self.levels[idx] += 1;
        for level in &mut self.levels[idx + 1..] {
            *level = 0;
        }
        // at least one level is non-zero after an increment
        self.format().unwrap_or_default()
    }

    pub fn levels(&self) -> [u32; MAX_SECTION_DEPTH] {
        self.levels
    }

    /// "1", "1.2", "1.2.3" with trailing zero levels omitted; `None` before
    /// the first advance.
    pub fn format(&self) -> Option<String> {
        let last = self.levels.iter().rposition(|&n| n != 0)?;
        Some(
            self.levels[..=last]
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join("."),
        )
    }
}

// ── Figure / table / equation counters ───────────────────────────────────

/// Independent ordinals for numbered environments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub figures: u32,
    pub tables: u32,
    pub equations: u32,
}

impl Counters {
    pub fn next_figure(&mut self) -> u32 {
        self.figures += 1;
        self.figures
    }

    pub fn next_table(&mut self) -> u32 {
        self.tables += 1;
        self.tables
    }

    pub fn next_equation(&mut self) -> u32 {
        self.equations += 1;
        self.equations
    }
}

// ── Label registry ───────────────────────────────────────────────────────

/// The construct a label was attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelKind {
    Section,
    Figure,
    Table,
}

impl LabelKind {
    /// Capitalised name used by `\autoref`.
    pub fn title(self) -> &'static str {
        match self {
            LabelKind::Section => "Section",
            LabelKind::Figure => "Figure",
            LabelKind::Table => "Table",
        }
    }
}

impl fmt::Display for LabelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LabelKind::Section => "section",
            LabelKind::Figure => "figure",
            LabelKind::Table => "table",
        })
    }
}

/// What a label resolves to: a section number or a figure/table ordinal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTarget {
    pub kind: LabelKind,
    pub value: String,
}

impl fmt::Display for LabelTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.value)
    }
}

/// Label → target map; every target is tagged with its construct kind.
///
/// Every registration is kept in order under its identifier; the
/// [`LabelPolicy`] decides which one [`LabelRegistry::resolve`] returns, or
/// whether a second registration is an error.
#[derive(Debug, Clone, Default)]
pub struct LabelRegistry {
    policy: LabelPolicy,
    entries: IndexMap<String, Vec<LabelTarget>>,
    registrations: usize,
}

impl LabelRegistry {
    pub fn new(policy: LabelPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn register(
        &mut self,
        id: &str,
        kind: LabelKind,
        value: impl Into<String>,
    ) -> Result<(), Tex2MdError> {
        let target = LabelTarget {
            kind,
            value: value.into(),
        };
        match self.entries.get_mut(id) {
            Some(existing) => {
                if self.policy == LabelPolicy::Error {
                    return Err(Tex2MdError::LabelCollision {
                        label: id.to_string(),
                        first: existing[0].to_string(),
                        second: target.to_string(),
                    });
                }
                debug!(
                    "Label '{}' redefined as {} (policy {:?})",
                    id, target, self.policy
                );
                existing.push(target);
            }
            None => {
                self.entries.insert(id.to_string(), vec![target]);
            }
        }
        self.registrations += 1;
        Ok(())
    }

    pub fn resolve(&self, id: &str) -> Option<&LabelTarget> {
        let targets = self.entries.get(id)?;
        match self.policy {
            LabelPolicy::KeepFirst => targets.first(),
            LabelPolicy::Overwrite | LabelPolicy::Error => targets.last(),
        }
    }

    pub fn registrations(&self) -> usize {
        self.registrations
    }
}

// ── Footnote store ───────────────────────────────────────────────────────

/// Footnote bodies in first-occurrence order; footnote *n* is `bodies[n - 1]`.
#[derive(Debug, Clone, Default)]
pub struct FootnoteStore {
    bodies: Vec<String>,
}

impl FootnoteStore {
    /// Store a body and return its 1-based number.
    pub fn push(&mut self, body: impl Into<String>) -> usize {
        self.bodies.push(body.into());
        self.bodies.len()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.bodies
            .iter()
            .enumerate()
            .map(|(i, body)| (i + 1, body.as_str()))
    }
}

// ── Document context ─────────────────────────────────────────────────────

/// All mutable state of one conversion job.
#[derive(Debug, Clone, Default)]
pub struct DocumentContext {
    pub sections: SectionCounter,
    /// Number of the most recent numbered heading, for `\label` binding.
    pub current_section: Option<String>,
    pub numbered_headings: usize,
    pub counters: Counters,
    pub labels: LabelRegistry,
    pub footnotes: FootnoteStore,
    pub unresolved_refs: IndexSet<String>,
}

impl DocumentContext {
    pub fn new(policy: LabelPolicy) -> Self {
        Self {
            labels: LabelRegistry::new(policy),
            ..Self::default()
        }
    }
}
