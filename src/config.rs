//! Configuration types for LaTeX-to-Markdown conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The defaults reproduce the plain
//! behaviour of the pass pipeline; every knob here only changes how a result
//! is rendered or how a label collision is treated.

use crate::error::Tex2MdError;
use serde::{Deserialize, Serialize};

/// Configuration for a LaTeX-to-Markdown conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use tex2md::{ConversionConfig, LabelPolicy};
///
/// let config = ConversionConfig::builder()
///     .label_policy(LabelPolicy::Error)
///     .number_headings(true)
///     .build()
///     .unwrap();
/// assert!(config.number_headings);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// What happens when one label identifier is registered twice. Default: [`LabelPolicy::Overwrite`].
    pub label_policy: LabelPolicy,

    /// Prefix numbered headings with their section number ("## 1.2 Methods"). Default: false.
    ///
    /// The number is always computed for `\ref`; this only controls whether it
    /// is also printed in the heading itself.
    pub number_headings: bool,

    /// Escape literal `<` / `>` as `&lt;` / `&gt;`. Default: true.
    ///
    /// The figure/table placeholders are angle-bracketed pseudo-tags. Without
    /// escaping, a downstream Markdown converter reads them as raw HTML and
    /// drops them.
    pub escape_angle_brackets: bool,

    /// Heading text of the appended footnote-definitions block. Default: "Footnotes".
    pub footnotes_heading: String,

    /// Heading text of the rendered reference list. Default: "References".
    pub references_heading: String,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            label_policy: LabelPolicy::default(),
            number_headings: false,
            escape_angle_brackets: true,
            footnotes_heading: "Footnotes".to_string(),
            references_heading: "References".to_string(),
        }
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn label_policy(mut self, policy: LabelPolicy) -> Self {
        self.config.label_policy = policy;
        self
    }

    pub fn number_headings(mut self, v: bool) -> Self {
        self.config.number_headings = v;
        self
    }

    pub fn escape_angle_brackets(mut self, v: bool) -> Self {
        self.config.escape_angle_brackets = v;
        self
    }

    pub fn footnotes_heading(mut self, heading: impl Into<String>) -> Self {
        self.config.footnotes_heading = heading.into();
        self
    }

    pub fn references_heading(mut self, heading: impl Into<String>) -> Self {
        self.config.references_heading = heading.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Tex2MdError> {
        let c = &self.config;
        for (name, heading) in [
            ("footnotes_heading", &c.footnotes_heading),
            ("references_heading", &c.references_heading),
        ] {
            if heading.trim().is_empty() {
                return Err(Tex2MdError::InvalidConfig(format!(
                    "{name} must not be empty"
                )));
            }
            if heading.contains('\n') {
                return Err(Tex2MdError::InvalidConfig(format!(
                    "{name} must be a single line, got {heading:?}"
                )));
            }
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Policy for a label identifier that is registered more than once.
///
/// Sections, figures and tables share one `\label` namespace in LaTeX, so an
/// author who writes `\label{results}` on both a section and a figure gets an
/// ambiguous `\ref{results}`. The registry keeps every registration together
/// with its construct kind; the policy decides which one `\ref` sees.
///
/// | Policy | `\ref` resolves to |
/// |--------|--------------------|
/// | `Overwrite` | the most recent registration (default) |
/// | `KeepFirst` | the earliest registration |
/// | `Error` | nothing: the second registration aborts the conversion |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LabelPolicy {
    /// Later registrations win. (default)
    #[default]
    Overwrite,
    /// The first registration wins; later ones are kept but never resolved.
    KeepFirst,
    /// A second registration is [`Tex2MdError::LabelCollision`].
    Error,
}
