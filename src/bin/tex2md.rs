//! CLI binary for tex2md.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tex2md::{convert_file, export_docx, write_atomic, ConversionConfig, LabelPolicy};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Basic conversion (writes paper.md next to paper.tex)
  tex2md paper.tex

  # The .tex extension may be omitted
  tex2md paper

  # Resolve \citet / \citep against a BibTeX file
  tex2md paper.tex -b refs.bib

  # Also produce paper.docx (requires pandoc on PATH)
  tex2md paper.tex -b refs.bib -w

  # Print Markdown to stdout
  tex2md --stdout paper.tex

  # JSON output with stats and the unconverted-command report
  tex2md --json --stdout paper.tex > paper.json

  # Fail on duplicate \label identifiers
  tex2md --label-policy error paper.tex

ENVIRONMENT VARIABLES:
  TEX2MD_OUTPUT           Output path
  TEX2MD_BIBLIOGRAPHY     BibTeX file
  TEX2MD_LABEL_POLICY     overwrite, keep-first, error
  RUST_LOG                Override the log filter (e.g. tex2md=debug)

WHAT IS CONVERTED:
  \section / \subsection / \subsubsection   # / ## / ### headings
  \textbf \emph \textit \texttt             **bold** *italic* `code`
  figure / table / equation environments    <Figure N: caption> placeholders
  \ref \autoref                             resolved numbers
  \footnote                                 [^n] plus a Footnotes section
  \citet \citep \cite \citeauthor \citeyear author-year text plus References
  anything else                             reported, then removed
"#;

/// Convert LaTeX manuscripts to Markdown.
#[derive(Parser, Debug)]
#[command(
    name = "tex2md",
    version,
    about = "Convert LaTeX manuscripts to Markdown",
    long_about = "Convert a LaTeX manuscript to Markdown: headings with hierarchical \
numbers, resolved cross-references, footnotes, and author-year citations with a \
reference list built from a BibTeX file. Optionally export to Word through pandoc.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// LaTeX file (`.tex` is appended when the path has no extension).
    input: PathBuf,

    /// Write output to this file (default: input with `.md` extension).
    #[arg(short, long, env = "TEX2MD_OUTPUT")]
    output: Option<PathBuf>,

    /// BibTeX file used to resolve citations.
    #[arg(short, long, env = "TEX2MD_BIBLIOGRAPHY")]
    bibliography: Option<PathBuf>,

    /// Also write a Word document next to the Markdown (requires pandoc).
    #[arg(short = 'w', long, env = "TEX2MD_WRITE_WORD")]
    write_word: bool,

    /// Output structured JSON (ConversionOutput) instead of Markdown.
    #[arg(long, env = "TEX2MD_JSON")]
    json: bool,

    /// Print to stdout instead of writing a file.
    #[arg(long)]
    stdout: bool,

    /// What to do when a label is defined twice.
    #[arg(long, env = "TEX2MD_LABEL_POLICY", value_enum, default_value = "overwrite")]
    label_policy: LabelPolicyArg,

    /// Prefix headings with their section number (1, 1.1, 1.1.1).
    #[arg(long, env = "TEX2MD_NUMBER_HEADINGS")]
    number_headings: bool,

    /// Leave `<` and `>` unescaped in the Markdown.
    #[arg(long, env = "TEX2MD_NO_ESCAPE")]
    no_escape: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "TEX2MD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "TEX2MD_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LabelPolicyArg {
    Overwrite,
    KeepFirst,
    Error,
}

impl From<LabelPolicyArg> for LabelPolicy {
    fn from(v: LabelPolicyArg) -> Self {
        match v {
            LabelPolicyArg::Overwrite => LabelPolicy::Overwrite,
            LabelPolicyArg::KeepFirst => LabelPolicy::KeepFirst,
            LabelPolicyArg::Error => LabelPolicy::Error,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let config = ConversionConfig::builder()
        .label_policy(cli.label_policy.into())
        .number_headings(cli.number_headings)
        .escape_angle_brackets(!cli.no_escape)
        .build()
        .context("Invalid configuration")?;

    // ── Run conversion ───────────────────────────────────────────────────
    let output = convert_file(&cli.input, cli.bibliography.as_deref(), &config)
        .context("Conversion failed")?;

    let body = if cli.json {
        let mut json =
            serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        json.push('\n');
        json
    } else {
        output.markdown.clone()
    };

    let destination = if cli.stdout {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(body.as_bytes())
            .context("Failed to write to stdout")?;
        None
    } else {
        let path = cli
            .output
            .clone()
            .unwrap_or_else(|| default_output(&cli.input, cli.json));
        write_atomic(&path, &body)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Some(path)
    };

    // ── Word export ──────────────────────────────────────────────────────
    let docx = if cli.write_word {
        let base = destination.as_deref().unwrap_or(cli.input.as_path());
        let path = base.with_extension("docx");
        export_docx(&output.markdown, &path).context("Word export failed")?;
        Some(path)
    } else {
        None
    };

    // ── Summary ──────────────────────────────────────────────────────────
    if !cli.quiet {
        let s = &output.stats;
        let target = match &destination {
            Some(p) => bold(&p.display().to_string()),
            None => dim("stdout"),
        };
        eprintln!(
            "{}  {} sections, {} figures, {} tables, {} footnotes, {} citations  {}ms  →  {}",
            green("✔"),
            s.sections,
            s.figures,
            s.tables,
            s.footnotes,
            s.citations,
            s.duration_ms,
            target,
        );
        if let Some(p) = docx {
            eprintln!("   Word document  →  {}", bold(&p.display().to_string()));
        }
        if !s.unresolved_refs.is_empty() {
            eprintln!("   {} unresolved references: {}", cyan("⚠"), s.unresolved_refs.join(", "));
        }
        if !s.unresolved_citation_keys.is_empty() {
            eprintln!(
                "   {} unresolved citation keys: {}",
                cyan("⚠"),
                s.unresolved_citation_keys.join(", ")
            );
        }
        if !output.unconverted_commands.is_empty() {
            eprintln!(
                "   {}",
                dim(&format!(
                    "{} unconverted command forms removed",
                    output.unconverted_commands.len()
                ))
            );
        }
    }

    Ok(())
}

/// `paper.tex` → `paper.md` (or `paper.json` with `--json`).
fn default_output(input: &Path, json: bool) -> PathBuf {
    input.with_extension(if json { "json" } else { "md" })
}
