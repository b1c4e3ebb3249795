//! End-to-end integration tests for tex2md.
//!
//! Every test drives the public API only: LaTeX text (or a file on disk) in,
//! Markdown plus stats out. Files are written to a fresh `TempDir` per test.
//!
//! Run with:
//!   cargo test --test e2e -- --nocapture

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tex2md::pipeline::residual::strip_residual;
use tex2md::{
    bibtex, convert, convert_file, convert_to_file, ConversionConfig, ConversionOutput,
    LabelPolicy, Tex2MdError,
};

// ── Fixtures ─────────────────────────────────────────────────────────────────

const MANUSCRIPT: &str = r"\documentclass{article}
\usepackage{natbib}
% A sample manuscript
\title{Testing Conversions}
\author{Jane Doe}
\begin{document}
\maketitle

\section{Introduction}\label{sec:intro}
Prior work \citep{smith2020} shows \textbf{bold} results.
\citet{bcd} extend this, see Figure~\ref{fig:plot} and Section~\ref{sec:method}.
Costs are 5\% lower\footnote{Measured on the test set.}.

\begin{figure}[t]
\centering
\includegraphics[width=\linewidth]{plot.png}
\caption{A \emph{simple} plot}
\label{fig:plot}
\end{figure}

\section{Method}\label{sec:method}
\subsection{Data}
We use \texttt{data.csv} as in \citep{smith2020}.
\begin{table}
\caption{Results}\label{tab:res}
\begin{tabular}{cc} a & b \\ \end{tabular}
\end{table}
Table~\ref{tab:res} summarises \autoref{sec:model}.
\subsection{Model}\label{sec:model}
\begin{equation}
E = mc^2
\end{equation}

\section*{Acknowledgements}
Thanks.
\bibliographystyle{plainnat}
\bibliography{refs}
\end{document}
";

const REFS: &str = r#"@string{jot = "Journal of Tests"}

@article{smith2020,
  author  = {Smith, John},
  title   = {On {Testing} Things},
  journal = jot,
  year    = 2020,
  volume  = {12},
  number  = {3},
  pages   = {1--10},
}

@book{bcd,
  author    = "Alice Brown and Bob Clark and Carol Day",
  title     = {A Book of Tests},
  publisher = {Pub House},
  year      = {2019}
}

@comment{never cited}
@inproceedings{unused, author = {Nobody}, title = {Never Cited}, booktitle = {Conf}, year = {2001}}
"#;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn plain() -> ConversionConfig {
    ConversionConfig::builder()
        .escape_angle_brackets(false)
        .build()
        .unwrap()
}

fn run(latex: &str) -> ConversionOutput {
    convert(latex, None, &plain()).unwrap()
}

fn run_with_refs(latex: &str, bib: &str) -> ConversionOutput {
    let db = bibtex::parse(bib).unwrap();
    convert(latex, Some(&db), &plain()).unwrap()
}

/// Assert the markdown passes basic hygiene checks.
fn assert_markdown_quality(md: &str, context: &str) {
    assert!(
        md.ends_with('\n') && !md.ends_with("\n\n"),
        "[{context}] Markdown must end with exactly one newline"
    );
    assert!(
        !md.contains("\n\n\n"),
        "[{context}] Output has more than one consecutive blank line"
    );
    assert!(
        !md.contains('\\'),
        "[{context}] Output still contains a backslash"
    );
    for line in md.lines() {
        assert_eq!(line, line.trim_end(), "[{context}] trailing whitespace");
    }
}

fn position(md: &str, needle: &str) -> usize {
    md.find(needle)
        .unwrap_or_else(|| panic!("{needle:?} not found in:\n{md}"))
}

// ── Full manuscript ──────────────────────────────────────────────────────────

#[test]
fn test_manuscript_from_files() {
    let dir = TempDir::new().unwrap();
    let tex = write(&dir, "paper.tex", MANUSCRIPT);
    let bib = write(&dir, "refs.bib", REFS);

    let out = convert_file(&tex, Some(bib.as_path()), &ConversionConfig::default()).unwrap();
    let md = &out.markdown;
    assert_markdown_quality(md, "manuscript");

    assert!(
        md.starts_with("# Testing Conversions\n\n**Author:** Jane Doe\n\n# Introduction\n"),
        "got:\n{md}"
    );
    assert!(md.contains("Prior work (Smith 2020) shows **bold** results."));
    assert!(md.contains(
        "Brown, Clark and Day (2019) extend this, see Figure 1 and Section 2."
    ));
    assert!(md.contains("Costs are 5% lower[^1]."));
    assert!(md.contains("&lt;Figure 1: A *simple* plot&gt;"));
    assert!(md.contains("&lt;Table 1: Results&gt;"));
    assert!(md.contains("&lt;Equation&gt;"));
    assert!(md.contains("We use `data.csv` as in (Smith 2020)."));
    assert!(md.contains("Table 1 summarises Section 2.2."));
    assert!(md.contains("## Data\n"));
    assert!(md.contains("# Acknowledgements {.unnumbered}\n"));

    // Footnotes block comes before the reference list.
    let footnotes = position(md, "# Footnotes\n\n[^1]: Measured on the test set.");
    let references = position(md, "# References\n\n");
    assert!(footnotes < references);

    let smith = position(
        md,
        "Smith, John (2020). \"On Testing Things\". *Journal of Tests*, 12(3): 1--10.",
    );
    let bcd = position(
        md,
        "Alice Brown and Bob Clark and Carol Day (2019). *A Book of Tests*. Pub House.",
    );
    assert!(references < smith && smith < bcd);
    assert!(!md.contains("Never Cited"));

    let s = &out.stats;
    assert_eq!(s.sections, 4);
    assert_eq!((s.figures, s.tables, s.equations), (1, 1, 1));
    assert_eq!(s.footnotes, 1);
    assert_eq!(s.labels, 5);
    assert_eq!(s.citations, 2);
    assert_eq!(s.references_listed, 2);
    assert!(s.unresolved_refs.is_empty());
    assert!(s.unresolved_citation_keys.is_empty());

    assert!(out.unconverted_commands.contains(&r"\maketitle".to_string()));
    assert!(out
        .unconverted_commands
        .contains(&r"\bibliography{refs}".to_string()));
    assert!(out
        .unconverted_commands
        .iter()
        .all(|c| !c.starts_with(r"\section") && !c.starts_with(r"\cite")));
    let mut sorted = out.unconverted_commands.clone();
    sorted.sort();
    assert_eq!(sorted, out.unconverted_commands);
}

#[test]
fn test_manuscript_numbered_headings() {
    let config = ConversionConfig::builder()
        .number_headings(true)
        .build()
        .unwrap();
    let out = convert(MANUSCRIPT, None, &config).unwrap();
    let headings: Vec<&str> = out
        .markdown
        .lines()
        .filter(|l| l.starts_with('#'))
        .collect();
    assert_eq!(
        headings,
        vec![
            "# Testing Conversions",
            "# 1 Introduction",
            "# 2 Method",
            "## 2.1 Data",
            "## 2.2 Model",
            "# Acknowledgements {.unnumbered}",
            "# Footnotes",
        ]
    );
}

#[test]
fn test_convert_to_file_writes_markdown() {
    let dir = TempDir::new().unwrap();
    let tex = write(&dir, "paper.tex", MANUSCRIPT);
    let bib = write(&dir, "refs.bib", REFS);
    let md_path = dir.path().join("out").join("paper.md");

    let stats = convert_to_file(&tex, &md_path, Some(bib.as_path()), &ConversionConfig::default()).unwrap();
    assert_eq!(stats.citations, 2);

    let written = std::fs::read_to_string(&md_path).unwrap();
    assert!(written.starts_with("# Testing Conversions\n"));
    assert!(written.contains("# References"));
}

#[test]
fn test_input_without_extension() {
    let dir = TempDir::new().unwrap();
    write(&dir, "paper.tex", r"\section{Only}");
    let out = convert_file(dir.path().join("paper"), None, &plain()).unwrap();
    assert_eq!(out.markdown, "# Only\n");
}

// ── Structure ────────────────────────────────────────────────────────────────

#[test]
fn test_no_sections_no_numeric_labels() {
    let out = run("\\label{x}\nSome text, see \\ref{x}.\n");
    assert_eq!(out.stats.sections, 0);
    assert_eq!(out.stats.labels, 0);
    assert!(out.markdown.contains("see Unknown x."));
    assert!(!out.markdown.chars().any(|c| c.is_ascii_digit()));
}

#[test]
fn test_nested_section_numbers() {
    let config = ConversionConfig::builder()
        .number_headings(true)
        .build()
        .unwrap();
    let out = convert(
        r"\section{A}\subsection{B}\subsection{C}\section{D}",
        None,
        &config,
    )
    .unwrap();
    assert_eq!(out.markdown, "# 1 A\n\n## 1.1 B\n\n## 1.2 C\n\n# 2 D\n");
}

#[test]
fn test_figure_ordinals_follow_document_order() {
    let out = run(
        "\\begin{figure}\\caption{first}\\end{figure}\n\
         \\begin{figure}\\includegraphics{x}\\end{figure}\n\
         \\begin{figure}\\caption{third}\\end{figure}\n",
    );
    assert_eq!(
        out.markdown,
        "<Figure 1: first>\n\n<Figure 2>\n\n<Figure 3: third>\n"
    );
    assert_eq!(out.stats.figures, 3);
}

#[test]
fn test_nested_figure_is_one_block() {
    let out = run(
        "\\begin{figure}\\begin{figure}inner\\end{figure}\\caption{outer}\\end{figure}\nAfter",
    );
    assert_eq!(out.stats.figures, 1);
    assert!(out.markdown.starts_with("<Figure 1:"), "got: {}", out.markdown);
    assert!(out.markdown.ends_with("After\n"));
    assert!(!out.markdown.contains("inner"));
}

#[test]
fn test_unknown_reference() {
    let out = run(r"\section{A}\label{a} See \ref{x} and \ref{a}.");
    assert!(out.markdown.contains("See Unknown x and 1."), "got: {}", out.markdown);
    assert_eq!(out.stats.unresolved_refs, vec!["x"]);
}

#[test]
fn test_angle_brackets_escaped_by_default() {
    let out = convert(
        "\\begin{table}\\caption{T}\\end{table}\nif a < b",
        None,
        &ConversionConfig::default(),
    )
    .unwrap();
    assert_eq!(out.markdown, "&lt;Table 1: T&gt;\n\nif a &lt; b\n");
}

// ── Labels ───────────────────────────────────────────────────────────────────

const COLLIDING: &str = "\\section{A}\n\\section{B}\\label{x}\n\
\\begin{figure}\\caption{c}\\label{x}\\end{figure}\nSee \\autoref{x}.";

fn with_policy(policy: LabelPolicy) -> Result<ConversionOutput, Tex2MdError> {
    let config = ConversionConfig::builder()
        .label_policy(policy)
        .build()
        .unwrap();
    convert(COLLIDING, None, &config)
}

#[test]
fn test_label_policy_overwrite() {
    let out = with_policy(LabelPolicy::Overwrite).unwrap();
    assert!(out.markdown.contains("See Section 2."), "got: {}", out.markdown);
    assert_eq!(out.stats.labels, 2);
}

#[test]
fn test_label_policy_keep_first() {
    let out = with_policy(LabelPolicy::KeepFirst).unwrap();
    assert!(out.markdown.contains("See Figure 1."), "got: {}", out.markdown);
}

#[test]
fn test_label_policy_error() {
    match with_policy(LabelPolicy::Error).unwrap_err() {
        Tex2MdError::LabelCollision {
            label,
            first,
            second,
        } => {
            assert_eq!(label, "x");
            assert_eq!(first, "figure 1");
            assert_eq!(second, "section 2");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

// ── Footnotes ────────────────────────────────────────────────────────────────

#[test]
fn test_footnote_round_trip() {
    let out = run(r"First\footnote{plain note here}. Second\footnote{another one}.");
    assert_eq!(
        out.markdown,
        "First[^1]. Second[^2].\n\n# Footnotes\n\n[^1]: plain note here\n\n[^2]: another one\n"
    );
    assert_eq!(out.stats.footnotes, 2);
}

// ── Citations ────────────────────────────────────────────────────────────────

const SMITH: &str = "@article{smith2020, author = {Smith, John}, year = {2020}, title = {T}}";

#[test]
fn test_citation_determinism() {
    let out = run_with_refs(r"A \citet{smith2020}. B \citep{smith2020}.", SMITH);
    assert!(
        out.markdown.starts_with("A Smith (2020). B (Smith 2020).\n"),
        "got: {}",
        out.markdown
    );
}

#[test]
fn test_multi_author_last_names() {
    let bib = "@book{k, author = {Alice Brown and Bob Clark and Carol Day}, year = {2019}}";
    let out = run_with_refs(r"\citeauthor{k} \citep{k}", bib);
    assert!(
        out.markdown
            .starts_with("Brown, Clark and Day (Brown, Clark and Day 2019)\n"),
        "got: {}",
        out.markdown
    );
}

#[test]
fn test_natbib_notes() {
    let out = run_with_refs(
        r"\citep[see][p.~4]{smith2020} and \citet[ch. 2]{smith2020}",
        SMITH,
    );
    assert!(
        out.markdown
            .starts_with("(see Smith 2020, p. 4) and Smith (2020, ch. 2)\n"),
        "got: {}",
        out.markdown
    );
}

#[test]
fn test_accented_author_survives() {
    let bib = r#"@article{m, author = {M{\"u}ller, Hans}, year = {2020}, title = {T}}"#;
    let out = run_with_refs(r"As \citet{m} showed, \citep{m}.", bib);
    let md = &out.markdown;
    assert!(
        md.starts_with("As Müller (2020) showed, (Müller 2020).\n"),
        "got: {md}"
    );
    assert!(md.contains("Müller, Hans (2020). \"T\"."), "got: {md}");
    assert!(out.unconverted_commands.is_empty());
}

#[test]
fn test_bibliography_with_email_in_header() {
    let dir = TempDir::new().unwrap();
    let tex = write(&dir, "paper.tex", r"See \citet{smith2020}.");
    let bib = write(
        &dir,
        "refs.bib",
        &format!("% Maintained by jane@example.org\n{SMITH}\n"),
    );
    let out = convert_file(&tex, Some(bib.as_path()), &plain()).unwrap();
    assert!(out.markdown.starts_with("See Smith (2020).\n"), "got: {}", out.markdown);
}

#[test]
fn test_reference_list_order() {
    let bib = "@misc{a, author = {Ann A}, year = {2001}, title = {Alpha}}\n\
               @misc{b, author = {Bob B}, year = {2002}, title = {Beta}}";
    let out = run_with_refs(r"\citep{b}, \citet{a}, \citep{b}", bib);
    let md = &out.markdown;
    let list = &md[position(md, "# References")..];
    let entries: Vec<&str> = list
        .lines()
        .skip(1)
        .filter(|l| !l.is_empty())
        .collect();
    assert_eq!(
        entries,
        vec!["Bob B (2002). *Beta*.", "Ann A (2001). *Alpha*."]
    );
    assert_eq!(out.stats.references_listed, 2);
}

#[test]
fn test_unknown_citation_key() {
    let out = run_with_refs(r"See \citep{nobody} and \citep{smith2020, nobody}.", SMITH);
    assert!(out.markdown.starts_with("See  and (Smith 2020).\n"), "got: {}", out.markdown);
    assert_eq!(out.stats.unresolved_citation_keys, vec!["nobody"]);
    assert_eq!(out.stats.references_listed, 1);
}

#[test]
fn test_no_citations_no_reference_list() {
    let out = run_with_refs("Nothing cited.", SMITH);
    assert_eq!(out.markdown, "Nothing cited.\n");
    assert_eq!(out.stats.references_listed, 0);
}

// ── Bibliography errors ──────────────────────────────────────────────────────

#[test]
fn test_missing_bibliography_is_fatal() {
    let dir = TempDir::new().unwrap();
    let tex = write(&dir, "paper.tex", r"\citep{a}");
    let err = convert_file(&tex, Some(Path::new("/nonexistent/refs.bib")), &plain()).unwrap_err();
    assert!(
        matches!(err, Tex2MdError::BibliographyUnreadable { .. }),
        "got: {err:?}"
    );
}

#[test]
fn test_malformed_bibliography_is_fatal() {
    let dir = TempDir::new().unwrap();
    let tex = write(&dir, "paper.tex", r"\citep{a}");
    let bib = write(&dir, "refs.bib", "@article{a,\n  author = {Smith\n");
    let err = convert_file(&tex, Some(bib.as_path()), &plain()).unwrap_err();
    assert!(
        matches!(err, Tex2MdError::BibliographyMalformed { .. }),
        "got: {err:?}"
    );
}

#[test]
fn test_missing_input_file() {
    let err = convert_file("/nonexistent/paper.tex", None, &plain()).unwrap_err();
    assert!(matches!(err, Tex2MdError::FileNotFound { .. }));
}

// ── Residual ─────────────────────────────────────────────────────────────────

#[test]
fn test_residual_idempotent_on_output() {
    let out = run(MANUSCRIPT);
    let (again, report) = strip_residual(&out.markdown);
    assert_eq!(again, out.markdown);
    assert!(report.is_empty());
}

#[test]
fn test_unknown_commands_reported_and_removed() {
    let out = run("\\noindent Text with \\href{http://x}{link} here.\n\\vspace{1em}\nEnd");
    assert_eq!(
        out.unconverted_commands,
        vec![r"\href{http://x}", r"\noindent", r"\vspace{1em}"]
    );
    assert_eq!(out.markdown, "Text with here.\n\nEnd\n");
}

// ── Serialisation ────────────────────────────────────────────────────────────

#[test]
fn test_output_json() {
    let out = run_with_refs(r"\section{A} \citep{smith2020} \ref{nope}", SMITH);
    let value = serde_json::to_value(&out).unwrap();
    assert!(value["markdown"].as_str().unwrap().contains("(Smith 2020)"));
    assert_eq!(value["stats"]["sections"], 1);
    assert_eq!(value["stats"]["citations"], 1);
    assert_eq!(value["stats"]["unresolved_refs"][0], "nope");

    let back: ConversionOutput = serde_json::from_value(value).unwrap();
    assert_eq!(back.stats, out.stats);
}
