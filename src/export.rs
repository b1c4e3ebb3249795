//! Word export through an external `pandoc` process.
//!
//! The Markdown is piped on stdin; pandoc writes the `.docx` itself. No
//! pandoc library binding is involved, so the only requirement is a
//! `pandoc` executable on `PATH`.

use crate::error::Tex2MdError;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Program name looked up on `PATH`.
pub const PANDOC: &str = "pandoc";

/// Convert `markdown` to a Word document at `path`.
pub fn export_docx(markdown: &str, path: impl AsRef<Path>) -> Result<(), Tex2MdError> {
    export_with(PANDOC, markdown, path.as_ref())
}

fn export_with(program: &str, markdown: &str, path: &Path) -> Result<(), Tex2MdError> {
    let fail = |detail: String| Tex2MdError::ExportFailed {
        path: path.to_path_buf(),
        detail,
    };

    debug!("Spawning {} for {}", program, path.display());
    let mut child = Command::new(program)
        .args(["-f", "markdown", "-t", "docx", "-o"])
        .arg(path)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| fail(format!("could not run '{program}': {e}")))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(markdown.as_bytes())
            .map_err(|e| fail(format!("writing to {program}: {e}")))?;
    }

    let output = child
        .wait_with_output()
        .map_err(|e| fail(format!("waiting for {program}: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(fail(format!(
            "{program} exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    info!("Word document written to {}", path.display());
    Ok(())
}
