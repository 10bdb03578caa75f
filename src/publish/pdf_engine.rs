use std::{
    io::Write,
    path::Path,
    process::{Command, Stdio},
};

use tracing::debug;

use crate::publish::Error;

/// Converts a standalone HTML page into a PDF file.
pub trait PdfEngine {
    /// Write `html` as a PDF to `output`.
    ///
    /// Relative URLs in the page resolve against `base`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Pdf`] if the conversion fails.
    fn convert(&self, html: &str, stylesheet: &Path, base: &Path, output: &Path)
        -> Result<(), Error>;
}

/// Runs an external converter with the HTML on standard input.
///
/// The command line follows `weasyprint`:
/// `{program} - {output} --stylesheet {css} --base-url {base}`.
#[derive(Debug, Clone)]
pub struct CommandPdfEngine {
    program: String,
}

impl CommandPdfEngine {
    /// Use `program` for conversion.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl PdfEngine for CommandPdfEngine {
    fn convert(
        &self,
        html: &str,
        stylesheet: &Path,
        base: &Path,
        output: &Path,
    ) -> Result<(), Error> {
        let program = &self.program;
        debug!("converting to {} with {program}", output.display());

        let mut child = Command::new(program)
            .arg("-")
            .arg(output)
            .arg("--stylesheet")
            .arg(stylesheet)
            .arg("--base-url")
            .arg(base)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Pdf(format!("failed to run {program}: {e}")))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(html.as_bytes())
                .map_err(|e| Error::Pdf(format!("failed to write to {program}: {e}")))?;
        }

        let result = child
            .wait_with_output()
            .map_err(|e| Error::Pdf(format!("failed to wait for {program}: {e}")))?;
        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(Error::Pdf(format!(
                "{program} exited with {}: {}",
                result.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}
