//! Report exports written to the configured export directory.

use std::path::PathBuf;

use crate::DashError;

/// File name of the clinician PDF report.
pub const PDF_REPORT_FILE: &str = "clinician_report_last3.pdf";
/// File name of the HTML report.
pub const HTML_REPORT_FILE: &str = "dietdash_report.html";

/// Writes exported reports into one directory.
#[derive(Debug, Clone)]
pub struct ExportWriter {
    dir: PathBuf,
}

impl ExportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Save PDF bytes downloaded from the backend.
    ///
    /// # Errors
    /// Returns error if the body is not a PDF or the file cannot be written.
    pub async fn save_pdf(&self, bytes: &[u8]) -> Result<PathBuf, DashError> {
        if !bytes.starts_with(b"%PDF") {
            return Err(DashError::Validation(
                "Export did not return a PDF document".to_string(),
            ));
        }
        self.write(PDF_REPORT_FILE, bytes).await
    }

    /// Save a rendered HTML report.
    ///
    /// # Errors
    /// Returns error if the file cannot be written.
    pub async fn save_html(&self, markup: &str) -> Result<PathBuf, DashError> {
        self.write(HTML_REPORT_FILE, markup.as_bytes()).await
    }

    async fn write(&self, file_name: &str, contents: &[u8]) -> Result<PathBuf, DashError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(file_name);
        tokio::fs::write(&path, contents).await?;
        tracing::info!("Exported {} ({} bytes)", path.display(), contents.len());
        Ok(path)
    }
}
