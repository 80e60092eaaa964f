//! File-export collaborator for report downloads.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{DashboardError, Result};

/// Filename used for audit report downloads.
pub const AUDIT_REPORT_FILENAME: &str = "audit_report.json";

/// Turns a serialized payload into a downloadable artifact.
pub trait ReportExporter: Send + Sync {
    fn export(&self, filename: &str, payload: &str) -> Result<()>;
}

/// Writes exports into a directory on disk.
#[derive(Debug, Clone)]
pub struct FileExporter {
    dir: PathBuf,
}

impl FileExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ReportExporter for FileExporter {
    fn export(&self, filename: &str, payload: &str) -> Result<()> {
        if filename.is_empty() || filename.contains(['/', '\\']) {
            return Err(DashboardError::Export(format!(
                "invalid export filename: {filename:?}"
            )));
        }
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(filename);
        std::fs::write(&path, payload)?;
        info!(path = %path.display(), bytes = payload.len(), "Exported report");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_exporter_writes_payload() {
        let dir = tempdir().unwrap();
        let exporter = FileExporter::new(dir.path().join("downloads"));

        exporter.export(AUDIT_REPORT_FILENAME, "{\"a\":1}").unwrap();

        let written = std::fs::read_to_string(dir.path().join("downloads").join(AUDIT_REPORT_FILENAME))
            .unwrap();
        assert_eq!(written, "{\"a\":1}");
    }

    #[test]
    fn test_file_exporter_rejects_path_in_filename() {
        let dir = tempdir().unwrap();
        let exporter = FileExporter::new(dir.path());
        assert!(exporter.export("../escape.json", "{}").is_err());
        assert!(exporter.export("", "{}").is_err());
    }
}
