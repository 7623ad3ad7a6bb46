use crate::error::Result;
use crate::models::AnalysisReport;
use std::fs;
use std::path::Path;
use tracing::info;

pub struct JsonExporter;

impl JsonExporter {
    pub fn new() -> Self {
        Self
    }

    pub fn export(&self, report: &AnalysisReport) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }

    /// Writes the report to `path`, creating parent directories.
    pub fn write_to(&self, report: &AnalysisReport, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = self.export(report)?;
        fs::write(path, json.as_bytes())?;
        info!(path = %path.display(), bytes = json.len(), "Wrote analysis report");
        Ok(())
    }
}

impl Default for JsonExporter {
    fn default() -> Self {
        Self::new()
    }
}
