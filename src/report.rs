use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::pipeline::FailurePolicy;

/// Record of one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub generator: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub policy: FailurePolicy,
    pub stages: Vec<StageRecord>,
    pub artifacts: Vec<Artifact>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRecord {
    pub name: String,
    pub status: StageStatus,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum StageStatus {
    Succeeded,
    /// Failed, but the failure policy let the run continue
    Tolerated { message: String },
    Failed { message: String },
    /// Never started because an earlier stage failed
    Skipped,
}

/// A file produced by a stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub path: PathBuf,
    /// Hex SHA-256 of the file contents, when the stage computed one
    pub sha256: Option<String>,
}

impl StageRecord {
    pub fn new(name: impl Into<String>, status: StageStatus, duration_ms: u64) -> Self {
        Self {
            name: name.into(),
            status,
            duration_ms,
        }
    }

    pub fn skipped(name: impl Into<String>) -> Self {
        Self::new(name, StageStatus::Skipped, 0)
    }
}

impl RunReport {
    /// Start a new report stamped with the current time
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            generator: format!("assetline v{}", env!("CARGO_PKG_VERSION")),
            started_at: Utc::now().to_rfc3339(),
            finished_at: None,
            policy,
            stages: Vec::new(),
            artifacts: Vec::new(),
        }
    }

    pub fn record(&mut self, record: StageRecord) {
        self.stages.push(record);
    }

    pub fn add_artifacts(&mut self, artifacts: impl IntoIterator<Item = Artifact>) {
        self.artifacts.extend(artifacts);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now().to_rfc3339());
    }

    /// True when no stage failed or was skipped
    pub fn is_success(&self) -> bool {
        self.stages
            .iter()
            .all(|s| matches!(s.status, StageStatus::Succeeded | StageStatus::Tolerated { .. }))
    }

    /// The first stage that failed, if any
    pub fn failed_stage(&self) -> Option<&StageRecord> {
        self.stages
            .iter()
            .find(|s| matches!(s.status, StageStatus::Failed { .. }))
    }

    pub fn status_of(&self, name: &str) -> Option<&StageStatus> {
        self.stages.iter().find(|s| s.name == name).map(|s| &s.status)
    }

    /// Human-readable lines for the terminal
    pub fn summary(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.stages.len() + 2);
        lines.push(format!("Run {}", self.run_id));

        for stage in &self.stages {
            let line = match &stage.status {
                StageStatus::Succeeded => format!("  ✓ {:<24} {}ms", stage.name, stage.duration_ms),
                StageStatus::Tolerated { message } => {
                    format!("  ! {:<24} {}ms  {}", stage.name, stage.duration_ms, message)
                }
                StageStatus::Failed { message } => {
                    format!("  ✗ {:<24} {}ms  {}", stage.name, stage.duration_ms, message)
                }
                StageStatus::Skipped => format!("  - {:<24} skipped", stage.name),
            };
            lines.push(line);
        }

        lines.push(format!("Artifacts: {}", self.artifacts.len()));
        lines
    }

    /// Write the report as pretty JSON
    pub fn write_to_file(&self, output_path: &Path) -> Result<()> {
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize run report")?;
        fs::write(output_path, json)
            .with_context(|| format!("Failed to write run report: {}", output_path.display()))?;

        eprintln!("[report] Wrote {}", output_path.display());
        Ok(())
    }
}
