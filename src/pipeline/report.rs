//! Run report

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Loaded,
    StageFailed,
    LoadFailed,
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OutcomeStatus::Loaded => "loaded",
            OutcomeStatus::StageFailed => "stage failed",
            OutcomeStatus::LoadFailed => "load failed",
        };
        f.write_str(s)
    }
}

/// One (file, feature) unit of work
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureOutcome {
    pub file: String,
    pub feature: String,
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// The staged CSV is still in the staging bucket
    pub staged_retained: bool,
}

impl FeatureOutcome {
    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Loaded
    }
}

/// A file whose features could not be extracted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionFailure {
    pub file: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub copied: Vec<String>,
    pub outcomes: Vec<FeatureOutcome>,
    pub extraction_failures: Vec<ExtractionFailure>,
}

impl RunReport {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            copied: Vec::new(),
            outcomes: Vec::new(),
            extraction_failures: Vec::new(),
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Every extraction and every load went through
    pub fn is_success(&self) -> bool {
        self.extraction_failures.is_empty() && self.outcomes.iter().all(|o| o.is_success())
    }

    pub fn loaded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.loaded() + self.extraction_failures.len()
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Copied {} file(s); loaded {} feature(s); {} failure(s)",
            self.copied.len(),
            self.loaded(),
            self.failed()
        )?;
        for outcome in &self.outcomes {
            write!(f, "  {} [{}]: {}", outcome.file, outcome.feature, outcome.status)?;
            if let Some(rows) = outcome.rows {
                write!(f, " ({rows} rows)")?;
            }
            if let Some(error) = &outcome.error {
                write!(f, ": {error}")?;
            }
            if outcome.staged_retained {
                write!(f, " (staged file kept)")?;
            }
            writeln!(f)?;
        }
        for failure in &self.extraction_failures {
            writeln!(f, "  {}: extraction failed: {}", failure.file, failure.error)?;
        }
        Ok(())
    }
}
