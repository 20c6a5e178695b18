use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::enums::{ResultStatus, Stratum, TrendDirection, Urgency};
use crate::models::{LabTrendPoint, OrganImplication, UserDemographics};

use super::critical::CriticalNotice;

// ---------------------------------------------------------------------------
// ResolvedBand
// ---------------------------------------------------------------------------

/// The single concrete band selected for one patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedBand {
    /// Which stratum supplied `low`/`high`/`unit`.
    pub stratum: Stratum,
    pub low: f64,
    pub high: f64,
    pub unit: String,
    pub critical_low: Option<f64>,
    pub critical_high: Option<f64>,
}

// ---------------------------------------------------------------------------
// InterpretedLabResult
// ---------------------------------------------------------------------------

/// A raw value classified against its resolved band.
/// Contains no timestamps or ids so identical inputs compare equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpretedLabResult {
    pub test_id: String,
    pub value: f64,
    pub range: ResolvedBand,
    pub status: ResultStatus,
    pub urgency: Urgency,
    /// Candidate conditions, declaration order, first occurrence kept.
    pub conditions: Vec<String>,
    pub additional_tests: Vec<String>,
}

// ---------------------------------------------------------------------------
// DetectedPattern
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedFinding {
    pub test_id: String,
    pub required: bool,
    pub weight: f64,
    pub result: InterpretedLabResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedPattern {
    pub pattern_id: String,
    pub name: String,
    /// Satisfied weight over total weight, in [0, 1].
    pub confidence: f64,
    pub required_satisfied: usize,
    pub matched_findings: Vec<MatchedFinding>,
    pub organ_implications: Vec<OrganImplication>,
}

// ---------------------------------------------------------------------------
// Panel input / output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabValue {
    pub test_id: String,
    pub value: f64,
}

impl LabValue {
    pub fn new(test_id: impl Into<String>, value: f64) -> Self {
        Self {
            test_id: test_id.into(),
            value,
        }
    }
}

/// A full panel request, as the binary reads it from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelRequest {
    pub demographics: UserDemographics,
    pub values: Vec<LabValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedReason {
    UnknownTest,
    InvalidValue,
    DuplicateEntry,
}

/// A panel entry that could not be interpreted. Callers show it as
/// "unable to interpret" instead of guessing a status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnresolvedValue {
    pub test_id: String,
    pub value: f64,
    pub reason: UnresolvedReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StatusCounts {
    pub critical_low: usize,
    pub low: usize,
    pub normal: usize,
    pub high: usize,
    pub critical_high: usize,
}

impl StatusCounts {
    pub fn record(&mut self, status: ResultStatus) {
        match status {
            ResultStatus::CriticalLow => self.critical_low += 1,
            ResultStatus::Low => self.low += 1,
            ResultStatus::Normal => self.normal += 1,
            ResultStatus::High => self.high += 1,
            ResultStatus::CriticalHigh => self.critical_high += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.critical_low + self.low + self.normal + self.high + self.critical_high
    }

    pub fn abnormal(&self) -> usize {
        self.total() - self.normal
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelAnalysisResult {
    pub analysis_id: Uuid,
    pub analyzed_at: NaiveDateTime,
    /// Classified entries in input order.
    pub results: Vec<InterpretedLabResult>,
    pub unresolved: Vec<UnresolvedValue>,
    /// Ranked; may hold several co-existing patterns.
    pub patterns: Vec<DetectedPattern>,
    pub counts: StatusCounts,
    pub critical_notices: Vec<CriticalNotice>,
    pub processing_time_ms: u64,
}

// ---------------------------------------------------------------------------
// LabTrend
// ---------------------------------------------------------------------------

/// One point plus its change from the preceding point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendStep {
    pub timestamp: NaiveDateTime,
    pub value: f64,
    pub delta: f64,
    /// `None` when the preceding value is zero.
    pub percent_change: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabTrend {
    pub test_id: String,
    pub steps: Vec<TrendStep>,
    pub direction: TrendDirection,
    pub is_significant: bool,
    pub net_change: f64,
    pub net_percent_change: Option<f64>,
    pub rate_per_day: Option<f64>,
    pub threshold_percent: f64,
}

/// Trend request, as the binary reads it from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendRequest {
    pub test_id: String,
    pub points: Vec<LabTrendPoint>,
}

// ---------------------------------------------------------------------------
// LabError
// ---------------------------------------------------------------------------

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LabError {
    #[error("Configuration error ({subject}): {reason}")]
    Configuration { subject: String, reason: String },

    #[error("Invalid value for {test_id}: {value}")]
    InvalidValue { test_id: String, value: f64 },

    #[error("Explanation level must be 1-5, got {0}")]
    InvalidLevel(u8),

    #[error("Trend points out of chronological order at index {index}")]
    UnsortedInput { index: usize },

    #[error("Significance threshold must be a positive percentage, got {0}")]
    InvalidThreshold(f64),

    #[error("Unknown lab test: {0}")]
    UnknownTest(String),

    #[error("Reference data load failed ({0}): {1}")]
    ReferenceDataLoad(String, String),

    #[error("Reference data parse failed ({0}): {1}")]
    ReferenceDataParse(String, String),

    #[error("Engine config load failed ({0}): {1}")]
    ConfigLoad(String, String),
}

impl LabError {
    pub(crate) fn configuration(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            subject: subject.into(),
            reason: reason.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// LabInterpretationEngine trait
// ---------------------------------------------------------------------------

/// The main interpretation engine trait.
/// Every method is a pure computation over the catalog and its arguments.
pub trait LabInterpretationEngine {
    /// Resolve the patient's band and classify one raw value.
    fn interpret(
        &self,
        test_id: &str,
        value: f64,
        demographics: &UserDemographics,
    ) -> Result<InterpretedLabResult, LabError>;

    /// Leveled explanation text for a classified result.
    fn explain(&self, result: &InterpretedLabResult, level: u8) -> Result<String, LabError>;

    /// Classify a whole panel and detect cross-test patterns.
    fn analyze_panel(
        &self,
        values: &[LabValue],
        demographics: &UserDemographics,
    ) -> Result<PanelAnalysisResult, LabError>;

    /// Direction and significance of one test's history.
    fn analyze_trend(
        &self,
        test_id: &str,
        points: &[LabTrendPoint],
    ) -> Result<LabTrend, LabError>;
}
