use serde::{Deserialize, Serialize};

use super::enums::ResultStatus;

/// Multi-test rule template matched against a classified panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabPattern {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub findings: Vec<PatternFinding>,
    #[serde(default)]
    pub organ_implications: Vec<OrganImplication>,
}

impl LabPattern {
    pub fn required_findings(&self) -> impl Iterator<Item = &PatternFinding> {
        self.findings.iter().filter(|f| f.required)
    }

    pub fn total_weight(&self) -> f64 {
        self.findings.iter().map(|f| f.weight).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternFinding {
    pub test_id: String,
    /// Statuses that satisfy this finding.
    pub statuses: Vec<ResultStatus>,
    pub required: bool,
    pub weight: f64,
}

impl PatternFinding {
    pub fn accepts(&self, status: ResultStatus) -> bool {
        self.statuses.contains(&status)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganImplication {
    pub organ: String,
    pub explanation: String,
}
