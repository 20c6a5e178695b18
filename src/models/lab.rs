use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::enums::{BodySystem, Direction, LabCategory, Specimen, Stratum, Urgency};

/// Static definition of one laboratory test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabTest {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub abbreviation: Option<String>,
    #[serde(default)]
    pub loinc_code: Option<String>,
    pub category: LabCategory,
    pub specimen: Specimen,
    #[serde(default)]
    pub description: String,
    pub primary_organs: Vec<String>,
    pub affected_systems: Vec<BodySystem>,
    pub reference_range: ReferenceRange,
    /// Declaration order matters: condition lists are merged in this order.
    pub interpretations: Vec<ClinicalInterpretation>,
    pub explanations: LeveledExplanations,
    #[serde(default)]
    pub key_facts: Vec<String>,
    #[serde(default)]
    pub related_tests: Vec<String>,
    /// Physiological pathway ids (e.g. `raas`, `hpt-axis`).
    #[serde(default)]
    pub related_pathways: Vec<String>,
}

/// One `{low, high, unit}` band, optionally with its own critical thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeBand {
    pub low: f64,
    pub high: f64,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_low: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_high: Option<f64>,
}

/// Demographically stratified reference range.
///
/// `critical_low`/`critical_high` at this level belong to the general band
/// and are inherited by every other band that does not set its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceRange {
    pub bands: BTreeMap<Stratum, RangeBand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_low: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ReferenceRange {
    pub fn band(&self, stratum: Stratum) -> Option<&RangeBand> {
        self.bands.get(&stratum)
    }

    pub fn general(&self) -> Option<&RangeBand> {
        self.band(Stratum::General)
    }

    /// Critical low of the general band (its own value, else range level).
    pub fn general_critical_low(&self) -> Option<f64> {
        self.general()
            .and_then(|g| g.critical_low)
            .or(self.critical_low)
    }

    pub fn general_critical_high(&self) -> Option<f64> {
        self.general()
            .and_then(|g| g.critical_high)
            .or(self.critical_high)
    }
}

/// Candidate causes for a result on one side of the range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicalInterpretation {
    pub direction: Direction,
    pub conditions: Vec<String>,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub additional_tests: Vec<String>,
}

/// Explanation text at five complexity levels, 1 (plain) to 5 (specialist).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeveledExplanations {
    pub level1: String,
    pub level2: String,
    pub level3: String,
    pub level4: String,
    pub level5: String,
}

impl LeveledExplanations {
    pub fn get(&self, level: u8) -> Option<&str> {
        match level {
            1 => Some(&self.level1),
            2 => Some(&self.level2),
            3 => Some(&self.level3),
            4 => Some(&self.level4),
            5 => Some(&self.level5),
            _ => None,
        }
    }
}

/// A named group of tests ordered together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabPanel {
    pub id: String,
    pub name: String,
    pub abbreviation: String,
    pub description: String,
    /// May list tests the catalog does not define (e.g. hematocrit).
    pub tests: Vec<String>,
    pub common_indications: Vec<String>,
    pub primary_organs: Vec<String>,
    pub affected_systems: Vec<BodySystem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganLabMapping {
    pub organ_id: String,
    pub organ_name: String,
    pub primary_labs: Vec<String>,
    pub secondary_labs: Vec<String>,
    pub function_tests: Vec<String>,
}
