use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::models::enums::{BodySystem, LabCategory, Stratum};
use crate::models::{LabPanel, LabPattern, LabTest, OrganLabMapping, RangeBand};

use super::types::LabError;

const TESTS_FILE: &str = "lab_tests.json";
const PATTERNS_FILE: &str = "lab_patterns.json";
const PANELS_FILE: &str = "lab_panels.json";
const ORGAN_MAPPINGS_FILE: &str = "organ_lab_mappings.json";

const BUNDLED_TESTS: &str = include_str!("../../resources/lab_tests.json");
const BUNDLED_PATTERNS: &str = include_str!("../../resources/lab_patterns.json");
const BUNDLED_PANELS: &str = include_str!("../../resources/lab_panels.json");
const BUNDLED_ORGAN_MAPPINGS: &str = include_str!("../../resources/organ_lab_mappings.json");

/// Immutable lab reference tables, validated once at construction.
#[derive(Debug)]
pub struct LabCatalog {
    tests: Vec<LabTest>,
    test_index: HashMap<String, usize>,
    patterns: Vec<LabPattern>,
    panels: Vec<LabPanel>,
    organ_mappings: Vec<OrganLabMapping>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStatistics {
    pub total_tests: usize,
    pub total_panels: usize,
    pub total_patterns: usize,
    pub category_counts: BTreeMap<LabCategory, usize>,
}

impl LabCatalog {
    /// Validate and index already-parsed tables.
    pub fn from_parts(
        tests: Vec<LabTest>,
        patterns: Vec<LabPattern>,
        panels: Vec<LabPanel>,
        organ_mappings: Vec<OrganLabMapping>,
    ) -> Result<Self, LabError> {
        let mut test_index = HashMap::with_capacity(tests.len());
        for (i, test) in tests.iter().enumerate() {
            if test_index.insert(test.id.clone(), i).is_some() {
                return Err(LabError::configuration(&test.id, "duplicate test id"));
            }
            validate_test(test)?;
        }

        let mut pattern_ids = HashSet::new();
        for pattern in &patterns {
            if !pattern_ids.insert(pattern.id.as_str()) {
                return Err(LabError::configuration(&pattern.id, "duplicate pattern id"));
            }
            validate_pattern(pattern)?;
            for finding in &pattern.findings {
                if !test_index.contains_key(&finding.test_id) {
                    tracing::warn!(
                        pattern_id = %pattern.id,
                        test_id = %finding.test_id,
                        "Pattern finding references a test missing from the catalog"
                    );
                }
            }
        }

        Ok(Self {
            tests,
            test_index,
            patterns,
            panels,
            organ_mappings,
        })
    }

    /// Load the four catalog files from `dir`.
    pub fn load(dir: &Path) -> Result<Self, LabError> {
        let catalog = Self::from_parts(
            read_json(dir, TESTS_FILE)?,
            read_json(dir, PATTERNS_FILE)?,
            read_json(dir, PANELS_FILE)?,
            read_json(dir, ORGAN_MAPPINGS_FILE)?,
        )?;
        tracing::info!(
            dir = %dir.display(),
            tests = catalog.tests.len(),
            patterns = catalog.patterns.len(),
            "Lab catalog loaded"
        );
        Ok(catalog)
    }

    /// The catalogs compiled into the binary.
    pub fn bundled() -> Result<Self, LabError> {
        let catalog = Self::from_parts(
            parse_json(BUNDLED_TESTS, TESTS_FILE)?,
            parse_json(BUNDLED_PATTERNS, PATTERNS_FILE)?,
            parse_json(BUNDLED_PANELS, PANELS_FILE)?,
            parse_json(BUNDLED_ORGAN_MAPPINGS, ORGAN_MAPPINGS_FILE)?,
        )?;
        tracing::info!(
            tests = catalog.tests.len(),
            patterns = catalog.patterns.len(),
            "Bundled lab catalog loaded"
        );
        Ok(catalog)
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    pub fn test(&self, id: &str) -> Option<&LabTest> {
        self.test_index.get(id).map(|&i| &self.tests[i])
    }

    pub fn tests(&self) -> &[LabTest] {
        &self.tests
    }

    pub fn tests_by_category(&self, category: LabCategory) -> Vec<&LabTest> {
        self.tests.iter().filter(|t| t.category == category).collect()
    }

    /// Case-insensitive substring match over each test's primary organs.
    pub fn tests_by_organ(&self, organ: &str) -> Vec<&LabTest> {
        let needle = organ.to_lowercase();
        self.tests
            .iter()
            .filter(|t| {
                t.primary_organs
                    .iter()
                    .any(|o| o.to_lowercase().contains(&needle))
            })
            .collect()
    }

    pub fn tests_by_system(&self, system: BodySystem) -> Vec<&LabTest> {
        self.tests
            .iter()
            .filter(|t| t.affected_systems.contains(&system))
            .collect()
    }

    pub fn tests_by_pathway(&self, pathway_id: &str) -> Vec<&LabTest> {
        self.tests
            .iter()
            .filter(|t| t.related_pathways.iter().any(|p| p == pathway_id))
            .collect()
    }

    /// Exact, case-insensitive match on name or abbreviation.
    pub fn test_by_name(&self, name: &str) -> Option<&LabTest> {
        let wanted = name.trim().to_lowercase();
        self.tests.iter().find(|t| {
            t.name.to_lowercase() == wanted
                || t.abbreviation
                    .as_deref()
                    .is_some_and(|a| a.to_lowercase() == wanted)
        })
    }

    /// Case-insensitive search over name, abbreviation and description.
    pub fn search_tests(&self, query: &str) -> Vec<&LabTest> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.tests
            .iter()
            .filter(|t| {
                t.name.to_lowercase().contains(&needle)
                    || t.abbreviation
                        .as_deref()
                        .is_some_and(|a| a.to_lowercase().contains(&needle))
                    || t.description.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Explanation text for a test at one level, without any result context.
    pub fn explanation(&self, test_id: &str, level: u8) -> Result<&str, LabError> {
        let test = self
            .test(test_id)
            .ok_or_else(|| LabError::UnknownTest(test_id.to_string()))?;
        test.explanations
            .get(level)
            .ok_or(LabError::InvalidLevel(level))
    }

    // -----------------------------------------------------------------------
    // Panels, patterns, organs
    // -----------------------------------------------------------------------

    pub fn panel(&self, id: &str) -> Option<&LabPanel> {
        self.panels.iter().find(|p| p.id == id)
    }

    pub fn panels(&self) -> &[LabPanel] {
        &self.panels
    }

    pub fn pattern(&self, id: &str) -> Option<&LabPattern> {
        self.patterns.iter().find(|p| p.id == id)
    }

    pub fn patterns(&self) -> &[LabPattern] {
        &self.patterns
    }

    pub fn organ_mappings(&self) -> &[OrganLabMapping] {
        &self.organ_mappings
    }

    /// Catalog tests mapped to an organ: primary labs first, then secondary.
    /// Ids the catalog does not define are skipped.
    pub fn labs_for_organ(&self, organ_id: &str) -> Vec<&LabTest> {
        self.organ_mappings
            .iter()
            .find(|m| m.organ_id == organ_id)
            .map(|m| {
                m.primary_labs
                    .iter()
                    .chain(&m.secondary_labs)
                    .filter_map(|id| self.test(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Primary organs of a test; empty for unknown ids.
    pub fn organs_for_lab(&self, lab_id: &str) -> &[String] {
        self.test(lab_id)
            .map(|t| t.primary_organs.as_slice())
            .unwrap_or_default()
    }

    /// Organ mapping ids that list `lab_id` as primary or secondary.
    pub fn mapped_organs_for_lab(&self, lab_id: &str) -> Vec<&str> {
        self.organ_mappings
            .iter()
            .filter(|m| {
                m.primary_labs.iter().any(|l| l == lab_id)
                    || m.secondary_labs.iter().any(|l| l == lab_id)
            })
            .map(|m| m.organ_id.as_str())
            .collect()
    }

    pub fn statistics(&self) -> CatalogStatistics {
        let mut category_counts = BTreeMap::new();
        for test in &self.tests {
            *category_counts.entry(test.category).or_insert(0) += 1;
        }
        CatalogStatistics {
            total_tests: self.tests.len(),
            total_panels: self.panels.len(),
            total_patterns: self.patterns.len(),
            category_counts,
        }
    }
}

fn read_json<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<T, LabError> {
    let path = dir.join(file);
    let json = std::fs::read_to_string(&path)
        .map_err(|e| LabError::ReferenceDataLoad(path.display().to_string(), e.to_string()))?;
    parse_json(&json, file)
}

fn parse_json<T: DeserializeOwned>(json: &str, file: &str) -> Result<T, LabError> {
    serde_json::from_str(json).map_err(|e| LabError::ReferenceDataParse(file.into(), e.to_string()))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_test(test: &LabTest) -> Result<(), LabError> {
    let range = &test.reference_range;
    let general = range
        .general()
        .ok_or_else(|| LabError::configuration(&test.id, "reference range has no general band"))?;

    for (stratum, band) in &range.bands {
        validate_band(&test.id, *stratum, band)?;
    }

    if let Some(c) = range.general_critical_low() {
        if !c.is_finite() || c >= general.low {
            return Err(LabError::configuration(
                &test.id,
                format!("critical low {c} must be below general low {}", general.low),
            ));
        }
    }
    if let Some(c) = range.general_critical_high() {
        if !c.is_finite() || c <= general.high {
            return Err(LabError::configuration(
                &test.id,
                format!("critical high {c} must be above general high {}", general.high),
            ));
        }
    }
    Ok(())
}

fn validate_band(test_id: &str, stratum: Stratum, band: &RangeBand) -> Result<(), LabError> {
    if !band.low.is_finite() || !band.high.is_finite() || band.low >= band.high {
        return Err(LabError::configuration(
            test_id,
            format!("{stratum} band requires low < high, got {}..{}", band.low, band.high),
        ));
    }
    if band.critical_low.is_some_and(|c| !c.is_finite() || c >= band.low) {
        return Err(LabError::configuration(
            test_id,
            format!("{stratum} band critical low must be below {}", band.low),
        ));
    }
    if band.critical_high.is_some_and(|c| !c.is_finite() || c <= band.high) {
        return Err(LabError::configuration(
            test_id,
            format!("{stratum} band critical high must be above {}", band.high),
        ));
    }
    Ok(())
}

fn validate_pattern(pattern: &LabPattern) -> Result<(), LabError> {
    if pattern.required_findings().next().is_none() {
        return Err(LabError::configuration(
            &pattern.id,
            "pattern needs at least one required finding",
        ));
    }
    for finding in &pattern.findings {
        if finding.statuses.is_empty() {
            return Err(LabError::configuration(
                &pattern.id,
                format!("finding for {} accepts no status", finding.test_id),
            ));
        }
        if !finding.weight.is_finite() || finding.weight <= 0.0 {
            return Err(LabError::configuration(
                &pattern.id,
                format!("finding for {} has invalid weight {}", finding.test_id, finding.weight),
            ));
        }
    }
    Ok(())
}
