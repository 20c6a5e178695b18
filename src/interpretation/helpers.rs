use std::collections::HashSet;

/// Append `items` to `out`, skipping anything already present.
pub fn extend_unique<'a, I>(out: &mut Vec<String>, seen: &mut HashSet<String>, items: I)
where
    I: IntoIterator<Item = &'a String>,
{
    for item in items {
        if seen.insert(item.clone()) {
            out.push(item.clone());
        }
    }
}

/// Percent change from `previous` to `current`; `None` from a zero baseline.
pub fn percent_change(previous: f64, current: f64) -> Option<f64> {
    if previous == 0.0 {
        None
    } else {
        Some((current - previous) / previous.abs() * 100.0)
    }
}

/// Join a list for patient-facing text: "A", "A and B", "A, B and C".
pub fn join_readable(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [head @ .., last] => format!("{} and {}", head.join(", "), last),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::collections::BTreeMap;

    use crate::models::enums::{
        BodySystem, Direction, LabCategory, ResultStatus, Specimen, Stratum, Urgency,
    };
    use crate::models::{
        ClinicalInterpretation, LabPattern, LabTest, LeveledExplanations, PatternFinding,
        RangeBand, ReferenceRange,
    };

    pub fn band(low: f64, high: f64, unit: &str) -> RangeBand {
        RangeBand {
            low,
            high,
            unit: unit.into(),
            critical_low: None,
            critical_high: None,
        }
    }

    pub fn interp(
        direction: Direction,
        conditions: &[&str],
        urgency: Urgency,
    ) -> ClinicalInterpretation {
        ClinicalInterpretation {
            direction,
            conditions: conditions.iter().map(|c| c.to_string()).collect(),
            urgency,
            additional_tests: Vec::new(),
        }
    }

    /// A minimal test with only a general band and no interpretations.
    pub fn make_test(id: &str, general: RangeBand) -> LabTest {
        let mut bands = BTreeMap::new();
        bands.insert(Stratum::General, general);
        LabTest {
            id: id.into(),
            name: id.to_uppercase(),
            abbreviation: None,
            loinc_code: None,
            category: LabCategory::Cbc,
            specimen: Specimen::WholeBlood,
            description: format!("{id} test"),
            primary_organs: vec!["Bone Marrow".into()],
            affected_systems: vec![BodySystem::Hematologic],
            reference_range: ReferenceRange {
                bands,
                critical_low: None,
                critical_high: None,
                notes: None,
            },
            interpretations: Vec::new(),
            explanations: LeveledExplanations {
                level1: format!("{id} level one."),
                level2: format!("{id} level two."),
                level3: format!("{id} level three."),
                level4: format!("{id} level four."),
                level5: format!("{id} level five."),
            },
            key_facts: Vec::new(),
            related_tests: Vec::new(),
            related_pathways: Vec::new(),
        }
    }

    pub fn finding(
        test_id: &str,
        statuses: &[ResultStatus],
        required: bool,
        weight: f64,
    ) -> PatternFinding {
        PatternFinding {
            test_id: test_id.into(),
            statuses: statuses.to_vec(),
            required,
            weight,
        }
    }

    pub fn make_pattern(id: &str, findings: Vec<PatternFinding>) -> LabPattern {
        LabPattern {
            id: id.into(),
            name: id.replace('-', " "),
            description: String::new(),
            findings,
            organ_implications: Vec::new(),
        }
    }
}
