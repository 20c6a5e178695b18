use std::collections::HashSet;

use crate::models::enums::{ResultStatus, Urgency};
use crate::models::ClinicalInterpretation;

use super::helpers::extend_unique;
use super::types::{InterpretedLabResult, LabError, ResolvedBand};

/// Ordinal status of `value` against `band`. Critical thresholds are checked
/// before the nominal bounds.
pub fn status_for(value: f64, band: &ResolvedBand) -> ResultStatus {
    if band.critical_low.is_some_and(|c| value < c) {
        ResultStatus::CriticalLow
    } else if band.critical_high.is_some_and(|c| value > c) {
        ResultStatus::CriticalHigh
    } else if value < band.low {
        ResultStatus::Low
    } else if value > band.high {
        ResultStatus::High
    } else {
        ResultStatus::Normal
    }
}

/// Classify a raw value and collect urgency, candidate conditions and
/// follow-up tests from the interpretations on the matching side.
pub fn classify(
    test_id: &str,
    value: f64,
    band: &ResolvedBand,
    interpretations: &[ClinicalInterpretation],
) -> Result<InterpretedLabResult, LabError> {
    if !value.is_finite() {
        return Err(LabError::InvalidValue {
            test_id: test_id.to_string(),
            value,
        });
    }

    let status = status_for(value, band);

    let mut urgency = Urgency::Routine;
    let mut conditions = Vec::new();
    let mut additional_tests = Vec::new();
    let mut seen_conditions = HashSet::new();
    let mut seen_tests = HashSet::new();

    for interp in interpretations.iter().filter(|i| i.direction.applies_to(status)) {
        urgency = urgency.max(interp.urgency);
        extend_unique(&mut conditions, &mut seen_conditions, &interp.conditions);
        extend_unique(&mut additional_tests, &mut seen_tests, &interp.additional_tests);
    }

    Ok(InterpretedLabResult {
        test_id: test_id.to_string(),
        value,
        range: band.clone(),
        status,
        urgency,
        conditions,
        additional_tests,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpretation::helpers::fixtures::interp;
    use crate::models::enums::{Direction, Stratum};

    fn female_hgb(critical_low: Option<f64>) -> ResolvedBand {
        ResolvedBand {
            stratum: Stratum::Female,
            low: 12.0,
            high: 16.0,
            unit: "g/dL".into(),
            critical_low,
            critical_high: None,
        }
    }

    fn hgb_interpretations() -> Vec<ClinicalInterpretation> {
        vec![
            interp(
                Direction::Low,
                &["Iron deficiency anemia", "Blood loss"],
                Urgency::Urgent,
            ),
            interp(Direction::High, &["Dehydration", "Polycythemia"], Urgency::Routine),
            interp(Direction::Both, &["Blood loss", "Lab error"], Urgency::Routine),
        ]
    }

    #[test]
    fn low_hemoglobin_takes_low_urgency() {
        let result = classify(
            "hemoglobin",
            10.0,
            &female_hgb(None),
            &hgb_interpretations(),
        )
        .unwrap();
        assert_eq!(result.status, ResultStatus::Low);
        assert_eq!(result.urgency, Urgency::Urgent);
        assert_eq!(
            result.conditions,
            vec!["Iron deficiency anemia", "Blood loss", "Lab error"]
        );
    }

    #[test]
    fn critical_low_dominates_nominal_low() {
        let result = classify(
            "hemoglobin",
            6.5,
            &female_hgb(Some(7.0)),
            &hgb_interpretations(),
        )
        .unwrap();
        assert_eq!(result.status, ResultStatus::CriticalLow);
    }

    #[test]
    fn boundaries_are_normal() {
        let band = female_hgb(Some(7.0));
        assert_eq!(status_for(12.0, &band), ResultStatus::Normal);
        assert_eq!(status_for(16.0, &band), ResultStatus::Normal);
        assert_eq!(status_for(7.0, &band), ResultStatus::Low);
        assert_eq!(status_for(16.1, &band), ResultStatus::High);
    }

    #[test]
    fn critical_high_checked_before_high() {
        let mut band = female_hgb(None);
        band.critical_high = Some(20.0);
        assert_eq!(status_for(20.5, &band), ResultStatus::CriticalHigh);
        assert_eq!(status_for(20.0, &band), ResultStatus::High);
    }

    #[test]
    fn normal_result_is_routine_without_conditions() {
        let result = classify(
            "hemoglobin",
            14.0,
            &female_hgb(None),
            &hgb_interpretations(),
        )
        .unwrap();
        assert_eq!(result.status, ResultStatus::Normal);
        assert_eq!(result.urgency, Urgency::Routine);
        assert!(result.conditions.is_empty());
    }

    #[test]
    fn no_matching_interpretation_defaults_routine() {
        let interps = vec![interp(Direction::High, &["Dehydration"], Urgency::Critical)];
        let result = classify("hemoglobin", 9.0, &female_hgb(None), &interps).unwrap();
        assert_eq!(result.urgency, Urgency::Routine);
        assert!(result.conditions.is_empty());
    }

    #[test]
    fn additional_tests_are_deduplicated() {
        let mut interps = hgb_interpretations();
        interps[0].additional_tests = vec!["ferritin".into(), "reticulocytes".into()];
        interps[2].additional_tests = vec!["ferritin".into(), "mcv".into()];
        let result = classify("hemoglobin", 10.0, &female_hgb(None), &interps).unwrap();
        assert_eq!(result.additional_tests, vec!["ferritin", "reticulocytes", "mcv"]);
    }

    #[test]
    fn non_finite_value_rejected() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = classify("hemoglobin", value, &female_hgb(None), &[]).unwrap_err();
            assert!(matches!(err, LabError::InvalidValue { .. }));
        }
    }

    #[test]
    fn classify_is_idempotent() {
        let band = female_hgb(Some(7.0));
        let interps = hgb_interpretations();
        let a = classify("hemoglobin", 10.0, &band, &interps).unwrap();
        let b = classify("hemoglobin", 10.0, &band, &interps).unwrap();
        assert_eq!(a, b);
    }
}
