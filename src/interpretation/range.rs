use crate::models::enums::{BiologicalSex, Stratum};
use crate::models::{LabTest, UserDemographics};

use super::types::{LabError, ResolvedBand};

/// Patients younger than this use the pediatric band when one exists.
pub const PEDIATRIC_AGE_LIMIT: u32 = 18;

/// Patients at or above this age use the geriatric band when one exists.
pub const GERIATRIC_AGE: u32 = 65;

/// Candidate strata for a patient, most specific first, always ending in
/// `General`. Strata the patient does not qualify for are omitted.
pub fn precedence(demographics: &UserDemographics) -> Vec<Stratum> {
    let mut order = Vec::with_capacity(5);
    if demographics.pregnant {
        order.push(Stratum::Pregnancy);
    }
    if demographics.age_years < PEDIATRIC_AGE_LIMIT {
        order.push(Stratum::Pediatric);
    }
    if demographics.age_years >= GERIATRIC_AGE {
        order.push(Stratum::Geriatric);
    }
    match demographics.sex {
        BiologicalSex::Male => order.push(Stratum::Male),
        BiologicalSex::Female => order.push(Stratum::Female),
        BiologicalSex::Unspecified => {}
    }
    order.push(Stratum::General);
    order
}

/// Select the single band that applies to this patient.
///
/// Critical thresholds the selected band leaves unset are taken from the
/// general band.
pub fn resolve(test: &LabTest, demographics: &UserDemographics) -> Result<ResolvedBand, LabError> {
    let range = &test.reference_range;
    if range.general().is_none() {
        return Err(LabError::configuration(
            &test.id,
            "reference range has no general band",
        ));
    }

    let (stratum, band) = precedence(demographics)
        .into_iter()
        .find_map(|s| range.band(s).map(|b| (s, b)))
        .ok_or_else(|| LabError::configuration(&test.id, "no applicable band"))?;

    let (critical_low, critical_high) = if stratum == Stratum::General {
        (range.general_critical_low(), range.general_critical_high())
    } else {
        (
            band.critical_low.or(range.general_critical_low()),
            band.critical_high.or(range.general_critical_high()),
        )
    };

    tracing::debug!(test_id = %test.id, stratum = %stratum, "Reference band selected");

    Ok(ResolvedBand {
        stratum,
        low: band.low,
        high: band.high,
        unit: band.unit.clone(),
        critical_low,
        critical_high,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpretation::helpers::fixtures::{band, make_test};

    fn hemoglobin() -> LabTest {
        let mut test = make_test("hemoglobin", band(12.0, 17.5, "g/dL"));
        let bands = &mut test.reference_range.bands;
        bands.insert(Stratum::Male, band(13.5, 17.5, "g/dL"));
        bands.insert(Stratum::Female, band(12.0, 16.0, "g/dL"));
        bands.insert(Stratum::Pregnancy, band(11.0, 14.0, "g/dL"));
        bands.insert(Stratum::Pediatric, band(11.5, 15.5, "g/dL"));
        test.reference_range.critical_low = Some(7.0);
        test.reference_range.critical_high = Some(20.0);
        test
    }

    #[test]
    fn precedence_orders_specific_to_general() {
        let d = UserDemographics::new(16, BiologicalSex::Female).pregnant(true);
        assert_eq!(
            precedence(&d),
            vec![
                Stratum::Pregnancy,
                Stratum::Pediatric,
                Stratum::Female,
                Stratum::General
            ]
        );

        let d = UserDemographics::new(70, BiologicalSex::Male);
        assert_eq!(
            precedence(&d),
            vec![Stratum::Geriatric, Stratum::Male, Stratum::General]
        );
    }

    #[test]
    fn age_cutoffs_are_exclusive_and_inclusive() {
        let at_18 = UserDemographics::new(18, BiologicalSex::Unspecified);
        assert_eq!(precedence(&at_18), vec![Stratum::General]);
        let at_65 = UserDemographics::new(65, BiologicalSex::Unspecified);
        assert_eq!(precedence(&at_65), vec![Stratum::Geriatric, Stratum::General]);
    }

    #[test]
    fn falls_back_to_general_without_specific_band() {
        let test = make_test("glucose", band(70.0, 100.0, "mg/dL"));
        for d in [
            UserDemographics::new(8, BiologicalSex::Male),
            UserDemographics::new(80, BiologicalSex::Female).pregnant(true),
            UserDemographics::new(40, BiologicalSex::Unspecified),
        ] {
            let resolved = resolve(&test, &d).unwrap();
            assert_eq!(resolved.stratum, Stratum::General);
            assert_eq!((resolved.low, resolved.high), (70.0, 100.0));
        }
    }

    #[test]
    fn pregnancy_beats_sex_band() {
        let d = UserDemographics::new(30, BiologicalSex::Female).pregnant(true);
        let resolved = resolve(&hemoglobin(), &d).unwrap();
        assert_eq!(resolved.stratum, Stratum::Pregnancy);
        assert_eq!(resolved.low, 11.0);
    }

    #[test]
    fn pediatric_beats_sex_band() {
        let d = UserDemographics::new(10, BiologicalSex::Male);
        let resolved = resolve(&hemoglobin(), &d).unwrap();
        assert_eq!(resolved.stratum, Stratum::Pediatric);
    }

    #[test]
    fn geriatric_skipped_when_absent() {
        let d = UserDemographics::new(72, BiologicalSex::Female);
        let resolved = resolve(&hemoglobin(), &d).unwrap();
        assert_eq!(resolved.stratum, Stratum::Female);
        assert_eq!((resolved.low, resolved.high), (12.0, 16.0));
    }

    #[test]
    fn criticals_inherited_from_general() {
        let d = UserDemographics::new(30, BiologicalSex::Female);
        let resolved = resolve(&hemoglobin(), &d).unwrap();
        assert_eq!(resolved.critical_low, Some(7.0));
        assert_eq!(resolved.critical_high, Some(20.0));
    }

    #[test]
    fn band_own_criticals_win() {
        let mut test = make_test("sodium", band(136.0, 145.0, "mEq/L"));
        test.reference_range.critical_low = Some(120.0);
        test.reference_range.critical_high = Some(160.0);
        let mut pediatric = band(135.0, 145.0, "mEq/L");
        pediatric.critical_low = Some(125.0);
        test.reference_range
            .bands
            .insert(Stratum::Pediatric, pediatric);

        let child = UserDemographics::new(5, BiologicalSex::Male);
        let resolved = resolve(&test, &child).unwrap();
        assert_eq!(resolved.critical_low, Some(125.0));
        assert_eq!(resolved.critical_high, Some(160.0));
    }

    #[test]
    fn missing_general_band_is_configuration_error() {
        let mut test = hemoglobin();
        test.reference_range.bands.remove(&Stratum::General);
        let d = UserDemographics::new(30, BiologicalSex::Male);
        let err = resolve(&test, &d).unwrap_err();
        assert!(matches!(err, LabError::Configuration { .. }));
    }
}
