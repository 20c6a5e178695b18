use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use uuid::Uuid;

use crate::config::EngineConfig;
use crate::models::{LabTest, LabTrendPoint, UserDemographics};

use super::classify::classify;
use super::critical::CriticalResultProtocol;
use super::explain::explain;
use super::patterns::detect_patterns;
use super::range::resolve;
use super::reference::LabCatalog;
use super::trend::analyze_trend;
use super::types::{
    InterpretedLabResult, LabError, LabInterpretationEngine, LabTrend, LabValue,
    PanelAnalysisResult, StatusCounts, UnresolvedReason, UnresolvedValue,
};

/// Default implementation of the interpretation engine.
/// Holds only read-only state, so one instance can serve any number of threads.
pub struct DefaultLabEngine {
    catalog: Arc<LabCatalog>,
    config: EngineConfig,
}

impl DefaultLabEngine {
    pub fn new(catalog: Arc<LabCatalog>, config: EngineConfig) -> Result<Self, LabError> {
        config.validate()?;
        Ok(Self { catalog, config })
    }

    /// Build from config: catalogs from `catalog_dir` when set, else bundled.
    pub fn from_config(config: EngineConfig) -> Result<Self, LabError> {
        let catalog = match &config.catalog_dir {
            Some(dir) => LabCatalog::load(dir)?,
            None => LabCatalog::bundled()?,
        };
        Self::new(Arc::new(catalog), config)
    }

    pub fn catalog(&self) -> &LabCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn lookup(&self, test_id: &str) -> Result<&LabTest, LabError> {
        self.catalog
            .test(test_id)
            .ok_or_else(|| LabError::UnknownTest(test_id.to_string()))
    }

    fn interpret_test(
        test: &LabTest,
        value: f64,
        demographics: &UserDemographics,
    ) -> Result<InterpretedLabResult, LabError> {
        let band = resolve(test, demographics)?;
        classify(&test.id, value, &band, &test.interpretations)
    }
}

impl LabInterpretationEngine for DefaultLabEngine {
    fn interpret(
        &self,
        test_id: &str,
        value: f64,
        demographics: &UserDemographics,
    ) -> Result<InterpretedLabResult, LabError> {
        let test = self.lookup(test_id)?;
        Self::interpret_test(test, value, demographics)
    }

    fn explain(&self, result: &InterpretedLabResult, level: u8) -> Result<String, LabError> {
        let test = self.lookup(&result.test_id)?;
        explain(test, result, level)
    }

    fn analyze_panel(
        &self,
        values: &[LabValue],
        demographics: &UserDemographics,
    ) -> Result<PanelAnalysisResult, LabError> {
        let start = Instant::now();

        let mut results = Vec::with_capacity(values.len());
        let mut unresolved = Vec::new();
        let mut seen = HashSet::new();
        let mut counts = StatusCounts::default();

        for entry in values {
            let reason = if !seen.insert(entry.test_id.as_str()) {
                Some(UnresolvedReason::DuplicateEntry)
            } else {
                match self.catalog.test(&entry.test_id) {
                    None => Some(UnresolvedReason::UnknownTest),
                    Some(test) => match Self::interpret_test(test, entry.value, demographics) {
                        Ok(result) => {
                            counts.record(result.status);
                            results.push(result);
                            None
                        }
                        Err(LabError::InvalidValue { .. }) => Some(UnresolvedReason::InvalidValue),
                        Err(e) => return Err(e),
                    },
                }
            };

            if let Some(reason) = reason {
                tracing::warn!(
                    test_id = %entry.test_id,
                    reason = ?reason,
                    "Panel entry could not be interpreted"
                );
                unresolved.push(UnresolvedValue {
                    test_id: entry.test_id.clone(),
                    value: entry.value,
                    reason,
                });
            }
        }

        let by_test: HashMap<String, InterpretedLabResult> = results
            .iter()
            .map(|r| (r.test_id.clone(), r.clone()))
            .collect();
        let patterns = detect_patterns(&by_test, self.catalog.patterns());
        let critical_notices = CriticalResultProtocol::process(&results, &self.catalog);

        let processing_time_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            total = counts.total(),
            abnormal = counts.abnormal(),
            unresolved = unresolved.len(),
            patterns = patterns.len(),
            critical = critical_notices.len(),
            processing_ms = processing_time_ms,
            "Panel analysis complete"
        );

        Ok(PanelAnalysisResult {
            analysis_id: Uuid::new_v4(),
            analyzed_at: chrono::Local::now().naive_local(),
            results,
            unresolved,
            patterns,
            counts,
            critical_notices,
            processing_time_ms,
        })
    }

    fn analyze_trend(
        &self,
        test_id: &str,
        points: &[LabTrendPoint],
    ) -> Result<LabTrend, LabError> {
        self.lookup(test_id)?;
        analyze_trend(test_id, points, self.config.significance_threshold_percent)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::enums::{BiologicalSex, ResultStatus, Stratum, TrendDirection, Urgency};

    fn engine() -> DefaultLabEngine {
        DefaultLabEngine::from_config(EngineConfig::default()).unwrap()
    }

    fn adult_female() -> UserDemographics {
        UserDemographics::new(35, BiologicalSex::Female)
    }

    #[test]
    fn engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DefaultLabEngine>();
    }

    #[test]
    fn interpret_low_hemoglobin_for_adult_female() {
        let result = engine().interpret("hemoglobin", 10.0, &adult_female()).unwrap();
        assert_eq!(result.range.stratum, Stratum::Female);
        assert_eq!(result.status, ResultStatus::Low);
        assert_eq!(result.urgency, Urgency::Urgent);
        assert_eq!(result.conditions.first().map(String::as_str), Some("Iron deficiency anemia"));
    }

    #[test]
    fn interpret_critical_low_hemoglobin() {
        let result = engine().interpret("hemoglobin", 6.5, &adult_female()).unwrap();
        assert_eq!(result.status, ResultStatus::CriticalLow);
        assert_eq!(result.range.critical_low, Some(7.0));
    }

    #[test]
    fn interpret_unknown_test() {
        assert_eq!(
            engine().interpret("hba1c", 6.0, &adult_female()),
            Err(LabError::UnknownTest("hba1c".into()))
        );
    }

    #[test]
    fn explain_through_engine() {
        let engine = engine();
        let result = engine.interpret("hemoglobin", 10.0, &adult_female()).unwrap();
        let text = engine.explain(&result, 1).unwrap();
        assert!(text.contains("Your result is lower than expected, which can occur with:"));
        assert_eq!(engine.explain(&result, 7), Err(LabError::InvalidLevel(7)));
    }

    #[test]
    fn panel_detects_iron_deficiency() {
        let values = vec![
            LabValue::new("mcv", 72.0),
            LabValue::new("ferritin", 5.0),
            LabValue::new("tibc", 480.0),
            LabValue::new("hemoglobin", 10.0),
        ];
        let analysis = engine().analyze_panel(&values, &adult_female()).unwrap();
        assert_eq!(analysis.results.len(), 4);
        assert!(analysis.unresolved.is_empty());
        assert_eq!(analysis.counts.abnormal(), 4);

        let top = &analysis.patterns[0];
        assert_eq!(top.pattern_id, "iron-deficiency-anemia");
        assert_eq!(top.required_satisfied, 3);
        // 2 + 2 + 1.5 + 1 of 7
        assert!((top.confidence - 6.5 / 7.0).abs() < 1e-12);
        assert!(!analysis
            .patterns
            .iter()
            .any(|p| p.pattern_id == "bone-marrow-suppression"));
    }

    #[test]
    fn panel_reports_unresolved_entries() {
        let values = vec![
            LabValue::new("glucose", 90.0),
            LabValue::new("glucose", 300.0),
            LabValue::new("hba1c", 6.0),
            LabValue::new("sodium", f64::NAN),
        ];
        let analysis = engine().analyze_panel(&values, &adult_female()).unwrap();
        assert_eq!(analysis.results.len(), 1);
        assert_eq!(analysis.results[0].value, 90.0);
        let reasons: Vec<_> = analysis.unresolved.iter().map(|u| u.reason).collect();
        assert_eq!(
            reasons,
            vec![
                UnresolvedReason::DuplicateEntry,
                UnresolvedReason::UnknownTest,
                UnresolvedReason::InvalidValue
            ]
        );
        assert_eq!(analysis.counts.total(), 1);
    }

    #[test]
    fn panel_raises_critical_notice() {
        let values = vec![LabValue::new("potassium", 7.1), LabValue::new("sodium", 140.0)];
        let analysis = engine().analyze_panel(&values, &adult_female()).unwrap();
        assert_eq!(analysis.counts.critical_high, 1);
        assert_eq!(analysis.critical_notices.len(), 1);
        assert_eq!(analysis.critical_notices[0].test_id, "potassium");
    }

    #[test]
    fn empty_panel_is_valid() {
        let analysis = engine().analyze_panel(&[], &adult_female()).unwrap();
        assert!(analysis.results.is_empty());
        assert!(analysis.patterns.is_empty());
        assert_eq!(analysis.counts.total(), 0);
    }

    #[test]
    fn trend_uses_configured_threshold() {
        let day = |d: u32| {
            NaiveDate::from_ymd_opt(2026, 3, d)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap()
        };
        let points = vec![
            LabTrendPoint { timestamp: day(1), value: 100.0 },
            LabTrendPoint { timestamp: day(11), value: 106.0 },
        ];
        let default = engine().analyze_trend("glucose", &points).unwrap();
        assert_eq!(default.direction, TrendDirection::Stable);

        let config = EngineConfig {
            significance_threshold_percent: 5.0,
            ..EngineConfig::default()
        };
        let sensitive = DefaultLabEngine::from_config(config).unwrap();
        let trend = sensitive.analyze_trend("glucose", &points).unwrap();
        assert_eq!(trend.direction, TrendDirection::Rising);
        assert!(trend.is_significant);
        assert!(matches!(
            sensitive.analyze_trend("hba1c", &points),
            Err(LabError::UnknownTest(_))
        ));
    }

    #[test]
    fn rejects_invalid_config() {
        let config = EngineConfig {
            significance_threshold_percent: f64::NAN,
            ..EngineConfig::default()
        };
        assert!(DefaultLabEngine::from_config(config).is_err());
    }
}
