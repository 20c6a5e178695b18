use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::LabPattern;

use super::types::{DetectedPattern, InterpretedLabResult, MatchedFinding};

/// Match classified panel results against the pattern catalog.
///
/// A pattern matches only when every required finding is satisfied.
/// Supportive findings only raise confidence. All matches are returned,
/// ordered by satisfied required findings, then confidence, then id.
pub fn detect_patterns(
    results: &HashMap<String, InterpretedLabResult>,
    catalog: &[LabPattern],
) -> Vec<DetectedPattern> {
    let mut detected: Vec<DetectedPattern> = catalog
        .iter()
        .filter_map(|pattern| match_pattern(results, pattern))
        .collect();

    detected.sort_by(rank);
    detected
}

fn match_pattern(
    results: &HashMap<String, InterpretedLabResult>,
    pattern: &LabPattern,
) -> Option<DetectedPattern> {
    let mut matched_findings = Vec::new();
    let mut satisfied_weight: f64 = 0.0;
    let mut required_satisfied = 0;

    for finding in &pattern.findings {
        let hit = results
            .get(&finding.test_id)
            .filter(|r| finding.accepts(r.status));

        match hit {
            Some(result) => {
                satisfied_weight += finding.weight;
                if finding.required {
                    required_satisfied += 1;
                }
                matched_findings.push(MatchedFinding {
                    test_id: finding.test_id.clone(),
                    required: finding.required,
                    weight: finding.weight,
                    result: result.clone(),
                });
            }
            None if finding.required => {
                tracing::debug!(
                    pattern_id = %pattern.id,
                    test_id = %finding.test_id,
                    present = results.contains_key(&finding.test_id),
                    "Pattern rejected: required finding not satisfied"
                );
                return None;
            }
            None => {}
        }
    }

    let total_weight = pattern.total_weight();
    let confidence = if total_weight > 0.0 {
        (satisfied_weight / total_weight).clamp(0.0, 1.0)
    } else {
        0.0
    };

    Some(DetectedPattern {
        pattern_id: pattern.id.clone(),
        name: pattern.name.clone(),
        confidence,
        required_satisfied,
        matched_findings,
        organ_implications: pattern.organ_implications.clone(),
    })
}

fn rank(a: &DetectedPattern, b: &DetectedPattern) -> Ordering {
    b.required_satisfied
        .cmp(&a.required_satisfied)
        .then_with(|| b.confidence.total_cmp(&a.confidence))
        .then_with(|| a.pattern_id.cmp(&b.pattern_id))
}
