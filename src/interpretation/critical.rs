use serde::{Deserialize, Serialize};

use crate::models::enums::ResultStatus;

use super::messages::MessageTemplates;
use super::reference::LabCatalog;
use super::types::InterpretedLabResult;

/// Notice generation for results beyond a critical threshold.
pub struct CriticalResultProtocol;

impl CriticalResultProtocol {
    /// One notice per critical-low / critical-high result, in input order.
    pub fn process(results: &[InterpretedLabResult], catalog: &LabCatalog) -> Vec<CriticalNotice> {
        results
            .iter()
            .filter(|r| r.status.is_critical())
            .map(|result| {
                let test_name = catalog
                    .test(&result.test_id)
                    .map(|t| t.name.clone())
                    .unwrap_or_else(|| result.test_id.clone());

                let follow_up_tests: Vec<String> = result
                    .additional_tests
                    .iter()
                    .map(|id| {
                        catalog
                            .test(id)
                            .map(|t| t.name.clone())
                            .unwrap_or_else(|| id.clone())
                    })
                    .collect();

                let mut message = MessageTemplates::critical_result(
                    &test_name,
                    result.value,
                    &result.range.unit,
                    result.status,
                );
                if let Some(follow_up) = MessageTemplates::follow_up(&follow_up_tests) {
                    message.push(' ');
                    message.push_str(&follow_up);
                }

                CriticalNotice {
                    test_id: result.test_id.clone(),
                    test_name,
                    status: result.status,
                    value: result.value,
                    unit: result.range.unit.clone(),
                    message,
                    follow_up_tests,
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalNotice {
    pub test_id: String,
    pub test_name: String,
    pub status: ResultStatus,
    pub value: f64,
    pub unit: String,
    /// Calm, preparatory wording for the summary view.
    pub message: String,
    /// Display names of suggested follow-up tests.
    pub follow_up_tests: Vec<String>,
}
