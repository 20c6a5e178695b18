use crate::models::LabTest;

use super::messages::MessageTemplates;
use super::types::{InterpretedLabResult, LabError};

/// Explanation text for `result` at `level` (1 plain .. 5 specialist).
///
/// Normal results get the base text verbatim. Abnormal results get one
/// extra sentence built from the conditions the classifier already found.
pub fn explain(
    test: &LabTest,
    result: &InterpretedLabResult,
    level: u8,
) -> Result<String, LabError> {
    let base = test
        .explanations
        .get(level)
        .ok_or(LabError::InvalidLevel(level))?;

    match MessageTemplates::abnormal_result(result.status, &result.conditions) {
        Some(sentence) => Ok(format!("{} {}", base, sentence)),
        None => Ok(base.to_string()),
    }
}
