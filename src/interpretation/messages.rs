use crate::models::enums::ResultStatus;

use super::helpers::join_readable;

/// Patient-facing sentence templates.
/// Calm, preparatory wording only: "prompt attention" / "soon", never
/// "immediately" or "emergency".
pub struct MessageTemplates;

impl MessageTemplates {
    /// Sentence appended to an explanation for an out-of-range result.
    /// Returns `None` for a normal result.
    pub fn abnormal_result(status: ResultStatus, conditions: &[String]) -> Option<String> {
        let side = if status.is_below() {
            "lower"
        } else if status.is_above() {
            "higher"
        } else {
            return None;
        };

        if conditions.is_empty() {
            Some(format!(
                "Your result is {} than expected. \
                 Your doctor can help explain what this means for you.",
                side,
            ))
        } else {
            Some(format!(
                "Your result is {} than expected, which can occur with: {}.",
                side,
                conditions.join(", "),
            ))
        }
    }

    /// Notice for a result beyond a critical threshold.
    pub fn critical_result(
        test_name: &str,
        value: f64,
        unit: &str,
        status: ResultStatus,
    ) -> String {
        let side = if status.is_below() { "below" } else { "above" };
        format!(
            "Your {} result of {} {} is {} the range where your lab flags it for prompt attention. \
             Please contact your doctor soon to talk it through.",
            test_name, value, unit, side,
        )
    }

    /// Follow-up tests sentence for a critical notice.
    pub fn follow_up(test_names: &[String]) -> Option<String> {
        if test_names.is_empty() {
            return None;
        }
        Some(format!(
            "Your doctor may also want to check {}.",
            join_readable(test_names),
        ))
    }
}
