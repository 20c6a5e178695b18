use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One historical value of a single test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabTrendPoint {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}
