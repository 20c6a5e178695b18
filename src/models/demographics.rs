use serde::{Deserialize, Serialize};

use super::enums::BiologicalSex;

/// Patient context supplied with each classification call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDemographics {
    pub age_years: u32,
    pub sex: BiologicalSex,
    #[serde(default)]
    pub pregnant: bool,
}

impl UserDemographics {
    pub fn new(age_years: u32, sex: BiologicalSex) -> Self {
        Self {
            age_years,
            sex,
            pregnant: false,
        }
    }

    pub fn pregnant(mut self, pregnant: bool) -> Self {
        self.pregnant = pregnant;
        self
    }
}
