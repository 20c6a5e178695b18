pub mod demographics;
pub mod enums;
pub mod lab;
pub mod pattern;
pub mod trend;

pub use demographics::UserDemographics;
pub use lab::{
    ClinicalInterpretation, LabPanel, LabTest, LeveledExplanations, OrganLabMapping, RangeBand,
    ReferenceRange,
};
pub use pattern::{LabPattern, OrganImplication, PatternFinding};
pub use trend::LabTrendPoint;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Invalid {field} value: {value:?}")]
    InvalidEnum { field: String, value: String },
}
