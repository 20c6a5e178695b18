pub mod classify;
pub mod critical;
pub mod engine;
pub mod explain;
pub mod helpers;
pub mod messages;
pub mod patterns;
pub mod range;
pub mod reference;
pub mod trend;
pub mod types;

pub use critical::{CriticalNotice, CriticalResultProtocol};
pub use engine::DefaultLabEngine;
pub use reference::{CatalogStatistics, LabCatalog};
pub use types::{
    DetectedPattern, InterpretedLabResult, LabError, LabInterpretationEngine, LabTrend, LabValue,
    MatchedFinding, PanelAnalysisResult, PanelRequest, ResolvedBand, StatusCounts, TrendRequest,
    TrendStep, UnresolvedReason, UnresolvedValue,
};
