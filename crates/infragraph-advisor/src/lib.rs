//! Drift detection, reconciliation and cost advice over an infrastructure graph
//!
//! Everything here reads a graph and returns new values. Rule tables and the
//! catalog are built once by the caller and passed by reference.

pub mod cost;
pub mod drift;
pub mod matching;
pub mod reconcile;
pub mod rules;

#[cfg(test)]
pub mod tests;

pub use cost::{analyze_costs, suggest, CostReport, CostSuggestion, Impact, Suggestion, SuggestionCategory};
pub use drift::{
    AttributeDifference, DriftComparisonError, DriftDetector, DriftOptions, DriftOutcome, DriftRecord, DriftStatus,
    InvalidGroundTruth, MatchedResource, DRIFT_SIGNIFICANT_ATTRIBUTES,
};
pub use matching::{normalize_label, Candidate, CategoryLabelStrategy, MatchStrategy, ResourceKeyStrategy};
pub use reconcile::{reconcile, ReconcileOutput};
pub use rules::{Alternative, CostRules, RESERVED_SAVINGS_PERCENT, SPOT_SAVINGS_PERCENT};
