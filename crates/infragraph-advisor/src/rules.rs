//! Static savings rule tables

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Discount applied to reserved-eligible components.
pub const RESERVED_SAVINGS_PERCENT: f64 = 30.0;

/// Discount applied to spot-eligible components.
pub const SPOT_SAVINGS_PERCENT: f64 = 60.0;

/// A cheaper canonical component that can stand in for another one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alternative {
    pub canonical_id: String,
    pub savings_percent: f64,
    pub reason: String,
}

impl Alternative {
    fn new(canonical_id: &str, savings_percent: f64, reason: &str) -> Self {
        Alternative {
            canonical_id: canonical_id.to_string(),
            savings_percent,
            reason: reason.to_string(),
        }
    }
}

/// Savings rules keyed by canonical id. Built once, passed by reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostRules {
    /// Ranked, best first. Only the first entry is ever suggested.
    pub alternatives: BTreeMap<String, Vec<Alternative>>,
    pub reserved_eligible: Vec<String>,
    pub spot_eligible: Vec<String>,
}

impl CostRules {
    pub fn builtin() -> Self {
        let alternatives = BTreeMap::from([
            (
                "compute.kubernetes".to_string(),
                vec![
                    Alternative::new(
                        "compute.container",
                        40.0,
                        "Small clusters cost less as managed container services without a control plane",
                    ),
                    Alternative::new("compute.vm", 25.0, "A few long-lived workloads fit on plain virtual machines"),
                ],
            ),
            (
                "storage.file".to_string(),
                vec![Alternative::new(
                    "storage.object",
                    45.0,
                    "Infrequently modified files are cheaper in object storage",
                )],
            ),
        ]);

        CostRules {
            alternatives,
            reserved_eligible: vec![
                "compute.vm".to_string(),
                "database.relational".to_string(),
                "database.cache".to_string(),
            ],
            spot_eligible: vec!["compute.vm".to_string(), "compute.container".to_string()],
        }
    }

    pub fn top_alternative(&self, canonical_id: &str) -> Option<&Alternative> {
        self.alternatives.get(canonical_id)?.first()
    }

    pub fn is_reserved_eligible(&self, canonical_id: &str) -> bool {
        self.reserved_eligible.iter().any(|id| id == canonical_id)
    }

    pub fn is_spot_eligible(&self, canonical_id: &str) -> bool {
        self.spot_eligible.iter().any(|id| id == canonical_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_rules() {
        let rules = CostRules::builtin();
        let top = rules.top_alternative("compute.kubernetes").unwrap();
        assert_eq!(top.canonical_id, "compute.container");
        assert_eq!(top.savings_percent, 40.0);
        assert!(rules.top_alternative("compute.vm").is_none());
        assert!(rules.is_reserved_eligible("compute.vm"));
        assert!(rules.is_spot_eligible("compute.vm"));
        assert!(!rules.is_spot_eligible("database.relational"));
    }
}
