//! Cost report and per-node savings suggestions

use serde::{Deserialize, Serialize};

use infragraph_core::{CanonicalCatalog, CostRange, GraphNode, InfraGraph, NodeId, Provider};

use crate::rules::{CostRules, RESERVED_SAVINGS_PERCENT, SPOT_SAVINGS_PERCENT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionCategory {
    Alternative,
    Reserved,
    Spot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    Medium,
    High,
}

impl Impact {
    /// Classify by midpoint monthly savings in USD.
    pub fn from_savings(monthly: f64) -> Self {
        if monthly >= 100.0 {
            Impact::High
        } else if monthly >= 25.0 {
            Impact::Medium
        } else {
            Impact::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub component_id: String,
    pub estimated_cost: CostRange,
    pub reason: String,
    pub savings_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostSuggestion {
    pub node_id: NodeId,
    pub current_cost: CostRange,
    pub suggestion: Suggestion,
    pub category: SuggestionCategory,
    pub impact: Impact,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostReport {
    pub current_cost: CostRange,
    pub optimized_cost: CostRange,
    pub savings: CostRange,
    /// Sorted by descending savings percent; equal percents keep graph order.
    pub suggestions: Vec<CostSuggestion>,
}

/// The provider a node is priced under: its own, or the cheapest one for
/// hand-drawn nodes that never named a provider.
fn pricing_provider(node: &GraphNode, catalog: &CanonicalCatalog) -> Option<Provider> {
    node.provider
        .clone()
        .or_else(|| catalog.cheapest_provider(&node.canonical_id))
}

/// At most one suggestion: alternative, then reserved, then spot.
pub fn suggest(node: &GraphNode, catalog: &CanonicalCatalog, rules: &CostRules) -> Option<CostSuggestion> {
    let provider = pricing_provider(node, catalog)?;
    let current = catalog.component_for(&node.canonical_id, &provider)?;
    let current_cost = current.cost_range;

    let (component_id, savings_percent, reason, category) =
        if let Some(alternative) = rules.top_alternative(&node.canonical_id) {
            let component_id = catalog
                .component_for(&alternative.canonical_id, &provider)
                .map(|pc| pc.component_id.clone())
                .unwrap_or_else(|| alternative.canonical_id.clone());
            (
                component_id,
                alternative.savings_percent,
                alternative.reason.clone(),
                SuggestionCategory::Alternative,
            )
        } else if rules.is_reserved_eligible(&node.canonical_id) {
            (
                current.component_id.clone(),
                RESERVED_SAVINGS_PERCENT,
                "Commit to reserved capacity for steady workloads".to_string(),
                SuggestionCategory::Reserved,
            )
        } else if rules.is_spot_eligible(&node.canonical_id) {
            (
                current.component_id.clone(),
                SPOT_SAVINGS_PERCENT,
                "Run interruptible workloads on spot capacity".to_string(),
                SuggestionCategory::Spot,
            )
        } else {
            return None;
        };

    let estimated_cost = current_cost.scaled(1.0 - savings_percent / 100.0);
    let impact = Impact::from_savings(current_cost.sub(&estimated_cost).midpoint());

    Some(CostSuggestion {
        node_id: node.id,
        current_cost,
        suggestion: Suggestion {
            component_id,
            estimated_cost,
            reason,
            savings_percent,
        },
        category,
        impact,
    })
}

/// Price every node and collect suggestions. Nodes the catalog cannot price
/// contribute nothing.
pub fn analyze_costs(graph: &InfraGraph, catalog: &CanonicalCatalog, rules: &CostRules) -> CostReport {
    let mut report = CostReport::default();

    for node in &graph.nodes {
        let Some(provider) = pricing_provider(node, catalog) else {
            continue;
        };
        let Some(cost) = catalog.cost_for(&node.canonical_id, &provider) else {
            continue;
        };
        report.current_cost = report.current_cost.add(&cost);

        match suggest(node, catalog, rules) {
            Some(suggestion) => {
                report.optimized_cost = report.optimized_cost.add(&suggestion.suggestion.estimated_cost);
                report.suggestions.push(suggestion);
            }
            None => report.optimized_cost = report.optimized_cost.add(&cost),
        }
    }

    report.savings = report.current_cost.sub(&report.optimized_cost);
    report
        .suggestions
        .sort_by(|a, b| b.suggestion.savings_percent.total_cmp(&a.suggestion.savings_percent));

    tracing::debug!(
        "Cost analysis: {} suggestions, savings {:.2}..{:.2}",
        report.suggestions.len(),
        report.savings.min,
        report.savings.max
    );
    report
}
