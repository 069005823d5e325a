//! Unit tests for infragraph-advisor

use std::collections::{BTreeMap, BTreeSet};

use chrono::{TimeZone, Utc};
use infragraph_core::test_utils::{keyed_node, node};
use infragraph_core::{BuildOptions, CanonicalCatalog, Category, GraphNode, InfraGraph, Position, Provider, ResourceKey, Scalar};
use infragraph_parser::{GroundTruthResource, GroundTruthSource};

use crate::*;

fn ground_truth(resource_type: &str, name: &str, attributes: &[(&str, &str)]) -> GroundTruthResource {
    GroundTruthResource {
        key: ResourceKey::new(resource_type, name),
        provider: Provider::from_resource_type(resource_type),
        attributes: attributes
            .iter()
            .map(|(k, v)| (k.to_string(), Scalar::String(v.to_string())))
            .collect(),
        dependencies: BTreeSet::new(),
        region: None,
        source: GroundTruthSource::State,
    }
}

fn with_attributes(mut node: GraphNode, attributes: &[(&str, &str)]) -> GraphNode {
    node.attributes = attributes
        .iter()
        .map(|(k, v)| (k.to_string(), Scalar::String(v.to_string())))
        .collect::<BTreeMap<_, _>>();
    node
}

fn web() -> GraphNode {
    keyed_node("aws_instance", "web", "compute.vm", Category::Compute)
}

#[test]
fn test_resource_only_in_ground_truth_is_missing_in_graph() {
    let catalog = CanonicalCatalog::builtin();
    let detector = DriftDetector::new(&catalog, &DriftOptions::default());
    let nodes = vec![web()];
    let truth = vec![ground_truth("aws_instance", "web", &[]), ground_truth("aws_s3_bucket", "logs", &[])];

    let record = detector.detect(&truth, &nodes);
    assert_eq!(record.status, DriftStatus::Drifted);
    assert_eq!(record.missing_in_graph, vec![ResourceKey::new("aws_s3_bucket", "logs")]);
    assert!(record.missing_in_state.is_empty());
    assert_eq!(record.matched.len(), 1);
    assert_eq!(record.matched[0].strategy, "resource_key");
}

#[test]
fn test_identical_graph_and_truth_are_in_sync() {
    let catalog = CanonicalCatalog::builtin();
    let detector = DriftDetector::new(&catalog, &DriftOptions::default());
    let nodes = vec![
        with_attributes(web(), &[("instance_type", "t3.micro")]),
        keyed_node("aws_s3_bucket", "assets", "storage.object", Category::Storage),
    ];
    let truth = vec![
        ground_truth("aws_instance", "web", &[("instance_type", "t3.micro"), ("ami", "ami-999")]),
        ground_truth("aws_s3_bucket", "assets", &[]),
    ];

    let now = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
    let record = detector.detect_at(&truth, &nodes, now);
    assert!(record.is_in_sync());
    assert!(record.missing_in_graph.is_empty());
    assert!(record.missing_in_state.is_empty());
    assert!(record.attribute_differences.is_empty());
    assert_eq!(record.timestamp, now);

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["status"], "in-sync");
    assert!(json["missingInGraph"].as_array().unwrap().is_empty());
}

#[test]
fn test_only_tracked_attributes_are_compared() {
    let catalog = CanonicalCatalog::builtin();
    let detector = DriftDetector::new(&catalog, &DriftOptions::default());
    let nodes = vec![with_attributes(
        web(),
        &[("instance_type", "t3.micro"), ("ami", "ami-123"), ("engine_version", "1")],
    )];
    let truth = vec![ground_truth("aws_instance", "web", &[("instance_type", "t3.large"), ("ami", "ami-999")])];

    let record = detector.detect(&truth, &nodes);
    assert_eq!(record.status, DriftStatus::Drifted);
    assert_eq!(
        record.attribute_differences,
        vec![AttributeDifference {
            resource_id: ResourceKey::new("aws_instance", "web"),
            attribute: "instance_type".to_string(),
            state_value: "t3.large".to_string(),
            diagram_value: "t3.micro".to_string(),
        }]
    );
}

#[test]
fn test_only_imported_nodes_can_be_missing_in_state() {
    let catalog = CanonicalCatalog::builtin();
    let detector = DriftDetector::new(&catalog, &DriftOptions::default());
    let imported = web();
    let sketch = node("cache", "database.cache", Category::Database);

    let record = detector.detect(&[], &[imported.clone(), sketch]);
    assert_eq!(record.missing_in_state, vec![imported.id]);
    assert_eq!(record.status, DriftStatus::Drifted);
}

#[test]
fn test_category_label_fallback_is_separate_and_optional() {
    let catalog = CanonicalCatalog::builtin();
    let sketch = node("Web-Server", "compute.vm", Category::Compute);
    let truth = vec![ground_truth("aws_instance", "web_server", &[])];

    let with_fallback = DriftDetector::new(&catalog, &DriftOptions::default());
    assert_eq!(with_fallback.strategy_names(), vec!["resource_key", "category_label"]);
    let record = with_fallback.detect(&truth, std::slice::from_ref(&sketch));
    assert!(record.is_in_sync());
    assert_eq!(record.matched[0].strategy, "category_label");
    assert_eq!(record.matched[0].node_id, sketch.id);

    let strict = DriftDetector::new(&catalog, &DriftOptions { fallback_matching: false });
    let record = strict.detect(&truth, std::slice::from_ref(&sketch));
    assert!(record.matched.is_empty());
    assert_eq!(record.missing_in_graph, vec![ResourceKey::new("aws_instance", "web_server")]);

    // a different category never matches on label alone
    let bucket = node("web_server", "storage.object", Category::Storage);
    let record = with_fallback.detect(&truth, &[bucket]);
    assert!(record.matched.is_empty());
}

#[test]
fn test_each_resource_is_matched_once() {
    let catalog = CanonicalCatalog::builtin();
    let detector = DriftDetector::new(&catalog, &DriftOptions::default());
    let keyed = web();
    let sketch = node("web", "compute.vm", Category::Compute);
    let truth = vec![ground_truth("aws_instance", "web", &[])];

    // the key match claims the resource before the label heuristic runs
    let record = detector.detect(&truth, &[sketch, keyed.clone()]);
    assert_eq!(record.matched.len(), 1);
    assert_eq!(record.matched[0].node_id, keyed.id);
}

#[test]
fn test_malformed_ground_truth_is_reported_not_raised() {
    let catalog = CanonicalCatalog::builtin();
    let detector = DriftDetector::new(&catalog, &DriftOptions::default());

    let outcome = detector.detect_from_state(r#"{"resources": [{"type": "", "name": "web"}]}"#, &[]);
    let DriftOutcome::Invalid(invalid) = &outcome else {
        panic!("expected an invalid outcome, got {:?}", outcome);
    };
    assert!(!invalid.valid);
    insta::assert_snapshot!(invalid.message, @"invalid state export: resource #0 has an empty 'type'");

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["valid"], false);

    assert!(matches!(
        detector.detect_from_inventory("[{\"type\": ", &[]),
        DriftOutcome::Invalid(_)
    ));
    assert!(matches!(
        detector.detect_from_inventory(r#"[{"id": "i-1", "type": "aws_instance"}]"#, &[]),
        DriftOutcome::Completed(_)
    ));
}

#[test]
fn test_reconcile_adds_missing_resources_below_the_drawing() {
    let catalog = CanonicalCatalog::builtin();
    let options = BuildOptions::default();
    let mut existing = web();
    existing.position = Position::new(50.0, 300.0);
    let graph = InfraGraph {
        nodes: vec![existing.clone()],
        edges: Vec::new(),
    };

    let mut volume = ground_truth("aws_efs_file_system", "shared", &[]);
    volume.dependencies.insert(ResourceKey::new("aws_instance", "web"));
    let truth = vec![ground_truth("aws_instance", "web", &[]), volume];

    let record = DriftDetector::new(&catalog, &DriftOptions::default()).detect(&truth, &graph.nodes);
    let output = reconcile(&graph, &record, &truth, &catalog, &options);

    assert_eq!(output.added.len(), 1);
    assert!(output.warnings.is_empty());
    let added = output.graph.node(output.added[0]).unwrap();
    assert!(added.flags.from_drift);
    assert!(added.flags.imported);
    assert_eq!(added.canonical_id, "storage.file");
    assert!(added.position.y > existing.position.y);

    assert_eq!(output.graph.edges.len(), 1);
    assert_eq!(output.graph.edges[0].source, existing.id);
    assert_eq!(output.graph.edges[0].target, added.id);

    // the input graph is untouched and a second pass finds nothing left to add
    assert_eq!(graph.nodes.len(), 1);
    let again = DriftDetector::new(&catalog, &DriftOptions::default()).detect(&truth, &output.graph.nodes);
    assert!(again.missing_in_graph.is_empty());
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_reconcile_warns_once_per_unmapped_type() {
    let catalog = CanonicalCatalog::builtin();
    let truth = vec![
        ground_truth("aws_quantum_computer", "q1", &[]),
        ground_truth("aws_quantum_computer", "q2", &[]),
    ];
    let graph = InfraGraph::default();
    let record = DriftDetector::new(&catalog, &DriftOptions::default()).detect(&truth, &graph.nodes);
    let output = reconcile(&graph, &record, &truth, &catalog, &BuildOptions::default());

    assert_eq!(output.added.len(), 2);
    assert_eq!(output.warnings.len(), 1);
    assert!(output.warnings[0].to_string().contains("aws_quantum_computer"));
}

#[test]
fn test_alternative_takes_precedence_over_discounts() {
    let catalog = CanonicalCatalog::builtin();
    // virtual machines are eligible for every kind of saving here
    let mut rules = CostRules {
        alternatives: BTreeMap::from([(
            "compute.vm".to_string(),
            vec![Alternative {
                canonical_id: "compute.container".to_string(),
                savings_percent: 15.0,
                reason: "Pack the workload into containers".to_string(),
            }],
        )]),
        reserved_eligible: vec!["compute.vm".to_string()],
        spot_eligible: vec!["compute.vm".to_string()],
    };
    let web = keyed_node("aws_instance", "web", "compute.vm", Category::Compute);

    let suggestion = suggest(&web, &catalog, &rules).unwrap();
    assert_eq!(suggestion.category, SuggestionCategory::Alternative);
    assert_eq!(suggestion.suggestion.savings_percent, 15.0);
    assert_eq!(suggestion.suggestion.component_id, "aws_ecs_service");
    assert_eq!(suggestion.suggestion.reason, "Pack the workload into containers");

    // without the alternative, reserved wins over the larger spot discount
    rules.alternatives.clear();
    let suggestion = suggest(&web, &catalog, &rules).unwrap();
    assert_eq!(suggestion.category, SuggestionCategory::Reserved);
    assert_eq!(suggestion.suggestion.savings_percent, RESERVED_SAVINGS_PERCENT);
    assert_eq!(suggestion.suggestion.component_id, "aws_instance");

    rules.reserved_eligible.clear();
    let suggestion = suggest(&web, &catalog, &rules).unwrap();
    assert_eq!(suggestion.category, SuggestionCategory::Spot);
    assert_eq!(suggestion.suggestion.savings_percent, SPOT_SAVINGS_PERCENT);

    rules.spot_eligible.clear();
    assert!(suggest(&web, &catalog, &rules).is_none());
}

#[test]
fn test_kubernetes_cluster_gets_its_top_ranked_alternative() {
    let catalog = CanonicalCatalog::builtin();
    let cluster = keyed_node("aws_eks_cluster", "main", "compute.kubernetes", Category::Compute);

    let suggestion = suggest(&cluster, &catalog, &CostRules::builtin()).unwrap();
    assert_eq!(suggestion.category, SuggestionCategory::Alternative);
    assert_eq!(suggestion.suggestion.savings_percent, 40.0);
    assert_eq!(suggestion.suggestion.component_id, "aws_ecs_service");
    assert!(close(suggestion.suggestion.estimated_cost.min, 73.0 * 0.6));
    assert!(close(suggestion.suggestion.estimated_cost.max, 600.0 * 0.6));
    assert_eq!(suggestion.impact, Impact::High);
}

#[test]
fn test_cost_report_totals_and_order() {
    let catalog = CanonicalCatalog::builtin();
    let rules = CostRules::builtin();
    let graph = InfraGraph {
        nodes: vec![
            keyed_node("aws_eks_cluster", "main", "compute.kubernetes", Category::Compute),
            keyed_node("aws_instance", "web", "compute.vm", Category::Compute),
            keyed_node("aws_s3_bucket", "assets", "storage.object", Category::Storage),
            keyed_node("aws_efs_file_system", "shared", "storage.file", Category::Storage),
            keyed_node("aws_subnet", "public", "networking.subnet", Category::Networking),
        ],
        edges: Vec::new(),
    };

    let report = analyze_costs(&graph, &catalog, &rules);
    let categories: Vec<_> = report.suggestions.iter().map(|s| (s.category, s.suggestion.savings_percent)).collect();
    assert_eq!(
        categories,
        vec![
            (SuggestionCategory::Alternative, 45.0),
            (SuggestionCategory::Alternative, 40.0),
            (SuggestionCategory::Reserved, 30.0),
        ]
    );
    assert_eq!(report.suggestions[2].impact, Impact::Medium);

    assert!(close(report.current_cost.min, 73.0 + 8.0 + 1.0 + 9.0));
    assert!(close(report.current_cost.max, 600.0 + 280.0 + 50.0 + 300.0));
    assert!(close(report.savings.min, report.current_cost.min - report.optimized_cost.min));
    assert!(close(report.optimized_cost.min, 73.0 * 0.6 + 8.0 * 0.7 + 1.0 + 9.0 * 0.55));

    let json = serde_json::to_value(&report).unwrap();
    assert!(json.get("currentCost").is_some());
    assert_eq!(json["suggestions"][0]["category"], "alternative");
    assert!(json["suggestions"][0]["suggestion"].get("savingsPercent").is_some());
}

#[test]
fn test_unpriced_and_hand_drawn_nodes() {
    let catalog = CanonicalCatalog::builtin();
    let rules = CostRules::builtin();

    let unknown = node("mystery", "generic.resource", Category::Other);
    assert!(suggest(&unknown, &catalog, &rules).is_none());

    // no provider: priced under the cheapest one
    let sketch = node("worker", "compute.vm", Category::Compute);
    let suggestion = suggest(&sketch, &catalog, &rules).unwrap();
    assert_eq!(suggestion.category, SuggestionCategory::Reserved);
    let cheapest = catalog.cheapest_provider("compute.vm").unwrap();
    assert_eq!(Some(suggestion.current_cost), catalog.cost_for("compute.vm", &cheapest));

    let report = analyze_costs(&InfraGraph { nodes: vec![unknown], edges: Vec::new() }, &catalog, &rules);
    assert!(report.suggestions.is_empty());
    assert_eq!(report.current_cost, infragraph_core::CostRange::ZERO);
}

#[test]
fn test_impact_thresholds() {
    assert_eq!(Impact::from_savings(100.0), Impact::High);
    assert_eq!(Impact::from_savings(99.9), Impact::Medium);
    assert_eq!(Impact::from_savings(25.0), Impact::Medium);
    assert_eq!(Impact::from_savings(24.9), Impact::Low);
}
