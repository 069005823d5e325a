//! Integration tests for InfraGraph
//!
//! These tests run the whole pipeline across crates: parse, build, layout,
//! drift and cost.

use std::process::Command;

use infragraph_advisor::{analyze_costs, reconcile, CostRules, DriftDetector, DriftOptions, DriftStatus, SuggestionCategory};
use infragraph_core::test_utils::SAMPLE_CONFIGURATION;
use infragraph_core::{BuildOptions, CanonicalCatalog, Category, ResourceKey};
use infragraph_layout::{layout_graph, LayoutAlgorithm, LayoutOptions};
use infragraph_parser::{import_configuration, parse_state_export, SourceDocument};

const STATE: &str = r#"{
  "version": 4,
  "resources": [
    {"mode": "managed", "type": "aws_vpc", "name": "main", "provider": "provider[\"registry.terraform.io/hashicorp/aws\"]",
     "instances": [{"attributes": {"cidr_block": "10.0.0.0/16"}}]},
    {"mode": "managed", "type": "aws_subnet", "name": "public", "provider": "provider[\"registry.terraform.io/hashicorp/aws\"]",
     "instances": [{"attributes": {"cidr_block": "10.0.1.0/24"}, "dependencies": ["aws_vpc.main"]}]},
    {"mode": "managed", "type": "aws_instance", "name": "web", "provider": "provider[\"registry.terraform.io/hashicorp/aws\"]",
     "instances": [{"attributes": {"instance_type": "t3.large", "ami": "ami-654321"}, "dependencies": ["aws_subnet.public"]}]},
    {"mode": "managed", "type": "aws_db_instance", "name": "orders", "provider": "provider[\"registry.terraform.io/hashicorp/aws\"]",
     "instances": [{"attributes": {"engine": "postgres", "instance_class": "db.t3.micro", "allocated_storage": 20}}]},
    {"mode": "managed", "type": "aws_s3_bucket", "name": "assets", "provider": "provider[\"registry.terraform.io/hashicorp/aws\"]",
     "instances": [{"attributes": {"bucket": "assets-bucket"}}]},
    {"mode": "managed", "type": "aws_efs_file_system", "name": "shared", "provider": "provider[\"registry.terraform.io/hashicorp/aws\"]",
     "instances": [{"attributes": {}, "dependencies": ["aws_instance.web"]}]},
    {"mode": "data", "type": "aws_ami", "name": "ubuntu", "instances": [{"attributes": {}}]}
  ]
}"#;

fn sample_documents() -> Vec<SourceDocument> {
    vec![SourceDocument::new("main.tf", SAMPLE_CONFIGURATION)]
}

#[test]
fn test_full_pipeline() {
    let catalog = CanonicalCatalog::builtin();
    let build = BuildOptions::default();

    let imported = import_configuration(&sample_documents(), &catalog, &build);
    assert!(imported.warnings.is_empty(), "{:?}", imported.warnings);
    assert_eq!(imported.graph.nodes.len(), 5);
    assert_eq!(imported.graph.edges.len(), 2);
    assert!(imported.graph.nodes.iter().all(|n| n.flags.imported));

    // every layout keeps identity and returns finite positions
    for algorithm in LayoutAlgorithm::ALL {
        let options = LayoutOptions {
            algorithm,
            ..LayoutOptions::default()
        };
        let laid_out = layout_graph(&imported.graph, &options);
        assert_eq!(laid_out.edges, imported.graph.edges);
        for (before, after) in imported.graph.nodes.iter().zip(&laid_out.nodes) {
            assert_eq!(before.id, after.id);
            assert!(after.position.x.is_finite() && after.position.y.is_finite());
        }
    }

    let truth = parse_state_export(STATE).unwrap();
    assert_eq!(truth.len(), 6);
    let record = DriftDetector::new(&catalog, &DriftOptions::default()).detect(&truth, &imported.graph.nodes);
    assert_eq!(record.status, DriftStatus::Drifted);
    assert_eq!(record.matched.len(), 5);
    assert_eq!(record.missing_in_graph, vec![ResourceKey::new("aws_efs_file_system", "shared")]);
    assert!(record.missing_in_state.is_empty());
    assert_eq!(record.attribute_differences.len(), 1);
    assert_eq!(record.attribute_differences[0].attribute, "instance_type");
    assert_eq!(record.attribute_differences[0].state_value, "t3.large");

    let reconciled = reconcile(&imported.graph, &record, &truth, &catalog, &build);
    assert_eq!(reconciled.graph.nodes.len(), 6);
    assert_eq!(reconciled.graph.edges.len(), 3);
    let shared = reconciled.graph.node(reconciled.added[0]).unwrap();
    assert!(shared.flags.from_drift);
    assert_eq!(shared.category, Category::Storage);

    let report = analyze_costs(&reconciled.graph, &catalog, &CostRules::builtin());
    let categories: Vec<_> = report.suggestions.iter().map(|s| s.category).collect();
    assert_eq!(
        categories,
        vec![
            SuggestionCategory::Alternative,
            SuggestionCategory::Reserved,
            SuggestionCategory::Reserved,
        ]
    );
    assert!(report.savings.min > 0.0);
    assert!(report.optimized_cost.max < report.current_cost.max);
}

#[test]
fn test_cli_import_then_cost() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("main.tf");
    let graph = dir.path().join("graph.json");
    std::fs::write(&config, SAMPLE_CONFIGURATION).unwrap();

    let status = Command::new(env!("CARGO_BIN_EXE_infragraph"))
        .args(["--config", &dir.path().join("infragraph.toml").display().to_string()])
        .args(["import", &config.display().to_string(), "--layout", "grid", "--output"])
        .arg(&graph)
        .status()
        .expect("failed to run infragraph");
    assert!(status.success());

    let output = Command::new(env!("CARGO_BIN_EXE_infragraph"))
        .arg("cost")
        .arg(&graph)
        .output()
        .expect("failed to run infragraph");
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["suggestions"].as_array().unwrap().len(), 2);
    assert!(report.get("currentCost").is_some());
}

#[test]
fn test_cli_reports_invalid_ground_truth() {
    let dir = tempfile::tempdir().unwrap();
    let graph = dir.path().join("graph.json");
    let state = dir.path().join("state.json");
    std::fs::write(&graph, r#"{"nodes": [], "edges": []}"#).unwrap();
    std::fs::write(&state, "{ not json").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_infragraph"))
        .arg("drift")
        .arg(&graph)
        .arg("--state")
        .arg(&state)
        .output()
        .expect("failed to run infragraph");
    assert!(output.status.success());

    let outcome: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(outcome["valid"], false);
    assert!(outcome["message"].as_str().unwrap().starts_with("invalid state export"));
}

#[test]
fn test_cli_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_infragraph"))
        .arg("version")
        .output()
        .expect("failed to run infragraph");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("InfraGraph"));
}
