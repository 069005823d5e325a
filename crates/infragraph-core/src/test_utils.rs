//! Test fixtures shared across the workspace

use std::collections::BTreeMap;

use crate::model::*;

/// A small aws stack: vpc -> subnet -> instance, a database and a bucket.
pub const SAMPLE_CONFIGURATION: &str = r#"
# Networking
resource "aws_vpc" "main" {
  cidr_block = "10.0.0.0/16"
}

resource "aws_subnet" "public" {
  vpc_id     = aws_vpc.main.id
  cidr_block = "10.0.1.0/24"
}

/* Compute */
resource "aws_instance" "web" {
  ami           = "ami-123456"
  instance_type = "t3.micro"
  subnet_id     = aws_subnet.public.id

  tags = {
    Name = "web-${var.env}"
  }
}

resource "aws_db_instance" "orders" {
  engine            = "postgres"
  instance_class    = "db.t3.micro"
  allocated_storage = 20
  publicly_accessible = false
}

// Storage
resource "aws_s3_bucket" "assets" {
  bucket = "assets-bucket"
}

variable "env" {
  type    = string
  default = "dev"
}

output "web_ip" {
  value = aws_instance.web.public_ip
}
"#;

/// A node with a fresh id at the origin, no resource key, not imported.
pub fn node(label: &str, canonical_id: &str, category: Category) -> GraphNode {
    GraphNode {
        id: NodeId::generate(),
        position: Position::default(),
        canonical_id: canonical_id.to_string(),
        category,
        label: label.to_string(),
        attributes: BTreeMap::new(),
        flags: NodeFlags::default(),
        resource_key: None,
        provider: None,
    }
}

/// An imported node carrying a resource key and provider.
pub fn keyed_node(resource_type: &str, name: &str, canonical_id: &str, category: Category) -> GraphNode {
    GraphNode {
        flags: NodeFlags {
            imported: true,
            ..NodeFlags::default()
        },
        resource_key: Some(ResourceKey::new(resource_type, name)),
        provider: Some(Provider::from_resource_type(resource_type)),
        ..node(name, canonical_id, category)
    }
}

pub fn edge(source: &GraphNode, target: &GraphNode) -> GraphEdge {
    GraphEdge {
        id: EdgeId::generate(),
        source: source.id,
        target: target.id,
        kind: EdgeKind::DependsOn,
    }
}

/// `count` generic nodes labelled `n0..`.
pub fn nodes(count: usize) -> Vec<GraphNode> {
    (0..count)
        .map(|i| node(&format!("n{}", i), "compute.vm", Category::Compute))
        .collect()
}

/// Edges `pairs[i].0 -> pairs[i].1` between `nodes` by index.
pub fn edges(nodes: &[GraphNode], pairs: &[(usize, usize)]) -> Vec<GraphEdge> {
    pairs
        .iter()
        .map(|&(s, t)| edge(&nodes[s], &nodes[t]))
        .collect()
}
