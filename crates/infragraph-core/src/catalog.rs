//! Canonical resource mapping between provider-specific types and generic components
//!
//! The catalog is immutable once built. Callers build it once (usually with
//! [`CanonicalCatalog::builtin`]) and pass it by reference into the builder,
//! the drift detector and the cost advisor.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::EngineWarning;
use crate::model::{Category, Provider, Scalar};

/// Canonical id assigned to resource types the catalog does not know.
pub const GENERIC_CANONICAL_ID: &str = "generic.resource";

/// Estimated monthly cost in USD.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CostRange {
    pub min: f64,
    pub max: f64,
}

impl CostRange {
    pub const ZERO: CostRange = CostRange { min: 0.0, max: 0.0 };

    pub const fn new(min: f64, max: f64) -> Self {
        CostRange { min, max }
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// Scale both bounds by `factor` (e.g. `0.7` for a 30% reduction).
    pub fn scaled(&self, factor: f64) -> CostRange {
        CostRange::new(self.min * factor, self.max * factor)
    }

    pub fn add(&self, other: &CostRange) -> CostRange {
        CostRange::new(self.min + other.min, self.max + other.max)
    }

    pub fn sub(&self, other: &CostRange) -> CostRange {
        CostRange::new(self.min - other.min, self.max - other.max)
    }
}

/// How one provider implements a canonical component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderComponent {
    pub component_id: String,
    /// Further source types that map onto the same component.
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub default_attributes: BTreeMap<String, Scalar>,
    pub cost_range: CostRange,
}

/// A provider-agnostic component and its per-provider implementations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalComponent {
    pub generic_id: String,
    pub category: Category,
    pub per_provider: BTreeMap<Provider, ProviderComponent>,
}

/// Forward mapping result. `warning` is set whenever the generic fallback was used.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub canonical_id: String,
    pub category: Category,
    pub warning: Option<EngineWarning>,
}

impl Resolution {
    pub fn is_mapped(&self) -> bool {
        self.warning.is_none()
    }
}

/// Bidirectional table between provider resource types and canonical components.
#[derive(Debug, Clone)]
pub struct CanonicalCatalog {
    components: BTreeMap<String, CanonicalComponent>,
    by_source: HashMap<(Provider, String), String>,
}

impl CanonicalCatalog {
    /// Build a catalog from an explicit component list.
    pub fn from_components(components: impl IntoIterator<Item = CanonicalComponent>) -> Self {
        let mut by_id = BTreeMap::new();
        let mut by_source = HashMap::new();

        for component in components {
            for (provider, pc) in &component.per_provider {
                for source in std::iter::once(&pc.component_id).chain(pc.aliases.iter()) {
                    by_source.insert((provider.clone(), source.clone()), component.generic_id.clone());
                }
            }
            by_id.insert(component.generic_id.clone(), component);
        }

        CanonicalCatalog {
            components: by_id,
            by_source,
        }
    }

    /// The built-in aws/azure/gcp table.
    pub fn builtin() -> Self {
        Self::from_components(BUILTIN.iter().map(Row::to_component))
    }

    /// Map a provider resource type onto its canonical component.
    pub fn resolve(&self, resource_type: &str, provider: &Provider) -> Resolution {
        let hit = self
            .by_source
            .get(&(provider.clone(), resource_type.to_string()))
            .or_else(|| {
                let inferred = Provider::from_resource_type(resource_type);
                self.by_source.get(&(inferred, resource_type.to_string()))
            })
            .and_then(|id| self.components.get(id));

        match hit {
            Some(component) => Resolution {
                canonical_id: component.generic_id.clone(),
                category: component.category,
                warning: None,
            },
            None => {
                tracing::debug!("No canonical mapping for {} ({})", resource_type, provider);
                Resolution {
                    canonical_id: GENERIC_CANONICAL_ID.to_string(),
                    category: Category::Other,
                    warning: Some(EngineWarning::UnmappedResourceType {
                        resource_type: resource_type.to_string(),
                    }),
                }
            }
        }
    }

    pub fn component(&self, canonical_id: &str) -> Option<&CanonicalComponent> {
        self.components.get(canonical_id)
    }

    /// Reverse mapping used for cross-provider conversion.
    pub fn component_for(&self, canonical_id: &str, provider: &Provider) -> Option<&ProviderComponent> {
        self.components.get(canonical_id)?.per_provider.get(provider)
    }

    pub fn cost_for(&self, canonical_id: &str, provider: &Provider) -> Option<CostRange> {
        self.component_for(canonical_id, provider).map(|pc| pc.cost_range)
    }

    /// Provider with the lowest cost-range midpoint, ties broken in [`Provider::KNOWN`] order.
    pub fn cheapest_provider(&self, canonical_id: &str) -> Option<Provider> {
        let component = self.components.get(canonical_id)?;
        let mut best: Option<(&Provider, f64)> = None;

        for (provider, pc) in ordered(&component.per_provider) {
            let mid = pc.cost_range.midpoint();
            if best.is_none_or(|(_, current)| mid < current) {
                best = Some((provider, mid));
            }
        }

        best.map(|(provider, _)| provider.clone())
    }

    pub fn components(&self) -> impl Iterator<Item = &CanonicalComponent> {
        self.components.values()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl Default for CanonicalCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Known providers first, in tie-break order, then any others by name.
fn ordered(
    per_provider: &BTreeMap<Provider, ProviderComponent>,
) -> Vec<(&Provider, &ProviderComponent)> {
    let mut out: Vec<_> = Provider::KNOWN
        .iter()
        .filter_map(|p| per_provider.get_key_value(p))
        .collect();
    out.extend(
        per_provider
            .iter()
            .filter(|(p, _)| !Provider::KNOWN.contains(p)),
    );
    out
}

// ── Built-in table ──────────────────────────────────────

#[derive(Clone, Copy)]
enum DefaultValue {
    Str(&'static str),
    Int(i64),
}

struct Entry {
    provider: Provider,
    component: &'static str,
    aliases: &'static [&'static str],
    cost: (f64, f64),
    defaults: &'static [(&'static str, DefaultValue)],
}

struct Row {
    canonical: &'static str,
    category: Category,
    entries: [Entry; 3],
}

impl Row {
    fn to_component(&self) -> CanonicalComponent {
        let per_provider = self
            .entries
            .iter()
            .map(|e| {
                let defaults = e
                    .defaults
                    .iter()
                    .map(|(k, v)| {
                        let value = match *v {
                            DefaultValue::Str(s) => Scalar::String(s.to_string()),
                            DefaultValue::Int(i) => Scalar::Integer(i),
                        };
                        (k.to_string(), value)
                    })
                    .collect();
                (
                    e.provider.clone(),
                    ProviderComponent {
                        component_id: e.component.to_string(),
                        aliases: e.aliases.iter().map(|a| a.to_string()).collect(),
                        default_attributes: defaults,
                        cost_range: CostRange::new(e.cost.0, e.cost.1),
                    },
                )
            })
            .collect();

        CanonicalComponent {
            generic_id: self.canonical.to_string(),
            category: self.category,
            per_provider,
        }
    }
}

const fn aws(
    component: &'static str,
    aliases: &'static [&'static str],
    cost: (f64, f64),
    defaults: &'static [(&'static str, DefaultValue)],
) -> Entry {
    Entry { provider: Provider::Aws, component, aliases, cost, defaults }
}

const fn azure(
    component: &'static str,
    aliases: &'static [&'static str],
    cost: (f64, f64),
    defaults: &'static [(&'static str, DefaultValue)],
) -> Entry {
    Entry { provider: Provider::Azure, component, aliases, cost, defaults }
}

const fn gcp(
    component: &'static str,
    aliases: &'static [&'static str],
    cost: (f64, f64),
    defaults: &'static [(&'static str, DefaultValue)],
) -> Entry {
    Entry { provider: Provider::Gcp, component, aliases, cost, defaults }
}

use DefaultValue::{Int, Str};

static BUILTIN: &[Row] = &[
    // ── Compute ─────────────────────────────────────────────
    Row {
        canonical: "compute.vm",
        category: Category::Compute,
        entries: [
            aws("aws_instance", &[], (8.0, 280.0), &[("instance_type", Str("t3.medium"))]),
            azure(
                "azurerm_linux_virtual_machine",
                &["azurerm_windows_virtual_machine", "azurerm_virtual_machine"],
                (9.0, 300.0),
                &[("size", Str("Standard_B2s"))],
            ),
            gcp("google_compute_instance", &[], (7.0, 260.0), &[("machine_type", Str("e2-medium"))]),
        ],
    },
    Row {
        canonical: "compute.container",
        category: Category::Compute,
        entries: [
            aws(
                "aws_ecs_service",
                &["aws_ecs_task_definition", "aws_ecs_cluster"],
                (10.0, 150.0),
                &[("launch_type", Str("FARGATE"))],
            ),
            azure("azurerm_container_group", &["azurerm_container_app"], (12.0, 160.0), &[]),
            gcp("google_cloud_run_service", &["google_cloud_run_v2_service"], (5.0, 120.0), &[]),
        ],
    },
    Row {
        canonical: "compute.function",
        category: Category::Compute,
        entries: [
            aws(
                "aws_lambda_function",
                &[],
                (0.0, 40.0),
                &[("runtime", Str("python3.12")), ("memory_size", Int(128))],
            ),
            azure("azurerm_function_app", &["azurerm_linux_function_app"], (0.0, 45.0), &[]),
            gcp(
                "google_cloudfunctions_function",
                &["google_cloudfunctions2_function"],
                (0.0, 38.0),
                &[("available_memory_mb", Int(128))],
            ),
        ],
    },
    Row {
        canonical: "compute.kubernetes",
        category: Category::Compute,
        entries: [
            aws("aws_eks_cluster", &["aws_eks_node_group"], (73.0, 600.0), &[("version", Str("1.29"))]),
            azure("azurerm_kubernetes_cluster", &[], (60.0, 550.0), &[("kubernetes_version", Str("1.29"))]),
            gcp("google_container_cluster", &["google_container_node_pool"], (70.0, 580.0), &[]),
        ],
    },
    // ── Networking ──────────────────────────────────────────
    Row {
        canonical: "networking.vpc",
        category: Category::Networking,
        entries: [
            aws("aws_vpc", &[], (0.0, 0.0), &[("cidr_block", Str("10.0.0.0/16"))]),
            azure("azurerm_virtual_network", &[], (0.0, 0.0), &[]),
            gcp("google_compute_network", &[], (0.0, 0.0), &[]),
        ],
    },
    Row {
        canonical: "networking.subnet",
        category: Category::Networking,
        entries: [
            aws("aws_subnet", &[], (0.0, 0.0), &[("cidr_block", Str("10.0.1.0/24"))]),
            azure("azurerm_subnet", &[], (0.0, 0.0), &[]),
            gcp("google_compute_subnetwork", &[], (0.0, 0.0), &[]),
        ],
    },
    Row {
        canonical: "networking.route_table",
        category: Category::Networking,
        entries: [
            aws("aws_route_table", &["aws_route_table_association", "aws_route", "aws_internet_gateway"], (0.0, 0.0), &[]),
            azure("azurerm_route_table", &[], (0.0, 0.0), &[]),
            gcp("google_compute_route", &["google_compute_router"], (0.0, 0.0), &[]),
        ],
    },
    Row {
        canonical: "networking.load_balancer",
        category: Category::Networking,
        entries: [
            aws("aws_lb", &["aws_alb", "aws_elb", "aws_lb_target_group", "aws_lb_listener"], (16.0, 60.0), &[]),
            azure("azurerm_lb", &["azurerm_application_gateway"], (18.0, 70.0), &[]),
            gcp(
                "google_compute_forwarding_rule",
                &["google_compute_url_map", "google_compute_backend_service"],
                (18.0, 65.0),
                &[],
            ),
        ],
    },
    Row {
        canonical: "networking.dns",
        category: Category::Networking,
        entries: [
            aws("aws_route53_zone", &["aws_route53_record"], (0.5, 5.0), &[]),
            azure("azurerm_dns_zone", &["azurerm_dns_a_record"], (0.5, 5.0), &[]),
            gcp("google_dns_managed_zone", &["google_dns_record_set"], (0.2, 4.0), &[]),
        ],
    },
    Row {
        canonical: "networking.cdn",
        category: Category::Networking,
        entries: [
            aws("aws_cloudfront_distribution", &[], (5.0, 200.0), &[]),
            azure("azurerm_cdn_profile", &["azurerm_cdn_endpoint"], (6.0, 210.0), &[]),
            gcp("google_compute_backend_bucket", &[], (4.0, 190.0), &[]),
        ],
    },
    Row {
        canonical: "networking.nat_gateway",
        category: Category::Networking,
        entries: [
            aws("aws_nat_gateway", &["aws_eip"], (32.0, 90.0), &[]),
            azure("azurerm_nat_gateway", &["azurerm_public_ip"], (32.0, 85.0), &[]),
            gcp("google_compute_router_nat", &["google_compute_address"], (30.0, 80.0), &[]),
        ],
    },
    // ── Database ────────────────────────────────────────────
    Row {
        canonical: "database.relational",
        category: Category::Database,
        entries: [
            aws(
                "aws_db_instance",
                &["aws_rds_cluster", "aws_rds_cluster_instance"],
                (15.0, 700.0),
                &[("instance_class", Str("db.t3.micro")), ("engine", Str("postgres"))],
            ),
            azure(
                "azurerm_postgresql_flexible_server",
                &["azurerm_postgresql_server", "azurerm_mysql_flexible_server", "azurerm_mssql_database"],
                (13.0, 650.0),
                &[("sku_name", Str("B_Standard_B1ms"))],
            ),
            gcp("google_sql_database_instance", &[], (10.0, 620.0), &[("tier", Str("db-f1-micro"))]),
        ],
    },
    Row {
        canonical: "database.nosql",
        category: Category::Database,
        entries: [
            aws("aws_dynamodb_table", &[], (1.0, 250.0), &[("billing_mode", Str("PAY_PER_REQUEST"))]),
            azure("azurerm_cosmosdb_account", &[], (24.0, 300.0), &[]),
            gcp("google_firestore_database", &["google_bigtable_instance"], (1.0, 260.0), &[]),
        ],
    },
    Row {
        canonical: "database.cache",
        category: Category::Database,
        entries: [
            aws(
                "aws_elasticache_cluster",
                &["aws_elasticache_replication_group"],
                (12.0, 400.0),
                &[("node_type", Str("cache.t3.micro"))],
            ),
            azure("azurerm_redis_cache", &[], (16.0, 420.0), &[("sku_name", Str("Basic"))]),
            gcp("google_redis_instance", &[], (35.0, 450.0), &[("tier", Str("BASIC"))]),
        ],
    },
    // ── Storage ─────────────────────────────────────────────
    Row {
        canonical: "storage.object",
        category: Category::Storage,
        entries: [
            aws("aws_s3_bucket", &["aws_s3_bucket_policy", "aws_s3_bucket_versioning"], (1.0, 50.0), &[]),
            azure("azurerm_storage_account", &["azurerm_storage_container"], (1.0, 45.0), &[]),
            gcp("google_storage_bucket", &[], (1.0, 48.0), &[("storage_class", Str("STANDARD"))]),
        ],
    },
    Row {
        canonical: "storage.block",
        category: Category::Storage,
        entries: [
            aws("aws_ebs_volume", &[], (4.0, 120.0), &[("size", Int(20))]),
            azure("azurerm_managed_disk", &[], (5.0, 125.0), &[("disk_size_gb", Int(32))]),
            gcp("google_compute_disk", &[], (4.0, 110.0), &[("size", Int(20))]),
        ],
    },
    Row {
        canonical: "storage.file",
        category: Category::Storage,
        entries: [
            aws("aws_efs_file_system", &[], (9.0, 300.0), &[]),
            azure("azurerm_storage_share", &[], (10.0, 280.0), &[]),
            gcp("google_filestore_instance", &[], (200.0, 600.0), &[("tier", Str("BASIC_HDD"))]),
        ],
    },
    // ── Integration ─────────────────────────────────────────
    Row {
        canonical: "integration.queue",
        category: Category::Integration,
        entries: [
            aws("aws_sqs_queue", &[], (0.0, 20.0), &[]),
            azure(
                "azurerm_servicebus_queue",
                &["azurerm_servicebus_namespace", "azurerm_storage_queue"],
                (0.0, 25.0),
                &[],
            ),
            gcp("google_pubsub_subscription", &[], (0.0, 22.0), &[]),
        ],
    },
    Row {
        canonical: "integration.topic",
        category: Category::Integration,
        entries: [
            aws("aws_sns_topic", &["aws_sns_topic_subscription"], (0.0, 15.0), &[]),
            azure("azurerm_eventgrid_topic", &["azurerm_servicebus_topic"], (0.0, 18.0), &[]),
            gcp("google_pubsub_topic", &[], (0.0, 16.0), &[]),
        ],
    },
    Row {
        canonical: "integration.api_gateway",
        category: Category::Integration,
        entries: [
            aws("aws_api_gateway_rest_api", &["aws_apigatewayv2_api"], (3.0, 100.0), &[]),
            azure("azurerm_api_management", &[], (48.0, 700.0), &[("sku_name", Str("Developer_1"))]),
            gcp("google_api_gateway_api", &["google_api_gateway_gateway"], (3.0, 90.0), &[]),
        ],
    },
    // ── Security ────────────────────────────────────────────
    Row {
        canonical: "security.iam_role",
        category: Category::Security,
        entries: [
            aws(
                "aws_iam_role",
                &["aws_iam_policy", "aws_iam_role_policy_attachment", "aws_iam_instance_profile"],
                (0.0, 0.0),
                &[],
            ),
            azure(
                "azurerm_role_assignment",
                &["azurerm_role_definition", "azurerm_user_assigned_identity"],
                (0.0, 0.0),
                &[],
            ),
            gcp("google_service_account", &["google_project_iam_member"], (0.0, 0.0), &[]),
        ],
    },
    Row {
        canonical: "security.kms_key",
        category: Category::Security,
        entries: [
            aws("aws_kms_key", &["aws_kms_alias"], (1.0, 3.0), &[]),
            azure("azurerm_key_vault_key", &[], (1.0, 3.0), &[]),
            gcp("google_kms_crypto_key", &["google_kms_key_ring"], (1.0, 3.0), &[]),
        ],
    },
    Row {
        canonical: "security.secret",
        category: Category::Security,
        entries: [
            aws("aws_secretsmanager_secret", &["aws_secretsmanager_secret_version"], (0.4, 2.0), &[]),
            azure("azurerm_key_vault", &["azurerm_key_vault_secret"], (0.3, 2.0), &[]),
            gcp("google_secret_manager_secret", &[], (0.1, 2.0), &[]),
        ],
    },
    Row {
        canonical: "security.firewall",
        category: Category::Security,
        entries: [
            aws("aws_security_group", &["aws_security_group_rule", "aws_network_acl"], (0.0, 0.0), &[]),
            azure("azurerm_network_security_group", &["azurerm_network_security_rule"], (0.0, 0.0), &[]),
            gcp("google_compute_firewall", &[], (0.0, 0.0), &[]),
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_type() {
        let catalog = CanonicalCatalog::builtin();
        let res = catalog.resolve("aws_instance", &Provider::Aws);
        assert!(res.is_mapped());
        assert_eq!(res.canonical_id, "compute.vm");
        assert_eq!(res.category, Category::Compute);

        let alias = catalog.resolve("azurerm_windows_virtual_machine", &Provider::Azure);
        assert_eq!(alias.canonical_id, "compute.vm");
    }

    #[test]
    fn test_resolve_unknown_type_warns() {
        let catalog = CanonicalCatalog::builtin();
        let res = catalog.resolve("aws_quantum_computer", &Provider::Aws);
        assert!(!res.is_mapped());
        assert_eq!(res.canonical_id, GENERIC_CANONICAL_ID);
        assert_eq!(res.category, Category::Other);
        assert!(res.warning.unwrap().to_string().contains("aws_quantum_computer"));
    }

    #[test]
    fn test_resolve_infers_provider_from_prefix() {
        let catalog = CanonicalCatalog::builtin();
        let res = catalog.resolve("google_storage_bucket", &Provider::Other("unknown".into()));
        assert_eq!(res.canonical_id, "storage.object");
    }

    #[test]
    fn test_reverse_lookup() {
        let catalog = CanonicalCatalog::builtin();
        let pc = catalog.component_for("compute.vm", &Provider::Gcp).unwrap();
        assert_eq!(pc.component_id, "google_compute_instance");
        assert_eq!(
            pc.default_attributes.get("machine_type"),
            Some(&Scalar::String("e2-medium".into()))
        );
        assert!(catalog.component_for("compute.vm", &Provider::Other("oci".into())).is_none());
    }

    #[test]
    fn test_cheapest_provider_uses_midpoint() {
        let catalog = CanonicalCatalog::builtin();
        // gcp midpoint 133.5 < aws 144 < azure 154.5
        assert_eq!(catalog.cheapest_provider("compute.vm"), Some(Provider::Gcp));
        assert_eq!(catalog.cheapest_provider("no.such.component"), None);
    }

    #[test]
    fn test_cheapest_provider_tie_prefers_known_order() {
        let catalog = CanonicalCatalog::builtin();
        // all subnets are free
        assert_eq!(catalog.cheapest_provider("networking.subnet"), Some(Provider::Aws));
    }

    #[test]
    fn test_every_source_type_is_unique() {
        let mut seen = std::collections::HashSet::new();
        for row in BUILTIN {
            for entry in &row.entries {
                for source in std::iter::once(&entry.component).chain(entry.aliases.iter()) {
                    assert!(seen.insert(*source), "duplicate source type {}", source);
                }
            }
        }
    }
}
