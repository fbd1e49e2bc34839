// Risk Catalog
//
// Lookup tables the risk rules match against: resource-type fragments
// per category, production address markers, and the attribute names
// that carry encryption, backup, and network exposure settings.
//
// All matching is case-insensitive substring containment.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Resource categories the built-in rules care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceCategory {
    Database,
    Storage,
    Network,
    Compute,
    LoadBalancer,
    SecurityGroup,
}

/// Catalog loaded from JSON, or built in.
///
/// Fields missing from a file keep their built-in value; a field that
/// is present replaces the built-in value whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskCatalog {
    pub resource_types: BTreeMap<ResourceCategory, Vec<String>>,
    pub production_markers: Vec<String>,
    pub encryption_keys: Vec<String>,
    pub backup_keys: Vec<String>,
    pub cidr_keys: Vec<String>,
    pub open_cidr_blocks: Vec<String>,
}

impl Default for RiskCatalog {
    fn default() -> Self {
        use ResourceCategory::*;

        let resource_types = [
            (
                Database,
                &[
                    "aws_db_instance",
                    "aws_rds",
                    "google_sql_database",
                    "azurerm_sql_database",
                    "aws_dynamodb_table",
                    "postgresql",
                    "mysql",
                ][..],
            ),
            (
                Storage,
                &[
                    "aws_s3_bucket",
                    "google_storage_bucket",
                    "azurerm_storage_account",
                    "aws_ebs_volume",
                ][..],
            ),
            (
                Network,
                &[
                    "aws_vpc",
                    "aws_subnet",
                    "google_compute_network",
                    "azurerm_virtual_network",
                ][..],
            ),
            (
                Compute,
                &[
                    "aws_instance",
                    "google_compute_instance",
                    "azurerm_virtual_machine",
                    "aws_ecs_service",
                    "aws_lambda_function",
                ][..],
            ),
            (
                LoadBalancer,
                &[
                    "aws_lb",
                    "aws_elb",
                    "aws_alb",
                    "google_compute_forwarding_rule",
                    "azurerm_lb",
                ][..],
            ),
            (
                SecurityGroup,
                &[
                    "aws_security_group",
                    "google_compute_firewall",
                    "azurerm_network_security_group",
                ][..],
            ),
        ]
        .into_iter()
        .map(|(category, types)| (category, strings(types)))
        .collect();

        Self {
            resource_types,
            production_markers: strings(&["prod", "production"]),
            encryption_keys: strings(&[
                "encryption",
                "encrypted",
                "enable_encryption",
                "encryption_enabled",
            ]),
            backup_keys: strings(&[
                "versioning",
                "backup_enabled",
                "enable_backup",
                "backup_retention_days",
                "backup_retention_period",
            ]),
            cidr_keys: strings(&["cidr_blocks"]),
            open_cidr_blocks: strings(&["0.0.0.0/0", "::/0"]),
        }
    }
}

impl RiskCatalog {
    /// Whether `resource_type` belongs to `category`.
    pub fn matches(&self, category: ResourceCategory, resource_type: &str) -> bool {
        self.resource_types
            .get(&category)
            .is_some_and(|fragments| contains_any(resource_type, fragments))
    }

    /// Whether the address looks like a production resource.
    pub fn is_production(&self, address: &str) -> bool {
        contains_any(address, &self.production_markers)
    }

    /// Whether a CIDR block opens access to every address.
    pub fn is_open_cidr(&self, block: &str) -> bool {
        self.open_cidr_blocks.iter().any(|open| open == block)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Case-insensitive substring match against any fragment.
pub fn contains_any(haystack: &str, fragments: &[String]) -> bool {
    let haystack = haystack.to_lowercase();
    fragments
        .iter()
        .any(|fragment| haystack.contains(&fragment.to_lowercase()))
}
