// Built-in Risk Rules
//
// Destructive operations are judged by resource category and address.
// Updates are judged by attribute deltas between before and after.

use crate::catalog::{ResourceCategory, RiskCatalog};
use crate::plan::{Change, ChangeKind};
use crate::rules::attributes::{bool_attr, number_attr, string_list_attr};
use crate::rules::{RiskLevel, Rule, Warning};

/// All built-in rules in evaluation order.
pub fn builtin_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(ProductionDestroyed),
        Box::new(DATABASE_DESTROYED),
        Box::new(STORAGE_DESTROYED),
        Box::new(NETWORK_DESTROYED),
        Box::new(DATABASE_REPLACED),
        Box::new(COMPUTE_REPLACED),
        Box::new(LOAD_BALANCER_REPLACED),
        Box::new(SecurityGroupRelaxed),
        Box::new(EncryptionDisabled),
        Box::new(BackupDisabled),
    ]
}

/// Fires when a change of `kind` touches a resource of `category`.
#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    pub name: &'static str,
    pub kind: ChangeKind,
    pub category: ResourceCategory,
    pub level: RiskLevel,
    pub message: &'static str,
    pub explanation: &'static str,
}

impl Rule for CategoryRule {
    fn name(&self) -> &'static str {
        self.name
    }

    fn applies_to(&self) -> ChangeKind {
        self.kind
    }

    fn evaluate(&self, change: &Change, catalog: &RiskCatalog) -> Vec<Warning> {
        if !catalog.matches(self.category, &change.resource_type) {
            return Vec::new();
        }
        vec![Warning::new(
            self.level,
            change,
            self.message,
            self.explanation,
        )]
    }
}

pub const DATABASE_DESTROYED: CategoryRule = CategoryRule {
    name: "database-destroyed",
    kind: ChangeKind::Delete,
    category: ResourceCategory::Database,
    level: RiskLevel::Critical,
    message: "Database will be DESTROYED - data loss risk!",
    explanation: "Ensure backups are in place before deleting databases",
};

pub const STORAGE_DESTROYED: CategoryRule = CategoryRule {
    name: "storage-destroyed",
    kind: ChangeKind::Delete,
    category: ResourceCategory::Storage,
    level: RiskLevel::High,
    message: "Storage resource will be DESTROYED - potential data loss",
    explanation: "Verify data is backed up or migrated before deletion",
};

pub const NETWORK_DESTROYED: CategoryRule = CategoryRule {
    name: "network-destroyed",
    kind: ChangeKind::Delete,
    category: ResourceCategory::Network,
    level: RiskLevel::High,
    message: "Network resource will be DESTROYED - connectivity impact",
    explanation: "This may affect connectivity for other resources",
};

pub const DATABASE_REPLACED: CategoryRule = CategoryRule {
    name: "database-replaced",
    kind: ChangeKind::Replace,
    category: ResourceCategory::Database,
    level: RiskLevel::Critical,
    message: "Database will be REPLACED - downtime expected!",
    explanation: "Database recreation causes downtime and potential data loss",
};

pub const COMPUTE_REPLACED: CategoryRule = CategoryRule {
    name: "compute-replaced",
    kind: ChangeKind::Replace,
    category: ResourceCategory::Compute,
    level: RiskLevel::High,
    message: "Compute instance will be REPLACED - downtime expected",
    explanation: "Instance recreation causes service interruption",
};

pub const LOAD_BALANCER_REPLACED: CategoryRule = CategoryRule {
    name: "load-balancer-replaced",
    kind: ChangeKind::Replace,
    category: ResourceCategory::LoadBalancer,
    level: RiskLevel::High,
    message: "Load balancer will be REPLACED - traffic interruption",
    explanation: "This may cause temporary service unavailability",
};

/// Deleting anything addressed as production.
pub struct ProductionDestroyed;

impl Rule for ProductionDestroyed {
    fn name(&self) -> &'static str {
        "production-destroyed"
    }

    fn applies_to(&self) -> ChangeKind {
        ChangeKind::Delete
    }

    fn evaluate(&self, change: &Change, catalog: &RiskCatalog) -> Vec<Warning> {
        if !catalog.is_production(&change.address) {
            return Vec::new();
        }
        vec![Warning::new(
            RiskLevel::Critical,
            change,
            "Production resource will be DESTROYED",
            "Deleting production resources can cause service outages",
        )]
    }
}

/// A firewall-like resource gains an open-to-the-world CIDR block.
///
/// Only blocks absent from the same list before the change count.
pub struct SecurityGroupRelaxed;

impl SecurityGroupRelaxed {
    fn opens_access(change: &Change, catalog: &RiskCatalog) -> bool {
        catalog.cidr_keys.iter().any(|key| {
            let before = string_list_attr(&change.before, key);
            string_list_attr(&change.after, key)
                .into_iter()
                .any(|block| catalog.is_open_cidr(block) && !before.contains(&block))
        })
    }
}

impl Rule for SecurityGroupRelaxed {
    fn name(&self) -> &'static str {
        "security-group-relaxed"
    }

    fn applies_to(&self) -> ChangeKind {
        ChangeKind::Update
    }

    fn evaluate(&self, change: &Change, catalog: &RiskCatalog) -> Vec<Warning> {
        if !catalog.matches(ResourceCategory::SecurityGroup, &change.resource_type)
            || !Self::opens_access(change, catalog)
        {
            return Vec::new();
        }
        vec![Warning::new(
            RiskLevel::High,
            change,
            "Security group rules are being relaxed",
            "Review that new permissions don't expose services unnecessarily",
        )]
    }
}

/// Any encryption flag flips from true to false. Applies to every type.
pub struct EncryptionDisabled;

impl Rule for EncryptionDisabled {
    fn name(&self) -> &'static str {
        "encryption-disabled"
    }

    fn applies_to(&self) -> ChangeKind {
        ChangeKind::Update
    }

    fn evaluate(&self, change: &Change, catalog: &RiskCatalog) -> Vec<Warning> {
        let disabled = catalog
            .encryption_keys
            .iter()
            .any(|key| bool_attr(&change.before, key) && !bool_attr(&change.after, key));

        if !disabled {
            return Vec::new();
        }
        vec![Warning::new(
            RiskLevel::Critical,
            change,
            "Encryption is being DISABLED",
            "Disabling encryption is a serious security risk",
        )]
    }
}

/// A backup or versioning flag flips off, or a retention period drops
/// from a positive value to zero. Applies to every type.
pub struct BackupDisabled;

impl Rule for BackupDisabled {
    fn name(&self) -> &'static str {
        "backup-disabled"
    }

    fn applies_to(&self) -> ChangeKind {
        ChangeKind::Update
    }

    fn evaluate(&self, change: &Change, catalog: &RiskCatalog) -> Vec<Warning> {
        let disabled = catalog.backup_keys.iter().any(|key| {
            let flag_off = bool_attr(&change.before, key) && !bool_attr(&change.after, key);
            let retention_dropped =
                number_attr(&change.before, key) > 0.0 && number_attr(&change.after, key) == 0.0;
            flag_off || retention_dropped
        });

        if !disabled {
            return Vec::new();
        }
        vec![Warning::new(
            RiskLevel::High,
            change,
            "Backup or versioning is being DISABLED",
            "This increases risk of data loss",
        )]
    }
}
