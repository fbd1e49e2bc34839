// Terraform Plan Adapter
//
// Parses the JSON rendering of a saved plan (`terraform show -json`)
// and exposes the subset needed for classification.

use serde::Deserialize;
use serde_json::Value;

use crate::plan::{aggregate, Action, ChangeRecord, Summary};

/// Subset of a plan document we care about.
///
/// This intentionally ignores:
/// - prior state and configuration
/// - output changes
/// - resource drift
#[derive(Debug, Default, Deserialize)]
pub struct PlanDocument {
    #[serde(default)]
    pub format_version: String,

    #[serde(default)]
    pub terraform_version: String,

    #[serde(default)]
    pub resource_changes: Option<Vec<ResourceChangeDocument>>,
}

#[derive(Debug, Deserialize)]
pub struct ResourceChangeDocument {
    pub address: String,

    #[serde(rename = "type")]
    pub resource_type: String,

    /// An entry without a change object decodes with no actions and is
    /// reported as unrecognized instead of failing the whole plan.
    #[serde(default)]
    pub change: ChangeDocument,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChangeDocument {
    #[serde(default)]
    pub actions: Vec<Action>,

    #[serde(default)]
    pub before: Value,

    #[serde(default)]
    pub after: Value,

    #[serde(default)]
    pub after_unknown: Value,

    #[serde(default)]
    pub before_sensitive: Value,

    #[serde(default)]
    pub after_sensitive: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("invalid plan JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl PlanDocument {
    pub fn from_json_str(json: &str) -> Result<Self, PlanError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Raw change records in document order.
    pub fn into_records(self) -> Vec<ChangeRecord> {
        self.resource_changes
            .unwrap_or_default()
            .into_iter()
            .map(ResourceChangeDocument::into_record)
            .collect()
    }

    /// Classify every resource change into a summary.
    pub fn into_summary(self) -> Summary {
        let tool_version = self.terraform_version.clone();
        let format_version = self.format_version.clone();
        aggregate(tool_version, format_version, self.into_records())
    }
}

impl ResourceChangeDocument {
    pub fn into_record(self) -> ChangeRecord {
        let change = self.change;
        ChangeRecord {
            address: self.address,
            resource_type: self.resource_type,
            actions: change.actions,
            before: change.before,
            after: change.after,
            after_unknown: change.after_unknown,
            before_sensitive: change.before_sensitive,
            after_sensitive: change.after_sensitive,
        }
    }
}
