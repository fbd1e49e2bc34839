// InfraSync Kernel
//
// Change classification and risk analysis for infrastructure plans.
// Everything here is pure: no file access, no network, no global state.

pub mod adapters;
pub mod analyze;
pub mod catalog;
pub mod plan;
pub mod rules;

pub use adapters::terraform::{PlanDocument, PlanError};
pub use analyze::{analyze, Outcome, PlanReport};
pub use catalog::{ResourceCategory, RiskCatalog};
pub use plan::{aggregate, classify, Action, Change, ChangeKind, ChangeRecord, Summary};
pub use rules::{RiskLevel, Rule, RuleEngine, Warning};
