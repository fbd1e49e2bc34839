// Risk Rule Framework
//
// Rules are pure predicates over a single classified change. Each rule
// is gated on one change kind and may emit any number of warnings.
// Rules are independent and additive: every gated rule runs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::RiskCatalog;
use crate::plan::{Change, ChangeKind, Summary};

pub mod attributes;
pub mod builtin;

/// Severity of a warning, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Most severe first.
    pub const DESCENDING: [RiskLevel; 4] = [
        RiskLevel::Critical,
        RiskLevel::High,
        RiskLevel::Medium,
        RiskLevel::Low,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected risky change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub level: RiskLevel,
    pub resource: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub message: String,
    pub explanation: String,
}

impl Warning {
    pub fn new(
        level: RiskLevel,
        change: &Change,
        message: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            level,
            resource: change.address.clone(),
            resource_type: change.resource_type.clone(),
            message: message.into(),
            explanation: explanation.into(),
        }
    }
}

/// Trait implemented by all risk rules.
///
/// Rules must be:
/// - Pure
/// - Deterministic
/// - Side-effect free
pub trait Rule: Send + Sync {
    fn name(&self) -> &'static str;

    /// The only change kind this rule looks at.
    fn applies_to(&self) -> ChangeKind;

    fn evaluate(&self, change: &Change, catalog: &RiskCatalog) -> Vec<Warning>;
}

/// Rule engine that evaluates a set of rules against a catalog.
pub struct RuleEngine {
    catalog: RiskCatalog,
    rules: Vec<Box<dyn Rule>>,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::with_builtin_rules(RiskCatalog::default())
    }
}

impl RuleEngine {
    /// Create an engine with no rules registered.
    pub fn new(catalog: RiskCatalog) -> Self {
        Self {
            catalog,
            rules: Vec::new(),
        }
    }

    /// Create an engine with every built-in rule registered.
    pub fn with_builtin_rules(catalog: RiskCatalog) -> Self {
        Self {
            catalog,
            rules: builtin::builtin_rules(),
        }
    }

    /// Register a rule. Rules run in registration order.
    pub fn register<R: Rule + 'static>(&mut self, rule: R) {
        self.rules.push(Box::new(rule));
    }

    pub fn catalog(&self) -> &RiskCatalog {
        &self.catalog
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|rule| rule.name())
    }

    /// Evaluate every rule gated on this change's kind.
    ///
    /// Unrecognized changes are never evaluated.
    pub fn evaluate(&self, change: &Change) -> Vec<Warning> {
        let Some(kind) = change.kind else {
            return Vec::new();
        };

        let mut warnings = Vec::new();
        for rule in self.rules.iter().filter(|rule| rule.applies_to() == kind) {
            let found = rule.evaluate(change, &self.catalog);
            for warning in &found {
                log::debug!(
                    "rule `{}` flagged {} as {}: {}",
                    rule.name(),
                    warning.resource,
                    warning.level,
                    warning.message
                );
            }
            warnings.extend(found);
        }
        warnings
    }

    /// Evaluate every change in plan order.
    pub fn analyze(&self, summary: &Summary) -> Vec<Warning> {
        summary
            .changes()
            .iter()
            .flat_map(|change| self.evaluate(change))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{classify, Action, ChangeRecord};

    struct FlagEveryCreate;

    impl Rule for FlagEveryCreate {
        fn name(&self) -> &'static str {
            "flag-every-create"
        }

        fn applies_to(&self) -> ChangeKind {
            ChangeKind::Create
        }

        fn evaluate(&self, change: &Change, _catalog: &RiskCatalog) -> Vec<Warning> {
            vec![Warning::new(RiskLevel::Low, change, "created", "every create")]
        }
    }

    fn change(actions: Vec<Action>) -> Change {
        classify(ChangeRecord {
            address: "aws_instance.web".into(),
            resource_type: "aws_instance".into(),
            actions,
            ..Default::default()
        })
    }

    #[test]
    fn levels_are_ordered() {
        assert!(RiskLevel::Critical > RiskLevel::High);
        assert!(RiskLevel::High > RiskLevel::Medium);
        assert!(RiskLevel::Medium > RiskLevel::Low);
        assert_eq!(RiskLevel::Critical.to_string(), "critical");
    }

    #[test]
    fn registered_rule_only_sees_its_kind() {
        let mut engine = RuleEngine::new(RiskCatalog::default());
        engine.register(FlagEveryCreate);

        let warnings = engine.evaluate(&change(vec![Action::Create]));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].resource, "aws_instance.web");
        assert_eq!(warnings[0].resource_type, "aws_instance");

        assert!(engine.evaluate(&change(vec![Action::Delete])).is_empty());
    }

    #[test]
    fn rules_are_additive() {
        let mut engine = RuleEngine::new(RiskCatalog::default());
        engine.register(FlagEveryCreate);
        engine.register(FlagEveryCreate);

        assert_eq!(engine.evaluate(&change(vec![Action::Create])).len(), 2);
    }

    #[test]
    fn unrecognized_changes_are_skipped() {
        let mut engine = RuleEngine::new(RiskCatalog::default());
        engine.register(FlagEveryCreate);

        assert!(engine.evaluate(&change(vec![])).is_empty());
    }

    #[test]
    fn empty_engine_has_no_rules() {
        let engine = RuleEngine::new(RiskCatalog::default());
        assert_eq!(engine.rule_names().count(), 0);
        assert!(engine.evaluate(&change(vec![Action::Create])).is_empty());
    }
}
