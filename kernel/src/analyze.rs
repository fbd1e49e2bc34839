// End-to-End Plan Analysis
//
// Runs the full pipeline over a decoded plan:
// records → classification → summary → risk rules → report

use serde::Serialize;

use crate::plan::Summary;
use crate::rules::{RiskLevel, RuleEngine, Warning};

/// Run the built-in rules with the built-in catalog.
pub fn analyze(summary: &Summary) -> Vec<Warning> {
    RuleEngine::default().analyze(summary)
}

/// How a run should be reported to the calling process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Nothing will be created, updated, replaced, or destroyed.
    ///
    /// No-ops and unrecognized entries may still be present.
    NoChanges,

    /// Changes are planned, none of them critical.
    Changes,

    /// At least one critical warning was raised.
    CriticalRisk,
}

impl Outcome {
    pub fn code(self) -> u8 {
        match self {
            Outcome::NoChanges => 0,
            Outcome::Changes => 1,
            Outcome::CriticalRisk => 2,
        }
    }
}

/// Result of a full analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanReport {
    pub summary: Summary,
    pub warnings: Vec<Warning>,
}

impl PlanReport {
    /// Classify-and-analyze in one step.
    ///
    /// This function is:
    /// - deterministic
    /// - side-effect free
    /// - safe to run repeatedly
    pub fn build(summary: Summary, engine: &RuleEngine) -> Self {
        let warnings = engine.analyze(&summary);
        log::info!(
            "{} changes analyzed, {} warnings raised",
            summary.changes().len(),
            warnings.len()
        );
        Self { summary, warnings }
    }

    /// A report whose risk analysis was skipped.
    pub fn without_analysis(summary: Summary) -> Self {
        Self {
            summary,
            warnings: Vec::new(),
        }
    }

    /// Warnings of one level, in the order they were raised.
    pub fn warnings_at(&self, level: RiskLevel) -> impl Iterator<Item = &Warning> + '_ {
        self.warnings.iter().filter(move |w| w.level == level)
    }

    pub fn highest_level(&self) -> Option<RiskLevel> {
        self.warnings.iter().map(|w| w.level).max()
    }

    pub fn has_critical(&self) -> bool {
        self.highest_level() == Some(RiskLevel::Critical)
    }

    pub fn outcome(&self) -> Outcome {
        if !self.summary.has_changes() {
            Outcome::NoChanges
        } else if self.has_critical() {
            Outcome::CriticalRisk
        } else {
            Outcome::Changes
        }
    }
}
