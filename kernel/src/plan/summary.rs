// Plan Summary
//
// Folds classified changes into per-kind counters. Counters only move
// through `push`, so they always agree with the change list.

use serde::Serialize;

use crate::plan::{classify, Change, ChangeKind, ChangeRecord};

/// Aggregate view of one plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    tool_version: String,
    format_version: String,
    changes: Vec<Change>,
    to_create: usize,
    to_update: usize,
    to_delete: usize,
    to_replace: usize,
    no_changes: usize,
    unrecognized: usize,
}

impl Summary {
    pub fn new(tool_version: impl Into<String>, format_version: impl Into<String>) -> Self {
        Self {
            tool_version: tool_version.into(),
            format_version: format_version.into(),
            ..Self::default()
        }
    }

    /// Append a change and bump the counter for its kind.
    pub fn push(&mut self, change: Change) {
        match change.kind {
            Some(ChangeKind::Create) => self.to_create += 1,
            Some(ChangeKind::Update) => self.to_update += 1,
            Some(ChangeKind::Delete) => self.to_delete += 1,
            Some(ChangeKind::Replace) => self.to_replace += 1,
            Some(ChangeKind::NoOp) => self.no_changes += 1,
            None => self.unrecognized += 1,
        }
        self.changes.push(change);
    }

    pub fn tool_version(&self) -> &str {
        &self.tool_version
    }

    pub fn format_version(&self) -> &str {
        &self.format_version
    }

    /// Changes in plan order.
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn to_create(&self) -> usize {
        self.to_create
    }

    pub fn to_update(&self) -> usize {
        self.to_update
    }

    pub fn to_delete(&self) -> usize {
        self.to_delete
    }

    pub fn to_replace(&self) -> usize {
        self.to_replace
    }

    pub fn no_changes(&self) -> usize {
        self.no_changes
    }

    pub fn unrecognized(&self) -> usize {
        self.unrecognized
    }

    pub fn count(&self, kind: ChangeKind) -> usize {
        match kind {
            ChangeKind::Create => self.to_create,
            ChangeKind::Update => self.to_update,
            ChangeKind::Delete => self.to_delete,
            ChangeKind::Replace => self.to_replace,
            ChangeKind::NoOp => self.no_changes,
        }
    }

    /// Changes of one kind, in plan order.
    pub fn changes_of(&self, kind: ChangeKind) -> impl Iterator<Item = &Change> + '_ {
        self.changes.iter().filter(move |c| c.kind == Some(kind))
    }

    pub fn unrecognized_changes(&self) -> impl Iterator<Item = &Change> + '_ {
        self.changes.iter().filter(|c| c.is_unrecognized())
    }

    /// Creates, updates, deletes and replaces.
    pub fn total_changes(&self) -> usize {
        self.to_create + self.to_update + self.to_delete + self.to_replace
    }

    /// True when something will be created, updated, replaced or destroyed.
    ///
    /// Unrecognized entries (deferred reads and the like) touch no counter
    /// here; they are listed but never make a plan count as changing.
    pub fn has_changes(&self) -> bool {
        self.total_changes() > 0
    }

    pub fn has_destructive_changes(&self) -> bool {
        self.to_delete > 0 || self.to_replace > 0
    }
}

/// Classify every record in order and fold the results.
pub fn aggregate<I>(
    tool_version: impl Into<String>,
    format_version: impl Into<String>,
    records: I,
) -> Summary
where
    I: IntoIterator<Item = ChangeRecord>,
{
    let mut summary = Summary::new(tool_version, format_version);
    for record in records {
        summary.push(classify(record));
    }

    log::debug!(
        "aggregated {} changes: +{} ~{} -{} ±{} ={} ?{}",
        summary.changes.len(),
        summary.to_create,
        summary.to_update,
        summary.to_delete,
        summary.to_replace,
        summary.no_changes,
        summary.unrecognized
    );

    summary
}
