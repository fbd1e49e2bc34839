// Output Rendering
//
// Shared pieces for the terminal and markdown views: value formatting
// and an attribute diff that honours sensitivity and unknown markers.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::{Map, Value};

use infrasync_kernel::plan::{
    marker_child, marker_covers, SENSITIVE_PLACEHOLDER, UNKNOWN_PLACEHOLDER,
};
use infrasync_kernel::{Change, Outcome, PlanReport, Summary, Warning};

pub mod markdown;
pub mod terminal;

pub const SENSITIVE: &str = SENSITIVE_PLACEHOLDER;
pub const KNOWN_AFTER_APPLY: &str = UNKNOWN_PLACEHOLDER;

const MAX_VALUE_CHARS: usize = 60;

/// Short, single-line rendering of an attribute value.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            // Whole floats print like integers.
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        Value::String(s) if s.chars().count() > MAX_VALUE_CHARS => {
            let head: String = s.chars().take(MAX_VALUE_CHARS).collect();
            format!("{head}...")
        }
        Value::String(s) => format!("{s:?}"),
        Value::Array(items) => format!("[{} items]", items.len()),
        Value::Object(_) => "{...}".to_string(),
    }
}

/// One line of an attribute diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine {
    Unknown { depth: usize, key: String },
    Changed { depth: usize, key: String, before: String, after: String },
    Added { depth: usize, key: String, value: String },
    Removed { depth: usize, key: String, value: String },

    /// Header for a nested object whose children follow one level deeper.
    Nested { depth: usize, key: String },
}

struct Markers<'a> {
    unknown: &'a Value,
    before_sensitive: &'a Value,
    after_sensitive: &'a Value,
}

impl<'a> Markers<'a> {
    fn sensitive(&self, key: &str) -> bool {
        marker_covers(self.before_sensitive, key) || marker_covers(self.after_sensitive, key)
    }

    fn child(&self, key: &str) -> Markers<'a> {
        Markers {
            unknown: marker_child(self.unknown, key),
            before_sensitive: marker_child(self.before_sensitive, key),
            after_sensitive: marker_child(self.after_sensitive, key),
        }
    }
}

/// Attribute-level differences between before and after, keys sorted.
///
/// Unchanged keys are omitted. Objects present on both sides are diffed
/// recursively unless redacted.
pub fn attribute_diff(change: &Change) -> Vec<DiffLine> {
    let markers = Markers {
        unknown: &change.after_unknown,
        before_sensitive: &change.before_sensitive,
        after_sensitive: &change.after_sensitive,
    };
    let mut lines = Vec::new();
    diff_maps(&change.before, &change.after, &markers, 0, &mut lines);
    lines
}

fn diff_maps(
    before: &Map<String, Value>,
    after: &Map<String, Value>,
    markers: &Markers<'_>,
    depth: usize,
    out: &mut Vec<DiffLine>,
) {
    let mut keys: BTreeSet<&String> = before.keys().chain(after.keys()).collect();
    if let Value::Object(unknown) = markers.unknown {
        keys.extend(unknown.keys());
    }

    for key in keys {
        let key_name = key.to_string();

        if marker_covers(markers.unknown, key) {
            out.push(DiffLine::Unknown {
                depth,
                key: key_name,
            });
            continue;
        }

        let sensitive = markers.sensitive(key);
        let shown = |value: &Value| {
            if sensitive {
                SENSITIVE.to_string()
            } else {
                format_value(value)
            }
        };

        match (before.get(key), after.get(key)) {
            (Some(Value::Object(b)), Some(Value::Object(a))) if !sensitive => {
                if a == b {
                    continue;
                }
                out.push(DiffLine::Nested {
                    depth,
                    key: key_name,
                });
                diff_maps(b, a, &markers.child(key), depth + 1, out);
            }
            (Some(b), Some(a)) => {
                let (before, after) = (shown(b), shown(a));
                if b != a && (before != after || sensitive) {
                    out.push(DiffLine::Changed {
                        depth,
                        key: key_name,
                        before,
                        after,
                    });
                }
            }
            (None, Some(a)) => out.push(DiffLine::Added {
                depth,
                key: key_name,
                value: shown(a),
            }),
            (Some(b), None) => out.push(DiffLine::Removed {
                depth,
                key: key_name,
                value: shown(b),
            }),
            // Only present in the unknown marker, but not flagged unknown.
            (None, None) => {}
        }
    }
}

/// Key/value listing of one attribute snapshot, redacted.
///
/// `after_side` selects which unknown marker applies: only after-values
/// can be unknown.
pub fn attribute_listing(change: &Change, after_side: bool) -> Vec<(String, String)> {
    let attrs = if after_side { &change.after } else { &change.before };

    let mut keys: BTreeSet<&String> = attrs.keys().collect();
    if after_side {
        if let Value::Object(unknown) = &change.after_unknown {
            keys.extend(unknown.keys());
        }
    }

    keys.into_iter()
        .filter_map(|key| {
            let value = if after_side && change.is_unknown_after_apply(key) {
                KNOWN_AFTER_APPLY.to_string()
            } else if change.is_sensitive(key) {
                SENSITIVE.to_string()
            } else {
                format_value(attrs.get(key)?)
            };
            Some((key.to_string(), value))
        })
        .collect()
}

/// Machine-readable report. Attribute maps are redacted by the kernel's
/// `Change` serialization.
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    summary: &'a Summary,
    warnings: &'a [Warning],
    outcome: Outcome,
    exit_code: u8,
}

pub fn json(report: &PlanReport) -> serde_json::Result<String> {
    let outcome = report.outcome();
    let mut rendered = serde_json::to_string_pretty(&JsonReport {
        summary: &report.summary,
        warnings: &report.warnings,
        outcome,
        exit_code: outcome.code(),
    })?;
    rendered.push('\n');
    Ok(rendered)
}
