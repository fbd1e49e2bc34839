// Change Classification
//
// Turns raw resource change records into normalized changes with a
// single action kind. This module is pure, deterministic, and total:
// malformed attribute snapshots degrade to empty maps.

use std::collections::BTreeSet;
use std::fmt;

use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod summary;

pub use summary::{aggregate, Summary};

/// Shown in place of a value flagged by a sensitivity marker.
pub const SENSITIVE_PLACEHOLDER: &str = "(sensitive)";

/// Shown in place of a value only known once the plan is applied.
pub const UNKNOWN_PLACEHOLDER: &str = "(known after apply)";

static NO_MARKER: Value = Value::Null;

/// A single lifecycle action as it appears in a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    NoOp,
    Create,
    Read,
    Update,
    Delete,

    /// Any action name this version does not know about.
    #[serde(other)]
    Unsupported,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::NoOp => "no-op",
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized kind of change for one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeKind {
    Create,
    Update,
    Delete,

    /// Destroy followed by create (or the reverse).
    Replace,

    NoOp,
}

impl ChangeKind {
    /// Every kind, in the order reports list them.
    pub const ALL: [ChangeKind; 5] = [
        ChangeKind::Create,
        ChangeKind::Update,
        ChangeKind::Replace,
        ChangeKind::Delete,
        ChangeKind::NoOp,
    ];

    /// Classify an ordered action sequence.
    ///
    /// The `{delete, create}` pair is checked before single actions so a
    /// destroy-and-recreate is never reported as a plain delete. Shapes
    /// outside the known set yield `None`.
    pub fn from_actions(actions: &[Action]) -> Option<Self> {
        use Action::*;

        match actions {
            [Delete, Create] | [Create, Delete] => Some(ChangeKind::Replace),
            [Create] => Some(ChangeKind::Create),
            [Update] => Some(ChangeKind::Update),
            [Delete] => Some(ChangeKind::Delete),
            [NoOp] => Some(ChangeKind::NoOp),
            _ => None,
        }
    }

    /// Delete and replace both destroy the existing resource.
    pub fn is_destructive(self) -> bool {
        matches!(self, ChangeKind::Delete | ChangeKind::Replace)
    }
}

/// One raw resource change, as decoded from the plan document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeRecord {
    pub address: String,
    pub resource_type: String,
    pub actions: Vec<Action>,
    pub before: Value,
    pub after: Value,
    pub after_unknown: Value,
    pub before_sensitive: Value,
    pub after_sensitive: Value,
}

/// A classified resource change.
///
/// `before` and `after` are always maps. `kind` is `None` only for
/// action sequences that do not describe a known change.
///
/// Serializes with redacted attribute maps, never the raw values.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub address: String,
    pub resource_type: String,
    pub actions: Vec<Action>,
    pub kind: Option<ChangeKind>,
    pub before: Map<String, Value>,
    pub after: Map<String, Value>,
    pub after_unknown: Value,
    pub before_sensitive: Value,
    pub after_sensitive: Value,
}

impl Change {
    pub fn is_create(&self) -> bool {
        self.kind == Some(ChangeKind::Create)
    }

    pub fn is_update(&self) -> bool {
        self.kind == Some(ChangeKind::Update)
    }

    pub fn is_delete(&self) -> bool {
        self.kind == Some(ChangeKind::Delete)
    }

    pub fn is_replace(&self) -> bool {
        self.kind == Some(ChangeKind::Replace)
    }

    pub fn is_no_op(&self) -> bool {
        self.kind == Some(ChangeKind::NoOp)
    }

    pub fn is_unrecognized(&self) -> bool {
        self.kind.is_none()
    }

    /// Whether the value under `key` must be redacted.
    ///
    /// A marker that is `true` as a whole redacts every key.
    pub fn is_sensitive(&self, key: &str) -> bool {
        marker_covers(&self.before_sensitive, key) || marker_covers(&self.after_sensitive, key)
    }

    /// Whether the after-value of `key` is only known once applied.
    pub fn is_unknown_after_apply(&self, key: &str) -> bool {
        marker_covers(&self.after_unknown, key)
    }

    /// `before` with sensitive values masked.
    pub fn redacted_before(&self) -> Map<String, Value> {
        redact(&self.before, &NO_MARKER, self.sensitivity())
    }

    /// `after` with sensitive and unknown-after-apply values masked.
    pub fn redacted_after(&self) -> Map<String, Value> {
        redact(&self.after, &self.after_unknown, self.sensitivity())
    }

    fn sensitivity(&self) -> [&Value; 2] {
        [&self.before_sensitive, &self.after_sensitive]
    }
}

impl Serialize for Change {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Change", 6)?;
        state.serialize_field("address", &self.address)?;
        state.serialize_field("type", &self.resource_type)?;
        state.serialize_field("actions", &self.actions)?;
        state.serialize_field("kind", &self.kind)?;
        state.serialize_field("before", &self.redacted_before())?;
        state.serialize_field("after", &self.redacted_after())?;
        state.end()
    }
}

/// Whether a sensitivity or unknown marker flags `key`.
///
/// Markers mirror the attribute map: `true` covers everything, an object
/// flags the keys mapped to `true`.
pub fn marker_covers(marker: &Value, key: &str) -> bool {
    match marker {
        Value::Bool(all) => *all,
        Value::Object(map) => map.get(key) == Some(&Value::Bool(true)),
        _ => false,
    }
}

/// The marker for the value nested under `key`.
///
/// A marker that is `true` as a whole covers every nested value too.
pub fn marker_child<'a>(marker: &'a Value, key: &str) -> &'a Value {
    match marker {
        Value::Bool(true) => marker,
        Value::Object(map) => map.get(key).unwrap_or(&NO_MARKER),
        _ => &NO_MARKER,
    }
}

/// Whether a marker flags anything at any depth.
fn marker_flags_any(marker: &Value) -> bool {
    match marker {
        Value::Bool(flag) => *flag,
        Value::Array(items) => items.iter().any(marker_flags_any),
        Value::Object(map) => map.values().any(marker_flags_any),
        _ => false,
    }
}

/// Copy of `attrs` with flagged values replaced by placeholders.
///
/// Objects are masked key by key. Lists are masked whole when any of
/// their elements is flagged.
fn redact(
    attrs: &Map<String, Value>,
    unknown: &Value,
    sensitive: [&Value; 2],
) -> Map<String, Value> {
    let mut keys: BTreeSet<&String> = attrs.keys().collect();
    if let Value::Object(flagged) = unknown {
        keys.extend(flagged.keys());
    }

    keys.into_iter()
        .filter_map(|key| {
            let unknown_child = marker_child(unknown, key);
            let sensitive_child = sensitive.map(|marker| marker_child(marker, key));

            let value = if marker_covers(unknown, key) {
                Value::from(UNKNOWN_PLACEHOLDER)
            } else if sensitive.iter().any(|marker| marker_covers(marker, key)) {
                Value::from(SENSITIVE_PLACEHOLDER)
            } else {
                match attrs.get(key)? {
                    Value::Object(nested) => {
                        Value::Object(redact(nested, unknown_child, sensitive_child))
                    }
                    Value::Array(_) if sensitive_child.iter().any(|m| marker_flags_any(m)) => {
                        Value::from(SENSITIVE_PLACEHOLDER)
                    }
                    Value::Array(_) if marker_flags_any(unknown_child) => {
                        Value::from(UNKNOWN_PLACEHOLDER)
                    }
                    other => other.clone(),
                }
            };
            Some((key.clone(), value))
        })
        .collect()
}

/// Anything that is not a JSON object becomes an empty map.
pub fn normalize_attributes(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Classify one raw record. Never fails.
pub fn classify(record: ChangeRecord) -> Change {
    let kind = ChangeKind::from_actions(&record.actions);

    if kind.is_none() {
        log::warn!(
            "unrecognized action sequence {:?} for {}, leaving unclassified",
            record.actions,
            record.address
        );
    }

    Change {
        address: record.address,
        resource_type: record.resource_type,
        actions: record.actions,
        kind,
        before: normalize_attributes(record.before),
        after: normalize_attributes(record.after),
        after_unknown: record.after_unknown,
        before_sensitive: record.before_sensitive,
        after_sensitive: record.after_sensitive,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record(actions: Vec<Action>) -> ChangeRecord {
        ChangeRecord {
            address: "aws_instance.web".into(),
            resource_type: "aws_instance".into(),
            actions,
            ..Default::default()
        }
    }

    fn flags(change: &Change) -> [bool; 5] {
        [
            change.is_create(),
            change.is_update(),
            change.is_delete(),
            change.is_replace(),
            change.is_no_op(),
        ]
    }

    #[test]
    fn single_actions_map_directly() {
        let cases = [
            (Action::Create, [true, false, false, false, false]),
            (Action::Update, [false, true, false, false, false]),
            (Action::Delete, [false, false, true, false, false]),
            (Action::NoOp, [false, false, false, false, true]),
        ];

        for (action, expected) in cases {
            let change = classify(record(vec![action]));
            assert_eq!(flags(&change), expected, "action {action:?}");
        }
    }

    #[test]
    fn delete_create_is_replace_in_either_order() {
        for actions in [
            vec![Action::Delete, Action::Create],
            vec![Action::Create, Action::Delete],
        ] {
            let change = classify(record(actions));
            assert!(change.is_replace());
            assert!(!change.is_delete());
            assert!(!change.is_create());
        }
    }

    #[test]
    fn odd_action_shapes_stay_unclassified() {
        let shapes = [
            vec![],
            vec![Action::Read],
            vec![Action::Delete, Action::Update],
            vec![Action::Create, Action::Create],
            vec![Action::Delete, Action::Create, Action::Update],
        ];

        for actions in shapes {
            let change = classify(record(actions.clone()));
            assert!(change.is_unrecognized(), "actions {actions:?}");
            assert_eq!(flags(&change), [false; 5]);
        }
    }

    #[test]
    fn attribute_snapshots_are_normalized() {
        let change = classify(ChangeRecord {
            before: Value::Null,
            after: json!(["not", "a", "map"]),
            ..record(vec![Action::Update])
        });
        assert!(change.before.is_empty());
        assert!(change.after.is_empty());

        let change = classify(ChangeRecord {
            after: json!({"ami": "ami-123"}),
            ..record(vec![Action::Create])
        });
        assert_eq!(change.after.get("ami"), Some(&json!("ami-123")));
    }

    #[test]
    fn action_names_decode_from_plan_strings() {
        let actions: Vec<Action> =
            serde_json::from_value(json!(["no-op", "create", "read", "forget"])).unwrap();
        assert_eq!(
            actions,
            vec![Action::NoOp, Action::Create, Action::Read, Action::Unsupported]
        );
    }

    #[test]
    fn sensitivity_and_unknown_markers() {
        let change = classify(ChangeRecord {
            before_sensitive: json!({"password": true}),
            after_sensitive: json!({"token": true, "name": false}),
            after_unknown: json!({"arn": true, "tags": {}}),
            ..record(vec![Action::Update])
        });

        assert!(change.is_sensitive("password"));
        assert!(change.is_sensitive("token"));
        assert!(!change.is_sensitive("name"));
        assert!(change.is_unknown_after_apply("arn"));
        assert!(!change.is_unknown_after_apply("tags"));

        let redacted = classify(ChangeRecord {
            after_sensitive: json!(true),
            ..record(vec![Action::Update])
        });
        assert!(redacted.is_sensitive("anything"));
    }

    #[test]
    fn redacted_snapshots_mask_flagged_values() {
        let change = classify(ChangeRecord {
            before: json!({"password": "hunter2", "engine": "postgres"}),
            after: json!({
                "password": "hunter3",
                "engine": "postgres",
                "endpoint": null,
                "settings": {"token": "abc", "size": 2},
                "users": ["alice", "s3cret"]
            }),
            before_sensitive: json!({"password": true}),
            after_sensitive: json!({
                "password": true,
                "settings": {"token": true},
                "users": [false, true]
            }),
            after_unknown: json!({"endpoint": true, "arn": true}),
            ..record(vec![Action::Update])
        });

        assert_eq!(
            Value::Object(change.redacted_before()),
            json!({"engine": "postgres", "password": SENSITIVE_PLACEHOLDER})
        );
        assert_eq!(
            Value::Object(change.redacted_after()),
            json!({
                "arn": UNKNOWN_PLACEHOLDER,
                "endpoint": UNKNOWN_PLACEHOLDER,
                "engine": "postgres",
                "password": SENSITIVE_PLACEHOLDER,
                "settings": {"size": 2, "token": SENSITIVE_PLACEHOLDER},
                "users": SENSITIVE_PLACEHOLDER
            })
        );
    }

    #[test]
    fn serialized_change_never_carries_sensitive_values() {
        let change = classify(ChangeRecord {
            before: json!({"password": "hunter2"}),
            after: json!({"password": "hunter3"}),
            after_sensitive: json!(true),
            ..record(vec![Action::Update])
        });

        let value = serde_json::to_value(&change).unwrap();
        assert_eq!(value["type"], "aws_instance");
        assert_eq!(value["kind"], "update");
        assert_eq!(value["before"]["password"], SENSITIVE_PLACEHOLDER);
        assert_eq!(value["after"]["password"], SENSITIVE_PLACEHOLDER);

        let text = value.to_string();
        assert!(!text.contains("hunter2"));
        assert!(!text.contains("hunter3"));
    }
}
