// Attribute accessors used by the update rules.
//
// A missing key reads as `false`, `0.0`, or an empty list.

use serde_json::{Map, Value};

pub fn bool_attr(attrs: &Map<String, Value>, key: &str) -> bool {
    attrs.get(key).and_then(Value::as_bool).unwrap_or(false)
}

/// Every JSON number reads as `f64`.
pub fn number_attr(attrs: &Map<String, Value>, key: &str) -> f64 {
    attrs.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

/// String items of an array attribute; other items are skipped.
pub fn string_list_attr<'a>(attrs: &'a Map<String, Value>, key: &str) -> Vec<&'a str> {
    match attrs.get(key) {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn bools_default_to_false() {
        let map = attrs(json!({"on": true, "off": false, "text": "true"}));
        assert!(bool_attr(&map, "on"));
        assert!(!bool_attr(&map, "off"));
        assert!(!bool_attr(&map, "text"));
        assert!(!bool_attr(&map, "missing"));
    }

    #[test]
    fn numbers_read_as_floats() {
        let map = attrs(json!({"int": 7, "float": 2.5, "text": "7"}));
        assert_eq!(number_attr(&map, "int"), 7.0);
        assert_eq!(number_attr(&map, "float"), 2.5);
        assert_eq!(number_attr(&map, "text"), 0.0);
        assert_eq!(number_attr(&map, "missing"), 0.0);
    }

    #[test]
    fn string_lists_skip_other_items() {
        let map = attrs(json!({"cidrs": ["10.0.0.0/8", 5, null, "0.0.0.0/0"], "one": "x"}));
        assert_eq!(string_list_attr(&map, "cidrs"), vec!["10.0.0.0/8", "0.0.0.0/0"]);
        assert!(string_list_attr(&map, "one").is_empty());
        assert!(string_list_attr(&map, "missing").is_empty());
    }
}
