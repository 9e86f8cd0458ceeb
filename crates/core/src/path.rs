//! Dot-path access over nested JSON values.
//!
//! A dot-path such as `metadata.bandwidth.downstreamCapacity` names a location
//! inside a structured record. Object segments are keys, array segments are
//! decimal indices. These helpers are the only bridge between the flat control
//! namespace of a form and the nested shape of an entity.

use serde_json::{Map, Value};

/// Split a dot-path into its segments.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('.')
}

/// Read the value at `path`.
///
/// Returns `None` as soon as an intermediate value is missing, `null`, or not
/// a container. A `null` stored at the final segment is returned as-is.
pub fn get<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in segments(path) {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Write `value` at `path`, creating empty objects for missing intermediates.
///
/// Intermediates that exist but are not containers are replaced by an empty
/// object. Index segments past the end of an array pad it with `null`.
/// Writing the same value twice leaves the record unchanged.
pub fn set(root: &mut Value, path: &str, value: Value) {
    let parts: Vec<&str> = segments(path).collect();
    let Some((last, parents)) = parts.split_last() else {
        return;
    };

    let mut current = root;
    for segment in parents {
        current = slot_mut(current, segment);
    }
    *slot_mut(current, last) = value;
}

/// Borrow the slot named by `segment`, inserting `null` when absent.
///
/// Arrays are only indexed by numeric segments; any other non-object node is
/// replaced by an empty object first.
fn slot_mut<'a>(node: &'a mut Value, segment: &str) -> &'a mut Value {
    match (node, segment.parse::<usize>()) {
        (Value::Array(items), Ok(index)) => {
            if items.len() <= index {
                items.resize(index + 1, Value::Null);
            }
            &mut items[index]
        }
        (Value::Object(map), _) => map.entry(segment.to_string()).or_insert(Value::Null),
        (other, _) => {
            *other = Value::Object(Map::new());
            &mut other[segment]
        }
    }
}

/// Whether a value counts as "not filled in".
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Interpret a control value as a number.
///
/// Numbers pass through; strings are trimmed and parsed. Anything else, and
/// empty strings, yield `None`.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok().filter(|f| f.is_finite())
            }
        }
        _ => None,
    }
}

/// Interpret a control value as a whole count.
pub fn as_count(value: &Value) -> Option<i64> {
    let f = as_number(value)?;
    if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Render a scalar value as text for identity comparisons.
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_nested() {
        let root = json!({"metadata": {"bandwidth": {"downstreamCapacity": 2500}}});
        assert_eq!(get(&root, "metadata.bandwidth.downstreamCapacity"), Some(&json!(2500)));
    }

    #[test]
    fn test_get_missing_intermediate() {
        let root = json!({"metadata": null});
        assert_eq!(get(&root, "metadata.bandwidth.downstreamCapacity"), None);
        assert_eq!(get(&root, "other.value"), None);
    }

    #[test]
    fn test_get_through_scalar_is_none() {
        let root = json!({"name": "olt-1"});
        assert_eq!(get(&root, "name.first"), None);
    }

    #[test]
    fn test_get_final_null_is_present() {
        let root = json!({"code": null});
        assert_eq!(get(&root, "code"), Some(&Value::Null));
    }

    #[test]
    fn test_get_array_index() {
        let root = json!({"cards": [{"slot": 1}, {"slot": 2}]});
        assert_eq!(get(&root, "cards.1.slot"), Some(&json!(2)));
        assert_eq!(get(&root, "cards.5.slot"), None);
        assert_eq!(get(&root, "cards.x"), None);
    }

    #[test]
    fn test_set_creates_intermediates() {
        let mut root = json!({"name": "x"});
        set(&mut root, "a.b.c", json!(42));
        assert_eq!(root, json!({"name": "x", "a": {"b": {"c": 42}}}));
    }

    #[test]
    fn test_set_is_idempotent() {
        let mut root = json!({});
        set(&mut root, "metadata.vendor", json!("acme"));
        let once = root.clone();
        set(&mut root, "metadata.vendor", json!("acme"));
        assert_eq!(root, once);
    }

    #[test]
    fn test_set_disjoint_paths_share_parent() {
        let mut root = json!({});
        set(&mut root, "metadata.optical.txPower", json!(3.5));
        set(&mut root, "metadata.optical.rxPower", json!(-20));
        assert_eq!(root, json!({"metadata": {"optical": {"txPower": 3.5, "rxPower": -20}}}));
    }

    #[test]
    fn test_set_replaces_scalar_intermediate() {
        let mut root = json!({"metadata": "legacy"});
        set(&mut root, "metadata.vendor", json!("acme"));
        assert_eq!(root, json!({"metadata": {"vendor": "acme"}}));
    }

    #[test]
    fn test_set_array_index_pads() {
        let mut root = json!({"cards": [{"slot": 1}]});
        set(&mut root, "cards.2.slot", json!(3));
        assert_eq!(root, json!({"cards": [{"slot": 1}, null, {"slot": 3}]}));
    }

    #[test]
    fn test_set_on_scalar_root() {
        let mut root = json!(7);
        set(&mut root, "a", json!(1));
        assert_eq!(root, json!({"a": 1}));
    }

    #[test]
    fn test_as_number() {
        assert_eq!(as_number(&json!(3)), Some(3.0));
        assert_eq!(as_number(&json!(" 4.5 ")), Some(4.5));
        assert_eq!(as_number(&json!("")), None);
        assert_eq!(as_number(&json!("abc")), None);
        assert_eq!(as_number(&json!(true)), None);
    }

    #[test]
    fn test_as_count() {
        assert_eq!(as_count(&json!(10)), Some(10));
        assert_eq!(as_count(&json!("11")), Some(11));
        assert_eq!(as_count(&json!(10.5)), None);
    }

    #[test]
    fn test_is_empty() {
        assert!(is_empty(&Value::Null));
        assert!(is_empty(&json!("")));
        assert!(is_empty(&json!([])));
        assert!(!is_empty(&json!(" ")));
        assert!(!is_empty(&json!(false)));
        assert!(!is_empty(&json!(0)));
    }
}
