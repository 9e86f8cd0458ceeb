//! Cross-field business rules.
//!
//! Each rule compares sibling values of one form and yields a typed
//! [`ErrorKind`] carrying the exact numbers involved. Rules whose operands are
//! blank or non-numeric stay silent; the field validators report those.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::path;
use crate::validation::{ErrorKind, ValidationError};

static SPLIT_RATIO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*1\s*:\s*(\d+)\s*$").expect("split ratio regex"));

/// Read access to field values, implemented by forms and raw entities.
pub trait FieldLookup {
    /// Value of a scalar field.
    fn field(&self, path: &str) -> Option<&Value>;

    /// Values of `field` across every item of array `array`, in order.
    fn item_values(&self, array: &str, field: &str) -> Vec<&Value>;
}

/// One operand of a port budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "from", rename_all = "camelCase")]
pub enum PortTerm {
    /// A scalar count field.
    Field { path: String },
    /// The sum of a count sub-field over all items of an array field.
    ItemSum { array: String, field: String },
}

/// Resource checked by a capacity rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capacity {
    Ports,
    RackUnits,
}

/// A declarative cross-field rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "camelCase")]
pub enum FormRule {
    /// Sum of `parts` must not exceed `total`.
    PortBudget { total: String, parts: Vec<PortTerm> },
    /// `transmit` must be greater than or equal to `receive`.
    PowerOrdering { transmit: String, receive: String },
    /// N in the "1:N" `ratio` must equal `outputs`.
    RatioConsistency { ratio: String, outputs: String },
    /// `used` must not exceed `total`.
    CapacityVsUsed { used: String, total: String, resource: Capacity },
    /// `total` must not exceed `ceiling`.
    HeightCeiling { total: String, ceiling: String },
    /// `source` and `target` must reference different elements.
    DistinctReferences { source: String, target: String },
}

impl FormRule {
    /// Field paths this rule reads, used for schema consistency checks.
    pub fn referenced_paths(&self) -> Vec<&str> {
        match self {
            Self::PortBudget { total, parts } => {
                let mut out = vec![total.as_str()];
                for part in parts {
                    match part {
                        PortTerm::Field { path } => out.push(path.as_str()),
                        PortTerm::ItemSum { array, .. } => out.push(array.as_str()),
                    }
                }
                out
            }
            Self::PowerOrdering { transmit, receive } => {
                vec![transmit.as_str(), receive.as_str()]
            }
            Self::RatioConsistency { ratio, outputs } => vec![ratio.as_str(), outputs.as_str()],
            Self::CapacityVsUsed { used, total, .. } => vec![used.as_str(), total.as_str()],
            Self::HeightCeiling { total, ceiling } => vec![total.as_str(), ceiling.as_str()],
            Self::DistinctReferences { source, target } => {
                vec![source.as_str(), target.as_str()]
            }
        }
    }

    /// `(array, sub_field)` pairs read from array items.
    pub fn item_references(&self) -> Vec<(&str, &str)> {
        match self {
            Self::PortBudget { parts, .. } => parts
                .iter()
                .filter_map(|part| match part {
                    PortTerm::ItemSum { array, field } => Some((array.as_str(), field.as_str())),
                    PortTerm::Field { .. } => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Evaluate the rule, returning an error anchored on the offending field.
    pub fn evaluate(&self, values: &dyn FieldLookup) -> Option<ValidationError> {
        let count = |p: &str| values.field(p).and_then(path::as_count);
        let number = |p: &str| values.field(p).and_then(path::as_number);

        match self {
            Self::PortBudget { total, parts } => {
                let max = count(total.as_str())?;
                let mut actual: i64 = 0;
                let mut anchor = total.as_str();
                for part in parts {
                    match part {
                        PortTerm::Field { path } => {
                            if let Some(n) = count(path.as_str()) {
                                actual = actual.saturating_add(n);
                                anchor = path.as_str();
                            }
                        }
                        PortTerm::ItemSum { array, field } => {
                            let items = values.item_values(array, field);
                            if !items.is_empty() {
                                anchor = array.as_str();
                            }
                            actual = items
                                .into_iter()
                                .filter_map(path::as_count)
                                .fold(actual, i64::saturating_add);
                        }
                    }
                }
                (actual > max).then(|| {
                    ValidationError::form(anchor, ErrorKind::UsedPortsExceeded { actual, max })
                })
            }
            Self::PowerOrdering { transmit, receive } => {
                let tx = number(transmit.as_str())?;
                let rx = number(receive.as_str())?;
                (tx < rx).then(|| {
                    ValidationError::form(
                        transmit,
                        ErrorKind::InvalidPowerLevels { transmit: tx, receive: rx },
                    )
                })
            }
            Self::RatioConsistency { ratio, outputs } => {
                let expected = values.field(ratio).and_then(split_ratio)?;
                let actual = count(outputs.as_str())?;
                (actual != expected).then(|| {
                    let kind = ErrorKind::InvalidSplitRatio { actual, expected };
                    ValidationError::form(outputs, kind)
                })
            }
            Self::CapacityVsUsed { used, total, resource } => {
                let actual = count(used.as_str())?;
                let max = count(total.as_str())?;
                (actual > max).then(|| {
                    let kind = match resource {
                        Capacity::Ports => ErrorKind::PortCapacityExceeded { actual, max },
                        Capacity::RackUnits => ErrorKind::RackUnitsExceeded { actual, max },
                    };
                    ValidationError::form(used, kind)
                })
            }
            Self::HeightCeiling { total, ceiling } => {
                let actual = count(total.as_str())?;
                let max = count(ceiling.as_str())?;
                (actual > max).then(|| {
                    ValidationError::form(total, ErrorKind::RackHeightExceeded { actual, max })
                })
            }
            Self::DistinctReferences { source, target } => {
                let a = values.field(source).and_then(path::as_text)?;
                let b = values.field(target).and_then(path::as_text)?;
                (a == b).then(|| {
                    ValidationError::form(target, ErrorKind::SameSourceAndTarget { id: a })
                })
            }
        }
    }
}

/// Parse the N out of a "1:N" split ratio.
pub fn split_ratio(value: &Value) -> Option<i64> {
    let text = value.as_str()?;
    SPLIT_RATIO.captures(text)?.get(1)?.as_str().parse().ok()
}

/// The cross-field validator of one type: its rules, evaluated in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormValidator {
    pub rules: Vec<FormRule>,
}

impl FormValidator {
    pub fn new(rules: Vec<FormRule>) -> Self {
        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run every rule and collect the errors.
    pub fn validate(&self, values: &dyn FieldLookup) -> Vec<ValidationError> {
        self.rules.iter().filter_map(|rule| rule.evaluate(values)).collect()
    }
}

impl FieldLookup for crate::entity::Entity {
    fn field(&self, path: &str) -> Option<&Value> {
        self.get(path)
    }

    fn item_values(&self, array: &str, field: &str) -> Vec<&Value> {
        match self.get(array) {
            Some(Value::Array(items)) => {
                items.iter().filter_map(|item| path::get(item, field)).collect()
            }
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use rstest::rstest;
    use serde_json::json;

    fn olt(total: Value, uplink: Value, cards: Value) -> Entity {
        Entity::new("o1", "olt")
            .with("metadata.totalPorts", total)
            .with("metadata.uplinkPorts", uplink)
            .with("metadata.cards", cards)
    }

    fn budget() -> FormRule {
        FormRule::PortBudget {
            total: "metadata.totalPorts".into(),
            parts: vec![
                PortTerm::Field { path: "metadata.uplinkPorts".into() },
                PortTerm::ItemSum { array: "metadata.cards".into(), field: "ports".into() },
            ],
        }
    }

    #[test]
    fn test_port_budget_exceeded() {
        let entity = olt(json!(10), json!(11), json!([]));
        let err = budget().evaluate(&entity).unwrap();
        assert_eq!(err.kind, ErrorKind::UsedPortsExceeded { actual: 11, max: 10 });
        assert_eq!(err.path, "metadata.uplinkPorts");
    }

    #[test]
    fn test_port_budget_at_limit() {
        let entity = olt(json!(10), json!(10), json!([]));
        assert!(budget().evaluate(&entity).is_none());
    }

    #[test]
    fn test_port_budget_sums_items() {
        let entity = olt(json!(16), json!(2), json!([{"ports": 8}, {"ports": "8"}]));
        let err = budget().evaluate(&entity).unwrap();
        assert_eq!(err.kind, ErrorKind::UsedPortsExceeded { actual: 18, max: 16 });
        assert_eq!(err.path, "metadata.cards");
    }

    #[test]
    fn test_port_budget_saturates_on_huge_counts() {
        let huge = json!("9000000000000000000");
        let entity = olt(json!(16), huge.clone(), json!([{"ports": huge}]));
        let err = budget().evaluate(&entity).unwrap();
        assert_eq!(err.kind, ErrorKind::UsedPortsExceeded { actual: i64::MAX, max: 16 });
    }

    #[test]
    fn test_item_references() {
        assert_eq!(budget().item_references(), vec![("metadata.cards", "ports")]);
        let rule = FormRule::HeightCeiling { total: "total".into(), ceiling: "ceiling".into() };
        assert!(rule.item_references().is_empty());
    }

    #[test]
    fn test_port_budget_without_total_is_silent() {
        let entity = olt(json!(""), json!(11), json!([]));
        assert!(budget().evaluate(&entity).is_none());
    }

    #[rstest]
    #[case(json!(3), json!(-20), None)]
    #[case(json!(-8), json!(-8), None)]
    #[case(
        json!(-25),
        json!("-20"),
        Some(ErrorKind::InvalidPowerLevels { transmit: -25.0, receive: -20.0 })
    )]
    fn test_power_ordering(
        #[case] tx: Value,
        #[case] rx: Value,
        #[case] expected: Option<ErrorKind>,
    ) {
        let rule = FormRule::PowerOrdering { transmit: "tx".into(), receive: "rx".into() };
        let entity = Entity::new("n", "ont").with("tx", tx).with("rx", rx);
        assert_eq!(rule.evaluate(&entity).map(|e| e.kind), expected);
    }

    #[rstest]
    #[case("1:8", None)]
    #[case("1:16", Some(ErrorKind::InvalidSplitRatio { actual: 8, expected: 16 }))]
    #[case("garbage", None)]
    fn test_ratio_consistency(#[case] ratio: &str, #[case] expected: Option<ErrorKind>) {
        let rule = FormRule::RatioConsistency { ratio: "ratio".into(), outputs: "outputs".into() };
        let entity =
            Entity::new("s", "splitter").with("ratio", json!(ratio)).with("outputs", json!(8));
        assert_eq!(rule.evaluate(&entity).map(|e| e.kind), expected);
    }

    #[test]
    fn test_capacity_resources() {
        let entity = Entity::new("r", "rack").with("used", json!(12)).with("total", json!(10));
        let ports = FormRule::CapacityVsUsed {
            used: "used".into(),
            total: "total".into(),
            resource: Capacity::Ports,
        };
        let units = FormRule::CapacityVsUsed {
            used: "used".into(),
            total: "total".into(),
            resource: Capacity::RackUnits,
        };
        assert_eq!(
            ports.evaluate(&entity).unwrap().kind,
            ErrorKind::PortCapacityExceeded { actual: 12, max: 10 }
        );
        assert_eq!(
            units.evaluate(&entity).unwrap().kind,
            ErrorKind::RackUnitsExceeded { actual: 12, max: 10 }
        );
    }

    #[test]
    fn test_height_ceiling() {
        let rule = FormRule::HeightCeiling { total: "total".into(), ceiling: "ceiling".into() };
        let over = Entity::new("r", "rack").with("total", json!(48)).with("ceiling", json!(42));
        let ok = Entity::new("r", "rack").with("total", json!(42)).with("ceiling", json!(42));
        assert_eq!(
            rule.evaluate(&over).unwrap().kind,
            ErrorKind::RackHeightExceeded { actual: 48, max: 42 }
        );
        assert!(rule.evaluate(&ok).is_none());
    }

    #[test]
    fn test_distinct_references() {
        let rule = FormRule::DistinctReferences { source: "src".into(), target: "dst".into() };
        let cable = Entity::new("c", "cable").with("src", json!("olt-1"));
        let same = cable.clone().with("dst", json!("olt-1"));
        let differ = cable.with("dst", json!("ont-7"));
        assert_eq!(
            rule.evaluate(&same).unwrap().kind,
            ErrorKind::SameSourceAndTarget { id: "olt-1".into() }
        );
        assert!(rule.evaluate(&differ).is_none());
    }

    #[test]
    fn test_split_ratio_parse() {
        assert_eq!(split_ratio(&json!("1:32")), Some(32));
        assert_eq!(split_ratio(&json!(" 1 : 4 ")), Some(4));
        assert_eq!(split_ratio(&json!("2:8")), None);
        assert_eq!(split_ratio(&json!(8)), None);
    }

    #[test]
    fn test_rule_deserialization() {
        let yaml = r#"
            - rule: portBudget
              total: metadata.totalPorts
              parts:
                - from: field
                  path: metadata.uplinkPorts
                - from: itemSum
                  array: metadata.cards
                  field: ports
            - rule: capacityVsUsed
              used: metadata.usedPorts
              total: metadata.totalPorts
              resource: ports
        "#;
        let validator: FormValidator = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(validator.rules.len(), 2);
        assert_eq!(validator.rules[0], budget());
    }
}
