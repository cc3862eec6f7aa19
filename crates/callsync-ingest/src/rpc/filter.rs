//! Report row filters
//!
//! A filter is either a single `field operator value` condition or a group
//! of filters joined with `and`/`or`. Groups nest.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterCondition {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Filter {
    Condition {
        field: String,
        operator: String,
        value: serde_json::Value,
    },
    Group {
        filters: Vec<Filter>,
        condition: FilterCondition,
    },
}

impl Filter {
    /// `field operator value`, e.g. `Filter::new("direction", "=", "in")`
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        Filter::Condition {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }

    /// Rows matching every filter
    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        Self::group(FilterCondition::And, filters)
    }

    /// Rows matching any filter
    pub fn or(filters: impl IntoIterator<Item = Filter>) -> Self {
        Self::group(FilterCondition::Or, filters)
    }

    fn group(condition: FilterCondition, filters: impl IntoIterator<Item = Filter>) -> Self {
        let mut filters: Vec<Filter> = filters.into_iter().collect();
        if filters.len() == 1 {
            if let Some(only) = filters.pop() {
                return only;
            }
        }
        Filter::Group { filters, condition }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_groups_serialize() {
        let filter = Filter::and([
            Filter::new("direction", "=", "in"),
            Filter::or([
                Filter::new("is_lost", "=", true),
                Filter::new("employee_id", "=", serde_json::Value::Null),
            ]),
        ]);

        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({
                "filters": [
                    { "field": "direction", "operator": "=", "value": "in" },
                    {
                        "filters": [
                            { "field": "is_lost", "operator": "=", "value": true },
                            { "field": "employee_id", "operator": "=", "value": null }
                        ],
                        "condition": "or"
                    }
                ],
                "condition": "and"
            })
        );
    }

    #[test]
    fn test_single_member_group_collapses() {
        let filter = Filter::or([Filter::new("id", ">", 10)]);
        assert_eq!(filter, Filter::new("id", ">", 10));
    }
}
