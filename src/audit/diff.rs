//! Diff generation for the audit trail
//!
//! Compares two snapshots of an entity and reports only the edits a person
//! would care about. Bookkeeping fields are ignored, values are normalized
//! before comparison, and transitions to or from an empty value are not
//! reported: clearing a field is not shown, and a field that goes from empty
//! to set is assumed to be filled in by the system.
//!
//! Fields are visited in first-seen order: every field of the old snapshot in
//! document order, then fields that only the new snapshot has.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::value::{FieldValue, Record};

/// Fields never compared, at the top level or inside line items
pub const EXCLUDED_FIELDS: [&str; 6] = [
    "created_at",
    "created_by",
    "updated_at",
    "updated_by",
    "opportunities_id",
    "opportunity_id",
];

/// The one field holding a list of line-item records
pub const DETAILS_FIELD: &str = "details";

/// Check if a field is left out of comparisons
pub fn is_excluded(field: &str) -> bool {
    EXCLUDED_FIELDS.contains(&field)
}

/// A single changed field with its normalized old and new values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    pub field: String,
    pub old: FieldValue,
    pub new: FieldValue,
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} → {}", self.field, self.old, self.new)
    }
}

/// The meaningful changes between two snapshots
///
/// `details` holds the sub-field changes of the first line item.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChangeSet {
    pub fields: Vec<FieldChange>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<FieldChange>,
}

impl ChangeSet {
    /// Compare two snapshots
    ///
    /// A missing snapshot, or one that is not a JSON object, counts as an
    /// empty record.
    pub fn between(old: Option<&Value>, new: Option<&Value>) -> Self {
        let empty = Record::new();
        let old = old.and_then(Value::as_object).unwrap_or(&empty);
        let new = new.and_then(Value::as_object).unwrap_or(&empty);

        let mut changes = ChangeSet::default();

        for change in record_changes(old, new) {
            if change.field == DETAILS_FIELD {
                // Only the first line item is compared
                let old_item = change.old.first_record().unwrap_or(&empty);
                let new_item = change.new.first_record().unwrap_or(&empty);
                changes.details = record_changes(old_item, new_item).collect();
            } else {
                changes.fields.push(change);
            }
        }

        changes
    }

    /// Check if nothing meaningful changed
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.details.is_empty()
    }

    /// Total number of changed fields, line-item fields included
    pub fn len(&self) -> usize {
        self.fields.len() + self.details.len()
    }

    /// Render the changes for display
    ///
    /// One `field: old → new` line per top-level change, then a
    /// `Details Changed:` header with indented line-item changes.
    /// Returns an empty string when nothing changed.
    pub fn render(&self) -> String {
        let mut output = String::new();

        for change in &self.fields {
            output.push_str(&format!("{}\n", change));
        }

        if !self.details.is_empty() {
            output.push_str("Details Changed:\n");
            for change in &self.details {
                output.push_str(&format!("  {}\n", change));
            }
        }

        output.trim_end().to_string()
    }
}

impl fmt::Display for ChangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Render the meaningful changes between two snapshots
///
/// Returns an empty string when there is nothing to report.
pub fn audit_details(old: Option<&Value>, new: Option<&Value>) -> String {
    let changes = ChangeSet::between(old, new);
    tracing::debug!(
        fields = changes.fields.len(),
        details = changes.details.len(),
        "computed audit diff"
    );
    changes.render()
}

/// Changed fields of two records, in first-seen order
fn record_changes<'a>(old: &'a Record, new: &'a Record) -> impl Iterator<Item = FieldChange> + 'a {
    let new_only = new.keys().filter(move |key| !old.contains_key(*key));

    old.keys()
        .chain(new_only)
        .filter(|field| !is_excluded(field))
        .filter_map(move |field| {
            let (old_value, new_value) = meaningful_change(old.get(field), new.get(field))?;
            Some(FieldChange {
                field: field.clone(),
                old: old_value,
                new: new_value,
            })
        })
}

/// Normalize both sides and keep the pair only if it is worth reporting
fn meaningful_change(old: Option<&Value>, new: Option<&Value>) -> Option<(FieldValue, FieldValue)> {
    let old = FieldValue::normalize(old);
    let new = FieldValue::normalize(new);

    // Cleared value
    if !old.is_empty() && new.is_empty() {
        return None;
    }

    // System-filled value
    if old.is_empty() && !new.is_empty() {
        return None;
    }

    if old == new {
        return None;
    }

    Some((old, new))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn diff(old: Value, new: Value) -> String {
        audit_details(Some(&old), Some(&new))
    }

    #[test]
    fn test_identical_records() {
        let record = json!({
            "name": "Acme",
            "phone": "123",
            "amount": 2500,
            "details": [{"service_id": 4, "quantity": 2, "rate": 10}]
        });
        assert_eq!(diff(record.clone(), record), "");
    }

    #[test]
    fn test_simple_field_change() {
        let result = diff(
            json!({"description": "Call back"}),
            json!({"description": "Follow up"}),
        );
        assert_eq!(result, "description: Call back → Follow up");
    }

    #[test]
    fn test_emptying_suppressed() {
        assert_eq!(diff(json!({"phone": "123"}), json!({"phone": ""})), "");
        assert_eq!(diff(json!({"phone": "123"}), json!({"phone": null})), "");
        assert_eq!(diff(json!({"phone": "123"}), json!({})), "");
    }

    #[test]
    fn test_system_fill_suppressed() {
        assert_eq!(diff(json!({"phone": ""}), json!({"phone": "123"})), "");
        assert_eq!(diff(json!({}), json!({"phone": "123"})), "");
        assert_eq!(diff(json!({"stage_id": null}), json!({"stage_id": 3})), "");
    }

    #[test]
    fn test_type_insensitive_equality() {
        assert_eq!(diff(json!({"quantity": "5"}), json!({"quantity": 5})), "");
        assert_eq!(diff(json!({"amount": 12.5}), json!({"amount": "12.50"})), "");
    }

    #[test]
    fn test_zero_and_false_are_values() {
        assert_eq!(
            diff(json!({"quantity": 0}), json!({"quantity": 4})),
            "quantity: 0 → 4"
        );
        assert_eq!(
            diff(json!({"is_active": false}), json!({"is_active": true})),
            "is_active: false → true"
        );
    }

    #[test]
    fn test_excluded_fields_ignored() {
        let old = json!({
            "name": "Acme",
            "created_at": "2025-01-01",
            "created_by": 1,
            "updated_at": "2025-01-02",
            "updated_by": 1,
            "opportunities_id": 10,
            "opportunity_id": 10
        });
        let new = json!({
            "name": "Acme",
            "created_at": "2025-02-01",
            "created_by": 2,
            "updated_at": "2025-02-02",
            "updated_by": 2,
            "opportunities_id": 11,
            "opportunity_id": 11
        });
        assert_eq!(diff(old, new), "");
    }

    #[test]
    fn test_nested_details_change() {
        let result = diff(
            json!({"details": [{"quantity": 2, "rate": 10}]}),
            json!({"details": [{"quantity": 3, "rate": 10}]}),
        );
        assert_eq!(result, "Details Changed:\n  quantity: 2 → 3");
    }

    #[test]
    fn test_details_excluded_fields_ignored() {
        let result = diff(
            json!({"details": [{"opportunity_id": 1, "updated_at": "a", "rate": 10}]}),
            json!({"details": [{"opportunity_id": 2, "updated_at": "b", "rate": 10}]}),
        );
        assert_eq!(result, "");
    }

    #[test]
    fn test_details_suppression_rules() {
        let result = diff(
            json!({"details": [{"remarks": "old", "discount": "", "rate": "10"}]}),
            json!({"details": [{"remarks": "", "discount": 5, "rate": 10}]}),
        );
        assert_eq!(result, "");
    }

    #[test]
    fn test_only_first_line_item_compared() {
        let result = diff(
            json!({"details": [{"quantity": 1}, {"quantity": 5}]}),
            json!({"details": [{"quantity": 1}, {"quantity": 9}]}),
        );
        assert_eq!(result, "");
    }

    #[test]
    fn test_details_added_or_removed_suppressed() {
        assert_eq!(diff(json!({}), json!({"details": [{"quantity": 1}]})), "");
        assert_eq!(diff(json!({"details": [{"quantity": 1}]}), json!({})), "");
    }

    #[test]
    fn test_details_emptied_list() {
        // An empty list is a value, so the comparison falls through to the
        // line items, where every field of the old item was cleared
        let result = diff(
            json!({"details": [{"quantity": 1}]}),
            json!({"details": []}),
        );
        assert_eq!(result, "");
    }

    #[test]
    fn test_multiple_changes_in_first_seen_order() {
        let old = json!({
            "title": "Renewal",
            "details": [{"quantity": 2, "rate": 10}],
            "amount": 100,
            "stage": "Lead"
        });
        let new = json!({
            "stage": "Won",
            "amount": 150,
            "details": [{"rate": 12, "quantity": 2}],
            "title": "Renewal 2025"
        });

        let result = diff(old, new);
        assert_eq!(
            result,
            "title: Renewal → Renewal 2025\n\
             amount: 100 → 150\n\
             stage: Lead → Won\n\
             Details Changed:\n  rate: 10 → 12"
        );
    }

    #[test]
    fn test_new_only_fields_follow_old_fields() {
        let old = json!({"b": "1x", "a": "2x", "c": ""});
        let new = json!({"c": "", "z": "3x", "a": "2y", "b": "1y"});

        let changes = ChangeSet::between(Some(&old), Some(&new));
        let fields: Vec<&str> = changes.fields.iter().map(|c| c.field.as_str()).collect();
        assert_eq!(fields, vec!["b", "a"]);
    }

    #[test]
    fn test_missing_snapshots() {
        assert_eq!(audit_details(None, None), "");
        assert_eq!(audit_details(None, Some(&json!({"name": "Acme"}))), "");
        assert_eq!(audit_details(Some(&json!({"name": "Acme"})), None), "");
        assert_eq!(audit_details(Some(&json!(null)), Some(&json!(null))), "");
    }

    #[test]
    fn test_non_object_snapshots_are_empty_records() {
        assert_eq!(diff(json!([1, 2]), json!("text")), "");
        assert_eq!(diff(json!({"name": "Acme"}), json!(42)), "");
    }

    #[test]
    fn test_details_not_a_list() {
        let result = diff(
            json!({"details": "first"}),
            json!({"details": "second"}),
        );
        assert_eq!(result, "");
    }

    #[test]
    fn test_other_lists_rendered_as_json() {
        let result = diff(json!({"tags": ["a"]}), json!({"tags": ["a", "b"]}));
        assert_eq!(result, "tags: [\"a\"] → [\"a\",\"b\"]");
    }

    #[test]
    fn test_lists_with_equal_numbers_unchanged() {
        assert_eq!(diff(json!({"a": [1]}), json!({"a": [1.0]})), "");
        assert_eq!(diff(json!({"meta": {"n": 2}}), json!({"meta": {"n": 2.0}})), "");
    }

    #[test]
    fn test_trailing_whitespace_trimmed() {
        let result = diff(json!({"note": "Call back"}), json!({"note": "Follow up  "}));
        assert_eq!(result, "note: Call back → Follow up");
    }

    #[test]
    fn test_change_set_structure() {
        let changes = ChangeSet::between(
            Some(&json!({"amount": "100", "details": [{"rate": 10}]})),
            Some(&json!({"amount": 120, "details": [{"rate": 11}]})),
        );

        assert_eq!(changes.len(), 2);
        assert!(!changes.is_empty());
        assert_eq!(
            changes.fields,
            vec![FieldChange {
                field: "amount".into(),
                old: FieldValue::Number(100.0),
                new: FieldValue::Number(120.0),
            }]
        );
        assert_eq!(changes.details[0].field, "rate");
        assert_eq!(changes.to_string(), changes.render());
    }

    #[test]
    fn test_change_set_serialization() {
        let changes = ChangeSet::between(
            Some(&json!({"stage": "Lead"})),
            Some(&json!({"stage": "Won"})),
        );

        let value = serde_json::to_value(&changes).unwrap();
        assert_eq!(
            value,
            json!({"fields": [{"field": "stage", "old": "Lead", "new": "Won"}]})
        );
    }

    #[test]
    fn test_is_excluded() {
        for field in EXCLUDED_FIELDS {
            assert!(is_excluded(field));
        }
        assert!(!is_excluded("details"));
        assert!(!is_excluded("name"));
    }
}
