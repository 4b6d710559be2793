//! Response-time ordering of record sets

use std::cmp::Reverse;

use serde_json::Value;

use super::{Record, RecordSet, SortDirection, SortSpec};

/// Returns a sorted copy of `records`
///
/// Records are compared by the upper-cased string form of `spec.field`; a
/// missing or null field compares as the empty string. Records with equal
/// keys keep their input order in both directions. The input is never
/// modified.
pub fn sort_records(records: &[Record], spec: &SortSpec) -> RecordSet {
    let mut sorted = records.to_vec();
    match spec.direction {
        SortDirection::Ascending => sorted.sort_by_cached_key(|r| sort_key(r, &spec.field)),
        SortDirection::Descending => {
            sorted.sort_by_cached_key(|r| Reverse(sort_key(r, &spec.field)))
        }
    }
    sorted
}

fn sort_key(record: &Record, field: &str) -> String {
    match record.get(field) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.to_uppercase(),
        Some(other) => other.to_string().to_uppercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rec(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn districts(records: &[Record]) -> Vec<&str> {
        records
            .iter()
            .map(|r| r.get("district_name").and_then(Value::as_str).unwrap_or(""))
            .collect()
    }

    fn sample() -> RecordSet {
        vec![
            rec(json!({ "district_name": "PATNA", "id": 1 })),
            rec(json!({ "district_name": "araria", "id": 2 })),
            rec(json!({ "district_name": "Gaya", "id": 3 })),
        ]
    }

    #[test]
    fn test_default_sort_is_ascending_case_insensitive() {
        let sorted = sort_records(&sample(), &SortSpec::default());
        assert_eq!(districts(&sorted), vec!["araria", "Gaya", "PATNA"]);
    }

    #[test]
    fn test_descending_sort() {
        let spec = SortSpec::new("district_name", SortDirection::Descending);
        let sorted = sort_records(&sample(), &spec);
        assert_eq!(districts(&sorted), vec!["PATNA", "Gaya", "araria"]);
    }

    #[test]
    fn test_sort_does_not_mutate_input() {
        let input = sample();
        let before = input.clone();

        let _ = sort_records(&input, &SortSpec::default());

        assert_eq!(input, before);
    }

    #[test]
    fn test_sort_is_idempotent() {
        let spec = SortSpec::new("district_name", SortDirection::Descending);
        let once = sort_records(&sample(), &spec);
        let twice = sort_records(&once, &spec);

        assert_eq!(once, twice);
        assert_eq!(once, sort_records(&sample(), &spec));
    }

    #[test]
    fn test_equal_keys_keep_input_order_in_both_directions() {
        let input = vec![
            rec(json!({ "district_name": "patna", "id": 1 })),
            rec(json!({ "district_name": "ZZZ", "id": 2 })),
            rec(json!({ "district_name": "PATNA", "id": 3 })),
            rec(json!({ "district_name": "Patna", "id": 4 })),
        ];
        let ids = |records: &RecordSet| -> Vec<i64> {
            records.iter().map(|r| r["id"].as_i64().unwrap()).collect()
        };

        let asc = sort_records(&input, &SortSpec::default());
        assert_eq!(ids(&asc), vec![1, 3, 4, 2]);

        let desc = sort_records(
            &input,
            &SortSpec::new("district_name", SortDirection::Descending),
        );
        assert_eq!(ids(&desc), vec![2, 1, 3, 4]);
    }

    #[test]
    fn test_missing_and_null_fields_sort_as_empty() {
        let input = vec![
            rec(json!({ "district_name": "GAYA" })),
            rec(json!({ "block": "x" })),
            rec(json!({ "district_name": null })),
        ];

        let sorted = sort_records(&input, &SortSpec::default());

        assert!(sorted[0].get("district_name").is_none());
        assert_eq!(sorted[1]["district_name"], Value::Null);
        assert_eq!(sorted[2]["district_name"], "GAYA");
    }

    #[test]
    fn test_numeric_fields_compare_by_string_form() {
        let input = vec![
            rec(json!({ "households": 9 })),
            rec(json!({ "households": 100 })),
            rec(json!({ "households": "20" })),
        ];

        let sorted = sort_records(&input, &SortSpec::new("households", SortDirection::Ascending));
        let values: Vec<String> = sorted.iter().map(|r| r["households"].to_string()).collect();

        // "100" < "20" < "9" as strings
        assert_eq!(values, vec!["100", "\"20\"", "9"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(sort_records(&[], &SortSpec::default()).is_empty());
    }
}
