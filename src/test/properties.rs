use serde_json::json;

use crate::properties::{ColumnValue, Properties};

pub(crate) fn record<const N: usize>(entries: [(&str, ColumnValue); N]) -> Properties {
    entries
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

pub(crate) fn mixed_records() -> Vec<Properties> {
    vec![
        record([
            ("name", "a".into()),
            ("count", 1.into()),
            ("ratio", 0.5.into()),
            ("flag", true.into()),
            ("tags", ColumnValue::Json(json!(["x", "y"]))),
            ("mixed", 1.into()),
        ]),
        record([
            ("name", "b".into()),
            ("count", 5_000_000_000i64.into()),
            ("ratio", 2.into()),
            ("flag", false.into()),
            ("tags", ColumnValue::Null),
            ("mixed", "x".into()),
            ("blob", vec![1u8, 0, 2].into()),
        ]),
        record([
            ("count", ColumnValue::Null),
            ("name", "c".into()),
            ("tags", ColumnValue::Json(json!({"k": {"nested": true}}))),
        ]),
    ]
}

/// Records whose values only share a column type after promotion.
pub(crate) fn cross_typed_records() -> Vec<Properties> {
    vec![
        record([
            ("b", vec![0xffu8, 0xfe].into()),
            ("u", (-1i32).into()),
            ("w", i64::MIN.into()),
            ("f", true.into()),
            ("t", 1.5f32.into()),
        ]),
        record([
            ("b", "x".into()),
            ("u", 5u8.into()),
            ("w", u64::MAX.into()),
            ("f", 7.into()),
            ("t", ColumnValue::Json(json!({"k": null}))),
        ]),
        record([("u", ColumnValue::Null), ("f", 2.5.into()), ("t", "s".into())]),
    ]
}
