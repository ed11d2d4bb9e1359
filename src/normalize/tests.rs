//! Tests for schema-directed normalization

use super::*;
use crate::schema::{any, array, boolean, date_time, integer, number, object, string};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use test_case::test_case;

fn order_schema() -> SchemaNode {
    object([
        ("id", integer()),
        ("updatedAt", date_time()),
        ("priceIncl", number()),
        ("isCompany", boolean()),
        ("comment", string()),
        ("paymentData", any()),
        (
            "taxRates",
            array(object([("name", string()), ("rate", number())])),
        ),
        (
            "customer",
            object([("resource", object([("id", integer()), ("url", string())]))]),
        ),
    ])
}

fn normalized(mut value: Value, schema: &SchemaNode) -> Value {
    normalize(&mut value, schema);
    value
}

#[test]
fn test_false_becomes_null_for_non_boolean_fields() {
    let schema = order_schema();
    let record = json!({
        "comment": false,
        "updatedAt": false,
        "priceIncl": false,
        "isCompany": false
    });

    let result = normalized(record, &schema);
    assert_eq!(result["comment"], Value::Null);
    assert_eq!(result["updatedAt"], Value::Null);
    assert_eq!(result["priceIncl"], Value::Null);
    // Boolean-typed fields keep false.
    assert_eq!(result["isCompany"], json!(false));
}

#[test_case(json!(true) ; "true placeholder")]
#[test_case(json!(false) ; "false placeholder")]
fn test_boolean_under_integer_becomes_null(raw: Value) {
    let schema = order_schema();
    let result = normalized(json!({ "id": raw }), &schema);
    assert_eq!(result["id"], Value::Null);
}

#[test]
fn test_numeric_coercion() {
    let schema = order_schema();
    let result = normalized(
        json!({ "priceIncl": "19.95", "id": "42" }),
        &schema,
    );
    assert_eq!(result["priceIncl"], json!(19.95));
    assert_eq!(result["id"], json!(42));
}

#[test]
fn test_empty_string_under_numeric_becomes_null() {
    let schema = order_schema();
    let result = normalized(json!({ "priceIncl": "", "id": "" }), &schema);
    assert_eq!(result["priceIncl"], Value::Null);
    assert_eq!(result["id"], Value::Null);
}

#[test]
fn test_non_numeric_string_passes_through() {
    let schema = order_schema();
    let result = normalized(json!({ "priceIncl": "n/a" }), &schema);
    assert_eq!(result["priceIncl"], json!("n/a"));
}

#[test]
fn test_datetime_parses_to_canonical_utc() {
    let schema = order_schema();

    let result = normalized(json!({ "updatedAt": "2024-01-01 12:30:00" }), &schema);
    assert_eq!(result["updatedAt"], json!("2024-01-01T12:30:00Z"));

    let result = normalized(json!({ "updatedAt": "2024-01-01T14:30:00+02:00" }), &schema);
    assert_eq!(result["updatedAt"], json!("2024-01-01T12:30:00Z"));
}

#[test]
fn test_unparseable_datetime_passes_through() {
    let schema = order_schema();
    let result = normalized(json!({ "updatedAt": "whenever" }), &schema);
    assert_eq!(result["updatedAt"], json!("whenever"));
}

#[test]
fn test_string_coercion_stringifies() {
    let schema = order_schema();
    let result = normalized(json!({ "comment": 12 }), &schema);
    assert_eq!(result["comment"], json!("12"));
}

#[test]
fn test_unknown_keys_pass_through_verbatim() {
    let schema = order_schema();
    let result = normalized(json!({ "notInSchema": false, "other": "x" }), &schema);
    // No declared type, no coercion: even false survives.
    assert_eq!(result["notInSchema"], json!(false));
    assert_eq!(result["other"], json!("x"));
}

#[test]
fn test_null_stays_null() {
    let schema = order_schema();
    let result = normalized(json!({ "id": null, "isCompany": null }), &schema);
    assert_eq!(result["id"], Value::Null);
    assert_eq!(result["isCompany"], Value::Null);
}

#[test]
fn test_nested_arrays_and_objects() {
    let schema = order_schema();
    let record = json!({
        "taxRates": [
            { "name": false, "rate": "21" },
            { "name": "low", "rate": 9 }
        ],
        "customer": { "resource": { "id": "7", "url": false } }
    });

    let result = normalized(record, &schema);
    assert_eq!(result["taxRates"][0]["name"], Value::Null);
    assert_eq!(result["taxRates"][0]["rate"], json!(21.0));
    assert_eq!(result["taxRates"][1]["rate"], json!(9.0));
    assert_eq!(result["customer"]["resource"]["id"], json!(7));
    assert_eq!(result["customer"]["resource"]["url"], Value::Null);
}

#[test]
fn test_scalar_array_elements_pass_through() {
    let schema = object([("path", array(string()))]);
    let result = normalized(json!({ "path": ["a", 1, false] }), &schema);
    // Scalars inside arrays are not coerced at this level.
    assert_eq!(result["path"], json!(["a", 1, false]));
}

#[test]
fn test_any_typed_field_nulls_false_only() {
    let schema = order_schema();
    let result = normalized(
        json!({ "paymentData": { "issuer": "x" } }),
        &schema,
    );
    assert_eq!(result["paymentData"], json!({ "issuer": "x" }));

    let result = normalized(json!({ "paymentData": false }), &schema);
    assert_eq!(result["paymentData"], Value::Null);
}

#[test]
fn test_normalize_is_idempotent() {
    let schema = order_schema();
    let record = json!({
        "id": "42",
        "updatedAt": "2024-01-01 12:30:00",
        "priceIncl": "19.95",
        "isCompany": false,
        "comment": false,
        "paymentData": false,
        "taxRates": [{ "name": false, "rate": "21" }],
        "customer": { "resource": { "id": true, "url": "https://x" } },
        "unknown": false
    });

    let once = normalized(record, &schema);
    let twice = normalized(once.clone(), &schema);
    assert_eq!(once, twice);
}
