//! Report normalization tests: shape tolerance, defaulting and ordering.

use std::collections::BTreeMap;

use secaudit_core::{normalize, MissingPlugin, PolicyCheckRecord};
use serde_json::{json, Value};

/// Regroup flat records into a raw `audit_report` mapping.
fn regroup(records: &[PolicyCheckRecord]) -> Value {
    let mut services: BTreeMap<String, Vec<Value>> = BTreeMap::new();
    for record in records {
        services
            .entry(record.service_name.clone())
            .or_default()
            .push(serde_json::to_value(record).unwrap());
    }
    let map: serde_json::Map<String, Value> = services
        .into_iter()
        .map(|(name, policies)| (name, json!({ "policies": policies })))
        .collect();
    Value::Object(map)
}

#[test]
fn test_non_compliant_first_with_defaults() {
    let raw = json!({
        "A": { "policies": [{ "comply": "Comply" }] },
        "B": { "results": [{ "comply": false, "missing_plugins": [{ "plugin": "x" }] }] }
    });

    let report = normalize(&raw);
    assert_eq!(report.len(), 2);

    let b = &report.records[0];
    assert_eq!(b.service_name, "B");
    assert!(!b.compliant);
    assert_eq!(b.missing_plugins, vec![MissingPlugin::new(json!({ "plugin": "x" }))]);

    let a = &report.records[1];
    assert_eq!(a.service_name, "A");
    assert!(a.compliant);
    assert!(a.missing_plugins.is_empty());
    assert_eq!(a.required_for, a.policy_name);
    assert_eq!(a.details, "");
}

#[test]
fn test_normalizing_normalized_records_is_identity() {
    let raw = json!({
        "orders": { "policies": [
            { "policy_name": "Authentication", "comply": "comply" },
            { "policy_name": "Rate Limiting", "comply": "Non-Comply",
              "missing_plugins": ["rate-limiting"], "details": "no limits" }
        ]},
        "users": { "results": [
            { "policy_name": "Logging", "comply": true, "required_for": "PCI DSS 10.2" },
            { "policy_name": "IP Restriction", "comply": 0 }
        ]},
        "payments": { "error": "Failed to parse response: timeout" }
    });

    let first = normalize(&raw);
    let second = normalize(&regroup(&first.records));
    assert_eq!(first.records, second.records);
}

#[test]
fn test_relative_order_kept_within_each_class() {
    let raw = json!({
        "alpha": { "policies": [
            { "policy_name": "a1", "comply": true },
            { "policy_name": "a2", "comply": false },
            { "policy_name": "a3", "comply": true }
        ]},
        "beta": { "policies": [
            { "policy_name": "b1", "comply": false },
            { "policy_name": "b2", "comply": true }
        ]}
    });

    let names: Vec<String> = normalize(&raw)
        .records
        .into_iter()
        .map(|r| r.policy_name)
        .collect();
    assert_eq!(names, vec!["a2", "b1", "a1", "a3", "b2"]);
}

#[test]
fn test_present_fields_are_not_overwritten() {
    let raw = json!({
        "svc": { "policies": [{
            "policy_name": "Authentication",
            "comply": "COMPLY",
            "required_for": "OWASP API2",
            "details": "jwt enabled",
            "missing_plugins": []
        }]}
    });

    let record = &normalize(&raw).records[0];
    assert!(record.compliant);
    assert_eq!(record.required_for, "OWASP API2");
    assert_eq!(record.details, "jwt enabled");
}

#[test]
fn test_counts_and_failures() {
    let raw = json!({
        "a": { "policies": [{ "comply": true }, { "comply": false }, { "comply": "no" }] },
        "b": { "error": "upstream timeout" },
        "c": {}
    });

    let report = normalize(&raw);
    assert_eq!(report.compliant_count(), 1);
    assert_eq!(report.non_compliant_count(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].service_name, "b");
}
