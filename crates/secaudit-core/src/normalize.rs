//! Audit report normalization.
//!
//! The audit service returns a mapping from service name to a loosely shaped
//! value holding that service's policy checks. Everything tolerant about that
//! shape lives here; the rest of the crate only sees [`PolicyCheckRecord`].
//!
//! # Defaulting rules
//!
//! | Canonical field   | Source keys (first present wins)        | Default            |
//! |-------------------|-----------------------------------------|--------------------|
//! | policy list       | `policies`, `results`                   | empty              |
//! | `policy_name`     | `policy_name`, `policyName`             | `"Unknown Policy"` |
//! | `compliant`       | `comply`, `comply_status`               | `false`            |
//! | `missing_plugins` | `missing_plugins`, `missingPlugins`     | empty              |
//! | `required_for`    | `required_for`, `requiredFor`           | the policy name    |
//! | `details`         | `details`                               | empty string       |
//!
//! A string compliance value is compliant iff it equals `"comply"` ignoring
//! case; any other value uses JSON truthiness. Defaults apply only to absent
//! (or `null`) fields, so present data passes through unchanged.
//!
//! # Ordering
//!
//! Services are visited in key order of the mapping. The flattened records
//! are then stably partitioned: every non-compliant record precedes every
//! compliant one, and records within a class keep their relative order.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Policy name used when the source omits one.
pub const UNKNOWN_POLICY: &str = "Unknown Policy";

/// One plugin a policy needs but the service does not run.
///
/// Wraps the source entry verbatim so nothing is lost on the way to the
/// renderer; accessors pick out the commonly used labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MissingPlugin(Value);

impl MissingPlugin {
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    /// Plugin name, whether the entry is a bare string or an object.
    pub fn name(&self) -> Option<&str> {
        match &self.0 {
            Value::String(s) => Some(s),
            Value::Object(map) => ["plugin", "plugin_name", "pluginName", "name"]
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str)),
            _ => None,
        }
    }

    /// Label of the requirement this plugin satisfies, if given.
    pub fn required_for(&self) -> Option<&str> {
        match &self.0 {
            Value::Object(map) => ["required_for", "requiredFor"]
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str)),
            _ => None,
        }
    }

    pub fn raw(&self) -> &Value {
        &self.0
    }
}

/// One policy evaluated against one service, in canonical form.
///
/// Serializes with the same keys the normalizer reads, so a serialized
/// record normalizes back to itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyCheckRecord {
    pub service_name: String,
    pub policy_name: String,
    #[serde(rename = "comply")]
    pub compliant: bool,
    pub missing_plugins: Vec<MissingPlugin>,
    pub required_for: String,
    pub details: String,
}

/// A service whose check failed upstream and produced no policies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceFailure {
    pub service_name: String,
    pub error: String,
}

/// Display-ready audit report: non-compliant records first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlatReport {
    pub records: Vec<PolicyCheckRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ServiceFailure>,
}

impl FlatReport {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn non_compliant_count(&self) -> usize {
        self.records.iter().filter(|r| !r.compliant).count()
    }

    pub fn compliant_count(&self) -> usize {
        self.records.iter().filter(|r| r.compliant).count()
    }
}

/// Normalize a raw `audit_report` mapping into a [`FlatReport`].
///
/// A non-object input yields an empty report.
pub fn normalize(raw: &Value) -> FlatReport {
    let Some(services) = raw.as_object() else {
        debug!("Audit report is not an object; nothing to normalize");
        return FlatReport::default();
    };

    let mut records = Vec::new();
    let mut failures = Vec::new();
    for (service_name, value) in services {
        if let Some(error) = value.get("error").and_then(Value::as_str) {
            failures.push(ServiceFailure {
                service_name: service_name.clone(),
                error: error.to_string(),
            });
        }
        records.extend(normalize_service(service_name, value));
    }

    FlatReport {
        records: partition_by_compliance(records),
        failures,
    }
}

/// Normalize every policy entry of one service.
pub fn normalize_service(service_name: &str, value: &Value) -> Vec<PolicyCheckRecord> {
    let policies = first_present(value.as_object(), &["policies", "results"]);
    let Some(entries) = policies.and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| match entry.as_object() {
            Some(map) => Some(normalize_policy(service_name, map)),
            None => {
                debug!(service = %service_name, "Skipping non-object policy entry");
                None
            }
        })
        .collect()
}

/// Apply the defaulting rules to a single policy entry.
pub fn normalize_policy(service_name: &str, entry: &Map<String, Value>) -> PolicyCheckRecord {
    let entry = Some(entry);
    let policy_name = text(first_present(entry, &["policy_name", "policyName"]))
        .unwrap_or_else(|| UNKNOWN_POLICY.to_string());
    let required_for = text(first_present(entry, &["required_for", "requiredFor"]))
        .unwrap_or_else(|| policy_name.clone());

    PolicyCheckRecord {
        service_name: service_name.to_string(),
        compliant: is_compliant(first_present(entry, &["comply", "comply_status"])),
        missing_plugins: missing_plugins(first_present(
            entry,
            &["missing_plugins", "missingPlugins"],
        )),
        details: text(first_present(entry, &["details"])).unwrap_or_default(),
        required_for,
        policy_name,
    }
}

/// Compliance of a raw `comply` value.
pub fn is_compliant(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("comply"),
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Stable partition: non-compliant records first, relative order kept.
pub fn partition_by_compliance(records: Vec<PolicyCheckRecord>) -> Vec<PolicyCheckRecord> {
    let (compliant, mut ordered): (Vec<_>, Vec<_>) =
        records.into_iter().partition(|r| r.compliant);
    ordered.extend(compliant);
    ordered
}

fn first_present<'a>(map: Option<&'a Map<String, Value>>, keys: &[&str]) -> Option<&'a Value> {
    let map = map?;
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|v| !v.is_null())
}

fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn missing_plugins(value: Option<&Value>) -> Vec<MissingPlugin> {
    match value {
        None => Vec::new(),
        Some(Value::Array(items)) => items.iter().cloned().map(MissingPlugin).collect(),
        Some(other) => vec![MissingPlugin(other.clone())],
    }
}
