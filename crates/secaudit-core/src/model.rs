//! Pass-through shapes returned by the ingestion and remediation endpoints.
//!
//! These are rendered, never restructured. Parsing is lenient: unknown keys
//! are ignored or kept aside, absent keys fall back to empty values and
//! values of an unexpected type are kept as display text.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One ingested knowledge fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestChunk {
    /// Index the fragment was written to (copied from its batch)
    pub index_name: Option<String>,
    pub chunk_id: String,
    pub content: String,
    /// Opaque metadata, text or object
    pub metadata: Value,
}

/// One ingestion response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestBatch {
    pub index_name: Option<String>,
    pub message: Option<String>,
    pub chunks: Vec<IngestChunk>,
    /// Response body as received
    pub raw: Value,
}

impl IngestBatch {
    /// Build a batch from a response body.
    ///
    /// Each field and each chunk is read on its own, so one odd value never
    /// costs the rest of the batch. A body without a usable `chunks` list
    /// still becomes a batch, with no chunks and the raw body kept for display.
    pub fn from_response(raw: Value) -> Self {
        let index_name = raw.get("index_name").and_then(display_text);
        let message = raw.get("message").and_then(display_text);
        let chunks = raw
            .get("chunks")
            .and_then(Value::as_array)
            .map(|chunks| {
                chunks
                    .iter()
                    .map(|chunk| IngestChunk::from_value(chunk, index_name.clone()))
                    .collect()
            })
            .unwrap_or_default();

        IngestBatch {
            index_name,
            message,
            chunks,
            raw,
        }
    }
}

impl IngestChunk {
    fn from_value(chunk: &Value, index_name: Option<String>) -> Self {
        let Some(fields) = chunk.as_object() else {
            // a bare value is the content itself
            return IngestChunk {
                index_name,
                chunk_id: String::new(),
                content: display_text(chunk).unwrap_or_default(),
                metadata: Value::Null,
            };
        };
        IngestChunk {
            index_name,
            chunk_id: fields.get("chunk_id").and_then(display_text).unwrap_or_default(),
            content: fields.get("content").and_then(display_text).unwrap_or_default(),
            metadata: fields.get("metadata").cloned().unwrap_or(Value::Null),
        }
    }
}

/// Render a loosely typed JSON value as display text.
///
/// Strings pass through, arrays are joined with ", ", null is absent and
/// anything else is its JSON text.
pub fn display_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(display_text)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        other => Some(other.to_string()),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(display_text(&value))
}

fn lenient_plugin<'de, D>(deserializer: D) -> Result<Option<PluginRef>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        Value::Array(items) => Some(PluginRef::Many(
            items.iter().filter_map(display_text).collect(),
        )),
        other => display_text(&other).map(PluginRef::One),
    })
}

/// A plugin reference in a remediation item: one name or several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PluginRef {
    One(String),
    Many(Vec<String>),
}

impl PluginRef {
    pub fn names(&self) -> Vec<&str> {
        match self {
            PluginRef::One(name) => vec![name.as_str()],
            PluginRef::Many(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

impl std::fmt::Display for PluginRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.names().join(", "))
    }
}

/// One remediation suggestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemediationItem {
    #[serde(default, deserialize_with = "lenient_text")]
    pub service_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub policy_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub issue: Option<String>,
    #[serde(default, deserialize_with = "lenient_plugin")]
    pub missing_plugin: Option<PluginRef>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub recommended_action: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub severity: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub owner: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub estimated_effort: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub impact: Option<String>,
    #[serde(
        default,
        alias = "securityStandardReference",
        deserialize_with = "lenient_text"
    )]
    pub standard_reference: Option<String>,
    /// Keys this struct does not name, kept for display
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RemediationItem {
    /// Read one item of a remediation list.
    ///
    /// Every named field tolerates any JSON type, so only a non-object entry
    /// can miss the struct shape; its text is kept as the `issue`.
    pub fn from_value(value: Value) -> Self {
        if !value.is_object() {
            return RemediationItem {
                issue: display_text(&value),
                ..Default::default()
            };
        }
        let fallback = display_text(&value);
        serde_json::from_value(value).unwrap_or_else(|_| RemediationItem {
            issue: fallback,
            ..Default::default()
        })
    }
}
