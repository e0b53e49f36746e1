use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub name: String,
    #[serde(default)]
    pub fields: HashMap<String, Value>,
    pub create_time: Option<String>,
    pub update_time: Option<String>,
}

impl Document {
    /// The document id, i.e. the last segment of the resource name.
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or_default()
    }

    pub fn string_field(&self, key: &str) -> Option<&str> {
        match self.fields.get(key) {
            Some(Value {
                value_type: ValueType::StringValue(s),
            }) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Integer fields arrive as `integerValue` strings on the wire; a
    /// `doubleValue` holding an integral value is accepted too.
    pub fn integer_field(&self, key: &str) -> Option<i64> {
        match self.fields.get(key) {
            Some(Value {
                value_type: ValueType::IntegerValue(s),
            }) => s.parse().ok(),
            Some(Value {
                value_type: ValueType::DoubleValue(d),
            }) if d.fract() == 0.0 => Some(*d as i64),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Value {
    #[serde(flatten)]
    pub value_type: ValueType,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub enum ValueType {
    StringValue(String),
    IntegerValue(String), // Firestore sends integers as strings
    DoubleValue(f64),
    BooleanValue(bool),
    NullValue(()),
    TimestampValue(String),
    MapValue(MapValue),
    ArrayValue(ArrayValue),
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MapValue {
    #[serde(default)]
    pub fields: HashMap<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ArrayValue {
    #[serde(default)]
    pub values: Vec<Value>,
}

// --- Listen request ---

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ListenRequest {
    pub database: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_target: Option<Target>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<i32>,
    pub query: QueryTarget,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct QueryTarget {
    pub parent: String,
    pub structured_query: StructuredQuery,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StructuredQuery {
    pub from: Vec<CollectionSelector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<Vec<Order>>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSelector {
    pub collection_id: String,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub field: FieldReference,
    pub direction: Direction,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FieldReference {
    pub field_path: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Ascending,
    Descending,
}

// --- Listen response ---

/// One message from the listen change stream. The server tags each message
/// with exactly one of these fields; unknown tags are ignored.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListenEvent {
    pub target_change: Option<TargetChange>,
    pub document_change: Option<DocumentChange>,
    pub document_delete: Option<DocumentDelete>,
    pub document_remove: Option<DocumentRemove>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TargetChange {
    #[serde(default)]
    pub target_change_type: TargetChangeType,
    pub read_time: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetChangeType {
    #[default]
    NoChange,
    Add,
    Remove,
    Current,
    Reset,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DocumentChange {
    pub document: Document,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDelete {
    pub document: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRemove {
    pub document: String,
}
