//! Declared value-type schemas
//!
//! Each stream carries a static schema tree describing the types the API is
//! supposed to return for each field. The normalizer walks raw payloads
//! against this tree. Schemas are plain data built with the helpers below or
//! parsed from a JSON-Schema-shaped document.

use crate::error::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;

/// Declared type of a schema node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaType {
    /// Plain string
    String,
    /// Whole number
    Integer,
    /// Floating-point number
    Number,
    /// Boolean
    Boolean,
    /// Date-time string, normalized to canonical UTC RFC 3339
    DateTime,
    /// Keyed mapping with per-field sub-schemas
    Object,
    /// Sequence with an element sub-schema
    Array,
    /// No single declared type; values pass through untouched
    Any,
}

impl SchemaType {
    /// Collapse a declared type list to a single type. A union of null plus
    /// one concrete type is treated as the concrete type; anything wider
    /// becomes `Any`.
    pub fn from_declared(types: &[&str], format: Option<&str>) -> SchemaType {
        let concrete: Vec<&str> = types.iter().copied().filter(|t| *t != "null").collect();
        if concrete.len() != 1 {
            return SchemaType::Any;
        }
        match concrete[0] {
            "string" if format == Some("date-time") => SchemaType::DateTime,
            "string" => SchemaType::String,
            "integer" => SchemaType::Integer,
            "number" => SchemaType::Number,
            "boolean" => SchemaType::Boolean,
            "object" => SchemaType::Object,
            "array" => SchemaType::Array,
            _ => SchemaType::Any,
        }
    }
}

/// One node in a declared schema tree
#[derive(Debug, Clone)]
pub struct SchemaNode {
    /// Declared type of values at this node
    pub kind: SchemaType,
    /// Field sub-schemas (objects only)
    pub properties: HashMap<String, SchemaNode>,
    /// Element sub-schema (arrays only)
    pub items: Option<Box<SchemaNode>>,
}

impl SchemaNode {
    /// Create a scalar node of the given type
    pub fn scalar(kind: SchemaType) -> Self {
        Self {
            kind,
            properties: HashMap::new(),
            items: None,
        }
    }

    /// Look up the declared schema for a field
    pub fn property(&self, key: &str) -> Option<&SchemaNode> {
        self.properties.get(key)
    }

    /// Element sub-schema for arrays
    pub fn element(&self) -> Option<&SchemaNode> {
        self.items.as_deref()
    }

    /// Parse a JSON-Schema-shaped document into a schema tree.
    ///
    /// Supports `type` as a string or a list (null unions collapse to the
    /// concrete type), `format: date-time`, `properties`, and `items`.
    pub fn from_json_schema(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| Error::decode("schema node must be an object"))?;

        let types: Vec<&str> = match obj.get("type") {
            Some(Value::String(s)) => vec![s.as_str()],
            Some(Value::Array(arr)) => arr.iter().filter_map(Value::as_str).collect(),
            _ => vec![],
        };
        let format = obj.get("format").and_then(Value::as_str);
        let kind = if types.is_empty() {
            SchemaType::Any
        } else {
            SchemaType::from_declared(&types, format)
        };

        let mut node = SchemaNode::scalar(kind);

        if let Some(Value::Object(props)) = obj.get("properties") {
            for (key, sub) in props {
                node.properties
                    .insert(key.clone(), SchemaNode::from_json_schema(sub)?);
            }
        }
        if let Some(items) = obj.get("items") {
            node.items = Some(Box::new(SchemaNode::from_json_schema(items)?));
        }

        Ok(node)
    }
}

// ============================================================================
// Builders
// ============================================================================

/// String scalar
pub fn string() -> SchemaNode {
    SchemaNode::scalar(SchemaType::String)
}

/// Integer scalar
pub fn integer() -> SchemaNode {
    SchemaNode::scalar(SchemaType::Integer)
}

/// Number scalar
pub fn number() -> SchemaNode {
    SchemaNode::scalar(SchemaType::Number)
}

/// Boolean scalar
pub fn boolean() -> SchemaNode {
    SchemaNode::scalar(SchemaType::Boolean)
}

/// Date-time scalar
pub fn date_time() -> SchemaNode {
    SchemaNode::scalar(SchemaType::DateTime)
}

/// Untyped node; values pass through untouched
pub fn any() -> SchemaNode {
    SchemaNode::scalar(SchemaType::Any)
}

/// Object with the given field schemas
pub fn object<I, K>(fields: I) -> SchemaNode
where
    I: IntoIterator<Item = (K, SchemaNode)>,
    K: Into<String>,
{
    let mut node = SchemaNode::scalar(SchemaType::Object);
    node.properties = fields.into_iter().map(|(k, v)| (k.into(), v)).collect();
    node
}

/// Array with the given element schema
pub fn array(items: SchemaNode) -> SchemaNode {
    let mut node = SchemaNode::scalar(SchemaType::Array);
    node.items = Some(Box::new(items));
    node
}
