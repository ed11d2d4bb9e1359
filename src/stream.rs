//! Stream descriptors
//!
//! A [`StreamDescriptor`] is the static, per-resource declaration the engine
//! is parameterized by: path template, records path, page size, incremental
//! filtering fields, declared schema, and parent/child wiring. Descriptors
//! are plain data; there is one generic engine, not one type per resource.

use crate::error::{Error, Result};
use crate::schema::SchemaNode;
use crate::types::{JsonObject, JsonValue, SyncMode};

/// Default records per page
pub const DEFAULT_PAGE_SIZE: usize = 250;

/// How a parent stream builds the context passed to its children
#[derive(Debug, Clone)]
pub struct ChildContext {
    /// Context key the children see (e.g. "order_id")
    pub key: String,
    /// Field on the parent record the value is taken from (e.g. "id")
    pub record_field: String,
}

/// Static declaration of one logical resource stream
#[derive(Debug, Clone)]
pub struct StreamDescriptor {
    /// Stream name, also the state key
    pub name: String,
    /// Path template; `{key}` placeholders resolve from the sync context
    pub path: String,
    /// Dot path to the record list in the page body (e.g. `$.orders[*]`)
    pub records_path: String,
    /// Primary key fields
    pub primary_keys: Vec<String>,
    /// Incremental field on records (e.g. "updatedAt")
    pub replication_key: Option<String>,
    /// Query parameter carrying the window lower bound (e.g. "updated_at_min")
    pub replication_filter_param: Option<String>,
    /// Page size sent as the `limit` parameter
    pub page_size: usize,
    /// Declared value-type schema
    pub schema: SchemaNode,
    /// Name of the parent stream, for child streams
    pub parent: Option<String>,
    /// Child context produced from each record of this stream
    pub child_context: Option<ChildContext>,
    /// Query parameters filled from the sync context: (param, context key)
    pub context_params: Vec<(String, String)>,
}

impl StreamDescriptor {
    /// Create a descriptor with defaults
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        records_path: impl Into<String>,
        schema: SchemaNode,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            records_path: records_path.into(),
            primary_keys: vec!["id".to_string()],
            replication_key: None,
            replication_filter_param: None,
            page_size: DEFAULT_PAGE_SIZE,
            schema,
            parent: None,
            child_context: None,
            context_params: Vec::new(),
        }
    }

    /// Declare the incremental field and its filter parameter
    #[must_use]
    pub fn incremental(
        mut self,
        replication_key: impl Into<String>,
        filter_param: impl Into<String>,
    ) -> Self {
        self.replication_key = Some(replication_key.into());
        self.replication_filter_param = Some(filter_param.into());
        self
    }

    /// Declare the parent stream
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Declare the child context produced from each record
    #[must_use]
    pub fn with_child_context(
        mut self,
        key: impl Into<String>,
        record_field: impl Into<String>,
    ) -> Self {
        self.child_context = Some(ChildContext {
            key: key.into(),
            record_field: record_field.into(),
        });
        self
    }

    /// Add a query parameter filled from the sync context
    #[must_use]
    pub fn with_context_param(
        mut self,
        param: impl Into<String>,
        context_key: impl Into<String>,
    ) -> Self {
        self.context_params.push((param.into(), context_key.into()));
        self
    }

    /// Override the page size
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Whether this stream syncs incrementally. Both the incremental field
    /// and the filter parameter must be declared; anything else is a full
    /// refresh.
    pub fn is_incremental(&self) -> bool {
        self.replication_key.is_some() && self.replication_filter_param.is_some()
    }

    /// Effective sync mode
    pub fn sync_mode(&self) -> SyncMode {
        if self.is_incremental() {
            SyncMode::Incremental
        } else {
            SyncMode::FullRefresh
        }
    }

    /// Render the path template against a sync context
    pub fn render_path(&self, context: Option<&JsonObject>) -> Result<String> {
        let mut rendered = String::with_capacity(self.path.len());
        let mut rest = self.path.as_str();

        while let Some(open) = rest.find('{') {
            let (head, tail) = rest.split_at(open);
            rendered.push_str(head);
            let Some(close) = tail.find('}') else {
                rendered.push_str(tail);
                return Ok(rendered);
            };
            let key = &tail[1..close];
            let value = context
                .and_then(|ctx| ctx.get(key))
                .ok_or_else(|| Error::undefined_var(key))?;
            rendered.push_str(&value_to_string(value));
            rest = &tail[close + 1..];
        }
        rendered.push_str(rest);
        Ok(rendered)
    }

    /// Query parameters derived from the sync context
    pub fn context_query(&self, context: Option<&JsonObject>) -> Result<Vec<(String, String)>> {
        let mut params = Vec::with_capacity(self.context_params.len());
        for (param, key) in &self.context_params {
            let value = context
                .and_then(|ctx| ctx.get(key))
                .ok_or_else(|| Error::undefined_var(key))?;
            params.push((param.clone(), value_to_string(value)));
        }
        Ok(params)
    }

    /// Build the child context from one record of this stream
    pub fn child_context_for(&self, record: &JsonValue) -> Option<JsonObject> {
        let link = self.child_context.as_ref()?;
        let value = record.get(&link.record_field)?;
        let mut context = JsonObject::new();
        context.insert(link.key.clone(), value.clone());
        Some(context)
    }

    /// Extract the record list from a page body at the declared path.
    ///
    /// Paths are of the form `$.orders[*]` (list of records) or `$.shop`
    /// (single record). A missing path yields no records.
    pub fn extract_records(&self, body: &JsonValue) -> Result<Vec<JsonValue>> {
        let path = self.records_path.trim_start_matches("$.");
        let (path, wildcard) = match path.strip_suffix("[*]") {
            Some(stripped) => (stripped, true),
            None => (path, false),
        };

        let mut current = body;
        for part in path.split('.') {
            match current.get(part) {
                Some(next) => current = next,
                None => return Ok(Vec::new()),
            }
        }

        match (wildcard, current) {
            (true, JsonValue::Array(items)) => Ok(items.clone()),
            (true, JsonValue::Null) => Ok(Vec::new()),
            (true, other) => Err(Error::record_extraction(
                &self.records_path,
                format!("expected an array, got {}", type_name(other)),
            )),
            (false, JsonValue::Null) => Ok(Vec::new()),
            (false, single) => Ok(vec![single.clone()]),
        }
    }
}

/// Render a JSON scalar for use in a URL
fn value_to_string(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{integer, object};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn orders() -> StreamDescriptor {
        StreamDescriptor::new(
            "orders",
            "/orders.json",
            "$.orders[*]",
            object([("id", integer())]),
        )
        .incremental("updatedAt", "updated_at_min")
        .with_child_context("order_id", "id")
    }

    fn order_lines() -> StreamDescriptor {
        StreamDescriptor::new(
            "order_lines",
            "/orders/{order_id}/products.json",
            "$.orderProducts[*]",
            object([("id", integer())]),
        )
        .with_parent("orders")
    }

    #[test]
    fn test_is_incremental() {
        assert!(orders().is_incremental());
        assert!(!order_lines().is_incremental());
        assert_eq!(orders().sync_mode(), SyncMode::Incremental);
        assert_eq!(order_lines().sync_mode(), SyncMode::FullRefresh);
    }

    #[test]
    fn test_render_path_with_context() {
        let mut context = JsonObject::new();
        context.insert("order_id".to_string(), json!(42));

        let rendered = order_lines().render_path(Some(&context)).unwrap();
        assert_eq!(rendered, "/orders/42/products.json");
    }

    #[test]
    fn test_render_path_missing_context_fails() {
        let err = order_lines().render_path(None).unwrap_err();
        assert!(err.to_string().contains("order_id"));
    }

    #[test]
    fn test_render_path_without_placeholders() {
        assert_eq!(orders().render_path(None).unwrap(), "/orders.json");
    }

    #[test]
    fn test_context_query() {
        let stream = StreamDescriptor::new(
            "variants",
            "/variants.json",
            "$.variants[*]",
            object([("id", integer())]),
        )
        .with_parent("products")
        .with_context_param("product", "product_id");

        let mut context = JsonObject::new();
        context.insert("product_id".to_string(), json!(7));

        let params = stream.context_query(Some(&context)).unwrap();
        assert_eq!(params, vec![("product".to_string(), "7".to_string())]);
    }

    #[test]
    fn test_child_context_for_record() {
        let record = json!({ "id": 99, "status": "open" });
        let context = orders().child_context_for(&record).unwrap();
        assert_eq!(context.get("order_id"), Some(&json!(99)));
    }

    #[test]
    fn test_extract_records_list() {
        let body = json!({ "orders": [{ "id": 1 }, { "id": 2 }] });
        let records = orders().extract_records(&body).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_extract_records_single_object() {
        let shop = StreamDescriptor::new(
            "shop",
            "/shop.json",
            "$.shop",
            object([("id", integer())]),
        );
        let body = json!({ "shop": { "id": 1 } });
        let records = shop.extract_records(&body).unwrap();
        assert_eq!(records, vec![json!({ "id": 1 })]);
    }

    #[test]
    fn test_extract_records_missing_path_is_empty() {
        let body = json!({ "somethingElse": [] });
        assert!(orders().extract_records(&body).unwrap().is_empty());
    }

    #[test]
    fn test_extract_records_wrong_shape_fails() {
        let body = json!({ "orders": { "id": 1 } });
        assert!(orders().extract_records(&body).is_err());
    }
}
