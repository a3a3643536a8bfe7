/// Schema module exports
///
/// Two consumers read schema modules:
///
/// 1. **Route pass**: the default export of a handler's sibling schema
///    module becomes its `RawSchemaExport`. A non-object export is treated
///    as empty rather than failing.
/// 2. **Schema pass**: an orphan schema module (no sibling handler) feeds
///    the shared schema registry. Its default export is registered when it
///    carries a string `$id`; otherwise every named export carrying one is
///    registered, in document order.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::loader::SchemaModule;

/// Field identifying a shared schema
pub const ID_FIELD: &str = "$id";

/// Untyped schema export: validation fields and route options, not yet split
pub type RawSchemaExport = Map<String, Value>;

/// Guards a loaded default export into a raw schema export
///
/// Anything that is not an object (missing, array, string, null...) yields
/// an empty export.
pub fn raw_export(export: Option<Value>) -> RawSchemaExport {
    match export {
        Some(Value::Object(fields)) => fields,
        _ => RawSchemaExport::new(),
    }
}

/// A validation fragment registered independently of any route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedSchema {
    /// Value of the `$id` field
    pub id: String,

    /// The full schema, `$id` included
    pub schema: Value,
}

impl SharedSchema {
    /// Wraps a value that carries a string `$id`
    pub fn from_value(schema: Value) -> Option<Self> {
        let id = schema_id(&schema)?.to_string();
        Some(Self { id, schema })
    }
}

/// Extracts the shared schemas exported by an orphan schema module
pub fn shared_schemas(module: SchemaModule) -> Vec<SharedSchema> {
    if let Some(schema) = module.default.and_then(SharedSchema::from_value) {
        return vec![schema];
    }

    module
        .named
        .into_iter()
        .filter_map(|(_, value)| SharedSchema::from_value(value))
        .collect()
}

/// The string `$id` of an object value
pub fn schema_id(value: &Value) -> Option<&str> {
    value.as_object()?.get(ID_FIELD)?.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_export_guards_non_objects() {
        assert!(raw_export(None).is_empty());
        assert!(raw_export(Some(json!([1, 2]))).is_empty());
        assert!(raw_export(Some(json!("schema"))).is_empty());
        assert!(raw_export(Some(Value::Null)).is_empty());

        let export = raw_export(Some(json!({ "body": { "type": "object" } })));
        assert!(export.contains_key("body"));
    }

    #[test]
    fn test_named_exports_with_id() {
        let module = SchemaModule::from_document(json!({
            "UserSchema": { "$id": "User", "type": "object" },
            "TeamSchema": { "$id": "Team", "type": "object" },
            "helper": { "type": "string" },
            "count": 3
        }));

        let ids: Vec<String> = shared_schemas(module).into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["User", "Team"]);
    }

    #[test]
    fn test_default_export_with_id_wins() {
        let module = SchemaModule::from_document(json!({
            "$id": "Address",
            "type": "object",
            "properties": { "$id": { "type": "string" } }
        }));

        let schemas = shared_schemas(module);
        assert_eq!(schemas.len(), 1);
        assert_eq!(schemas[0].id, "Address");
        assert_eq!(schemas[0].schema["type"], "object");
    }

    #[test]
    fn test_non_string_id_is_ignored() {
        let module = SchemaModule::from_document(json!({ "A": { "$id": 7 } }));
        assert!(shared_schemas(module).is_empty());
    }
}
