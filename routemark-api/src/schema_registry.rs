/// Shared schema registry
///
/// Holds every shared schema registered during the schema pass and checks
/// route schemas for `$ref`s that cannot be resolved. A `$ref` resolves when
/// it is local (`#/definitions/...`), names an `$id` declared inside the
/// same schema, or names a registered shared schema. The fragment of an
/// external reference is ignored: `User#/properties/name` needs `User`.
///
/// # Example
///
/// ```
/// use routemark_api::schema_registry::SchemaRegistry;
/// use routemark_core::schema::SharedSchema;
/// use serde_json::json;
///
/// let mut registry = SchemaRegistry::new();
/// let user = SharedSchema::from_value(json!({ "$id": "User", "type": "object" })).unwrap();
/// registry.add(user).unwrap();
///
/// assert!(registry.check_refs(&json!({ "body": { "$ref": "User#" } })).is_ok());
/// assert!(registry.check_refs(&json!({ "body": { "$ref": "Team#" } })).is_err());
/// ```

use routemark_core::schema::{schema_id, SharedSchema};
use serde_json::Value;
use std::collections::HashSet;

const REF_FIELD: &str = "$ref";

/// Error type for registry operations
#[derive(Debug, thiserror::Error)]
pub enum SchemaRegistryError {
    /// Another shared schema already uses this id
    #[error("Schema with id \"{0}\" already declared")]
    DuplicateId(String),

    /// A `$ref` names an id nobody registered
    #[error("Cannot resolve $ref \"{reference}\": no schema with id \"{id}\"")]
    UnresolvedRef { reference: String, id: String },
}

/// Shared schemas in registration order
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: Vec<SharedSchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a shared schema
    ///
    /// # Errors
    ///
    /// Returns `SchemaRegistryError::DuplicateId` if the id is taken.
    pub fn add(&mut self, schema: SharedSchema) -> Result<(), SchemaRegistryError> {
        if self.contains(&schema.id) {
            return Err(SchemaRegistryError::DuplicateId(schema.id));
        }

        self.schemas.push(schema);
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.schemas.iter().any(|schema| schema.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.schemas
            .iter()
            .find(|schema| schema.id == id)
            .map(|schema| &schema.schema)
    }

    pub fn schemas(&self) -> &[SharedSchema] {
        &self.schemas
    }

    /// Verifies every `$ref` inside `schema` can be resolved
    ///
    /// # Errors
    ///
    /// Returns `SchemaRegistryError::UnresolvedRef` for the first reference
    /// that names an unknown id.
    pub fn check_refs(&self, schema: &Value) -> Result<(), SchemaRegistryError> {
        let mut local_ids = HashSet::new();
        collect_ids(schema, &mut local_ids);

        let mut references = Vec::new();
        collect_refs(schema, &mut references);

        for reference in references {
            let id = reference.split('#').next().unwrap_or_default();
            if id.is_empty() || local_ids.contains(id) || self.contains(id) {
                continue;
            }

            return Err(SchemaRegistryError::UnresolvedRef {
                reference: reference.to_string(),
                id: id.to_string(),
            });
        }

        Ok(())
    }
}

fn collect_ids<'a>(value: &'a Value, out: &mut HashSet<&'a str>) {
    match value {
        Value::Object(map) => {
            if let Some(id) = schema_id(value) {
                out.insert(id);
            }
            map.values().for_each(|child| collect_ids(child, out));
        }
        Value::Array(items) => items.iter().for_each(|child| collect_ids(child, out)),
        _ => {}
    }
}

fn collect_refs<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(reference)) = map.get(REF_FIELD) {
                out.push(reference);
            }
            map.values().for_each(|child| collect_refs(child, out));
        }
        Value::Array(items) => items.iter().for_each(|child| collect_refs(child, out)),
        _ => {}
    }
}
