//! Core record types for apae-records.
//!
//! A [`Record`] is one JSON object stored in a collection file. Field order is
//! kept exactly as written so that files round-trip without reordering.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the mandatory identifier field.
pub const ID_FIELD: &str = "id";

/// Field values supplied by a caller for create or update.
pub type Fields = Map<String, Value>;

/// A single stored record.
///
/// Serializes as a plain JSON object. Any element of a collection file that is
/// not an object fails to deserialize, which the store reports as a parse
/// error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Create a record whose first field is the given id.
    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(ID_FIELD.to_string(), Value::String(id.into()));
        Self(fields)
    }

    /// The record id, if present and string-typed.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.0.get(ID_FIELD).and_then(Value::as_str)
    }

    /// Whether this record's id is the string `id`.
    ///
    /// A numeric id of `1` does not match `"1"`.
    #[must_use]
    pub fn has_id(&self, id: &str) -> bool {
        self.id() == Some(id)
    }

    /// Get a field value.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Set a field value, keeping the position of an existing key.
    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }
}

/// Whether a supplied value counts as "set" for partial-merge updates.
///
/// `null`, `false`, `0` and `""` are unset. Arrays and objects are always set,
/// even when empty.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f.abs() > 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_with_id_puts_id_first() {
        let mut record = Record::with_id("3");
        record.insert("name", json!("Ana"));

        let serialized = serde_json::to_string(&record).unwrap();
        assert_eq!(serialized, r#"{"id":"3","name":"Ana"}"#);
    }

    #[test]
    fn test_has_id_is_string_equality() {
        let record: Record = serde_json::from_value(json!({"id": 1, "nome": "João"})).unwrap();
        assert!(!record.has_id("1"));
        assert_eq!(record.id(), None);

        let record: Record = serde_json::from_value(json!({"id": "1"})).unwrap();
        assert!(record.has_id("1"));
        assert!(!record.has_id("01"));
    }

    #[test]
    fn test_insert_keeps_existing_position() {
        let mut record: Record =
            serde_json::from_value(json!({"id": "1", "name": "X", "status": "active"})).unwrap();
        record.insert("name", json!("Y"));

        let value = serde_json::to_value(&record).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["id", "name", "status"]);
    }

    #[test]
    fn test_non_object_does_not_deserialize() {
        assert!(serde_json::from_value::<Record>(json!(["id", "1"])).is_err());
        assert!(serde_json::from_value::<Record>(json!("1")).is_err());
    }

    #[test]
    fn test_is_truthy() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));

        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(12)));
        assert!(is_truthy(&json!(-1)));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
    }
}
