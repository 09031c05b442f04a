//! Per-resource record schemas.
//!
//! Each resource accepts a fixed set of fields and uses one of two update
//! modes. The schema decides how a new record is built from caller input and
//! how an update combines caller input with the stored record.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::{is_truthy, Fields, Record};

/// How an update combines supplied fields with the stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateMode {
    /// The stored record becomes `{id, ...supplied fields}`; anything not
    /// supplied is dropped.
    Replace,
    /// Only truthy supplied values overwrite stored ones; everything else is
    /// kept as stored.
    PartialMerge,
}

impl std::fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Replace => write!(f, "replace"),
            Self::PartialMerge => write!(f, "partial_merge"),
        }
    }
}

/// One accepted field of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Field name as it appears in JSON.
    pub name: &'static str,
    /// Value used on create in partial-merge mode when the caller supplies
    /// nothing truthy. `None` means the empty string.
    pub default: Option<&'static str>,
}

impl Field {
    /// A field defaulting to the empty string.
    #[must_use]
    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            default: None,
        }
    }

    /// A field with a literal create default.
    #[must_use]
    pub const fn with_default(name: &'static str, default: &'static str) -> Self {
        Self {
            name,
            default: Some(default),
        }
    }

    fn default_value(&self) -> Value {
        Value::String(self.default.unwrap_or_default().to_string())
    }
}

/// The record shape and backing file of one resource.
#[derive(Debug, PartialEq, Eq)]
pub struct Schema {
    /// Resource name, used in routes and error messages.
    pub name: &'static str,
    /// File name of the backing collection inside the data directory.
    pub file_name: &'static str,
    /// Accepted fields, in the order they are written on create.
    pub fields: &'static [Field],
    /// Update semantics for this resource.
    pub mode: UpdateMode,
}

impl Schema {
    /// Build a new record with the given id from caller-supplied fields.
    ///
    /// Keys outside the schema, including any caller-supplied `id`, are
    /// ignored.
    #[must_use]
    pub fn build_new(&self, id: impl Into<String>, input: &Fields) -> Record {
        let mut record = Record::with_id(id);
        for field in self.fields {
            match self.mode {
                UpdateMode::Replace => {
                    if let Some(value) = input.get(field.name) {
                        record.insert(field.name, value.clone());
                    }
                }
                UpdateMode::PartialMerge => {
                    let value = input
                        .get(field.name)
                        .filter(|value| is_truthy(value))
                        .cloned()
                        .unwrap_or_else(|| field.default_value());
                    record.insert(field.name, value);
                }
            }
        }
        record
    }

    /// Combine a stored record with caller-supplied fields.
    #[must_use]
    pub fn apply_update(&self, existing: &Record, id: &str, input: &Fields) -> Record {
        match self.mode {
            UpdateMode::Replace => {
                let mut record = Record::with_id(id);
                for field in self.fields {
                    if let Some(value) = input.get(field.name) {
                        record.insert(field.name, value.clone());
                    }
                }
                record
            }
            UpdateMode::PartialMerge => {
                let mut record = existing.clone();
                for field in self.fields {
                    if let Some(value) = input.get(field.name).filter(|value| is_truthy(value)) {
                        record.insert(field.name, value.clone());
                    }
                }
                record
            }
        }
    }
}

/// Users: `{nome}`.
pub static USERS: Schema = Schema {
    name: "users",
    file_name: "usuarios.json",
    fields: &[Field::text("nome")],
    mode: UpdateMode::Replace,
};

/// Professionals with contact details.
pub static PROFESSIONALS_CONTACT: Schema = Schema {
    name: "professionals",
    file_name: "professionals.json",
    fields: &[
        Field::text("name"),
        Field::text("specialty"),
        Field::text("contact"),
        Field::text("phone_number"),
        Field::text("status"),
    ],
    mode: UpdateMode::Replace,
};

/// Professionals directory with an `active` status default.
pub static PROFESSIONALS_DIRECTORY: Schema = Schema {
    name: "professionals",
    file_name: "professionals.json",
    fields: &[
        Field::text("name"),
        Field::text("specialty"),
        Field::text("email"),
        Field::text("phone"),
        Field::with_default("status", "active"),
    ],
    mode: UpdateMode::PartialMerge,
};

/// Teachers.
pub static TEACHERS: Schema = Schema {
    name: "teachers",
    file_name: "teachers.json",
    fields: &[
        Field::text("name"),
        Field::text("subject"),
        Field::text("email"),
        Field::text("phone"),
        Field::with_default("status", "active"),
    ],
    mode: UpdateMode::PartialMerge,
};

/// Students.
pub static STUDENTS: Schema = Schema {
    name: "students",
    file_name: "students.json",
    fields: &[
        Field::text("name"),
        Field::text("age"),
        Field::text("grade"),
        Field::text("email"),
        Field::with_default("status", "active"),
    ],
    mode: UpdateMode::PartialMerge,
};

/// Appointments.
pub static APPOINTMENTS: Schema = Schema {
    name: "appointments",
    file_name: "appointments.json",
    fields: &[
        Field::text("patient"),
        Field::text("professional"),
        Field::text("date"),
        Field::text("time"),
    ],
    mode: UpdateMode::Replace,
};

/// Events as a plain agenda entry.
pub static EVENTS_AGENDA: Schema = Schema {
    name: "events",
    file_name: "events.json",
    fields: &[
        Field::text("title"),
        Field::text("description"),
        Field::text("date"),
        Field::text("time"),
    ],
    mode: UpdateMode::Replace,
};

/// Events with a location and a `scheduled` status default.
pub static EVENTS_SCHEDULED: Schema = Schema {
    name: "events",
    file_name: "events.json",
    fields: &[
        Field::text("title"),
        Field::text("date"),
        Field::text("location"),
        Field::text("description"),
        Field::with_default("status", "scheduled"),
    ],
    mode: UpdateMode::PartialMerge,
};

/// Which professionals schema a deployment uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfessionalsLayout {
    /// `{name, specialty, email, phone, status}`, partial-merge.
    #[default]
    Directory,
    /// `{name, specialty, contact, phone_number, status}`, replace.
    Contact,
}

impl ProfessionalsLayout {
    /// The schema for this layout.
    #[must_use]
    pub fn schema(self) -> &'static Schema {
        match self {
            Self::Directory => &PROFESSIONALS_DIRECTORY,
            Self::Contact => &PROFESSIONALS_CONTACT,
        }
    }
}

/// Which events schema a deployment uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventsLayout {
    /// `{title, date, location, description, status}`, partial-merge.
    #[default]
    Scheduled,
    /// `{title, description, date, time}`, replace.
    Agenda,
}

impl EventsLayout {
    /// The schema for this layout.
    #[must_use]
    pub fn schema(self) -> &'static Schema {
        match self {
            Self::Scheduled => &EVENTS_SCHEDULED,
            Self::Agenda => &EVENTS_AGENDA,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn record(value: Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_replace_create_omits_absent_fields() {
        let created = USERS.build_new("1", &fields(json!({})));
        assert_eq!(created, record(json!({"id": "1"})));

        let created = USERS.build_new("2", &fields(json!({"nome": "João"})));
        assert_eq!(created, record(json!({"id": "2", "nome": "João"})));
    }

    #[test]
    fn test_replace_create_keeps_null_and_empty() {
        let created = APPOINTMENTS.build_new(
            "1",
            &fields(json!({"patient": null, "professional": "", "date": "2025-06-10"})),
        );
        assert_eq!(
            created,
            record(json!({"id": "1", "patient": null, "professional": "", "date": "2025-06-10"}))
        );
    }

    #[test]
    fn test_partial_merge_create_applies_defaults() {
        let created = STUDENTS.build_new("1", &fields(json!({"name": "Lia", "age": 9})));
        assert_eq!(
            created,
            record(json!({
                "id": "1",
                "name": "Lia",
                "age": 9,
                "grade": "",
                "email": "",
                "status": "active"
            }))
        );
    }

    #[test]
    fn test_partial_merge_create_falsy_falls_back_to_default() {
        let created = EVENTS_SCHEDULED.build_new("4", &fields(json!({"status": "", "title": 0})));
        assert_eq!(created.get("status"), Some(&json!("scheduled")));
        assert_eq!(created.get("title"), Some(&json!("")));
    }

    #[test]
    fn test_create_ignores_unknown_fields_and_supplied_id() {
        let created = TEACHERS.build_new(
            "2",
            &fields(json!({"id": "99", "name": "Rui", "salary": 1000})),
        );
        assert!(created.has_id("2"));
        assert!(created.get("salary").is_none());
    }

    #[test]
    fn test_create_field_order_follows_schema() {
        let created = EVENTS_SCHEDULED.build_new(
            "1",
            &fields(json!({"status": "done", "description": "d", "title": "t"})),
        );
        let value = serde_json::to_value(&created).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["id", "title", "date", "location", "description", "status"]);
    }

    #[test]
    fn test_partial_merge_update_ignores_falsy() {
        let existing = record(json!({"id": "1", "status": "active", "name": "X"}));
        let updated = PROFESSIONALS_DIRECTORY.apply_update(
            &existing,
            "1",
            &fields(json!({"status": "", "name": "Y"})),
        );
        assert_eq!(
            updated,
            record(json!({"id": "1", "status": "active", "name": "Y"}))
        );
    }

    #[test]
    fn test_partial_merge_update_keeps_extra_and_absent_fields() {
        let existing = record(json!({"id": "1", "name": "X", "legacy": true}));
        let updated = TEACHERS.apply_update(&existing, "1", &fields(json!({"subject": "Math"})));
        assert_eq!(
            updated,
            record(json!({"id": "1", "name": "X", "legacy": true, "subject": "Math"}))
        );
        assert!(updated.get("email").is_none());
    }

    #[test]
    fn test_replace_update_drops_unsent_fields() {
        let existing = record(json!({
            "id": "1",
            "patient": "A",
            "professional": "B",
            "date": "d",
            "time": "t"
        }));
        let updated = APPOINTMENTS.apply_update(&existing, "1", &fields(json!({"patient": "C"})));
        assert_eq!(updated, record(json!({"id": "1", "patient": "C"})));
    }

    #[test]
    fn test_replace_update_uses_path_id() {
        let existing = record(json!({"id": "5", "nome": "Ana"}));
        let updated = USERS.apply_update(&existing, "5", &fields(json!({"id": "6", "nome": "Bia"})));
        assert_eq!(updated, record(json!({"id": "5", "nome": "Bia"})));
    }

    #[test]
    fn test_layouts_select_schemas() {
        assert_eq!(ProfessionalsLayout::default().schema().mode, UpdateMode::PartialMerge);
        assert_eq!(ProfessionalsLayout::Contact.schema(), &PROFESSIONALS_CONTACT);
        assert_eq!(EventsLayout::default().schema(), &EVENTS_SCHEDULED);
        assert_eq!(EventsLayout::Agenda.schema().mode, UpdateMode::Replace);
    }

    #[test]
    fn test_update_mode_display() {
        assert_eq!(UpdateMode::Replace.to_string(), "replace");
        assert_eq!(UpdateMode::PartialMerge.to_string(), "partial_merge");
    }
}
