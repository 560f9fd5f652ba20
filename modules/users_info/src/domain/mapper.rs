//! External random-user records → internal user records.
//!
//! Mapping happens in two steps. [`map_external`] walks the field table and
//! produces a flat JSON object that never fails; `User::try_from` then turns
//! that object into a typed [`User`], rejecting records with missing or
//! mistyped fields.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::contract::model::{normalize_email, Gender, User};
use crate::domain::ids::IdGenerator;
use crate::domain::schema::FieldPath;

/// Follow a dot-separated `path` into `record`.
///
/// Returns `None` as soon as a segment is missing or the current value is not
/// an object.
pub fn resolve_path<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(record, |current, segment| current.as_object()?.get(segment))
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Flatten `record` according to `fields`.
///
/// Unresolvable fields map to `null`. A falsy `id` is replaced with one drawn
/// from `ids`.
pub fn map_external(
    record: &Value,
    fields: &[FieldPath],
    ids: &dyn IdGenerator,
) -> Map<String, Value> {
    let mut flat = Map::new();
    for f in fields {
        let value = match f.path {
            Some(path) => resolve_path(record, path),
            None => record.get(f.field),
        };
        flat.insert(f.field.to_string(), value.cloned().unwrap_or(Value::Null));
    }

    if flat.get("id").map_or(true, is_falsy) {
        flat.insert("id".to_string(), Value::String(ids.next_id()));
    }
    flat
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("external record has no '{0}'")]
    Missing(&'static str),
    #[error("external record has an unusable '{field}': {value}")]
    Invalid { field: &'static str, value: String },
}

fn text(flat: &Map<String, Value>, field: &'static str) -> Result<String, MappingError> {
    match flat.get(field) {
        None | Some(Value::Null) => Err(MappingError::Missing(field)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(MappingError::Invalid {
            field,
            value: other.to_string(),
        }),
    }
}

fn age(flat: &Map<String, Value>) -> Result<u32, MappingError> {
    let invalid = |v: &Value| MappingError::Invalid {
        field: "age",
        value: v.to_string(),
    };
    match flat.get("age") {
        None | Some(Value::Null) => Err(MappingError::Missing("age")),
        Some(v @ Value::Number(n)) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| invalid(v)),
        Some(v @ Value::String(s)) => s.trim().parse().map_err(|_| invalid(v)),
        Some(v) => Err(invalid(v)),
    }
}

impl TryFrom<&Map<String, Value>> for User {
    type Error = MappingError;

    fn try_from(flat: &Map<String, Value>) -> Result<Self, Self::Error> {
        let gender_raw = text(flat, "gender")?;
        let gender = gender_raw
            .parse::<Gender>()
            .map_err(|value| MappingError::Invalid {
                field: "gender",
                value,
            })?;

        let address = format!(
            "{} {} {} {}",
            text(flat, "streetNumber")?,
            text(flat, "streetName")?,
            text(flat, "city")?,
            text(flat, "state")?,
        );

        Ok(User {
            id: text(flat, "id")?,
            title: text(flat, "title")?,
            first_name: text(flat, "firstName")?,
            last_name: text(flat, "lastName")?,
            gender,
            age: age(flat)?,
            address,
            country: text(flat, "country")?,
            email: normalize_email(&text(flat, "email")?),
            phone: text(flat, "phone")?,
            picture: text(flat, "picture")?,
            thumbnail: text(flat, "thumbnail")?,
        })
    }
}
