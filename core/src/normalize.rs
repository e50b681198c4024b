//! Post-processing of decoded API payloads.
//!
//! # Design
//! Every helper here is a pure function over explicit arguments: the payload,
//! and the field list or remap table to apply. Resource facades pick the
//! declarative `Recipe` for their resource (see `recipes`) and call
//! `Recipe::apply` on each object; nothing is shared between calls.
//!
//! Normalization turns a JSON object into a `Record`, a map from field name to
//! `Field`. Converted fields become `Field::Timestamp` or `Field::Token`; all
//! other fields stay `Field::Json` exactly as decoded.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{ApiError, NormalizeError};
use crate::timestamp::ApiTimestamp;

/// Reserved key whose presence marks a logical failure.
pub const ERROR_ENVELOPE_KEY: &str = "errors";

/// A single value inside a normalized `Record`.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// Upstream value, untouched.
    Json(Value),
    Timestamp(ApiTimestamp),
    /// Canonical token produced by an `EnumTable`.
    Token(&'static str),
}

impl Serialize for Field {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Field::Json(value) => value.serialize(serializer),
            Field::Timestamp(timestamp) => timestamp.serialize(serializer),
            Field::Token(token) => serializer.serialize_str(token),
        }
    }
}

/// A normalized JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, Field>,
}

impl Record {
    /// Wraps every value of `object` as `Field::Json`.
    pub fn from_object(object: Map<String, Value>) -> Self {
        Self {
            fields: object
                .into_iter()
                .map(|(name, value)| (name, Field::Json(value)))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Raw JSON value of a field that was not converted.
    pub fn json(&self, name: &str) -> Option<&Value> {
        match self.fields.get(name)? {
            Field::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn timestamp(&self, name: &str) -> Option<ApiTimestamp> {
        match self.fields.get(name)? {
            Field::Timestamp(timestamp) => Some(*timestamp),
            _ => None,
        }
    }

    pub fn token(&self, name: &str) -> Option<&'static str> {
        match self.fields.get(name)? {
            Field::Token(token) => Some(*token),
            _ => None,
        }
    }

    /// True when the field is present and JSON `null`.
    pub fn is_null(&self, name: &str) -> bool {
        matches!(self.fields.get(name), Some(Field::Json(Value::Null)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    /// Converts back into plain JSON, rendering timestamps as RFC 3339.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(name, field)| {
                    let value = match field {
                        Field::Json(value) => value.clone(),
                        Field::Timestamp(timestamp) => Value::String(timestamp.format_rfc3339()),
                        Field::Token(token) => Value::String((*token).to_string()),
                    };
                    (name.clone(), value)
                })
                .collect(),
        )
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, field) in &self.fields {
            map.serialize_entry(name, field)?;
        }
        map.end()
    }
}

/// Exhaustive mapping from raw upstream strings to canonical tokens.
#[derive(Debug, PartialEq, Eq)]
pub struct EnumTable {
    pub name: &'static str,
    pub entries: &'static [(&'static str, &'static str)],
}

impl EnumTable {
    pub fn lookup(&self, raw: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(key, _)| *key == raw)
            .map(|(_, token)| *token)
    }
}

/// How a single field of a resource is normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Timestamp,
    Enum(&'static EnumTable),
}

/// Declarative `field -> kind` table for one resource type.
#[derive(Debug, PartialEq, Eq)]
pub struct Recipe {
    pub resource: &'static str,
    pub fields: &'static [(&'static str, FieldKind)],
}

impl Recipe {
    /// Names of every field this recipe converts to a timestamp.
    pub fn timestamp_fields(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|(_, kind)| matches!(kind, FieldKind::Timestamp))
            .map(|(name, _)| *name)
            .collect()
    }

    /// Normalizes one JSON object. Fields missing from `object` are skipped.
    pub fn apply(&self, object: Map<String, Value>) -> Result<Record, NormalizeError> {
        let mut record = convert_datetimes(Record::from_object(object), &self.timestamp_fields())?;

        for (name, kind) in self.fields {
            if let FieldKind::Enum(table) = kind {
                record = remap_field(record, name, table)?;
            }
        }

        Ok(record)
    }

    /// Normalizes a decoded value that must be a JSON object.
    pub fn apply_value(&self, value: Value) -> Result<Record, NormalizeError> {
        match value {
            Value::Object(object) => self.apply(object),
            _ => Err(NormalizeError::NotAnObject {
                context: self.resource.to_string(),
            }),
        }
    }
}

/// Replaces each listed field that is present and non-null with a parsed
/// timestamp.
///
/// Absent fields are skipped and `null` stays `null`. Anything else that does
/// not parse as an API timestamp is an error. Only the top level of `record`
/// is visited.
pub fn convert_datetimes(mut record: Record, fields: &[&str]) -> Result<Record, NormalizeError> {
    for name in fields {
        let Some(field) = record.fields.get_mut(*name) else {
            continue;
        };

        let converted = match field {
            Field::Json(Value::Null) | Field::Timestamp(_) => continue,
            Field::Json(Value::String(raw)) => ApiTimestamp::parse(raw.as_str()).ok_or_else(|| {
                NormalizeError::InvalidTimestamp {
                    field: (*name).to_string(),
                    value: raw.clone(),
                }
            })?,
            Field::Json(other) => {
                return Err(NormalizeError::InvalidTimestamp {
                    field: (*name).to_string(),
                    value: other.to_string(),
                })
            }
            Field::Token(token) => {
                return Err(NormalizeError::InvalidTimestamp {
                    field: (*name).to_string(),
                    value: (*token).to_string(),
                })
            }
        };

        *field = Field::Timestamp(converted);
    }

    Ok(record)
}

/// Looks `value` up in `table`. An unknown value is always an error.
pub fn remap_enum(value: &str, table: &EnumTable) -> Result<&'static str, NormalizeError> {
    table
        .lookup(value)
        .ok_or_else(|| NormalizeError::UnmappedEnumValue {
            table: table.name,
            value: value.to_string(),
        })
}

/// Remaps the string value of `name` through `table`, skipping the field if
/// it is absent.
pub fn remap_field(
    mut record: Record,
    name: &str,
    table: &EnumTable,
) -> Result<Record, NormalizeError> {
    let Some(field) = record.fields.get_mut(name) else {
        return Ok(record);
    };

    let token = match field {
        Field::Token(_) => return Ok(record),
        Field::Json(Value::String(raw)) => remap_enum(raw.as_str(), table)?,
        Field::Json(other) => {
            return Err(NormalizeError::UnmappedEnumValue {
                table: table.name,
                value: other.to_string(),
            })
        }
        Field::Timestamp(timestamp) => {
            return Err(NormalizeError::UnmappedEnumValue {
                table: table.name,
                value: timestamp.to_string(),
            })
        }
    };

    *field = Field::Token(token);
    Ok(record)
}

/// Fails with `ApiError::ExecutionFailure` when `payload` carries a non-empty
/// `errors` block.
///
/// The API can answer 200 (or 400) and still report a failure this way.
pub fn check_for_logical_error(payload: &Value) -> Result<(), ApiError> {
    let Some(errors) = payload.get(ERROR_ENVELOPE_KEY) else {
        return Ok(());
    };

    if is_empty_value(errors) {
        return Ok(());
    }

    tracing::error!(errors = %errors, "response carries an error envelope");
    Err(ApiError::ExecutionFailure {
        errors: Some(errors.clone()),
    })
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Applies `recipe` to every object in the array under `key`.
///
/// A missing key or `null` yields an empty list: the API leaves out empty
/// collections entirely.
pub fn normalize_collection(
    payload: &mut Value,
    key: &str,
    recipe: &Recipe,
) -> Result<Vec<Record>, NormalizeError> {
    match payload.get_mut(key).map(Value::take) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| recipe.apply_value(item))
            .collect(),
        Some(_) => Err(NormalizeError::NotAnObject {
            context: key.to_string(),
        }),
    }
}
