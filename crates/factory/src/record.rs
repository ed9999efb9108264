//! Synthesized records, identifiers and attribute merging

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{FactoryError, FactoryResult};

/// Identifier assigned to a record by a [`RecordStore`](crate::RecordStore)
pub type RecordId = u64;

/// Free-form field mapping used for explicit attributes and partial states
pub type Attributes = Map<String, Value>;

/// Trait for models that carry a store-assigned identifier
pub trait HasId {
    fn id(&self) -> Option<RecordId>;

    fn set_id(&mut self, id: RecordId);
}

/// How a foreign key field is filled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForeignKey {
    /// Use an identifier supplied by the caller
    Existing(RecordId),
    /// Create a fresh related record
    Create,
}

impl ForeignKey {
    /// Read the pin for `field` of a `kind` record. A pin that is present
    /// must be an unsigned integer id.
    pub fn from_attribute(kind: &str, field: &str, value: Option<&Value>) -> FactoryResult<Self> {
        match value {
            None => Ok(ForeignKey::Create),
            Some(pinned) => match pinned.as_u64() {
                Some(id) => Ok(ForeignKey::Existing(id)),
                None => Err(FactoryError::InvalidAttribute {
                    kind: kind.to_string(),
                    source: serde::de::Error::custom(format!(
                        "foreign key `{}` must be an unsigned integer id, got {}",
                        field,
                        json_type_name(pinned)
                    )),
                }),
            },
        }
    }
}

/// Field mapping produced for one entity instance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthesizedRecord {
    kind: String,
    fields: Map<String, Value>,
}

impl SynthesizedRecord {
    pub fn new(kind: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            kind: kind.into(),
            fields,
        }
    }

    /// Serialize a typed model into a record
    pub fn from_model<M: Serialize>(kind: &str, model: &M) -> FactoryResult<Self> {
        match serde_json::to_value(model)? {
            Value::Object(fields) => Ok(Self::new(kind, fields)),
            other => Err(FactoryError::InvalidAttribute {
                kind: kind.to_string(),
                source: serde::ser::Error::custom(format!(
                    "model serialized to {} instead of an object",
                    json_type_name(&other)
                )),
            }),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn id(&self) -> Option<RecordId> {
        self.fields.get("id").and_then(Value::as_u64)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }

    /// Deserialize the record back into its typed model
    pub fn to_model<M: DeserializeOwned>(&self) -> FactoryResult<M> {
        serde_json::from_value(Value::Object(self.fields.clone())).map_err(|source| {
            FactoryError::InvalidAttribute {
                kind: self.kind.clone(),
                source,
            }
        })
    }
}

/// Overwrite fields of `model` with `attributes`, going through serde so the
/// model's field names and types are enforced
pub fn merge_attributes<M>(kind: &str, model: &mut M, attributes: &Attributes) -> FactoryResult<()>
where
    M: Serialize + DeserializeOwned,
{
    if attributes.is_empty() {
        return Ok(());
    }

    let mut value = serde_json::to_value(&*model)?;
    if let Value::Object(fields) = &mut value {
        for (key, v) in attributes {
            fields.insert(key.clone(), v.clone());
        }
    }

    *model = serde_json::from_value(value).map_err(|source| FactoryError::InvalidAttribute {
        kind: kind.to_string(),
        source,
    })?;
    Ok(())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
