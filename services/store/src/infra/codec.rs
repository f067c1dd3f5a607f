//! Entity codec: typed records to and from the table attribute bag.
//!
//! Records serialize with camelCase field names and carry `partitionKey` and
//! `rowKey`. On the wire those become `PartitionKey` and `RowKey`, nulls become
//! `""`, scalars pass through and nested values are stored as JSON strings.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use campus_domain::id::is_valid_key;

use crate::error::StoreError;

pub const PARTITION_KEY: &str = "PartitionKey";
pub const ROW_KEY: &str = "RowKey";

const RECORD_PARTITION_KEY: &str = "partitionKey";
const RECORD_ROW_KEY: &str = "rowKey";

/// Server-managed property that is never written back.
const TIMESTAMP: &str = "Timestamp";

/// One stored entity: identity pair plus scalar attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub partition_key: String,
    pub row_key: String,
    pub attributes: Map<String, Value>,
}

impl Entity {
    pub fn new(partition_key: impl Into<String>, row_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            row_key: row_key.into(),
            attributes: Map::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.to_owned(), value.into());
        self
    }

    /// Attribute lookup that also resolves the identity keys.
    pub fn attribute(&self, key: &str) -> Option<Value> {
        match key {
            PARTITION_KEY => Some(Value::String(self.partition_key.clone())),
            ROW_KEY => Some(Value::String(self.row_key.clone())),
            _ => self.attributes.get(key).cloned(),
        }
    }

    /// Wire JSON object sent to the table service.
    pub fn to_wire(&self) -> Value {
        let mut object = Map::with_capacity(self.attributes.len() + 2);
        object.insert(
            PARTITION_KEY.to_owned(),
            Value::String(self.partition_key.clone()),
        );
        object.insert(ROW_KEY.to_owned(), Value::String(self.row_key.clone()));
        for (key, value) in &self.attributes {
            object.insert(key.clone(), value.clone());
        }
        Value::Object(object)
    }

    /// Parse one wire JSON object returned by the table service.
    pub fn from_wire(value: Value) -> Result<Self, StoreError> {
        let Value::Object(mut object) = value else {
            return Err(StoreError::Encoding("entity is not a JSON object".to_owned()));
        };
        let partition_key = take_key(&mut object, PARTITION_KEY)?;
        let row_key = take_key(&mut object, ROW_KEY)?;
        object.retain(|key, _| !is_metadata(key));
        Ok(Self {
            partition_key,
            row_key,
            attributes: object,
        })
    }
}

/// Encode a record into an entity.
///
/// Fails with [`StoreError::Encoding`] when the identity fields are missing,
/// empty or contain characters the table service rejects.
pub fn encode<T: Serialize>(record: &T) -> Result<Entity, StoreError> {
    let value = serde_json::to_value(record)
        .map_err(|e| StoreError::Encoding(format!("serialize record: {e}")))?;
    let Value::Object(object) = value else {
        return Err(StoreError::Encoding("record is not a JSON object".to_owned()));
    };

    let mut partition_key = None;
    let mut row_key = None;
    let mut attributes = Map::with_capacity(object.len());
    for (key, value) in object {
        if is_metadata(&key) {
            continue;
        }
        match key.as_str() {
            RECORD_PARTITION_KEY | PARTITION_KEY => partition_key = value.as_str().map(str::to_owned),
            RECORD_ROW_KEY | ROW_KEY => row_key = value.as_str().map(str::to_owned),
            _ => {
                attributes.insert(key, flatten(value)?);
            }
        }
    }

    let partition_key = require_key(partition_key, PARTITION_KEY)?;
    let row_key = require_key(row_key, ROW_KEY)?;
    Ok(Entity {
        partition_key,
        row_key,
        attributes,
    })
}

/// Decode an entity back into a record.
pub fn decode<T: DeserializeOwned>(entity: Entity) -> Result<T, StoreError> {
    let mut object = entity.attributes;
    object.insert(
        RECORD_PARTITION_KEY.to_owned(),
        Value::String(entity.partition_key),
    );
    object.insert(RECORD_ROW_KEY.to_owned(), Value::String(entity.row_key));
    serde_json::from_value(Value::Object(object))
        .map_err(|e| StoreError::Encoding(format!("decode entity: {e}")))
}

fn flatten(value: Value) -> Result<Value, StoreError> {
    Ok(match value {
        Value::Null => Value::String(String::new()),
        Value::Bool(_) | Value::Number(_) | Value::String(_) => value,
        nested @ (Value::Array(_) | Value::Object(_)) => Value::String(
            serde_json::to_string(&nested)
                .map_err(|e| StoreError::Encoding(format!("serialize nested value: {e}")))?,
        ),
    })
}

fn is_metadata(key: &str) -> bool {
    key.starts_with("odata.") || key == TIMESTAMP
}

fn require_key(key: Option<String>, name: &str) -> Result<String, StoreError> {
    match key {
        Some(key) if is_valid_key(&key) => Ok(key),
        Some(key) if !key.is_empty() => Err(StoreError::Encoding(format!(
            "{name} contains reserved characters: {key:?}"
        ))),
        _ => Err(StoreError::Encoding(format!("missing {name}"))),
    }
}

fn take_key(object: &mut Map<String, Value>, name: &str) -> Result<String, StoreError> {
    match object.remove(name) {
        Some(Value::String(key)) if !key.is_empty() => Ok(key),
        _ => Err(StoreError::Encoding(format!("missing {name}"))),
    }
}
