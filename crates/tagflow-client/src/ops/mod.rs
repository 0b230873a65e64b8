//! Catalog operations, one module per entity kind.

mod performers;
mod status;
mod studios;
mod tags;

use serde_json::Value;

use tagflow_model::EntityId;

use crate::error::{ClientError, ClientResult};

/// Extract the id of a freshly created entity from a mutation payload,
/// e.g. `{"tagCreate": {"id": "12"}}`.
fn created_id(data: &Value, field: &str) -> ClientResult<EntityId> {
    data.get(field)
        .and_then(|entity| entity.get("id"))
        .and_then(Value::as_str)
        .map(EntityId::from)
        .ok_or_else(|| ClientError::Decode(format!("missing {field}.id in mutation response")))
}
