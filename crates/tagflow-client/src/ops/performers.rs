//! Performer lookup and creation.

use serde_json::{Value, json};
use tracing::{debug, info, warn};

use tagflow_model::EntityId;

use crate::error::ClientResult;
use crate::ops::created_id;
use crate::transport::CatalogClient;

const FIND_PERFORMERS_QUERY: &str = r#"
query FindPerformers($filter: FindFilterType) {
    findPerformers(filter: $filter) {
        performers {
            id
            name
        }
    }
}"#;

const PERFORMER_CREATE_MUTATION: &str = r#"
mutation PerformerCreate($input: PerformerCreateInput!) {
    performerCreate(input: $input) {
        id
        name
    }
}"#;

impl CatalogClient {
    /// Free-text search narrowed to an exact (case-insensitive) name match.
    pub async fn find_performer(&self, name: &str) -> ClientResult<Option<EntityId>> {
        let variables = json!({ "filter": { "q": name, "per_page": 10 } });
        let data = self.execute(FIND_PERFORMERS_QUERY, variables).await?;
        Ok(first_named_match(&data, "findPerformers", "performers", name))
    }

    pub async fn create_performer(&self, name: &str) -> ClientResult<EntityId> {
        let variables = json!({ "input": { "name": name } });
        let data = self.execute(PERFORMER_CREATE_MUTATION, variables).await?;
        created_id(&data, "performerCreate")
    }

    /// Lookup first, create on miss; failures collapse to `None` (logged).
    pub async fn find_or_create_performer(&self, name: &str) -> Option<EntityId> {
        match self.find_performer(name).await {
            Ok(Some(id)) => {
                debug!(performer = name, id = %id, "performer already present");
                Some(id)
            }
            Ok(None) => match self.create_performer(name).await {
                Ok(id) => {
                    info!(performer = name, id = %id, "performer created");
                    Some(id)
                }
                Err(e) => {
                    warn!(performer = name, error = %e, "performer creation failed");
                    None
                }
            },
            Err(e) => {
                warn!(performer = name, error = %e, "performer lookup failed");
                None
            }
        }
    }
}

/// First entity under `data.{root}.{list}` whose name equals `name`
/// case-insensitively.
pub(super) fn first_named_match(
    data: &Value,
    root: &str,
    list: &str,
    name: &str,
) -> Option<EntityId> {
    let entries = data.get(root)?.get(list)?.as_array()?;
    entries
        .iter()
        .find(|e| {
            e.get("name")
                .and_then(Value::as_str)
                .is_some_and(|n| n.eq_ignore_ascii_case(name))
        })
        .and_then(|e| e.get("id").and_then(Value::as_str))
        .map(EntityId::from)
}
