//! Studio lookup and creation.

use serde_json::json;
use tracing::{debug, info, warn};

use tagflow_model::EntityId;

use crate::error::ClientResult;
use crate::ops::created_id;
use crate::ops::performers::first_named_match;
use crate::transport::CatalogClient;

const FIND_STUDIOS_QUERY: &str = r#"
query FindStudios($filter: FindFilterType) {
    findStudios(filter: $filter) {
        studios {
            id
            name
        }
    }
}"#;

const STUDIO_CREATE_MUTATION: &str = r#"
mutation StudioCreate($input: StudioCreateInput!) {
    studioCreate(input: $input) {
        id
        name
    }
}"#;

impl CatalogClient {
    pub async fn find_studio(&self, name: &str) -> ClientResult<Option<EntityId>> {
        let variables = json!({ "filter": { "q": name, "per_page": 10 } });
        let data = self.execute(FIND_STUDIOS_QUERY, variables).await?;
        Ok(first_named_match(&data, "findStudios", "studios", name))
    }

    pub async fn create_studio(&self, name: &str) -> ClientResult<EntityId> {
        let variables = json!({ "input": { "name": name } });
        let data = self.execute(STUDIO_CREATE_MUTATION, variables).await?;
        created_id(&data, "studioCreate")
    }

    /// Lookup first, create on miss; failures collapse to `None` (logged).
    pub async fn find_or_create_studio(&self, name: &str) -> Option<EntityId> {
        match self.find_studio(name).await {
            Ok(Some(id)) => {
                debug!(studio = name, id = %id, "studio already present");
                Some(id)
            }
            Ok(None) => match self.create_studio(name).await {
                Ok(id) => {
                    info!(studio = name, id = %id, "studio created");
                    Some(id)
                }
                Err(e) => {
                    warn!(studio = name, error = %e, "studio creation failed");
                    None
                }
            },
            Err(e) => {
                warn!(studio = name, error = %e, "studio lookup failed");
                None
            }
        }
    }
}
