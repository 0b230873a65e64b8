//! Tag lookup and creation.

use serde_json::{Value, json};
use tracing::{debug, info, warn};

use tagflow_model::{EntityId, RemoteTag};

use crate::error::ClientResult;
use crate::ops::created_id;
use crate::transport::CatalogClient;

const FIND_TAGS_QUERY: &str = r#"
query FindTags($filter: FindFilterType, $tag_filter: TagFilterType) {
    findTags(filter: $filter, tag_filter: $tag_filter) {
        count
        tags {
            id
            name
            aliases
        }
    }
}"#;

const TAG_CREATE_MUTATION: &str = r#"
mutation TagCreate($input: TagCreateInput!) {
    tagCreate(input: $input) {
        id
        name
    }
}"#;

impl CatalogClient {
    /// Look a tag up by display name or alias, equality match, requesting
    /// all results. Returns the first match's id.
    pub async fn find_tag(&self, name: &str) -> ClientResult<Option<EntityId>> {
        let variables = json!({
            "filter": { "per_page": -1 },
            "tag_filter": {
                "name": { "value": name, "modifier": "EQUALS" },
                "OR": { "aliases": { "value": name, "modifier": "EQUALS" } }
            }
        });

        let data = self.execute(FIND_TAGS_QUERY, variables).await?;
        Ok(first_tag_match(&data, name))
    }

    /// Create a tag with the given name, returning the new id.
    pub async fn create_tag(&self, name: &str) -> ClientResult<EntityId> {
        let variables = json!({ "input": { "name": name } });
        let data = self.execute(TAG_CREATE_MUTATION, variables).await?;
        created_id(&data, "tagCreate")
    }

    /// Lookup first, create on miss. Not atomic: two racers on the same
    /// unseen name can both miss and both create; the catalog decides what
    /// happens then. Any failure is logged and collapsed to `None`.
    pub async fn find_or_create_tag(&self, name: &str) -> Option<EntityId> {
        match self.find_tag(name).await {
            Ok(Some(id)) => {
                debug!(tag = name, id = %id, "tag already present");
                Some(id)
            }
            Ok(None) => match self.create_tag(name).await {
                Ok(id) => {
                    info!(tag = name, id = %id, "tag created");
                    Some(id)
                }
                Err(e) => {
                    warn!(tag = name, error = %e, "tag creation failed");
                    None
                }
            },
            Err(e) => {
                warn!(tag = name, error = %e, "tag lookup failed");
                None
            }
        }
    }
}

/// First tag in a `findTags` payload whose name or alias matches `name`.
fn first_tag_match(data: &Value, name: &str) -> Option<EntityId> {
    let tags = data.get("findTags")?.get("tags")?.as_array()?;
    tags.iter()
        .filter_map(|t| serde_json::from_value::<RemoteTag>(t.clone()).ok())
        .find(|t| t.matches_name(name))
        .map(|t| t.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn picks_first_matching_tag() {
        let data = json!({
            "findTags": {
                "count": 2,
                "tags": [
                    {"id": "1", "name": "Blonde Hair", "aliases": []},
                    {"id": "2", "name": "blonde", "aliases": ["blond"]}
                ]
            }
        });
        assert_eq!(first_tag_match(&data, "blonde"), Some(EntityId::new("2")));
    }

    #[test]
    fn matches_via_alias() {
        let data = json!({
            "findTags": {
                "count": 1,
                "tags": [{"id": "3", "name": "blonde", "aliases": ["blond"]}]
            }
        });
        assert_eq!(first_tag_match(&data, "BLOND"), Some(EntityId::new("3")));
    }

    #[test]
    fn no_match_yields_none() {
        let data = json!({"findTags": {"count": 0, "tags": []}});
        assert_eq!(first_tag_match(&data, "blonde"), None);
    }

    #[test]
    fn malformed_payload_yields_none() {
        assert_eq!(first_tag_match(&json!({}), "blonde"), None);
        assert_eq!(first_tag_match(&json!(null), "blonde"), None);
    }
}
