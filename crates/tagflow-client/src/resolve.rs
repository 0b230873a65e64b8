use async_trait::async_trait;

use tagflow_core::Resolver;
use tagflow_model::EntityId;

use crate::transport::CatalogClient;

/// The controller's resolver seam, backed by the tag operations.
#[async_trait]
impl Resolver for CatalogClient {
    async fn find_or_create(&self, name: &str) -> Option<EntityId> {
        self.find_or_create_tag(name).await
    }
}
