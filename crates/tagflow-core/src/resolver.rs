use async_trait::async_trait;

use tagflow_model::EntityId;

/// Name-indexed find-or-create against the remote catalog.
///
/// Implementations look the name up first and create only on a miss. The
/// composition is not atomic: two processes racing on the same unseen name
/// can both miss and both create, and nothing here reconciles that. Within
/// a single run the controller serializes resolution per distinct name, so
/// the race only exists across runs.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Resolve `name` to an entity id, creating the entity on a miss.
    ///
    /// `None` covers both "could not be created" and any transport or
    /// application failure; callers treat absence and error identically,
    /// and implementations are expected to log the distinction.
    async fn find_or_create(&self, name: &str) -> Option<EntityId>;
}
