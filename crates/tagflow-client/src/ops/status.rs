//! Server connectivity check.

use serde_json::{Value, json};
use tracing::debug;

use crate::error::{ClientError, ClientResult};
use crate::transport::CatalogClient;

const SYSTEM_STATUS_QUERY: &str = "query { systemStatus { databaseSchema } }";

impl CatalogClient {
    /// Verify the server is reachable and answering GraphQL. Returns the
    /// reported database schema version.
    pub async fn check_connection(&self) -> ClientResult<i64> {
        let data = self.execute(SYSTEM_STATUS_QUERY, json!({})).await?;
        let schema = data
            .get("systemStatus")
            .and_then(|s| s.get("databaseSchema"))
            .and_then(Value::as_i64)
            .ok_or_else(|| {
                ClientError::Decode("missing systemStatus.databaseSchema".to_string())
            })?;
        debug!(schema, "catalog connection verified");
        Ok(schema)
    }
}
