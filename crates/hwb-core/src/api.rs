use async_trait::async_trait;

use crate::Result;

/// Port for the homework review API.
///
/// Result contract:
/// - `Ok(Some(json))`: the endpoint answered 200 with a JSON body.
/// - `Ok(None)`: the request never completed or the body was not JSON (already logged).
/// - `Err(Error::Protocol)`: the endpoint answered with a non-200 status.
#[async_trait]
pub trait HomeworkApi: Send + Sync {
    async fn homework_statuses(&self, from_date: i64) -> Result<Option<serde_json::Value>>;
}
