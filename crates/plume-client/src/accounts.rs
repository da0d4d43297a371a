use tracing::info;

use plume_types::models::ConnectedAccount;

use crate::error::ClientError;
use crate::http::ApiClient;

pub async fn connected(client: &ApiClient) -> Result<Vec<ConnectedAccount>, ClientError> {
    client.get("/accounts/connected").await
}

pub async fn disconnect(client: &ApiClient, account_id: &str) -> Result<(), ClientError> {
    client.delete(&format!("/accounts/{}/disconnect", account_id)).await?;
    info!(account_id = %account_id, "Account disconnected");
    Ok(())
}
