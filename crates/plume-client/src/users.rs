use plume_types::api::MeResponse;

use crate::error::ClientError;
use crate::http::ApiClient;

/// `GET /users/me`
pub async fn me(client: &ApiClient) -> Result<MeResponse, ClientError> {
    client.get("/users/me").await
}
