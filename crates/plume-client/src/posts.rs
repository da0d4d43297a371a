use serde::Serialize;
use tracing::info;

use plume_types::api::{CreatePostRequest, PostList, UpdatePostRequest};
use plume_types::models::{Post, PostStatus};

use crate::error::ClientError;
use crate::http::ApiClient;

#[derive(Debug, Default, Serialize)]
struct ListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<PostStatus>,
}

pub async fn list(client: &ApiClient, status: Option<PostStatus>) -> Result<Vec<Post>, ClientError> {
    let list: PostList = client.get_query("/posts", &ListQuery { status }).await?;
    Ok(list.posts)
}

pub async fn get(client: &ApiClient, id: &str) -> Result<Post, ClientError> {
    client.get(&format!("/posts/{}", id)).await
}

pub async fn create(client: &ApiClient, req: &CreatePostRequest) -> Result<Post, ClientError> {
    let post: Post = client.post("/posts", req).await?;
    info!(post_id = %post.id, networks = ?post.networks, "Post created");
    Ok(post)
}

pub async fn update(client: &ApiClient, id: &str, req: &UpdatePostRequest) -> Result<Post, ClientError> {
    client.put(&format!("/posts/{}", id), req).await
}

pub async fn delete(client: &ApiClient, id: &str) -> Result<(), ClientError> {
    client.delete(&format!("/posts/{}", id)).await?;
    info!(post_id = %id, "Post deleted");
    Ok(())
}
