//! Post CRUD handlers.

use actix_web::{HttpResponse, web};

use scribe_core::domain::{NewPost, PostPatch};

use crate::middleware::error::AppResult;
use crate::observability::RequestId;
use crate::state::AppState;

/// POST /posts
pub async fn create(
    state: web::Data<AppState>,
    request_id: RequestId,
    body: web::Json<NewPost>,
) -> AppResult<HttpResponse> {
    let post = state.posts.create(body.into_inner()).await?;
    tracing::info!(request_id = %request_id.as_str(), post_id = %post.id, "Post created");
    Ok(HttpResponse::Ok().json(post))
}

/// GET /posts
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.list().await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// GET /posts/{id}
pub async fn get(state: web::Data<AppState>, id: web::Path<String>) -> AppResult<HttpResponse> {
    let post = state.posts.get(&id).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// PUT /posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    request_id: RequestId,
    id: web::Path<String>,
    body: web::Json<PostPatch>,
) -> AppResult<HttpResponse> {
    let post = state.posts.update(&id, body.into_inner()).await?;
    tracing::info!(request_id = %request_id.as_str(), post_id = %post.id, "Post updated");
    Ok(HttpResponse::Ok().json(post))
}

/// DELETE /posts/{id}
pub async fn delete(
    state: web::Data<AppState>,
    request_id: RequestId,
    id: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post = state.posts.delete(&id).await?;
    tracing::info!(request_id = %request_id.as_str(), post_id = %post.id, "Post deleted");
    Ok(HttpResponse::Ok().json(post))
}
