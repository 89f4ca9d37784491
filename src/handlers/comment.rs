use crate::error::AppError;
use crate::error::AppResult;
use crate::middleware::{AuthUser, OptionalAuthUser};
use crate::models::{CommentModel, UserModel};
use crate::response::ApiResponse;
use crate::services::comment::CommentService;
use crate::services::post::PostService;
use axum::{extract::Path, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCommentRequest {
    /// Comment text
    #[validate(length(min = 1))]
    pub text: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommentResponse {
    /// Comment ID
    pub id: i32,
    /// Post ID
    pub post_id: i32,
    /// Author user ID
    pub author_id: i32,
    /// Author username
    pub author_username: Option<String>,
    /// Comment text
    pub text: String,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl CommentResponse {
    fn new(comment: CommentModel, author: Option<UserModel>) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            author_id: comment.author_id,
            author_username: author.map(|u| u.username),
            text: comment.text,
            created_at: comment.created_at.to_string(),
            updated_at: comment.updated_at.to_string(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/{post_id}/comments",
    params(("post_id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Comments oldest-first", body = [CommentResponse]),
        (status = 404, description = "Post not found or not visible", body = AppError),
    ),
    tag = "comments"
)]
pub async fn list_comments(
    Extension(db): Extension<DatabaseConnection>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    Path(post_id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let now = chrono::Utc::now().naive_utc();

    // Comments on an invisible post are as invisible as the post.
    PostService::new(db.clone())
        .get_visible(post_id, viewer, now)
        .await?;

    let service = CommentService::new(db);
    let comments = service.list_by_post(post_id).await?;

    let items: Vec<CommentResponse> = comments
        .into_iter()
        .map(|(comment, author)| CommentResponse::new(comment, author))
        .collect();

    Ok(ApiResponse::ok(items))
}

#[utoipa::path(
    post,
    path = "/api/v1/posts/{post_id}/comments",
    security(("jwt_token" = [])),
    params(("post_id" = i32, Path, description = "Post ID")),
    request_body = CreateCommentRequest,
    responses(
        (status = 200, description = "Comment created", body = CommentResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
        (status = 404, description = "Post not found or not visible", body = AppError),
    ),
    tag = "comments"
)]
pub async fn create_comment(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(post_id): Path<i32>,
    Json(payload): Json<CreateCommentRequest>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;

    let now = chrono::Utc::now().naive_utc();

    let service = CommentService::new(db.clone());
    let comment = service
        .create(post_id, auth_user.user_id, &payload.text, now)
        .await?;

    let author = crate::services::auth::AuthService::new(db)
        .get_user_by_id(auth_user.user_id)
        .await?;

    Ok(ApiResponse::ok(CommentResponse::new(comment, Some(author))))
}

#[utoipa::path(
    put,
    path = "/api/v1/comments/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Comment ID")),
    request_body = CreateCommentRequest,
    responses(
        (status = 200, description = "Comment updated", body = CommentResponse),
        (status = 401, description = "Unauthorized", body = AppError),
        (status = 403, description = "Not the author", body = AppError),
        (status = 404, description = "Comment not found", body = AppError),
    ),
    tag = "comments"
)]
pub async fn update_comment(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<CreateCommentRequest>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;

    let service = CommentService::new(db.clone());
    let comment = service.update(id, auth_user.user_id, &payload.text).await?;

    let author = crate::services::auth::AuthService::new(db)
        .get_user_by_id(auth_user.user_id)
        .await?;

    Ok(ApiResponse::ok(CommentResponse::new(comment, Some(author))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/comments/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Comment deleted", body = String),
        (status = 401, description = "Unauthorized", body = AppError),
        (status = 403, description = "Not the author", body = AppError),
        (status = 404, description = "Comment not found", body = AppError),
    ),
    tag = "comments"
)]
pub async fn delete_comment(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = CommentService::new(db);
    service.delete(id, auth_user.user_id).await?;

    Ok(ApiResponse::ok("Comment deleted"))
}
