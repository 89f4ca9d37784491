use crate::error::AppError;
use crate::error::AppResult;
use crate::middleware::{AuthUser, OptionalAuthUser};
use crate::response::{ApiResponse, PageQuery, PaginatedResponse};
use crate::services::feed::{FeedItem, FeedService};
use crate::services::post::{PostDetail, PostInput, PostService};
use axum::{extract::Path, extract::Query, response::IntoResponse, Extension, Json};
use chrono::NaiveDateTime;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePostRequest {
    /// Post title (1-256 characters)
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    /// Post body
    #[validate(length(min = 1))]
    pub text: String,
    /// Publish timestamp; a future value schedules the post
    pub pub_date: NaiveDateTime,
    /// Category ID
    pub category_id: Option<i32>,
    /// Location ID
    pub location_id: Option<i32>,
    /// Image URL (max 500 characters)
    #[validate(length(max = 500))]
    pub image_url: Option<String>,
}

impl From<CreatePostRequest> for PostInput {
    fn from(r: CreatePostRequest) -> Self {
        Self {
            title: r.title,
            text: r.text,
            pub_date: r.pub_date,
            category_id: r.category_id,
            location_id: r.location_id,
            image_url: r.image_url,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryBrief {
    pub id: i32,
    pub title: String,
    pub slug: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LocationBrief {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PostResponse {
    /// Post ID
    pub id: i32,
    /// Author user ID
    pub author_id: i32,
    /// Author username
    pub author_username: String,
    /// Post title
    pub title: String,
    /// Post body
    pub text: String,
    /// Publish timestamp
    pub pub_date: String,
    /// Published flag (authors see their own drafts)
    pub is_published: bool,
    /// Image URL
    pub image_url: Option<String>,
    /// Category, if any
    pub category: Option<CategoryBrief>,
    /// Location, if any
    pub location: Option<LocationBrief>,
    /// Creation timestamp
    pub created_at: String,
    /// Derived comment count
    pub comment_count: i64,
}

impl From<FeedItem> for PostResponse {
    fn from(item: FeedItem) -> Self {
        let category = match (item.category_id, item.category_title, item.category_slug) {
            (Some(id), Some(title), Some(slug)) => Some(CategoryBrief { id, title, slug }),
            _ => None,
        };
        let location = match (item.location_id, item.location_name) {
            (Some(id), Some(name)) => Some(LocationBrief { id, name }),
            _ => None,
        };
        Self {
            id: item.id,
            author_id: item.author_id,
            author_username: item.author_username,
            title: item.title,
            text: item.text,
            pub_date: item.pub_date.to_string(),
            is_published: item.is_published,
            image_url: item.image_url,
            category,
            location,
            created_at: item.created_at.to_string(),
            comment_count: item.comment_count,
        }
    }
}

impl PostResponse {
    pub fn from_detail(detail: PostDetail, author_username: String) -> Self {
        let PostDetail {
            post,
            category,
            location,
            comment_count,
        } = detail;
        Self {
            id: post.id,
            author_id: post.author_id,
            author_username,
            title: post.title,
            text: post.text,
            pub_date: post.pub_date.to_string(),
            is_published: post.is_published,
            image_url: post.image_url,
            category: category.map(|c| CategoryBrief {
                id: c.id,
                title: c.title,
                slug: c.slug,
            }),
            location: location.map(|l| LocationBrief {
                id: l.id,
                name: l.name,
            }),
            created_at: post.created_at.to_string(),
            comment_count: comment_count as i64,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/posts",
    params(("page" = Option<i64>, Query, description = "Page number (out-of-range values clamp)")),
    responses(
        (status = 200, description = "Global feed", body = PaginatedResponse<PostResponse>),
    ),
    tag = "posts"
)]
pub async fn list_posts(
    Extension(db): Extension<DatabaseConnection>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    Query(params): Query<PageQuery>,
) -> AppResult<impl IntoResponse> {
    let now = chrono::Utc::now().naive_utc();

    let service = FeedService::new(db);
    let page = service
        .global(viewer, now, params.page.unwrap_or(1))
        .await?;

    let items: Vec<PostResponse> = page.items.into_iter().map(PostResponse::from).collect();
    Ok(ApiResponse::ok(PaginatedResponse::new(
        items,
        page.total,
        page.page,
        page.per_page,
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/{id}",
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post details", body = PostResponse),
        (status = 404, description = "Post not found or not visible", body = AppError),
    ),
    tag = "posts"
)]
pub async fn get_post(
    Extension(db): Extension<DatabaseConnection>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let now = chrono::Utc::now().naive_utc();

    let service = PostService::new(db.clone());
    let detail = service.get_visible(id, viewer, now).await?;

    let author = crate::services::auth::AuthService::new(db)
        .get_user_by_id(detail.post.author_id)
        .await?;

    Ok(ApiResponse::ok(PostResponse::from_detail(
        detail,
        author.username,
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/posts",
    security(("jwt_token" = [])),
    request_body = CreatePostRequest,
    responses(
        (status = 200, description = "Post created", body = PostResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "posts"
)]
pub async fn create_post(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(payload): Json<CreatePostRequest>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;

    let now = chrono::Utc::now().naive_utc();

    let service = PostService::new(db.clone());
    let post = service.create(auth_user.user_id, payload.into()).await?;

    // Re-read through the visibility path; the author always sees it.
    let detail = service
        .get_visible(post.id, Some(auth_user.user_id), now)
        .await?;
    let author = crate::services::auth::AuthService::new(db)
        .get_user_by_id(auth_user.user_id)
        .await?;

    Ok(ApiResponse::ok(PostResponse::from_detail(
        detail,
        author.username,
    )))
}

#[utoipa::path(
    put,
    path = "/api/v1/posts/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Post ID")),
    request_body = CreatePostRequest,
    responses(
        (status = 200, description = "Post updated", body = PostResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
        (status = 403, description = "Not the author", body = AppError),
        (status = 404, description = "Post not found", body = AppError),
    ),
    tag = "posts"
)]
pub async fn update_post(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<CreatePostRequest>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;

    let now = chrono::Utc::now().naive_utc();

    let service = PostService::new(db.clone());
    let post = service.update(id, auth_user.user_id, payload.into()).await?;

    let detail = service
        .get_visible(post.id, Some(auth_user.user_id), now)
        .await?;
    let author = crate::services::auth::AuthService::new(db)
        .get_user_by_id(auth_user.user_id)
        .await?;

    Ok(ApiResponse::ok(PostResponse::from_detail(
        detail,
        author.username,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/v1/posts/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post deleted", body = String),
        (status = 401, description = "Unauthorized", body = AppError),
        (status = 403, description = "Not the author", body = AppError),
        (status = 404, description = "Post not found", body = AppError),
    ),
    tag = "posts"
)]
pub async fn delete_post(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = PostService::new(db);
    service.delete(id, auth_user.user_id).await?;

    Ok(ApiResponse::ok("Post deleted"))
}
