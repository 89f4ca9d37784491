use crate::error::AppError;
use crate::error::AppResult;
use crate::middleware::OptionalAuthUser;
use crate::models::CategoryModel;
use crate::response::{ApiResponse, PageQuery, PaginatedResponse};
use crate::services::category::CategoryService;
use crate::services::feed::FeedService;
use axum::{extract::Path, extract::Query, response::IntoResponse, Extension};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use utoipa::ToSchema;

use super::post::PostResponse;

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryResponse {
    /// Category ID
    pub id: i32,
    /// Category title
    pub title: String,
    /// Description
    pub description: String,
    /// URL slug
    pub slug: String,
    /// Creation timestamp
    pub created_at: String,
}

impl From<CategoryModel> for CategoryResponse {
    fn from(c: CategoryModel) -> Self {
        Self {
            id: c.id,
            title: c.title,
            description: c.description,
            slug: c.slug,
            created_at: c.created_at.to_string(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/categories",
    responses(
        (status = 200, description = "Published categories", body = [CategoryResponse]),
    ),
    tag = "categories"
)]
pub async fn list_categories(
    Extension(db): Extension<DatabaseConnection>,
) -> AppResult<impl IntoResponse> {
    let service = CategoryService::new(db);
    let categories = service.list_published().await?;

    let items: Vec<CategoryResponse> = categories.into_iter().map(CategoryResponse::from).collect();
    Ok(ApiResponse::ok(items))
}

#[utoipa::path(
    get,
    path = "/api/v1/categories/{slug}/posts",
    params(
        ("slug" = String, Path, description = "Category slug"),
        ("page" = Option<i64>, Query, description = "Page number (out-of-range values clamp)"),
    ),
    responses(
        (status = 200, description = "Category feed", body = PaginatedResponse<PostResponse>),
        (status = 404, description = "Category missing or unpublished", body = AppError),
    ),
    tag = "categories"
)]
pub async fn category_posts(
    Extension(db): Extension<DatabaseConnection>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    Path(slug): Path<String>,
    Query(params): Query<PageQuery>,
) -> AppResult<impl IntoResponse> {
    let now = chrono::Utc::now().naive_utc();

    let service = FeedService::new(db);
    let page = service
        .by_category(&slug, viewer, now, params.page.unwrap_or(1))
        .await?;

    let items: Vec<PostResponse> = page.items.into_iter().map(PostResponse::from).collect();
    Ok(ApiResponse::ok(PaginatedResponse::new(
        items,
        page.total,
        page.page,
        page.per_page,
    )))
}
