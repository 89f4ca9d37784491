use crate::error::AppError;
use crate::error::AppResult;
use crate::middleware::{AuthUser, OptionalAuthUser};
use crate::models::UserModel;
use crate::response::{ApiResponse, PageQuery, PaginatedResponse};
use crate::services::feed::FeedService;
use crate::services::user::UserService;
use axum::{extract::Path, extract::Query, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::post::PostResponse;

/// Public profile; email stays private.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserProfileResponse {
    pub id: i32,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: String,
}

impl From<UserModel> for UserProfileResponse {
    fn from(u: UserModel) -> Self {
        Self {
            id: u.id,
            username: u.username,
            first_name: u.first_name,
            last_name: u.last_name,
            created_at: u.created_at.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 150))]
    pub first_name: Option<String>,
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{username}",
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, description = "User profile", body = UserProfileResponse),
        (status = 404, description = "User not found", body = AppError),
    ),
    tag = "users"
)]
pub async fn get_user_profile(
    Extension(db): Extension<DatabaseConnection>,
    Path(username): Path<String>,
) -> AppResult<impl IntoResponse> {
    let service = UserService::new(db);
    let user = service.get_by_username(&username).await?;
    Ok(ApiResponse::ok(UserProfileResponse::from(user)))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{username}/posts",
    params(
        ("username" = String, Path, description = "Username"),
        ("page" = Option<i64>, Query, description = "Page number (out-of-range values clamp)"),
    ),
    responses(
        (status = 200, description = "Profile feed; self-view includes non-live posts", body = PaginatedResponse<PostResponse>),
        (status = 404, description = "User not found", body = AppError),
    ),
    tag = "users"
)]
pub async fn user_posts(
    Extension(db): Extension<DatabaseConnection>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    Path(username): Path<String>,
    Query(params): Query<PageQuery>,
) -> AppResult<impl IntoResponse> {
    let now = chrono::Utc::now().naive_utc();

    let service = FeedService::new(db);
    let page = service
        .by_author(&username, viewer, now, params.page.unwrap_or(1))
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
    put,
    path = "/api/v1/auth/profile",
    security(("jwt_token" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserProfileResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "users"
)]
pub async fn update_profile(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;

    let service = UserService::new(db);
    let user = service
        .update_profile(
            auth_user.user_id,
            payload.first_name,
            payload.last_name,
            payload.email,
        )
        .await?;

    Ok(ApiResponse::ok(UserProfileResponse::from(user)))
}
