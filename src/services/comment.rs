use crate::{
    error::{AppError, AppResult},
    models::{comment, Category, Comment, CommentModel, Post, UserModel},
    services::visibility::is_live,
};
use chrono::NaiveDateTime;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

pub struct CommentService {
    db: DatabaseConnection,
}

impl CommentService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Comments for a post in display order (oldest first, id tiebreak),
    /// each with its author. The caller is responsible for checking the
    /// post is visible to the viewer first.
    pub async fn list_by_post(&self, post_id: i32) -> AppResult<Vec<(CommentModel, Option<UserModel>)>> {
        let comments = Comment::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .find_also_related(crate::models::User)
            .all(&self.db)
            .await?;
        Ok(comments)
    }

    /// Create a comment. The post must exist and be live for this
    /// requester; a hidden or scheduled post reads as NotFound here just
    /// as it does on the detail view.
    pub async fn create(
        &self,
        post_id: i32,
        author_id: i32,
        text: &str,
        now: NaiveDateTime,
    ) -> AppResult<CommentModel> {
        let post = Post::find_by_id(post_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let category = match post.category_id {
            Some(category_id) => Category::find_by_id(category_id).one(&self.db).await?,
            None => None,
        };

        if !is_live(&post, category.as_ref(), Some(author_id), now) {
            return Err(AppError::NotFound);
        }

        let created_at = chrono::Utc::now().naive_utc();

        let new_comment = comment::ActiveModel {
            post_id: sea_orm::ActiveValue::Set(post_id),
            author_id: sea_orm::ActiveValue::Set(author_id),
            text: sea_orm::ActiveValue::Set(text.to_string()),
            created_at: sea_orm::ActiveValue::Set(created_at),
            updated_at: sea_orm::ActiveValue::Set(created_at),
            ..Default::default()
        };

        let comment = new_comment.insert(&self.db).await?;
        Ok(comment)
    }

    pub async fn update(&self, id: i32, requester_id: i32, text: &str) -> AppResult<CommentModel> {
        let existing = self.get_by_id(id).await?;
        if existing.author_id != requester_id {
            return Err(AppError::Forbidden);
        }

        let now = chrono::Utc::now().naive_utc();

        let mut active: comment::ActiveModel = existing.into();
        active.text = sea_orm::ActiveValue::Set(text.to_string());
        active.updated_at = sea_orm::ActiveValue::Set(now);

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: i32, requester_id: i32) -> AppResult<()> {
        let existing = self.get_by_id(id).await?;
        if existing.author_id != requester_id {
            return Err(AppError::Forbidden);
        }

        Comment::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<CommentModel> {
        Comment::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }
}
