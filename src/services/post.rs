use crate::{
    error::{AppError, AppResult},
    models::{post, Category, CategoryModel, Comment, Location, LocationModel, Post, PostModel},
    services::visibility::is_live,
};
use chrono::NaiveDateTime;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
};

/// Writable post fields; id, author and created_at are never client-set.
#[derive(Debug, Clone)]
pub struct PostInput {
    pub title: String,
    pub text: String,
    pub pub_date: NaiveDateTime,
    pub category_id: Option<i32>,
    pub location_id: Option<i32>,
    pub image_url: Option<String>,
}

/// A post detail read: the post with its joined attributes and derived
/// comment count.
#[derive(Debug)]
pub struct PostDetail {
    pub post: PostModel,
    pub category: Option<CategoryModel>,
    pub location: Option<LocationModel>,
    pub comment_count: u64,
}

pub struct PostService {
    db: DatabaseConnection,
}

impl PostService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Fetch a post as seen by `viewer`. A post that exists but is not
    /// visible to this viewer is reported as NotFound, not Forbidden:
    /// hidden posts must not leak their existence.
    pub async fn get_visible(
        &self,
        id: i32,
        viewer: Option<i32>,
        now: NaiveDateTime,
    ) -> AppResult<PostDetail> {
        let post = Post::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let category = match post.category_id {
            Some(category_id) => Category::find_by_id(category_id).one(&self.db).await?,
            None => None,
        };

        if !is_live(&post, category.as_ref(), viewer, now) {
            return Err(AppError::NotFound);
        }

        let location = match post.location_id {
            Some(location_id) => Location::find_by_id(location_id).one(&self.db).await?,
            None => None,
        };

        let comment_count = Comment::find()
            .filter(crate::models::comment::Column::PostId.eq(post.id))
            .count(&self.db)
            .await?;

        Ok(PostDetail {
            post,
            category,
            location,
            comment_count,
        })
    }

    pub async fn create(&self, author_id: i32, input: PostInput) -> AppResult<PostModel> {
        self.check_references(&input).await?;

        let now = chrono::Utc::now().naive_utc();

        let new_post = post::ActiveModel {
            author_id: sea_orm::ActiveValue::Set(author_id),
            category_id: sea_orm::ActiveValue::Set(input.category_id),
            location_id: sea_orm::ActiveValue::Set(input.location_id),
            title: sea_orm::ActiveValue::Set(input.title),
            text: sea_orm::ActiveValue::Set(input.text),
            pub_date: sea_orm::ActiveValue::Set(input.pub_date),
            is_published: sea_orm::ActiveValue::Set(true),
            image_url: sea_orm::ActiveValue::Set(input.image_url),
            created_at: sea_orm::ActiveValue::Set(now),
            updated_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        let post = new_post.insert(&self.db).await?;
        Ok(post)
    }

    /// Apply field changes. Id, author and creation timestamp survive
    /// every update.
    pub async fn update(
        &self,
        id: i32,
        requester_id: i32,
        input: PostInput,
    ) -> AppResult<PostModel> {
        let existing = self.get_owned(id, requester_id).await?;
        self.check_references(&input).await?;

        let now = chrono::Utc::now().naive_utc();

        let mut active: post::ActiveModel = existing.into();
        active.title = sea_orm::ActiveValue::Set(input.title);
        active.text = sea_orm::ActiveValue::Set(input.text);
        active.pub_date = sea_orm::ActiveValue::Set(input.pub_date);
        active.category_id = sea_orm::ActiveValue::Set(input.category_id);
        active.location_id = sea_orm::ActiveValue::Set(input.location_id);
        active.image_url = sea_orm::ActiveValue::Set(input.image_url);
        active.updated_at = sea_orm::ActiveValue::Set(now);

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    /// Delete a post. Its comments go with it in the same statement via
    /// the FK cascade, so readers never observe orphan comments.
    pub async fn delete(&self, id: i32, requester_id: i32) -> AppResult<()> {
        self.get_owned(id, requester_id).await?;
        Post::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    /// Ownership gate for mutations: NotFound for missing posts,
    /// Forbidden when the requester is not the author.
    async fn get_owned(&self, id: i32, requester_id: i32) -> AppResult<PostModel> {
        let existing = Post::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;
        if existing.author_id != requester_id {
            return Err(AppError::Forbidden);
        }
        Ok(existing)
    }

    /// Referencing a category or location that does not exist is a
    /// per-field validation failure, not a 500 from the FK constraint.
    /// Unpublished targets are accepted; the post is just not live.
    async fn check_references(&self, input: &PostInput) -> AppResult<()> {
        if let Some(category_id) = input.category_id {
            if Category::find_by_id(category_id).one(&self.db).await?.is_none() {
                return Err(AppError::invalid_field(
                    "category_id",
                    "unknown",
                    "unknown category",
                ));
            }
        }
        if let Some(location_id) = input.location_id {
            if Location::find_by_id(location_id).one(&self.db).await?.is_none() {
                return Err(AppError::invalid_field(
                    "location_id",
                    "unknown",
                    "unknown location",
                ));
            }
        }
        Ok(())
    }
}
