use crate::{
    config::pagination::posts_per_page,
    error::{AppError, AppResult},
    models::{category, user, Category, User},
    services::visibility::visible_clause,
};
use chrono::NaiveDateTime;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter,
    Statement,
};

/// One feed row: the post plus read-model decorations (author username,
/// category/location briefs, derived comment count).
#[derive(Debug, Clone, FromQueryResult)]
pub struct FeedItem {
    pub id: i32,
    pub author_id: i32,
    pub author_username: String,
    pub category_id: Option<i32>,
    pub category_title: Option<String>,
    pub category_slug: Option<String>,
    pub location_id: Option<i32>,
    pub location_name: Option<String>,
    pub title: String,
    pub text: String,
    pub pub_date: NaiveDateTime,
    pub is_published: bool,
    pub image_url: Option<String>,
    pub created_at: NaiveDateTime,
    pub comment_count: i64,
}

#[derive(Debug)]
pub struct FeedPage {
    pub items: Vec<FeedItem>,
    pub total: u64,
    /// Effective page after clamping.
    pub page: u64,
    pub per_page: u64,
}

pub struct FeedService {
    db: DatabaseConnection,
}

impl FeedService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Global feed: live posts, plus the viewer's own regardless of state.
    pub async fn global(
        &self,
        viewer: Option<i32>,
        now: NaiveDateTime,
        requested_page: i64,
    ) -> AppResult<FeedPage> {
        self.fetch_page(
            &visible_clause("$1", "$2"),
            vec![now.into(), viewer.into()],
            requested_page,
        )
        .await
    }

    /// Category feed. NotFound when the category is missing or
    /// unpublished, for every viewer; categories have no owner.
    pub async fn by_category(
        &self,
        slug: &str,
        viewer: Option<i32>,
        now: NaiveDateTime,
        requested_page: i64,
    ) -> AppResult<FeedPage> {
        let cat = Category::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;
        if !cat.is_published {
            return Err(AppError::NotFound);
        }

        let where_clause = format!("{} AND c.slug = $3", visible_clause("$1", "$2"));
        self.fetch_page(
            &where_clause,
            vec![now.into(), viewer.into(), slug.into()],
            requested_page,
        )
        .await
    }

    /// Profile feed. Self-view includes unpublished and scheduled posts;
    /// everyone else gets the live subset.
    pub async fn by_author(
        &self,
        username: &str,
        viewer: Option<i32>,
        now: NaiveDateTime,
        requested_page: i64,
    ) -> AppResult<FeedPage> {
        let profile = User::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        if viewer == Some(profile.id) {
            return self
                .fetch_page("p.author_id = $1", vec![profile.id.into()], requested_page)
                .await;
        }

        let where_clause = format!("p.author_id = $1 AND {}", visible_clause("$2", "$3"));
        self.fetch_page(
            &where_clause,
            vec![profile.id.into(), now.into(), viewer.into()],
            requested_page,
        )
        .await
    }

    /// Count, clamp, then fetch one page with comment counts from a
    /// single aggregate join, never one count query per row.
    async fn fetch_page(
        &self,
        where_clause: &str,
        values: Vec<sea_orm::Value>,
        requested_page: i64,
    ) -> AppResult<FeedPage> {
        let per_page = posts_per_page();

        let count_sql = format!(
            "SELECT COUNT(*) AS total FROM posts p \
             LEFT JOIN categories c ON c.id = p.category_id \
             WHERE {where_clause}"
        );

        let count_result = self
            .db
            .query_one(Statement::from_sql_and_values(
                sea_orm::DatabaseBackend::Postgres,
                &count_sql,
                values.clone(),
            ))
            .await?
            .ok_or(AppError::Internal(anyhow::anyhow!("Count query failed")))?;

        let total: i64 = count_result.try_get_by_index(0)?;
        let total = total as u64;

        let page = clamp_page(requested_page, total, per_page);
        let offset = (page - 1) * per_page;

        let limit_param = values.len() + 1;
        let offset_param = values.len() + 2;

        let page_sql = format!(
            "SELECT p.id, p.author_id, p.category_id, p.location_id, p.title, p.text, \
                p.pub_date, p.is_published, p.image_url, p.created_at, \
                u.username AS author_username, \
                c.title AS category_title, c.slug AS category_slug, \
                l.name AS location_name, \
                COUNT(cm.id) AS comment_count \
                FROM posts p \
                JOIN users u ON u.id = p.author_id \
                LEFT JOIN categories c ON c.id = p.category_id \
                LEFT JOIN locations l ON l.id = p.location_id \
                LEFT JOIN comments cm ON cm.post_id = p.id \
                WHERE {where_clause} \
                GROUP BY p.id, u.username, c.title, c.slug, l.name \
                ORDER BY p.pub_date DESC, p.id DESC \
                LIMIT ${limit_param} OFFSET ${offset_param}"
        );

        let mut page_values = values;
        page_values.push((per_page as i64).into());
        page_values.push((offset as i64).into());

        let items = FeedItem::find_by_statement(Statement::from_sql_and_values(
            sea_orm::DatabaseBackend::Postgres,
            &page_sql,
            page_values,
        ))
        .all(&self.db)
        .await?;

        Ok(FeedPage {
            items,
            total,
            page,
            per_page,
        })
    }
}

/// Out-of-range pages clamp, never error: zero and negative requests
/// serve page 1; requests past the end serve the last page; an empty
/// collection serves page 1 empty.
fn clamp_page(requested: i64, total: u64, per_page: u64) -> u64 {
    let total_pages = total.div_ceil(per_page).max(1);
    requested.clamp(1, total_pages as i64) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_negative_pages_clamp_to_first() {
        assert_eq!(clamp_page(0, 35, 10), 1);
        assert_eq!(clamp_page(-3, 35, 10), 1);
    }

    #[test]
    fn in_range_page_is_kept() {
        assert_eq!(clamp_page(2, 35, 10), 2);
        assert_eq!(clamp_page(4, 35, 10), 4);
    }

    #[test]
    fn past_the_end_clamps_to_last_page() {
        assert_eq!(clamp_page(99, 35, 10), 4);
        assert_eq!(clamp_page(99, 40, 10), 4);
        assert_eq!(clamp_page(99, 41, 10), 5);
    }

    #[test]
    fn empty_collection_serves_page_one() {
        assert_eq!(clamp_page(1, 0, 10), 1);
        assert_eq!(clamp_page(7, 0, 10), 1);
    }
}
