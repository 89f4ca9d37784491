use crate::{
    error::AppResult,
    models::{category, Category, CategoryModel},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

pub struct CategoryService {
    db: DatabaseConnection,
}

impl CategoryService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Published categories only; unpublished ones are invisible
    /// everywhere, including this listing.
    pub async fn list_published(&self) -> AppResult<Vec<CategoryModel>> {
        let categories = Category::find()
            .filter(category::Column::IsPublished.eq(true))
            .order_by_asc(category::Column::Title)
            .all(&self.db)
            .await?;
        Ok(categories)
    }
}
