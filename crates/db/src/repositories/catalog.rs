//! Catalog repository for categories and courses.

use std::sync::Arc;

use crate::entities::{Category, Course, Posting, category, course, posting};
use bookmarket_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};

/// Catalog repository for database operations.
#[derive(Clone)]
pub struct CatalogRepository {
    db: Arc<DatabaseConnection>,
}

impl CatalogRepository {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    // ========== Categories ==========

    /// Create a new category.
    pub async fn create_category(
        &self,
        model: category::ActiveModel,
    ) -> AppResult<category::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a category by ID.
    pub async fn get_category(&self, id: &str) -> AppResult<category::Model> {
        Category::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Category {id} not found")))
    }

    /// Find a category by name.
    pub async fn find_category_by_name(&self, name: &str) -> AppResult<Option<category::Model>> {
        Category::find()
            .filter(category::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List all categories by name.
    pub async fn list_categories(&self) -> AppResult<Vec<category::Model>> {
        Category::find()
            .order_by_asc(category::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a category.
    pub async fn update_category(
        &self,
        model: category::ActiveModel,
    ) -> AppResult<category::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a category.
    pub async fn delete_category(&self, model: category::Model) -> AppResult<()> {
        model
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Count postings referencing a category.
    pub async fn count_postings_in_category(&self, category_id: &str) -> AppResult<u64> {
        Posting::find()
            .filter(posting::Column::CategoryId.eq(category_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ========== Courses ==========

    /// Create a new course.
    pub async fn create_course(&self, model: course::ActiveModel) -> AppResult<course::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a course by ID.
    pub async fn get_course(&self, id: &str) -> AppResult<course::Model> {
        Course::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Course {id} not found")))
    }

    /// Find a course by code.
    pub async fn find_course_by_code(&self, code: &str) -> AppResult<Option<course::Model>> {
        Course::find()
            .filter(course::Column::Code.eq(code))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List courses, optionally restricted to one category.
    pub async fn list_courses(&self, category_id: Option<&str>) -> AppResult<Vec<course::Model>> {
        let mut query = Course::find().order_by_asc(course::Column::Code);

        if let Some(cat) = category_id {
            query = query.filter(course::Column::CategoryId.eq(cat));
        }

        query
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a course.
    pub async fn update_course(&self, model: course::ActiveModel) -> AppResult<course::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a course.
    pub async fn delete_course(&self, model: course::Model) -> AppResult<()> {
        model
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Count postings referencing a course.
    pub async fn count_postings_in_course(&self, course_id: &str) -> AppResult<u64> {
        Posting::find()
            .filter(posting::Column::CourseId.eq(course_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_category(id: &str, name: &str) -> category::Model {
        category::Model {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_list_categories() {
        let categories = vec![
            create_test_category("cat1", "Mathematics"),
            create_test_category("cat2", "Physics"),
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([categories])
                .into_connection(),
        );

        let repo = CatalogRepository::new(db);
        let result = repo.list_categories().await.unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_get_category_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<category::Model>::new()])
                .into_connection(),
        );

        let repo = CatalogRepository::new(db);
        let result = repo.get_category("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
