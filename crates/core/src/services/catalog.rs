//! Catalog service for categories and courses.

use bookmarket_common::{AppError, AppResult, IdGenerator};
use bookmarket_db::{
    entities::{category, course},
    repositories::CatalogRepository,
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Input for creating a category.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryInput {
    #[validate(length(min = 1, max = 128))]
    pub name: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

/// Input for updating a category.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCategoryInput {
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,

    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

/// Input for creating a course.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseInput {
    #[validate(length(min = 1, max = 64))]
    pub code: String,

    #[validate(length(min = 1, max = 256))]
    pub name: String,

    pub category_id: Option<String>,
}

/// Input for updating a course.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseInput {
    #[validate(length(min = 1, max = 64))]
    pub code: Option<String>,

    #[validate(length(min = 1, max = 256))]
    pub name: Option<String>,

    pub category_id: Option<String>,
}

/// Catalog service for admin-managed reference data.
#[derive(Clone)]
pub struct CatalogService {
    catalog_repo: CatalogRepository,
    id_gen: IdGenerator,
}

impl CatalogService {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(catalog_repo: CatalogRepository) -> Self {
        Self {
            catalog_repo,
            id_gen: IdGenerator::new(),
        }
    }

    // ========== Categories ==========

    /// Create a category.
    pub async fn create_category(&self, input: CreateCategoryInput) -> AppResult<category::Model> {
        input.validate()?;

        if self
            .catalog_repo
            .find_category_by_name(&input.name)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Category name already exists".to_string()));
        }

        let model = category::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input.name),
            description: Set(input.description),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.catalog_repo.create_category(model).await
    }

    /// List all categories.
    pub async fn list_categories(&self) -> AppResult<Vec<category::Model>> {
        self.catalog_repo.list_categories().await
    }

    /// Update a category.
    pub async fn update_category(
        &self,
        category_id: &str,
        input: UpdateCategoryInput,
    ) -> AppResult<category::Model> {
        input.validate()?;

        let category = self.catalog_repo.get_category(category_id).await?;
        let mut active: category::ActiveModel = category.into();

        if let Some(name) = input.name {
            if let Some(existing) = self.catalog_repo.find_category_by_name(&name).await?
                && existing.id != category_id
            {
                return Err(AppError::Conflict("Category name already exists".to_string()));
            }
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }

        self.catalog_repo.update_category(active).await
    }

    /// Delete a category. Fails when postings still reference it.
    pub async fn delete_category(&self, category_id: &str) -> AppResult<()> {
        let category = self.catalog_repo.get_category(category_id).await?;

        let in_use = self
            .catalog_repo
            .count_postings_in_category(category_id)
            .await?;
        if in_use > 0 {
            return Err(AppError::Conflict(format!(
                "Category is referenced by {in_use} postings"
            )));
        }

        self.catalog_repo.delete_category(category).await
    }

    // ========== Courses ==========

    /// Create a course.
    pub async fn create_course(&self, input: CreateCourseInput) -> AppResult<course::Model> {
        input.validate()?;

        if self
            .catalog_repo
            .find_course_by_code(&input.code)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Course code already exists".to_string()));
        }

        if let Some(ref category_id) = input.category_id {
            self.catalog_repo.get_category(category_id).await?;
        }

        let model = course::ActiveModel {
            id: Set(self.id_gen.generate()),
            code: Set(input.code),
            name: Set(input.name),
            category_id: Set(input.category_id),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.catalog_repo.create_course(model).await
    }

    /// List courses, optionally restricted to one category.
    pub async fn list_courses(&self, category_id: Option<&str>) -> AppResult<Vec<course::Model>> {
        self.catalog_repo.list_courses(category_id).await
    }

    /// Update a course.
    pub async fn update_course(
        &self,
        course_id: &str,
        input: UpdateCourseInput,
    ) -> AppResult<course::Model> {
        input.validate()?;

        let course = self.catalog_repo.get_course(course_id).await?;
        let mut active: course::ActiveModel = course.into();

        if let Some(code) = input.code {
            if let Some(existing) = self.catalog_repo.find_course_by_code(&code).await?
                && existing.id != course_id
            {
                return Err(AppError::Conflict("Course code already exists".to_string()));
            }
            active.code = Set(code);
        }
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(category_id) = input.category_id {
            self.catalog_repo.get_category(&category_id).await?;
            active.category_id = Set(Some(category_id));
        }

        self.catalog_repo.update_course(active).await
    }

    /// Delete a course. Fails when postings still reference it.
    pub async fn delete_course(&self, course_id: &str) -> AppResult<()> {
        let course = self.catalog_repo.get_course(course_id).await?;

        let in_use = self.catalog_repo.count_postings_in_course(course_id).await?;
        if in_use > 0 {
            return Err(AppError::Conflict(format!(
                "Course is referenced by {in_use} postings"
            )));
        }

        self.catalog_repo.delete_course(course).await
    }
}
