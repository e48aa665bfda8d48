//! Public catalog endpoints.

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use bookmarket_common::AppResult;
use bookmarket_db::entities::{category, course};
use serde::{Deserialize, Serialize};

use crate::{middleware::AppState, response::ApiResponse};

/// Category entry.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

impl From<category::Model> for CategoryResponse {
    fn from(category: category::Model) -> Self {
        Self {
            id: category.id,
            name: category.name,
            description: category.description,
        }
    }
}

/// Course entry.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseResponse {
    pub id: String,
    pub code: String,
    pub name: String,
    pub category_id: Option<String>,
}

impl From<course::Model> for CourseResponse {
    fn from(course: course::Model) -> Self {
        Self {
            id: course.id,
            code: course.code,
            name: course.name,
            category_id: course.category_id,
        }
    }
}

/// Course list query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCoursesQuery {
    pub category_id: Option<String>,
}

/// List categories.
async fn categories(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<CategoryResponse>>> {
    let categories = state.catalog_service.list_categories().await?;
    Ok(ApiResponse::ok(
        categories.into_iter().map(Into::into).collect(),
    ))
}

/// List courses.
async fn courses(
    State(state): State<AppState>,
    Query(query): Query<ListCoursesQuery>,
) -> AppResult<ApiResponse<Vec<CourseResponse>>> {
    let courses = state
        .catalog_service
        .list_courses(query.category_id.as_deref())
        .await?;
    Ok(ApiResponse::ok(
        courses.into_iter().map(Into::into).collect(),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(categories))
        .route("/courses", get(courses))
}
