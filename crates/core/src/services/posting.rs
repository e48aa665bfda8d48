//! Posting service.

use bookmarket_common::{AppError, AppResult, IdGenerator};
use bookmarket_db::{
    entities::{
        posting::{self, PostingStatus},
        posting_image,
    },
    repositories::{CatalogRepository, PostingRepository, PostingSearchFilter},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Input for creating a posting.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostingInput {
    #[validate(length(min = 1, max = 256))]
    pub title: String,

    #[validate(length(max = 4000))]
    pub description: Option<String>,

    /// Asking price in the minor currency unit.
    #[validate(range(min = 1))]
    pub price: i64,

    pub category_id: Option<String>,
    pub course_id: Option<String>,
    pub image_url: Option<String>,

    /// Additional gallery image URLs, in display order.
    #[serde(default)]
    pub images: Vec<String>,
}

/// Input for updating a posting.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostingInput {
    #[validate(length(min = 1, max = 256))]
    pub title: Option<String>,

    #[validate(length(max = 4000))]
    pub description: Option<String>,

    #[validate(range(min = 1))]
    pub price: Option<i64>,

    pub category_id: Option<String>,
    pub course_id: Option<String>,
    pub image_url: Option<String>,
}

/// A posting with its gallery and engagement counts.
pub struct PostingDetail {
    pub posting: posting::Model,
    pub images: Vec<posting_image::Model>,
    pub favorite_count: u64,
    pub comment_count: u64,
}

/// Posting service for listings and their galleries.
#[derive(Clone)]
pub struct PostingService {
    posting_repo: PostingRepository,
    catalog_repo: CatalogRepository,
    id_gen: IdGenerator,
}

impl PostingService {
    /// Create a new posting service.
    #[must_use]
    pub const fn new(posting_repo: PostingRepository, catalog_repo: CatalogRepository) -> Self {
        Self {
            posting_repo,
            catalog_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a new listing for a seller.
    pub async fn create(
        &self,
        seller_id: &str,
        input: CreatePostingInput,
    ) -> AppResult<posting::Model> {
        input.validate()?;

        // Referenced catalog entries must exist.
        if let Some(ref category_id) = input.category_id {
            self.catalog_repo.get_category(category_id).await?;
        }
        if let Some(ref course_id) = input.course_id {
            self.catalog_repo.get_course(course_id).await?;
        }

        let posting_id = self.id_gen.generate();
        let model = posting::ActiveModel {
            id: Set(posting_id.clone()),
            user_id: Set(seller_id.to_string()),
            title: Set(input.title.trim().to_string()),
            description: Set(input.description),
            price: Set(input.price),
            status: Set(PostingStatus::Listed),
            category_id: Set(input.category_id),
            course_id: Set(input.course_id),
            image_url: Set(input.image_url),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        let posting = self.posting_repo.create(model).await?;

        for (index, image_url) in input.images.into_iter().enumerate() {
            let image = posting_image::ActiveModel {
                id: Set(self.id_gen.generate()),
                posting_id: Set(posting_id.clone()),
                image_url: Set(image_url),
                display_order: Set(index as i32),
                created_at: Set(chrono::Utc::now().into()),
            };
            self.posting_repo.add_image(image).await?;
        }

        Ok(posting)
    }

    /// Get a posting with its gallery and engagement counts.
    pub async fn get_detail(&self, id: &str) -> AppResult<PostingDetail> {
        let posting = self.posting_repo.get_by_id(id).await?;
        let images = self.posting_repo.get_images(id).await?;
        let favorite_count = self.posting_repo.favorite_count(id).await?;
        let comment_count = self.posting_repo.comment_count(id).await?;

        Ok(PostingDetail {
            posting,
            images,
            favorite_count,
            comment_count,
        })
    }

    /// Get a posting by ID.
    pub async fn get(&self, id: &str) -> AppResult<posting::Model> {
        self.posting_repo.get_by_id(id).await
    }

    /// Search postings.
    pub async fn search(
        &self,
        filter: PostingSearchFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<(Vec<posting::Model>, u64)> {
        let postings = self.posting_repo.search(&filter, limit, offset).await?;
        let total = self.posting_repo.count(&filter).await?;
        Ok((postings, total))
    }

    /// List a user's postings with an optional status filter.
    pub async fn list_by_user(
        &self,
        user_id: &str,
        status: Option<PostingStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<(Vec<posting::Model>, u64)> {
        let filter = PostingSearchFilter {
            user_id: Some(user_id.to_string()),
            status,
            ..Default::default()
        };
        self.search(filter, limit, offset).await
    }

    /// Update a posting. Owner-only; sold and removed listings cannot be
    /// edited.
    pub async fn update(
        &self,
        posting_id: &str,
        user_id: &str,
        input: UpdatePostingInput,
    ) -> AppResult<posting::Model> {
        input.validate()?;

        let posting = self.posting_repo.get_by_id(posting_id).await?;

        if posting.user_id != user_id {
            return Err(AppError::Forbidden(
                "Only the seller can edit this listing".to_string(),
            ));
        }
        if posting.status.is_terminal() {
            return Err(AppError::Conflict(
                "Sold or removed listings cannot be edited".to_string(),
            ));
        }

        if let Some(ref category_id) = input.category_id {
            self.catalog_repo.get_category(category_id).await?;
        }
        if let Some(ref course_id) = input.course_id {
            self.catalog_repo.get_course(course_id).await?;
        }

        let mut active: posting::ActiveModel = posting.into();

        if let Some(title) = input.title {
            active.title = Set(title.trim().to_string());
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(price) = input.price {
            active.price = Set(price);
        }
        if let Some(category_id) = input.category_id {
            active.category_id = Set(Some(category_id));
        }
        if let Some(course_id) = input.course_id {
            active.course_id = Set(Some(course_id));
        }
        if let Some(image_url) = input.image_url {
            active.image_url = Set(Some(image_url));
        }
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.posting_repo.update(active).await
    }

    /// Take a listing down. Owner or admin; `removed` is terminal.
    ///
    /// A sold listing can still be removed by moderation, but it never
    /// returns to `listed`.
    pub async fn remove(
        &self,
        posting_id: &str,
        requester_id: &str,
        requester_is_admin: bool,
    ) -> AppResult<posting::Model> {
        let posting = self.posting_repo.get_by_id(posting_id).await?;

        if posting.user_id != requester_id && !requester_is_admin {
            return Err(AppError::Forbidden(
                "Only the seller or an administrator can remove this listing".to_string(),
            ));
        }
        if posting.status == PostingStatus::Removed {
            return Err(AppError::Conflict("Listing is already removed".to_string()));
        }

        let mut active: posting::ActiveModel = posting.into();
        active.status = Set(PostingStatus::Removed);
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.posting_repo.update(active).await
    }

    /// Most-favorited active listings.
    ///
    /// Ranks the newest listed postings by favorite count, breaking ties
    /// with comment count.
    pub async fn popular(&self, limit: u64) -> AppResult<Vec<PostingDetail>> {
        const CANDIDATE_POOL: u64 = 50;

        let filter = PostingSearchFilter {
            status: Some(PostingStatus::Listed),
            ..Default::default()
        };
        let candidates = self.posting_repo.search(&filter, CANDIDATE_POOL, 0).await?;

        let mut details = Vec::with_capacity(candidates.len());
        for posting in candidates {
            let favorite_count = self.posting_repo.favorite_count(&posting.id).await?;
            let comment_count = self.posting_repo.comment_count(&posting.id).await?;
            details.push(PostingDetail {
                images: Vec::new(),
                posting,
                favorite_count,
                comment_count,
            });
        }

        details.sort_by(|a, b| {
            b.favorite_count
                .cmp(&a.favorite_count)
                .then(b.comment_count.cmp(&a.comment_count))
        });
        details.truncate(limit as usize);

        Ok(details)
    }

    /// Attach an image to a posting. Owner-only.
    pub async fn add_image(
        &self,
        posting_id: &str,
        user_id: &str,
        image_url: String,
        display_order: i32,
    ) -> AppResult<posting_image::Model> {
        let posting = self.posting_repo.get_by_id(posting_id).await?;

        if posting.user_id != user_id {
            return Err(AppError::Forbidden(
                "Only the seller can manage this gallery".to_string(),
            ));
        }

        let model = posting_image::ActiveModel {
            id: Set(self.id_gen.generate()),
            posting_id: Set(posting_id.to_string()),
            image_url: Set(image_url),
            display_order: Set(display_order),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.posting_repo.add_image(model).await
    }

    /// Delete a gallery image. Owner-only.
    pub async fn delete_image(&self, image_id: &str, user_id: &str) -> AppResult<()> {
        let image = self
            .posting_repo
            .find_image(image_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Image {image_id} not found")))?;

        let posting = self.posting_repo.get_by_id(&image.posting_id).await?;
        if posting.user_id != user_id {
            return Err(AppError::Forbidden(
                "Only the seller can manage this gallery".to_string(),
            ));
        }

        self.posting_repo.delete_image(image).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn build_service(db: Arc<DatabaseConnection>) -> PostingService {
        PostingService::new(
            PostingRepository::new(Arc::clone(&db)),
            CatalogRepository::new(db),
        )
    }

    fn create_test_posting(id: &str, seller: &str, status: PostingStatus) -> posting::Model {
        posting::Model {
            id: id.to_string(),
            user_id: seller.to_string(),
            title: "Intro to Algorithms".to_string(),
            description: None,
            price: 450,
            status,
            category_id: None,
            course_id: None,
            image_url: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_zero_price() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = build_service(db);

        let result = service
            .create(
                "seller1",
                CreatePostingInput {
                    title: "Free book".to_string(),
                    description: None,
                    price: 0,
                    category_id: None,
                    course_id: None,
                    image_url: None,
                    images: Vec::new(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_rejects_non_owner() {
        let posting = create_test_posting("p1", "seller1", PostingStatus::Listed);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[posting]])
                .into_connection(),
        );
        let service = build_service(db);

        let result = service
            .update(
                "p1",
                "intruder",
                UpdatePostingInput {
                    title: None,
                    description: None,
                    price: Some(10),
                    category_id: None,
                    course_id: None,
                    image_url: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_update_rejects_sold_listing() {
        let posting = create_test_posting("p1", "seller1", PostingStatus::Sold);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[posting]])
                .into_connection(),
        );
        let service = build_service(db);

        let result = service
            .update(
                "p1",
                "seller1",
                UpdatePostingInput {
                    title: None,
                    description: None,
                    price: Some(999),
                    category_id: None,
                    course_id: None,
                    image_url: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_remove_already_removed_conflicts() {
        let posting = create_test_posting("p1", "seller1", PostingStatus::Removed);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[posting]])
                .into_connection(),
        );
        let service = build_service(db);

        let result = service.remove("p1", "seller1", false).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_remove_allows_admin() {
        let posting = create_test_posting("p1", "seller1", PostingStatus::Listed);
        let mut removed = create_test_posting("p1", "seller1", PostingStatus::Removed);
        removed.updated_at = Some(Utc::now().into());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[posting]])
                .append_query_results([[removed]])
                .into_connection(),
        );
        let service = build_service(db);

        let result = service.remove("p1", "admin1", true).await.unwrap();
        assert_eq!(result.status, PostingStatus::Removed);
    }
}
