//! Posting endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post},
};
use bookmarket_common::AppResult;
use bookmarket_core::{CreateCommentInput, CreatePostingInput, PostingDetail, UpdatePostingInput};
use bookmarket_db::{
    entities::{comment, posting, posting_image},
    repositories::PostingSearchFilter,
};
use serde::{Deserialize, Serialize};

use crate::{
    endpoints::page_offset,
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{ApiResponse, Paginated},
};

/// Posting list item.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostingResponse {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub price: i64,
    pub status: posting::PostingStatus,
    pub category_id: Option<String>,
    pub course_id: Option<String>,
    pub image_url: Option<String>,
    pub created_at: String,
}

impl From<posting::Model> for PostingResponse {
    fn from(posting: posting::Model) -> Self {
        Self {
            id: posting.id,
            user_id: posting.user_id,
            title: posting.title,
            description: posting.description,
            price: posting.price,
            status: posting.status,
            category_id: posting.category_id,
            course_id: posting.course_id,
            image_url: posting.image_url,
            created_at: posting.created_at.to_rfc3339(),
        }
    }
}

/// Gallery image.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponse {
    pub id: String,
    pub image_url: String,
    pub display_order: i32,
}

impl From<posting_image::Model> for ImageResponse {
    fn from(image: posting_image::Model) -> Self {
        Self {
            id: image.id,
            image_url: image.image_url,
            display_order: image.display_order,
        }
    }
}

/// Posting detail with gallery, engagement counts, and the caller's
/// favorite state.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostingDetailResponse {
    #[serde(flatten)]
    pub posting: PostingResponse,
    pub images: Vec<ImageResponse>,
    pub favorite_count: u64,
    pub comment_count: u64,
    pub is_favorited: bool,
}

impl PostingDetailResponse {
    fn new(detail: PostingDetail, is_favorited: bool) -> Self {
        Self {
            posting: detail.posting.into(),
            images: detail.images.into_iter().map(Into::into).collect(),
            favorite_count: detail.favorite_count,
            comment_count: detail.comment_count,
            is_favorited,
        }
    }
}

/// Comment on a posting.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub posting_id: String,
    pub user_id: String,
    pub content: String,
    pub created_at: String,
}

impl From<comment::Model> for CommentResponse {
    fn from(comment: comment::Model) -> Self {
        Self {
            id: comment.id,
            posting_id: comment.posting_id,
            user_id: comment.user_id,
            content: comment.content,
            created_at: comment.created_at.to_rfc3339(),
        }
    }
}

/// Search query parameters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub status: Option<posting::PostingStatus>,
    pub user_id: Option<String>,
    pub category_id: Option<String>,
    pub course_id: Option<String>,
    pub search: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// Comment creation request.
#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}

/// Image attach request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddImageRequest {
    pub image_url: String,
    #[serde(default)]
    pub display_order: i32,
}

/// Popular listing query.
#[derive(Debug, Deserialize)]
pub struct PopularQuery {
    pub limit: Option<u64>,
}

/// Search postings.
async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<ApiResponse<Paginated<PostingResponse>>> {
    let per_page = state.page_size(query.per_page);
    let (page, offset) = page_offset(query.page, per_page);

    let filter = PostingSearchFilter {
        status: query.status,
        user_id: query.user_id,
        category_id: query.category_id,
        course_id: query.course_id,
        keyword: query.search,
        min_price: query.min_price,
        max_price: query.max_price,
    };

    let (postings, total) = state.posting_service.search(filter, per_page, offset).await?;

    Ok(ApiResponse::ok(Paginated {
        items: postings.into_iter().map(Into::into).collect(),
        total,
        page,
        per_page,
    }))
}

/// Create a listing.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreatePostingInput>,
) -> AppResult<ApiResponse<PostingResponse>> {
    let posting = state.posting_service.create(&user.id, req).await?;
    Ok(ApiResponse::ok(posting.into()))
}

/// Most-favorited active listings.
async fn popular(
    State(state): State<AppState>,
    Query(query): Query<PopularQuery>,
) -> AppResult<ApiResponse<Vec<PostingDetailResponse>>> {
    let limit = query.limit.unwrap_or(10).min(50);
    let details = state.posting_service.popular(limit).await?;

    Ok(ApiResponse::ok(
        details
            .into_iter()
            .map(|d| PostingDetailResponse::new(d, false))
            .collect(),
    ))
}

/// Posting detail.
async fn get_one(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<PostingDetailResponse>> {
    let detail = state.posting_service.get_detail(&id).await?;

    let is_favorited = match viewer {
        Some(user) => state.favorite_service.is_favorited(&user.id, &id).await?,
        None => false,
    };

    Ok(ApiResponse::ok(PostingDetailResponse::new(detail, is_favorited)))
}

/// Update a listing.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePostingInput>,
) -> AppResult<ApiResponse<PostingResponse>> {
    let posting = state.posting_service.update(&id, &user.id, req).await?;
    Ok(ApiResponse::ok(posting.into()))
}

/// Take a listing down.
async fn remove(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<PostingResponse>> {
    let posting = state
        .posting_service
        .remove(&id, &user.id, user.is_admin)
        .await?;
    Ok(ApiResponse::ok(posting.into()))
}

/// List a posting's comments.
async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<CommentResponse>>> {
    let comments = state.comment_service.list_for_posting(&id).await?;
    Ok(ApiResponse::ok(
        comments.into_iter().map(Into::into).collect(),
    ))
}

/// Comment on a posting.
async fn create_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CreateCommentRequest>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state
        .comment_service
        .create(
            &user.id,
            CreateCommentInput {
                posting_id: id,
                content: req.content,
            },
        )
        .await?;

    Ok(ApiResponse::ok(comment.into()))
}

/// Favorite a posting.
async fn add_favorite(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.favorite_service.add(&user.id, &id).await?;
    Ok(ApiResponse::ok(()))
}

/// Unfavorite a posting.
async fn remove_favorite(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.favorite_service.remove(&user.id, &id).await?;
    Ok(ApiResponse::ok(()))
}

/// Attach a gallery image.
async fn add_image(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AddImageRequest>,
) -> AppResult<ApiResponse<ImageResponse>> {
    let image = state
        .posting_service
        .add_image(&id, &user.id, req.image_url, req.display_order)
        .await?;
    Ok(ApiResponse::ok(image.into()))
}

/// Delete a gallery image.
async fn delete_image(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(image_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.posting_service.delete_image(&image_id, &user.id).await?;
    Ok(ApiResponse::ok(()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(search).post(create))
        .route("/popular", get(popular))
        .route("/images/{imageId}", delete(delete_image))
        .route("/{id}", get(get_one).put(update).delete(remove))
        .route("/{id}/comments", get(list_comments).post(create_comment))
        .route("/{id}/favorite", post(add_favorite).delete(remove_favorite))
        .route("/{id}/images", post(add_image))
}
