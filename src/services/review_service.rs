use std::collections::HashMap;

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::reviews::{CreateReviewRequest, ReviewList, UpdateReviewRequest},
    entity::{
        reviews::{self, Entity as Reviews, Model as ReviewModel},
        titles::{Entity as Titles, Model as TitleModel},
        users::{self, Entity as Users},
    },
    error::{AppError, AppResult, on_unique_violation},
    middleware::auth::{AuthUser, ensure_admin_moderator_or_author},
    models::Review,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
    validators::{validate_score, validate_text},
};

/// Reviews of a title, newest first. 404 when the title itself is
/// missing, an empty page when it just has no reviews.
pub async fn list_reviews(
    state: &AppState,
    title_id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<ReviewList>> {
    let title = find_title(state, title_id).await?;
    let (page, per_page, offset) = pagination.normalize();

    let finder = Reviews::find()
        .filter(reviews::Column::TitleId.eq(title.id))
        .order_by_desc(reviews::Column::PubDate);

    let total = finder.clone().count(&state.orm).await? as i64;
    let models = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let authors = author_usernames(state, &models).await?;
    let items = models
        .into_iter()
        .map(|model| {
            let author = authors.get(&model.author_id).cloned().unwrap_or_default();
            review_from_entity(model, author)
        })
        .collect();

    let meta = Meta::new(page, per_page, total);
    Ok(ApiResponse::success(
        "Reviews",
        ReviewList { items },
        Some(meta),
    ))
}

pub async fn get_review(
    state: &AppState,
    title_id: Uuid,
    review_id: Uuid,
) -> AppResult<ApiResponse<Review>> {
    let model = find_scoped_review(state, title_id, review_id).await?;
    let author = username_of(state, model.author_id).await?;
    Ok(ApiResponse::success(
        "Review found",
        review_from_entity(model, author),
        Some(Meta::empty()),
    ))
}

/// One review per author per title; a second attempt is a validation
/// error, whether caught by the pre-check or by the unique index.
pub async fn create_review(
    state: &AppState,
    user: &AuthUser,
    title_id: Uuid,
    payload: CreateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    let title = find_title(state, title_id).await?;
    let author = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let mut errors = Vec::new();
    if let Err(err) = validate_text("text", &payload.text) {
        errors.push(err);
    }
    if let Err(err) = validate_score(payload.score) {
        errors.push(err);
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let already_reviewed = Reviews::find()
        .filter(reviews::Column::TitleId.eq(title.id))
        .filter(reviews::Column::AuthorId.eq(author.id))
        .count(&state.orm)
        .await?
        > 0;
    if already_reviewed {
        return Err(AppError::validation(
            "title",
            "you have already reviewed this title",
        ));
    }

    let active = reviews::ActiveModel {
        id: Set(Uuid::new_v4()),
        title_id: Set(title.id),
        author_id: Set(author.id),
        text: Set(payload.text),
        score: Set(payload.score),
        pub_date: Set(Utc::now().into()),
    };
    let model = active.insert(&state.orm).await.map_err(|err| {
        on_unique_violation(err, "title", "you have already reviewed this title")
    })?;

    if let Err(err) = log_audit(
        &state.pool,
        user.user_id,
        "review_create",
        "reviews",
        Some(serde_json::json!({ "review_id": model.id, "title_id": title.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Review created",
        review_from_entity(model, author.username),
        Some(Meta::empty()),
    ))
}

pub async fn update_review(
    state: &AppState,
    user: &AuthUser,
    title_id: Uuid,
    review_id: Uuid,
    payload: UpdateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    let existing = find_scoped_review(state, title_id, review_id).await?;
    ensure_admin_moderator_or_author(user, existing.author_id)?;

    let mut errors = Vec::new();
    if let Some(text) = payload.text.as_deref() {
        if let Err(err) = validate_text("text", text) {
            errors.push(err);
        }
    }
    if let Some(score) = payload.score {
        if let Err(err) = validate_score(score) {
            errors.push(err);
        }
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let author_id = existing.author_id;
    let mut active: reviews::ActiveModel = existing.into();
    if let Some(text) = payload.text {
        active.text = Set(text);
    }
    if let Some(score) = payload.score {
        active.score = Set(score);
    }
    let model = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        user.user_id,
        "review_update",
        "reviews",
        Some(serde_json::json!({ "review_id": model.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let author = username_of(state, author_id).await?;
    Ok(ApiResponse::success(
        "Review updated",
        review_from_entity(model, author),
        Some(Meta::empty()),
    ))
}

pub async fn delete_review(
    state: &AppState,
    user: &AuthUser,
    title_id: Uuid,
    review_id: Uuid,
) -> AppResult<ApiResponse<()>> {
    let existing = find_scoped_review(state, title_id, review_id).await?;
    ensure_admin_moderator_or_author(user, existing.author_id)?;
    let deleted_id = existing.id;
    existing.delete(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        user.user_id,
        "review_delete",
        "reviews",
        Some(serde_json::json!({ "review_id": deleted_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Review deleted",
        (),
        Some(Meta::empty()),
    ))
}

async fn find_title(state: &AppState, title_id: Uuid) -> AppResult<TitleModel> {
    Titles::find_by_id(title_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

/// A review is only addressable through its own title's path.
async fn find_scoped_review(
    state: &AppState,
    title_id: Uuid,
    review_id: Uuid,
) -> AppResult<ReviewModel> {
    Reviews::find_by_id(review_id)
        .filter(reviews::Column::TitleId.eq(title_id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

async fn author_usernames(
    state: &AppState,
    models: &[ReviewModel],
) -> AppResult<HashMap<Uuid, String>> {
    let author_ids: Vec<Uuid> = models.iter().map(|m| m.author_id).collect();
    let authors = Users::find()
        .filter(users::Column::Id.is_in(author_ids))
        .all(&state.orm)
        .await?;
    Ok(authors.into_iter().map(|u| (u.id, u.username)).collect())
}

async fn username_of(state: &AppState, user_id: Uuid) -> AppResult<String> {
    Ok(Users::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .map(|u| u.username)
        .unwrap_or_default())
}

fn review_from_entity(model: ReviewModel, author: String) -> Review {
    Review {
        id: model.id,
        text: model.text,
        author,
        score: model.score,
        pub_date: model.pub_date.with_timezone(&Utc),
    }
}
