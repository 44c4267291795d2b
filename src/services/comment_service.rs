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
    dto::reviews::{CommentList, CreateCommentRequest, UpdateCommentRequest},
    entity::{
        comments::{self, Entity as Comments, Model as CommentModel},
        reviews::{self, Entity as Reviews, Model as ReviewModel},
        users::{self, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin_moderator_or_author},
    models::Comment,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
    validators::validate_text,
};

/// Comments under one review, newest first. The (title, review) pair
/// from the path must match or the whole listing is a 404.
pub async fn list_comments(
    state: &AppState,
    title_id: Uuid,
    review_id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<CommentList>> {
    let review = find_scoped_review(state, title_id, review_id).await?;
    let (page, per_page, offset) = pagination.normalize();

    let finder = Comments::find()
        .filter(comments::Column::ReviewId.eq(review.id))
        .order_by_desc(comments::Column::PubDate);

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
            comment_from_entity(model, author)
        })
        .collect();

    let meta = Meta::new(page, per_page, total);
    Ok(ApiResponse::success(
        "Comments",
        CommentList { items },
        Some(meta),
    ))
}

pub async fn get_comment(
    state: &AppState,
    title_id: Uuid,
    review_id: Uuid,
    comment_id: Uuid,
) -> AppResult<ApiResponse<Comment>> {
    let model = find_scoped_comment(state, title_id, review_id, comment_id).await?;
    let author = username_of(state, model.author_id).await?;
    Ok(ApiResponse::success(
        "Comment found",
        comment_from_entity(model, author),
        Some(Meta::empty()),
    ))
}

pub async fn create_comment(
    state: &AppState,
    user: &AuthUser,
    title_id: Uuid,
    review_id: Uuid,
    payload: CreateCommentRequest,
) -> AppResult<ApiResponse<Comment>> {
    let review = find_scoped_review(state, title_id, review_id).await?;
    let author = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if let Err(err) = validate_text("text", &payload.text) {
        return Err(AppError::Validation(vec![err]));
    }

    let active = comments::ActiveModel {
        id: Set(Uuid::new_v4()),
        review_id: Set(review.id),
        author_id: Set(author.id),
        text: Set(payload.text),
        pub_date: Set(Utc::now().into()),
    };
    let model = active.insert(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        user.user_id,
        "comment_create",
        "comments",
        Some(serde_json::json!({ "comment_id": model.id, "review_id": review.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Comment created",
        comment_from_entity(model, author.username),
        Some(Meta::empty()),
    ))
}

pub async fn update_comment(
    state: &AppState,
    user: &AuthUser,
    title_id: Uuid,
    review_id: Uuid,
    comment_id: Uuid,
    payload: UpdateCommentRequest,
) -> AppResult<ApiResponse<Comment>> {
    let existing = find_scoped_comment(state, title_id, review_id, comment_id).await?;
    ensure_admin_moderator_or_author(user, existing.author_id)?;

    if let Some(text) = payload.text.as_deref() {
        if let Err(err) = validate_text("text", text) {
            return Err(AppError::Validation(vec![err]));
        }
    }

    let author_id = existing.author_id;
    let mut active: comments::ActiveModel = existing.into();
    if let Some(text) = payload.text {
        active.text = Set(text);
    }
    let model = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        user.user_id,
        "comment_update",
        "comments",
        Some(serde_json::json!({ "comment_id": model.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let author = username_of(state, author_id).await?;
    Ok(ApiResponse::success(
        "Comment updated",
        comment_from_entity(model, author),
        Some(Meta::empty()),
    ))
}

pub async fn delete_comment(
    state: &AppState,
    user: &AuthUser,
    title_id: Uuid,
    review_id: Uuid,
    comment_id: Uuid,
) -> AppResult<ApiResponse<()>> {
    let existing = find_scoped_comment(state, title_id, review_id, comment_id).await?;
    ensure_admin_moderator_or_author(user, existing.author_id)?;
    let deleted_id = existing.id;
    existing.delete(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        user.user_id,
        "comment_delete",
        "comments",
        Some(serde_json::json!({ "comment_id": deleted_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Comment deleted",
        (),
        Some(Meta::empty()),
    ))
}

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

async fn find_scoped_comment(
    state: &AppState,
    title_id: Uuid,
    review_id: Uuid,
    comment_id: Uuid,
) -> AppResult<CommentModel> {
    // The review lookup also verifies the title half of the path.
    let review = find_scoped_review(state, title_id, review_id).await?;
    Comments::find_by_id(comment_id)
        .filter(comments::Column::ReviewId.eq(review.id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

async fn author_usernames(
    state: &AppState,
    models: &[CommentModel],
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

fn comment_from_entity(model: CommentModel, author: String) -> Comment {
    Comment {
        id: model.id,
        text: model.text,
        author,
        pub_date: model.pub_date.with_timezone(&Utc),
    }
}
