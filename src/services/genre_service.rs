use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::catalog::{CreateGenreRequest, GenreList},
    entity::genres::{self, Entity as Genres, Model as GenreModel},
    error::{AppError, AppResult, on_unique_violation},
    middleware::auth::{AuthUser, ensure_admin},
    models::Genre,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
    validators::{validate_name, validate_slug},
};

/// Genres are searchable by name prefix and also by slug prefix.
pub async fn list_genres(
    state: &AppState,
    pagination: Pagination,
    search: Option<String>,
) -> AppResult<ApiResponse<GenreList>> {
    let (page, per_page, offset) = pagination.normalize();

    let mut condition = Condition::all();
    if let Some(term) = search.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(
            Condition::any()
                .add(Expr::col(genres::Column::Name).ilike(format!("{term}%")))
                .add(Expr::col(genres::Column::Slug).ilike(format!("{term}%"))),
        );
    }

    let finder = Genres::find()
        .filter(condition)
        .order_by_asc(genres::Column::Name);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(genre_from_entity)
        .collect();

    let meta = Meta::new(page, per_page, total);
    Ok(ApiResponse::success("Genres", GenreList { items }, Some(meta)))
}

pub async fn create_genre(
    state: &AppState,
    user: &AuthUser,
    payload: CreateGenreRequest,
) -> AppResult<ApiResponse<Genre>> {
    ensure_admin(user)?;

    let mut errors = Vec::new();
    if let Err(err) = validate_name("name", &payload.name) {
        errors.push(err);
    }
    if let Err(err) = validate_slug(&payload.slug) {
        errors.push(err);
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let active = genres::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        slug: Set(payload.slug),
    };
    let created = active
        .insert(&state.orm)
        .await
        .map_err(|err| on_unique_violation(err, "slug", "slug is already taken"))?;

    if let Err(err) = log_audit(
        &state.pool,
        user.user_id,
        "genre_create",
        "genres",
        Some(serde_json::json!({ "slug": created.slug })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Genre created",
        genre_from_entity(created),
        Some(Meta::empty()),
    ))
}

/// Deleting a genre drops its title links through the join table.
pub async fn delete_genre(
    state: &AppState,
    user: &AuthUser,
    slug: &str,
) -> AppResult<ApiResponse<()>> {
    ensure_admin(user)?;
    let existing = Genres::find()
        .filter(genres::Column::Slug.eq(slug))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let deleted_slug = existing.slug.clone();
    existing.delete(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        user.user_id,
        "genre_delete",
        "genres",
        Some(serde_json::json!({ "slug": deleted_slug })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Genre deleted", (), Some(Meta::empty())))
}

fn genre_from_entity(model: GenreModel) -> Genre {
    Genre {
        name: model.name,
        slug: model.slug,
    }
}
