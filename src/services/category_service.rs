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
    dto::catalog::{CategoryList, CreateCategoryRequest},
    entity::categories::{self, Entity as Categories, Model as CategoryModel},
    error::{AppError, AppResult, on_unique_violation},
    middleware::auth::{AuthUser, ensure_admin},
    models::Category,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
    validators::{validate_name, validate_slug},
};

pub async fn list_categories(
    state: &AppState,
    pagination: Pagination,
    search: Option<String>,
) -> AppResult<ApiResponse<CategoryList>> {
    let (page, per_page, offset) = pagination.normalize();

    let mut condition = Condition::all();
    if let Some(term) = search.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(Expr::col(categories::Column::Name).ilike(format!("{term}%")));
    }

    let finder = Categories::find()
        .filter(condition)
        .order_by_asc(categories::Column::Name);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(category_from_entity)
        .collect();

    let meta = Meta::new(page, per_page, total);
    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(meta),
    ))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
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

    let active = categories::ActiveModel {
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
        "category_create",
        "categories",
        Some(serde_json::json!({ "slug": created.slug })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Category created",
        category_from_entity(created),
        Some(Meta::empty()),
    ))
}

/// Deleting a category detaches it from its titles rather than removing
/// them; the foreign key nulls out.
pub async fn delete_category(
    state: &AppState,
    user: &AuthUser,
    slug: &str,
) -> AppResult<ApiResponse<()>> {
    ensure_admin(user)?;
    let existing = Categories::find()
        .filter(categories::Column::Slug.eq(slug))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let deleted_slug = existing.slug.clone();
    existing.delete(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        user.user_id,
        "category_delete",
        "categories",
        Some(serde_json::json!({ "slug": deleted_slug })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Category deleted",
        (),
        Some(Meta::empty()),
    ))
}

fn category_from_entity(model: CategoryModel) -> Category {
    Category {
        name: model.name,
        slug: model.slug,
    }
}
