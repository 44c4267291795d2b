use std::collections::HashMap;

use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::titles::{CreateTitleRequest, TitleList, UpdateTitleRequest},
    entity::{
        categories::{self, Entity as Categories, Model as CategoryModel},
        genre_titles::{self, Entity as GenreTitles},
        genres::{self, Entity as Genres, Model as GenreModel},
        titles::{self, Entity as Titles, Model as TitleModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Category, Genre, Title},
    response::{ApiResponse, Meta},
    routes::params::{Pagination, TitleListQuery},
    state::AppState,
    validators::{validate_name, validate_year},
};

pub async fn list_titles(
    state: &AppState,
    pagination: Pagination,
    query: TitleListQuery,
) -> AppResult<ApiResponse<TitleList>> {
    let (page, per_page, offset) = pagination.normalize();

    let mut condition = Condition::all();

    if let Some(slug) = query.category.as_ref().filter(|s| !s.is_empty()) {
        let category = Categories::find()
            .filter(categories::Column::Slug.eq(slug.as_str()))
            .one(&state.orm)
            .await?;
        match category {
            Some(c) => condition = condition.add(titles::Column::CategoryId.eq(c.id)),
            // An unknown slug matches nothing.
            None => return Ok(empty_page(page, per_page)),
        }
    }

    if let Some(slug) = query.genre.as_ref().filter(|s| !s.is_empty()) {
        let genre = Genres::find()
            .filter(genres::Column::Slug.eq(slug.as_str()))
            .one(&state.orm)
            .await?;
        match genre {
            Some(g) => {
                let title_ids: Vec<Uuid> = GenreTitles::find()
                    .filter(genre_titles::Column::GenreId.eq(g.id))
                    .all(&state.orm)
                    .await?
                    .into_iter()
                    .map(|link| link.title_id)
                    .collect();
                condition = condition.add(titles::Column::Id.is_in(title_ids));
            }
            None => return Ok(empty_page(page, per_page)),
        }
    }

    if let Some(name) = query.name.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(Expr::col(titles::Column::Name).ilike(format!("%{name}%")));
    }
    if let Some(year) = query.year {
        condition = condition.add(titles::Column::Year.eq(year));
    }

    let finder = Titles::find()
        .filter(condition)
        .order_by_asc(titles::Column::Year);

    let total = finder.clone().count(&state.orm).await? as i64;
    let models = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;
    let items = build_title_views(state, models).await?;

    let meta = Meta::new(page, per_page, total);
    Ok(ApiResponse::success("Titles", TitleList { items }, Some(meta)))
}

pub async fn get_title(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Title>> {
    let model = Titles::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let view = build_title_view(state, model).await?;
    Ok(ApiResponse::success("Title found", view, Some(Meta::empty())))
}

pub async fn create_title(
    state: &AppState,
    user: &AuthUser,
    payload: CreateTitleRequest,
) -> AppResult<ApiResponse<Title>> {
    ensure_admin(user)?;

    let mut errors = Vec::new();
    if let Err(err) = validate_name("name", &payload.name) {
        errors.push(err);
    }
    if let Err(err) = validate_year(payload.year) {
        errors.push(err);
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let genres = resolve_genres(state, &payload.genre).await?;
    let category = match payload.category.as_deref() {
        Some(slug) => Some(resolve_category(state, slug).await?),
        None => None,
    };

    let active = titles::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        year: Set(payload.year),
        description: Set(payload.description),
        category_id: Set(category.as_ref().map(|c| c.id)),
        created_at: NotSet,
    };

    let txn = state.orm.begin().await?;
    let model = active.insert(&txn).await?;
    for genre in &genres {
        let link = genre_titles::ActiveModel {
            id: Set(Uuid::new_v4()),
            genre_id: Set(genre.id),
            title_id: Set(model.id),
        };
        link.insert(&txn).await?;
    }
    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        user.user_id,
        "title_create",
        "titles",
        Some(serde_json::json!({ "title_id": model.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let view = build_title_view(state, model).await?;
    Ok(ApiResponse::success(
        "Title created",
        view,
        Some(Meta::empty()),
    ))
}

/// Partial update. A genre list, when present, replaces the full set of
/// links; an absent category leaves the current one in place.
pub async fn update_title(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateTitleRequest,
) -> AppResult<ApiResponse<Title>> {
    ensure_admin(user)?;
    let existing = Titles::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut errors = Vec::new();
    if let Some(name) = payload.name.as_deref() {
        if let Err(err) = validate_name("name", name) {
            errors.push(err);
        }
    }
    if let Some(year) = payload.year {
        if let Err(err) = validate_year(year) {
            errors.push(err);
        }
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let genres = match payload.genre.as_deref() {
        Some(slugs) => Some(resolve_genres(state, slugs).await?),
        None => None,
    };
    let category = match payload.category.as_deref() {
        Some(slug) => Some(resolve_category(state, slug).await?),
        None => None,
    };

    let mut active: titles::ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(year) = payload.year {
        active.year = Set(year);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(c) = &category {
        active.category_id = Set(Some(c.id));
    }

    let txn = state.orm.begin().await?;
    let model = active.update(&txn).await?;
    if let Some(genres) = &genres {
        GenreTitles::delete_many()
            .filter(genre_titles::Column::TitleId.eq(model.id))
            .exec(&txn)
            .await?;
        for genre in genres {
            let link = genre_titles::ActiveModel {
                id: Set(Uuid::new_v4()),
                genre_id: Set(genre.id),
                title_id: Set(model.id),
            };
            link.insert(&txn).await?;
        }
    }
    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        user.user_id,
        "title_update",
        "titles",
        Some(serde_json::json!({ "title_id": model.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let view = build_title_view(state, model).await?;
    Ok(ApiResponse::success(
        "Title updated",
        view,
        Some(Meta::empty()),
    ))
}

/// Removing a title takes its reviews and their comments with it.
pub async fn delete_title(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<()>> {
    ensure_admin(user)?;
    let existing = Titles::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    existing.delete(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        user.user_id,
        "title_delete",
        "titles",
        Some(serde_json::json!({ "title_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Title deleted", (), Some(Meta::empty())))
}

fn empty_page(page: i64, per_page: i64) -> ApiResponse<TitleList> {
    ApiResponse::success(
        "Titles",
        TitleList { items: Vec::new() },
        Some(Meta::new(page, per_page, 0)),
    )
}

async fn resolve_genres(state: &AppState, slugs: &[String]) -> AppResult<Vec<GenreModel>> {
    let mut out: Vec<GenreModel> = Vec::with_capacity(slugs.len());
    for slug in slugs {
        if out.iter().any(|g| g.slug == *slug) {
            continue;
        }
        let genre = Genres::find()
            .filter(genres::Column::Slug.eq(slug.as_str()))
            .one(&state.orm)
            .await?
            .ok_or_else(|| {
                AppError::validation("genre", format!("unknown genre slug \"{slug}\""))
            })?;
        out.push(genre);
    }
    Ok(out)
}

async fn resolve_category(state: &AppState, slug: &str) -> AppResult<CategoryModel> {
    Categories::find()
        .filter(categories::Column::Slug.eq(slug))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::validation("category", format!("unknown category slug \"{slug}\"")))
}

async fn build_title_view(state: &AppState, model: TitleModel) -> AppResult<Title> {
    let mut views = build_title_views(state, vec![model]).await?;
    views
        .pop()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("title view assembly lost its row")))
}

/// Expands titles into their read shape: nested genres and category plus
/// the aggregated rating, fetched in bulk for the whole page.
async fn build_title_views(state: &AppState, models: Vec<TitleModel>) -> AppResult<Vec<Title>> {
    if models.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();

    let links = GenreTitles::find()
        .filter(genre_titles::Column::TitleId.is_in(ids.clone()))
        .find_also_related(Genres)
        .all(&state.orm)
        .await?;
    let mut genres_by_title: HashMap<Uuid, Vec<Genre>> = HashMap::new();
    for (link, genre) in links {
        if let Some(genre) = genre {
            genres_by_title
                .entry(link.title_id)
                .or_default()
                .push(Genre {
                    name: genre.name,
                    slug: genre.slug,
                });
        }
    }
    for genres in genres_by_title.values_mut() {
        genres.sort_by(|a, b| a.name.cmp(&b.name));
    }

    let category_ids: Vec<Uuid> = models.iter().filter_map(|m| m.category_id).collect();
    let categories: HashMap<Uuid, CategoryModel> = Categories::find()
        .filter(categories::Column::Id.is_in(category_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    let ratings = fetch_ratings(&state.pool, &ids).await?;

    let views = models
        .into_iter()
        .map(|model| {
            let category = model
                .category_id
                .and_then(|id| categories.get(&id))
                .map(|c| Category {
                    name: c.name.clone(),
                    slug: c.slug.clone(),
                });
            Title {
                id: model.id,
                name: model.name,
                year: model.year,
                description: model.description,
                rating: ratings.get(&model.id).copied().map(round_rating),
                genre: genres_by_title.remove(&model.id).unwrap_or_default(),
                category,
            }
        })
        .collect();

    Ok(views)
}

/// Postgres averages integers as NUMERIC; cast to float8 so sqlx can
/// decode straight into f64.
async fn fetch_ratings(pool: &DbPool, title_ids: &[Uuid]) -> AppResult<HashMap<Uuid, f64>> {
    let rows: Vec<(Uuid, f64)> = sqlx::query_as(
        "SELECT title_id, AVG(score)::float8 FROM reviews WHERE title_id = ANY($1) GROUP BY title_id",
    )
    .bind(title_ids)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().collect())
}

fn round_rating(avg: f64) -> f64 {
    (avg * 10.0).round() / 10.0
}
