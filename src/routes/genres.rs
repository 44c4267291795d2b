use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get},
};

use crate::{
    dto::catalog::{CreateGenreRequest, GenreList},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Genre,
    response::ApiResponse,
    routes::params::{Pagination, SearchQuery},
    services::genre_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_genres).post(create_genre))
        .route("/{slug}", delete(delete_genre))
}

#[utoipa::path(
    get,
    path = "/api/v1/genres",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("search" = Option<String>, Query, description = "Name or slug prefix filter"),
    ),
    responses(
        (status = 200, description = "List genres", body = ApiResponse<GenreList>),
    ),
    tag = "genres"
)]
pub async fn list_genres(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
    Query(search): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<GenreList>>> {
    let resp = genre_service::list_genres(&state, pagination, search.search).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/genres",
    request_body = CreateGenreRequest,
    responses(
        (status = 200, description = "Genre created", body = ApiResponse<Genre>),
        (status = 400, description = "Validation failed or slug taken"),
        (status = 403, description = "Admin only"),
    ),
    tag = "genres"
)]
pub async fn create_genre(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateGenreRequest>,
) -> AppResult<Json<ApiResponse<Genre>>> {
    let resp = genre_service::create_genre(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/v1/genres/{slug}",
    params(("slug" = String, Path, description = "Genre slug")),
    responses(
        (status = 200, description = "Genre deleted"),
        (status = 404, description = "Unknown slug"),
    ),
    tag = "genres"
)]
pub async fn delete_genre(
    State(state): State<AppState>,
    user: AuthUser,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = genre_service::delete_genre(&state, &user, &slug).await?;
    Ok(Json(resp))
}
