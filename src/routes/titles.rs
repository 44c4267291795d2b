use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::titles::{CreateTitleRequest, TitleList, UpdateTitleRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Title,
    response::ApiResponse,
    routes::params::{Pagination, TitleListQuery},
    services::title_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_titles).post(create_title))
        .route(
            "/{title_id}",
            get(get_title).patch(update_title).delete(delete_title),
        )
}

#[utoipa::path(
    get,
    path = "/api/v1/titles",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("category" = Option<String>, Query, description = "Category slug filter"),
        ("genre" = Option<String>, Query, description = "Genre slug filter"),
        ("name" = Option<String>, Query, description = "Name substring filter"),
        ("year" = Option<i32>, Query, description = "Exact year filter"),
    ),
    responses(
        (status = 200, description = "List titles", body = ApiResponse<TitleList>),
    ),
    tag = "titles"
)]
pub async fn list_titles(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
    Query(query): Query<TitleListQuery>,
) -> AppResult<Json<ApiResponse<TitleList>>> {
    let resp = title_service::list_titles(&state, pagination, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/titles",
    request_body = CreateTitleRequest,
    responses(
        (status = 200, description = "Title created", body = ApiResponse<Title>),
        (status = 400, description = "Validation failed or unknown slug"),
        (status = 403, description = "Admin only"),
    ),
    tag = "titles"
)]
pub async fn create_title(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateTitleRequest>,
) -> AppResult<Json<ApiResponse<Title>>> {
    let resp = title_service::create_title(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/titles/{title_id}",
    params(("title_id" = Uuid, Path, description = "Title id")),
    responses(
        (status = 200, description = "Title detail", body = ApiResponse<Title>),
        (status = 404, description = "Title not found"),
    ),
    tag = "titles"
)]
pub async fn get_title(
    State(state): State<AppState>,
    Path(title_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Title>>> {
    let resp = title_service::get_title(&state, title_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/v1/titles/{title_id}",
    params(("title_id" = Uuid, Path, description = "Title id")),
    request_body = UpdateTitleRequest,
    responses(
        (status = 200, description = "Title updated", body = ApiResponse<Title>),
        (status = 400, description = "Validation failed or unknown slug"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Title not found"),
    ),
    tag = "titles"
)]
pub async fn update_title(
    State(state): State<AppState>,
    user: AuthUser,
    Path(title_id): Path<Uuid>,
    Json(payload): Json<UpdateTitleRequest>,
) -> AppResult<Json<ApiResponse<Title>>> {
    let resp = title_service::update_title(&state, &user, title_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/v1/titles/{title_id}",
    params(("title_id" = Uuid, Path, description = "Title id")),
    responses(
        (status = 200, description = "Title deleted"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Title not found"),
    ),
    tag = "titles"
)]
pub async fn delete_title(
    State(state): State<AppState>,
    user: AuthUser,
    Path(title_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = title_service::delete_title(&state, &user, title_id).await?;
    Ok(Json(resp))
}
