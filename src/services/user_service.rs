use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::users::{CreateUserRequest, UpdateMeRequest, UpdateUserRequest, UserList},
    entity::users::{self, Entity as Users, Model as UserModel},
    error::{AppError, AppResult, on_unique_violation},
    middleware::auth::{AuthUser, ensure_admin},
    models::User,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
    validators::{
        ROLE_USER, validate_email, validate_person_name, validate_role, validate_username,
    },
};

/// The user list keeps the small page size the API has always had.
const USERS_PER_PAGE: i64 = 4;

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
    search: Option<String>,
) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(user)?;
    let (page, per_page, offset) = pagination.normalize_or(USERS_PER_PAGE);

    let mut condition = Condition::all();
    if let Some(term) = search.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(Expr::col(users::Column::Username).ilike(format!("{term}%")));
    }

    let finder = Users::find()
        .filter(condition)
        .order_by_asc(users::Column::Username);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(user_from_entity)
        .collect();

    let meta = Meta::new(page, per_page, total);
    Ok(ApiResponse::success("Users", UserList { items }, Some(meta)))
}

pub async fn create_user(
    state: &AppState,
    user: &AuthUser,
    payload: CreateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;

    let mut errors = Vec::new();
    if let Err(err) = validate_username(&payload.username) {
        errors.push(err);
    }
    if let Err(err) = validate_email(&payload.email) {
        errors.push(err);
    }
    if let Some(role) = payload.role.as_deref() {
        if let Err(err) = validate_role(role) {
            errors.push(err);
        }
    }
    if let Some(name) = payload.first_name.as_deref() {
        if let Err(err) = validate_person_name("first_name", name) {
            errors.push(err);
        }
    }
    if let Some(name) = payload.last_name.as_deref() {
        if let Err(err) = validate_person_name("last_name", name) {
            errors.push(err);
        }
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let active = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(payload.username),
        email: Set(payload.email),
        first_name: Set(payload.first_name),
        last_name: Set(payload.last_name),
        bio: Set(payload.bio),
        role: Set(payload.role.unwrap_or_else(|| ROLE_USER.to_string())),
        created_at: NotSet,
    };
    let created = active.insert(&state.orm).await.map_err(|err| {
        on_unique_violation(err, "username", "username or email is already taken")
    })?;

    if let Err(err) = log_audit(
        &state.pool,
        user.user_id,
        "user_create",
        "users",
        Some(serde_json::json!({ "username": created.username })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "User created",
        user_from_entity(created),
        Some(Meta::empty()),
    ))
}

pub async fn get_user(
    state: &AppState,
    user: &AuthUser,
    username: &str,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;
    let found = find_by_username(state, username).await?;
    Ok(ApiResponse::success(
        "User found",
        user_from_entity(found),
        Some(Meta::empty()),
    ))
}

pub async fn update_user(
    state: &AppState,
    user: &AuthUser,
    username: &str,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;
    let existing = find_by_username(state, username).await?;

    let mut errors = Vec::new();
    if let Some(email) = payload.email.as_deref() {
        if let Err(err) = validate_email(email) {
            errors.push(err);
        }
    }
    if let Some(role) = payload.role.as_deref() {
        if let Err(err) = validate_role(role) {
            errors.push(err);
        }
    }
    if let Some(name) = payload.first_name.as_deref() {
        if let Err(err) = validate_person_name("first_name", name) {
            errors.push(err);
        }
    }
    if let Some(name) = payload.last_name.as_deref() {
        if let Err(err) = validate_person_name("last_name", name) {
            errors.push(err);
        }
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let mut active: users::ActiveModel = existing.into();
    if let Some(email) = payload.email {
        active.email = Set(email);
    }
    if let Some(first_name) = payload.first_name {
        active.first_name = Set(Some(first_name));
    }
    if let Some(last_name) = payload.last_name {
        active.last_name = Set(Some(last_name));
    }
    if let Some(bio) = payload.bio {
        active.bio = Set(Some(bio));
    }
    if let Some(role) = payload.role {
        active.role = Set(role);
    }
    let updated = active
        .update(&state.orm)
        .await
        .map_err(|err| on_unique_violation(err, "email", "email is already taken"))?;

    if let Err(err) = log_audit(
        &state.pool,
        user.user_id,
        "user_update",
        "users",
        Some(serde_json::json!({ "username": updated.username })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "User updated",
        user_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub async fn delete_user(
    state: &AppState,
    user: &AuthUser,
    username: &str,
) -> AppResult<ApiResponse<()>> {
    ensure_admin(user)?;
    let existing = find_by_username(state, username).await?;
    let deleted_username = existing.username.clone();
    existing.delete(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        user.user_id,
        "user_delete",
        "users",
        Some(serde_json::json!({ "username": deleted_username })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("User deleted", (), Some(Meta::empty())))
}

pub async fn get_me(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<User>> {
    // A token whose subject no longer exists does not authenticate anyone.
    let found = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::Unauthorized)?;
    Ok(ApiResponse::success(
        "User found",
        user_from_entity(found),
        Some(Meta::empty()),
    ))
}

/// Profile self-update. The role a caller submits only takes effect for
/// moderators and admins; a plain user always ends up with role "user".
pub async fn update_me(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateMeRequest,
) -> AppResult<ApiResponse<User>> {
    let existing = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let mut errors = Vec::new();
    if let Some(email) = payload.email.as_deref() {
        if let Err(err) = validate_email(email) {
            errors.push(err);
        }
    }
    if let Some(role) = payload.role.as_deref() {
        if let Err(err) = validate_role(role) {
            errors.push(err);
        }
    }
    if let Some(name) = payload.first_name.as_deref() {
        if let Err(err) = validate_person_name("first_name", name) {
            errors.push(err);
        }
    }
    if let Some(name) = payload.last_name.as_deref() {
        if let Err(err) = validate_person_name("last_name", name) {
            errors.push(err);
        }
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let mut active: users::ActiveModel = existing.into();
    if let Some(email) = payload.email {
        active.email = Set(email);
    }
    if let Some(first_name) = payload.first_name {
        active.first_name = Set(Some(first_name));
    }
    if let Some(last_name) = payload.last_name {
        active.last_name = Set(Some(last_name));
    }
    if let Some(bio) = payload.bio {
        active.bio = Set(Some(bio));
    }
    if user.is_admin() || user.is_moderator() {
        if let Some(role) = payload.role {
            active.role = Set(role);
        }
    } else {
        active.role = Set(ROLE_USER.to_string());
    }
    let updated = active
        .update(&state.orm)
        .await
        .map_err(|err| on_unique_violation(err, "email", "email is already taken"))?;

    if let Err(err) = log_audit(
        &state.pool,
        user.user_id,
        "me_update",
        "users",
        Some(serde_json::json!({ "username": updated.username })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "User updated",
        user_from_entity(updated),
        Some(Meta::empty()),
    ))
}

async fn find_by_username(state: &AppState, username: &str) -> AppResult<UserModel> {
    Users::find()
        .filter(users::Column::Username.eq(username))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

fn user_from_entity(model: UserModel) -> User {
    User {
        username: model.username,
        email: model.email,
        first_name: model.first_name,
        last_name: model.last_name,
        bio: model.bio,
        role: model.role,
    }
}
