use axum_review_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::users::{CreateUserRequest, UpdateMeRequest, UpdateUserRequest},
    entity::users::ActiveModel as UserActive,
    error::AppError,
    mailer::Mailer,
    middleware::auth::AuthUser,
    routes::params::Pagination,
    services::user_service,
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

// Integration flow: admin manages accounts through the users endpoints.
#[tokio::test]
async fn admin_user_management_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;

    let admin_id = seed_user(&state, &unique("boss"), "admin").await?;
    let auth_admin = AuthUser {
        user_id: admin_id,
        role: "admin".into(),
    };
    let auth_plain = AuthUser {
        user_id: Uuid::new_v4(),
        role: "user".into(),
    };

    // Only admins may touch the users collection.
    let err = user_service::list_users(&state, &auth_plain, default_page(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    // An omitted role defaults to "user".
    let prefix = unique("member");
    let first = user_service::create_user(
        &state,
        &auth_admin,
        CreateUserRequest {
            username: format!("{prefix}_a"),
            email: format!("{prefix}_a@example.com"),
            first_name: None,
            last_name: None,
            bio: None,
            role: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(first.role, "user");

    for suffix in ["b", "c", "d", "e"] {
        user_service::create_user(
            &state,
            &auth_admin,
            CreateUserRequest {
                username: format!("{prefix}_{suffix}"),
                email: format!("{prefix}_{suffix}@example.com"),
                first_name: None,
                last_name: None,
                bio: None,
                role: None,
            },
        )
        .await?;
    }

    // The user list pages by 4 per page unless told otherwise.
    let page_one =
        user_service::list_users(&state, &auth_admin, default_page(), Some(prefix.clone()))
            .await?;
    let meta = page_one.meta.unwrap();
    assert_eq!(meta.per_page, Some(4));
    assert_eq!(meta.total, Some(5));
    assert_eq!(meta.pages, Some(2));

    let items = page_one.data.unwrap().items;
    assert_eq!(items.len(), 4);
    let usernames: Vec<&str> = items.iter().map(|u| u.username.as_str()).collect();
    let mut sorted = usernames.clone();
    sorted.sort();
    assert_eq!(usernames, sorted, "expected username ascending order");
    assert_eq!(usernames[0], format!("{prefix}_a"));

    let page_two = user_service::list_users(
        &state,
        &auth_admin,
        Pagination {
            page: Some(2),
            per_page: None,
        },
        Some(prefix.clone()),
    )
    .await?;
    assert_eq!(page_two.data.unwrap().items.len(), 1);

    // Detail, patch, delete by username.
    let target = format!("{prefix}_c");
    let fetched = user_service::get_user(&state, &auth_admin, &target)
        .await?
        .data
        .unwrap();
    assert_eq!(fetched.username, target);

    let updated = user_service::update_user(
        &state,
        &auth_admin,
        &target,
        UpdateUserRequest {
            email: None,
            first_name: Some("Casey".into()),
            last_name: None,
            bio: Some("reads everything".into()),
            role: Some("moderator".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.first_name.as_deref(), Some("Casey"));
    assert_eq!(updated.bio.as_deref(), Some("reads everything"));
    assert_eq!(updated.role, "moderator");

    user_service::delete_user(&state, &auth_admin, &target).await?;
    let err = user_service::get_user(&state, &auth_admin, &target)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    // "me" is reserved and can never become an account name.
    let err = user_service::create_user(
        &state,
        &auth_admin,
        CreateUserRequest {
            username: "me".into(),
            email: format!("{prefix}_me@example.com"),
            first_name: None,
            last_name: None,
            bio: None,
            role: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    Ok(())
}

// Integration flow: profile self-service and the role escalation guard.
#[tokio::test]
async fn me_endpoint_role_guard_flow() -> anyhow::Result<()> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;

    let username = unique("plain");
    let user_id = seed_user(&state, &username, "user").await?;
    let auth_user = AuthUser {
        user_id,
        role: "user".into(),
    };

    let me = user_service::get_me(&state, &auth_user).await?.data.unwrap();
    assert_eq!(me.username, username);

    // A plain user asking for admin keeps the user role.
    let me = user_service::update_me(
        &state,
        &auth_user,
        UpdateMeRequest {
            email: None,
            first_name: None,
            last_name: None,
            bio: Some("just me".into()),
            role: Some("admin".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(me.bio.as_deref(), Some("just me"));
    assert_eq!(me.role, "user");

    // A moderator submitting a role change keeps what they sent.
    let moderator_id = seed_user(&state, &unique("mod"), "moderator").await?;
    let auth_moderator = AuthUser {
        user_id: moderator_id,
        role: "moderator".into(),
    };
    let me = user_service::update_me(
        &state,
        &auth_moderator,
        UpdateMeRequest {
            email: None,
            first_name: None,
            last_name: None,
            bio: None,
            role: Some("admin".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(me.role, "admin");

    // Malformed email is rejected.
    let err = user_service::update_me(
        &state,
        &auth_user,
        UpdateMeRequest {
            email: Some("not-an-email".into()),
            first_name: None,
            last_name: None,
            bio: None,
            role: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // A token for a deleted account no longer authenticates.
    let ghost = AuthUser {
        user_id: Uuid::new_v4(),
        role: "user".into(),
    };
    let err = user_service::get_me(&state, &ghost).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));

    Ok(())
}

fn default_page() -> Pagination {
    Pagination {
        page: None,
        per_page: None,
    }
}

fn unique(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    Ok(AppState {
        pool,
        orm,
        mailer: Mailer::disabled(),
    })
}

async fn seed_user(state: &AppState, username: &str, role: &str) -> anyhow::Result<Uuid> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        email: Set(format!("{username}@example.com")),
        first_name: Set(None),
        last_name: Set(None),
        bio: Set(None),
        role: Set(role.into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(user.id)
}
