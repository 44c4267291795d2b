use axum_review_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::auth::{ObtainTokenRequest, SignUpRequest},
    error::AppError,
    mailer::Mailer,
    services::auth_service,
    state::AppState,
};
use uuid::Uuid;

// Integration flow: sign up -> code stored -> re-signup rotates the code ->
// token exchange consumes it.
#[tokio::test]
async fn signup_and_token_flow() -> anyhow::Result<()> {
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
    unsafe { std::env::set_var("JWT_SECRET", "integration-test-secret") };

    let state = setup_state(&database_url).await?;

    let username = format!("reader_{}", Uuid::new_v4().simple());
    let email = format!("{username}@example.com");

    // First signup creates the user and stores a confirmation code.
    let resp = auth_service::sign_up(
        &state,
        SignUpRequest {
            username: username.clone(),
            email: email.clone(),
        },
    )
    .await?;
    let data = resp.data.unwrap();
    assert_eq!(data.username, username);
    assert_eq!(data.email, email);

    let first_code = stored_code(&state, &username).await?;
    assert_eq!(first_code.len(), 27);

    // Signing up again with the same pair is allowed and rotates the code.
    auth_service::sign_up(
        &state,
        SignUpRequest {
            username: username.clone(),
            email: email.clone(),
        },
    )
    .await?;
    let second_code = stored_code(&state, &username).await?;
    assert_ne!(first_code, second_code);

    // The same username with a different email belongs to someone else now.
    let err = auth_service::sign_up(
        &state,
        SignUpRequest {
            username: username.clone(),
            email: format!("other_{email}"),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Same email under a new username is rejected too.
    let err = auth_service::sign_up(
        &state,
        SignUpRequest {
            username: format!("other_{username}"),
            email: email.clone(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // A wrong code does not issue a token.
    let err = auth_service::obtain_token(
        &state,
        ObtainTokenRequest {
            username: username.clone(),
            confirmation_code: "not-the-code".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // An unknown username is a 404, not a validation error.
    let err = auth_service::obtain_token(
        &state,
        ObtainTokenRequest {
            username: format!("ghost_{}", Uuid::new_v4().simple()),
            confirmation_code: second_code.clone(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    // The stored code works exactly once.
    let resp = auth_service::obtain_token(
        &state,
        ObtainTokenRequest {
            username: username.clone(),
            confirmation_code: second_code.clone(),
        },
    )
    .await?;
    let token = resp.data.unwrap().token;
    assert_eq!(token.split('.').count(), 3);

    let err = auth_service::obtain_token(
        &state,
        ObtainTokenRequest {
            username: username.clone(),
            confirmation_code: second_code,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    Ok(())
}

#[tokio::test]
async fn signup_rejects_reserved_and_malformed_names() -> anyhow::Result<()> {
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

    for username in ["me", "has space", ""] {
        let err = auth_service::sign_up(
            &state,
            SignUpRequest {
                username: username.to_string(),
                email: format!("valid_{}@example.com", Uuid::new_v4().simple()),
            },
        )
        .await
        .unwrap_err();
        assert!(
            matches!(err, AppError::Validation(_)),
            "expected validation error for username {username:?}"
        );
    }

    Ok(())
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

async fn stored_code(state: &AppState, username: &str) -> anyhow::Result<String> {
    let row: (String,) = sqlx::query_as(
        r#"
        SELECT uc.confirmation_code
        FROM user_codes uc
        JOIN users u ON u.id = uc.user_id
        WHERE u.username = $1
        "#,
    )
    .bind(username)
    .fetch_one(&state.pool)
    .await?;
    Ok(row.0)
}
