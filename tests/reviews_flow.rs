use axum_review_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::{
        reviews::{
            CreateCommentRequest, CreateReviewRequest, UpdateCommentRequest, UpdateReviewRequest,
        },
        titles::CreateTitleRequest,
    },
    entity::users::ActiveModel as UserActive,
    entity::{Comments, Reviews},
    error::AppError,
    mailer::Mailer,
    middleware::auth::AuthUser,
    routes::params::Pagination,
    services::{comment_service, review_service, title_service},
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use uuid::Uuid;

// Integration flow: three readers score a title, the mean shows up on the
// title, and moderation rules gate edits on reviews and comments.
#[tokio::test]
async fn reviews_comments_and_rating_flow() -> anyhow::Result<()> {
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

    let admin_id = seed_user(&state, &unique("chief"), "admin").await?;
    let auth_admin = AuthUser {
        user_id: admin_id,
        role: "admin".into(),
    };

    let name1 = unique("reader1");
    let name2 = unique("reader2");
    let name3 = unique("reader3");
    let auth1 = AuthUser {
        user_id: seed_user(&state, &name1, "user").await?,
        role: "user".into(),
    };
    let auth2 = AuthUser {
        user_id: seed_user(&state, &name2, "user").await?,
        role: "user".into(),
    };
    let auth3 = AuthUser {
        user_id: seed_user(&state, &name3, "user").await?,
        role: "user".into(),
    };

    let title = title_service::create_title(
        &state,
        &auth_admin,
        CreateTitleRequest {
            name: unique("Quiet Harbor"),
            year: 2001,
            description: None,
            genre: vec![],
            category: None,
        },
    )
    .await?
    .data
    .unwrap();

    let review1 = review_service::create_review(
        &state,
        &auth1,
        title.id,
        CreateReviewRequest {
            text: "Slow start, strong finish".into(),
            score: 7,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(review1.author, name1);
    assert_eq!(review1.score, 7);

    // One review per reader per title.
    let err = review_service::create_review(
        &state,
        &auth1,
        title.id,
        CreateReviewRequest {
            text: "Changed my mind".into(),
            score: 2,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Scores live on a 1..=10 scale.
    for score in [0, 11] {
        let err = review_service::create_review(
            &state,
            &auth2,
            title.id,
            CreateReviewRequest {
                text: "Out of range".into(),
                score,
            },
        )
        .await
        .unwrap_err();
        assert!(
            matches!(err, AppError::Validation(_)),
            "expected validation error for score {score}"
        );
    }

    let err = review_service::create_review(
        &state,
        &auth2,
        title.id,
        CreateReviewRequest {
            text: "".into(),
            score: 8,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    review_service::create_review(
        &state,
        &auth2,
        title.id,
        CreateReviewRequest {
            text: "Exactly my kind of story".into(),
            score: 8,
        },
    )
    .await?;
    review_service::create_review(
        &state,
        &auth3,
        title.id,
        CreateReviewRequest {
            text: "A masterpiece".into(),
            score: 10,
        },
    )
    .await?;

    // (7 + 8 + 10) / 3 rounded to one decimal.
    let rated = title_service::get_title(&state, title.id).await?.data.unwrap();
    assert_eq!(rated.rating, Some(8.3));

    // Newest review first.
    let listing = review_service::list_reviews(&state, title.id, default_page()).await?;
    assert_eq!(listing.meta.unwrap().total, Some(3));
    let items = listing.data.unwrap().items;
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].author, name3);
    assert_eq!(items[2].author, name1);

    // Listing reviews of a missing title is a 404.
    let err = review_service::list_reviews(&state, Uuid::new_v4(), default_page())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    // Authors may rescore their own review; the mean follows.
    let review1 = review_service::update_review(
        &state,
        &auth1,
        title.id,
        review1.id,
        UpdateReviewRequest {
            text: None,
            score: Some(6),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(review1.score, 6);

    let rated = title_service::get_title(&state, title.id).await?.data.unwrap();
    assert_eq!(rated.rating, Some(8.0));

    // Someone else's review is off limits for a plain user.
    let err = review_service::update_review(
        &state,
        &auth2,
        title.id,
        review1.id,
        UpdateReviewRequest {
            text: Some("hijacked".into()),
            score: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    // Comments hang off a review and are addressed through the full path.
    let comment = comment_service::create_comment(
        &state,
        &auth2,
        title.id,
        review1.id,
        CreateCommentRequest {
            text: "Could not agree more".into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(comment.author, name2);

    let listing =
        comment_service::list_comments(&state, title.id, review1.id, default_page()).await?;
    assert_eq!(listing.meta.unwrap().total, Some(1));

    // A (title, review) pair that does not match is a 404.
    let err = comment_service::list_comments(&state, title.id, Uuid::new_v4(), default_page())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let err = comment_service::get_comment(&state, title.id, Uuid::new_v4(), comment.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let comment = comment_service::update_comment(
        &state,
        &auth2,
        title.id,
        review1.id,
        comment.id,
        UpdateCommentRequest {
            text: Some("Could not agree more, honestly".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(comment.text, "Could not agree more, honestly");

    // Moderators can remove content they do not own.
    let auth_moderator = AuthUser {
        user_id: Uuid::new_v4(),
        role: "moderator".into(),
    };
    comment_service::delete_comment(&state, &auth_moderator, title.id, review1.id, comment.id)
        .await?;
    let err = comment_service::get_comment(&state, title.id, review1.id, comment.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    review_service::delete_review(&state, &auth_moderator, title.id, review1.id).await?;
    let rated = title_service::get_title(&state, title.id).await?.data.unwrap();
    assert_eq!(rated.rating, Some(9.0));

    // Dropping the title takes the remaining reviews and their comments with
    // it, down to the rows.
    let remaining = review_service::list_reviews(&state, title.id, default_page())
        .await?
        .data
        .unwrap()
        .items;
    assert_eq!(remaining.len(), 2);
    let stray = comment_service::create_comment(
        &state,
        &auth3,
        title.id,
        remaining[0].id,
        CreateCommentRequest {
            text: "Came back to say this aged well".into(),
        },
    )
    .await?
    .data
    .unwrap();

    title_service::delete_title(&state, &auth_admin, title.id).await?;
    let err = review_service::list_reviews(&state, title.id, default_page())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    for review in &remaining {
        assert!(Reviews::find_by_id(review.id).one(&state.orm).await?.is_none());
    }
    assert!(Comments::find_by_id(stray.id).one(&state.orm).await?.is_none());

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
