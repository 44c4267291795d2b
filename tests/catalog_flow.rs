use axum_review_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::{
        catalog::{CreateCategoryRequest, CreateGenreRequest},
        titles::{CreateTitleRequest, UpdateTitleRequest},
    },
    entity::users::ActiveModel as UserActive,
    error::AppError,
    mailer::Mailer,
    middleware::auth::AuthUser,
    routes::params::{Pagination, TitleListQuery},
    services::{category_service, genre_service, title_service},
    state::AppState,
};
use chrono::{Datelike, Utc};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

// Integration flow: admin builds the catalog, titles pick up categories and
// genres by slug, and the list filters narrow things down.
#[tokio::test]
async fn catalog_and_title_management_flow() -> anyhow::Result<()> {
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

    let admin_id = seed_user(&state, &unique("curator"), "admin").await?;
    let auth_admin = AuthUser {
        user_id: admin_id,
        role: "admin".into(),
    };
    let auth_plain = AuthUser {
        user_id: Uuid::new_v4(),
        role: "user".into(),
    };

    let sfx = Uuid::new_v4().simple().to_string();
    let films_slug = format!("films-{sfx}");
    let drama_slug = format!("drama-{sfx}");
    let comedy_slug = format!("comedy-{sfx}");

    // Catalog writes are admin-only.
    let err = category_service::create_category(
        &state,
        &auth_plain,
        CreateCategoryRequest {
            name: format!("Films {sfx}"),
            slug: films_slug.clone(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    category_service::create_category(
        &state,
        &auth_admin,
        CreateCategoryRequest {
            name: format!("Films {sfx}"),
            slug: films_slug.clone(),
        },
    )
    .await?;

    // Slugs are unique and shaped.
    let err = category_service::create_category(
        &state,
        &auth_admin,
        CreateCategoryRequest {
            name: format!("Films again {sfx}"),
            slug: films_slug.clone(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = category_service::create_category(
        &state,
        &auth_admin,
        CreateCategoryRequest {
            name: "Bad".into(),
            slug: "not a slug!".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Anyone can read the catalog; search is a name prefix.
    let found = category_service::list_categories(
        &state,
        default_page(),
        Some(format!("Films {sfx}")),
    )
    .await?;
    assert_eq!(found.meta.unwrap().total, Some(1));
    assert_eq!(found.data.unwrap().items[0].slug, films_slug);

    genre_service::create_genre(
        &state,
        &auth_admin,
        CreateGenreRequest {
            name: format!("Drama {sfx}"),
            slug: drama_slug.clone(),
        },
    )
    .await?;
    genre_service::create_genre(
        &state,
        &auth_admin,
        CreateGenreRequest {
            name: format!("Comedy {sfx}"),
            slug: comedy_slug.clone(),
        },
    )
    .await?;

    // Genre search also matches slug prefixes.
    let found = genre_service::list_genres(&state, default_page(), Some(drama_slug.clone())).await?;
    assert_eq!(found.meta.unwrap().total, Some(1));
    assert_eq!(found.data.unwrap().items[0].slug, drama_slug);

    // Titles reference the catalog by slug.
    let title = title_service::create_title(
        &state,
        &auth_admin,
        CreateTitleRequest {
            name: format!("Midnight Premiere {sfx}"),
            year: 1994,
            description: Some("A festival favourite".into()),
            genre: vec![drama_slug.clone(), comedy_slug.clone()],
            category: Some(films_slug.clone()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(title.year, 1994);
    assert_eq!(title.rating, None);
    assert_eq!(title.category.as_ref().map(|c| c.slug.as_str()), Some(films_slug.as_str()));
    let genre_names: Vec<&str> = title.genre.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(
        genre_names,
        vec![format!("Comedy {sfx}"), format!("Drama {sfx}")],
        "expected nested genres sorted by name"
    );

    // Unknown slugs and future years never create a title.
    let err = title_service::create_title(
        &state,
        &auth_admin,
        CreateTitleRequest {
            name: "No such genre".into(),
            year: 1990,
            description: None,
            genre: vec![format!("missing-{sfx}")],
            category: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = title_service::create_title(
        &state,
        &auth_admin,
        CreateTitleRequest {
            name: "From the future".into(),
            year: Utc::now().year() + 1,
            description: None,
            genre: vec![],
            category: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Each list filter narrows to the seeded title.
    let by_category = title_service::list_titles(
        &state,
        default_page(),
        TitleListQuery {
            category: Some(films_slug.clone()),
            genre: None,
            name: None,
            year: None,
        },
    )
    .await?;
    assert_eq!(by_category.meta.unwrap().total, Some(1));
    assert_eq!(by_category.data.unwrap().items[0].id, title.id);

    let by_genre = title_service::list_titles(
        &state,
        default_page(),
        TitleListQuery {
            category: None,
            genre: Some(comedy_slug.clone()),
            name: None,
            year: None,
        },
    )
    .await?;
    assert_eq!(by_genre.data.unwrap().items[0].id, title.id);

    let by_name = title_service::list_titles(
        &state,
        default_page(),
        TitleListQuery {
            category: None,
            genre: None,
            name: Some(format!("premiere {sfx}")),
            year: None,
        },
    )
    .await?;
    assert_eq!(by_name.meta.unwrap().total, Some(1));

    let by_year = title_service::list_titles(
        &state,
        default_page(),
        TitleListQuery {
            category: Some(films_slug.clone()),
            genre: None,
            name: None,
            year: Some(1994),
        },
    )
    .await?;
    assert_eq!(by_year.meta.unwrap().total, Some(1));

    // Filtering on a slug nobody owns is an empty page, not an error.
    let nothing = title_service::list_titles(
        &state,
        default_page(),
        TitleListQuery {
            category: Some(format!("nope-{sfx}")),
            genre: None,
            name: None,
            year: None,
        },
    )
    .await?;
    assert_eq!(nothing.meta.unwrap().total, Some(0));
    assert!(nothing.data.unwrap().items.is_empty());

    // A patch without catalog fields leaves them alone; a genre list replaces
    // the whole set.
    let patched = title_service::update_title(
        &state,
        &auth_admin,
        title.id,
        UpdateTitleRequest {
            name: Some(format!("Midnight Premiere Redux {sfx}")),
            year: None,
            description: None,
            genre: None,
            category: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert!(patched.category.is_some());
    assert_eq!(patched.genre.len(), 2);

    let patched = title_service::update_title(
        &state,
        &auth_admin,
        title.id,
        UpdateTitleRequest {
            name: None,
            year: None,
            description: None,
            genre: Some(vec![comedy_slug.clone()]),
            category: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(patched.genre.len(), 1);
    assert_eq!(patched.genre[0].slug, comedy_slug);

    // Genre deletion mirrors categories: admin-only, slug-keyed, and it
    // drops the links without touching the titles.
    let err = genre_service::delete_genre(&state, &auth_plain, &drama_slug)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    genre_service::delete_genre(&state, &auth_admin, &drama_slug).await?;
    let err = genre_service::delete_genre(&state, &auth_admin, &drama_slug)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    genre_service::delete_genre(&state, &auth_admin, &comedy_slug).await?;
    let unlinked = title_service::get_title(&state, title.id).await?.data.unwrap();
    assert!(unlinked.genre.is_empty());

    // Removing a category orphans its titles instead of deleting them.
    category_service::delete_category(&state, &auth_admin, &films_slug).await?;
    let orphaned = title_service::get_title(&state, title.id).await?.data.unwrap();
    assert!(orphaned.category.is_none());

    let err = category_service::delete_category(&state, &auth_admin, &films_slug)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    // Title deletion is admin-only and final.
    let err = title_service::delete_title(&state, &auth_plain, title.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    title_service::delete_title(&state, &auth_admin, title.id).await?;
    let err = title_service::get_title(&state, title.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound));

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
