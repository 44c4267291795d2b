use axum_review_api::{
    config::AppConfig,
    db::create_pool,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_admin(&pool, "admin", "admin@example.com").await?;
    let moderator_id = ensure_moderator(&pool, "moderator", "moderator@example.com").await?;
    seed_categories(&pool).await?;
    seed_genres(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, Moderator ID: {moderator_id}");
    Ok(())
}

async fn ensure_admin(pool: &sqlx::PgPool, username: &str, email: &str) -> anyhow::Result<Uuid> {
    ensure_user_with_role(pool, username, email, "admin").await
}

async fn ensure_moderator(
    pool: &sqlx::PgPool,
    username: &str,
    email: &str,
) -> anyhow::Result<Uuid> {
    ensure_user_with_role(pool, username, email, "moderator").await
}

async fn ensure_user_with_role(
    pool: &sqlx::PgPool,
    username: &str,
    email: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, username, email, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (username) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(email)
    .bind(role)
    .fetch_optional(pool)
    .await?;

    // If user already exists, fetch id
    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE username = $1")
                .bind(username)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured user {username} (role={role})");
    Ok(user_id)
}

async fn seed_categories(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let categories = vec![
        ("Films", "films"),
        ("Books", "books"),
        ("Music", "music"),
    ];

    for (name, slug) in categories {
        sqlx::query(
            r#"
            INSERT INTO categories (id, name, slug)
            VALUES ($1, $2, $3)
            ON CONFLICT (slug) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(slug)
        .execute(pool)
        .await?;
    }

    println!("Seeded categories");
    Ok(())
}

async fn seed_genres(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let genres = vec![
        ("Drama", "drama"),
        ("Comedy", "comedy"),
        ("Fantasy", "fantasy"),
        ("Detective", "detective"),
        ("Rock", "rock"),
        ("Classical", "classical"),
    ];

    for (name, slug) in genres {
        sqlx::query(
            r#"
            INSERT INTO genres (id, name, slug)
            VALUES ($1, $2, $3)
            ON CONFLICT (slug) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(slug)
        .execute(pool)
        .await?;
    }

    println!("Seeded genres");
    Ok(())
}
