use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod categories;
pub mod comments;
pub mod doc;
pub mod genres;
pub mod health;
pub mod params;
pub mod reviews;
pub mod titles;
pub mod users;

// Build the API router without binding state; it will be provided at the top level.
// Reviews and comments hang off the titles tree since they are only addressable
// through their parent title's path.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/categories", categories::router())
        .nest("/genres", genres::router())
        .nest(
            "/titles",
            titles::router()
                .merge(reviews::router())
                .merge(comments::router()),
        )
}
