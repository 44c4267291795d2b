use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{ObtainTokenRequest, SignUpRequest, SignUpResponse, TokenResponse},
        catalog::{CategoryList, CreateCategoryRequest, CreateGenreRequest, GenreList},
        reviews::{
            CommentList, CreateCommentRequest, CreateReviewRequest, ReviewList,
            UpdateCommentRequest, UpdateReviewRequest,
        },
        titles::{CreateTitleRequest, TitleList, UpdateTitleRequest},
        users::{CreateUserRequest, UpdateMeRequest, UpdateUserRequest, UserList},
    },
    models::{Category, Comment, Genre, Review, Title, User},
    response::{ApiResponse, Meta},
    routes::{auth, categories, comments, genres, health, params, reviews, titles, users},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::sign_up,
        auth::obtain_token,
        users::list_users,
        users::create_user,
        users::get_me,
        users::update_me,
        users::get_user,
        users::update_user,
        users::delete_user,
        categories::list_categories,
        categories::create_category,
        categories::delete_category,
        genres::list_genres,
        genres::create_genre,
        genres::delete_genre,
        titles::list_titles,
        titles::create_title,
        titles::get_title,
        titles::update_title,
        titles::delete_title,
        reviews::list_reviews,
        reviews::create_review,
        reviews::get_review,
        reviews::update_review,
        reviews::delete_review,
        comments::list_comments,
        comments::create_comment,
        comments::get_comment,
        comments::update_comment,
        comments::delete_comment
    ),
    components(
        schemas(
            User,
            Category,
            Genre,
            Title,
            Review,
            Comment,
            SignUpRequest,
            SignUpResponse,
            ObtainTokenRequest,
            TokenResponse,
            CreateUserRequest,
            UpdateUserRequest,
            UpdateMeRequest,
            UserList,
            CreateCategoryRequest,
            CreateGenreRequest,
            CategoryList,
            GenreList,
            CreateTitleRequest,
            UpdateTitleRequest,
            TitleList,
            CreateReviewRequest,
            UpdateReviewRequest,
            ReviewList,
            CreateCommentRequest,
            UpdateCommentRequest,
            CommentList,
            params::Pagination,
            params::SearchQuery,
            params::TitleListQuery,
            Meta,
            ApiResponse<User>,
            ApiResponse<UserList>,
            ApiResponse<Category>,
            ApiResponse<CategoryList>,
            ApiResponse<Genre>,
            ApiResponse<GenreList>,
            ApiResponse<Title>,
            ApiResponse<TitleList>,
            ApiResponse<Review>,
            ApiResponse<ReviewList>,
            ApiResponse<Comment>,
            ApiResponse<CommentList>,
            ApiResponse<SignUpResponse>,
            ApiResponse<TokenResponse>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "auth", description = "Signup and token endpoints"),
        (name = "users", description = "User administration and profile endpoints"),
        (name = "categories", description = "Category endpoints"),
        (name = "genres", description = "Genre endpoints"),
        (name = "titles", description = "Title endpoints"),
        (name = "reviews", description = "Review endpoints"),
        (name = "comments", description = "Comment endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
