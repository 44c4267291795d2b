pub mod audit_logs;
pub mod categories;
pub mod comments;
pub mod genre_titles;
pub mod genres;
pub mod reviews;
pub mod titles;
pub mod user_codes;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use categories::Entity as Categories;
pub use comments::Entity as Comments;
pub use genre_titles::Entity as GenreTitles;
pub use genres::Entity as Genres;
pub use reviews::Entity as Reviews;
pub use titles::Entity as Titles;
pub use user_codes::Entity as UserCodes;
pub use users::Entity as Users;
