use chrono::{Datelike, Utc};
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::FieldError;

pub const ROLE_USER: &str = "user";
pub const ROLE_MODERATOR: &str = "moderator";
pub const ROLE_ADMIN: &str = "admin";

pub const USERNAME_MAX_LEN: usize = 150;
pub const EMAIL_MAX_LEN: usize = 254;
pub const NAME_MAX_LEN: usize = 256;
pub const SLUG_MAX_LEN: usize = 50;

lazy_static! {
    static ref USERNAME_RE: Regex = Regex::new(r"^[\w.@+-]+$").unwrap();
    static ref SLUG_RE: Regex = Regex::new(r"^[-a-zA-Z0-9_]+$").unwrap();
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

/// Letters, digits and @.+-_ only; never the literal "me".
pub fn validate_username(value: &str) -> Result<(), FieldError> {
    if value.is_empty() {
        return Err(FieldError::new("username", "username cannot be empty"));
    }
    if value.chars().count() > USERNAME_MAX_LEN {
        return Err(FieldError::new(
            "username",
            format!("username cannot exceed {USERNAME_MAX_LEN} characters"),
        ));
    }
    if !USERNAME_RE.is_match(value) {
        return Err(FieldError::new(
            "username",
            "username may only contain letters, digits and @.+-_",
        ));
    }
    if value == "me" {
        return Err(FieldError::new("username", "username cannot be \"me\""));
    }
    Ok(())
}

pub fn validate_email(value: &str) -> Result<(), FieldError> {
    if value.is_empty() {
        return Err(FieldError::new("email", "email cannot be empty"));
    }
    if value.chars().count() > EMAIL_MAX_LEN {
        return Err(FieldError::new(
            "email",
            format!("email cannot exceed {EMAIL_MAX_LEN} characters"),
        ));
    }
    if !EMAIL_RE.is_match(value) {
        return Err(FieldError::new("email", "enter a valid email address"));
    }
    Ok(())
}

pub fn validate_role(value: &str) -> Result<(), FieldError> {
    match value {
        ROLE_USER | ROLE_MODERATOR | ROLE_ADMIN => Ok(()),
        _ => Err(FieldError::new(
            "role",
            "role must be one of: user, moderator, admin",
        )),
    }
}

/// First and last names share the username length cap and may be empty.
pub fn validate_person_name(field: &'static str, value: &str) -> Result<(), FieldError> {
    if value.chars().count() > USERNAME_MAX_LEN {
        return Err(FieldError::new(
            field,
            format!("{field} cannot exceed {USERNAME_MAX_LEN} characters"),
        ));
    }
    Ok(())
}

pub fn validate_slug(value: &str) -> Result<(), FieldError> {
    if value.is_empty() {
        return Err(FieldError::new("slug", "slug cannot be empty"));
    }
    if value.chars().count() > SLUG_MAX_LEN {
        return Err(FieldError::new(
            "slug",
            format!("slug cannot exceed {SLUG_MAX_LEN} characters"),
        ));
    }
    if !SLUG_RE.is_match(value) {
        return Err(FieldError::new(
            "slug",
            "slug may only contain letters, digits, hyphens and underscores",
        ));
    }
    Ok(())
}

pub fn validate_name(field: &'static str, value: &str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        return Err(FieldError::new(field, format!("{field} cannot be empty")));
    }
    if value.chars().count() > NAME_MAX_LEN {
        return Err(FieldError::new(
            field,
            format!("{field} cannot exceed {NAME_MAX_LEN} characters"),
        ));
    }
    Ok(())
}

pub fn validate_text(field: &'static str, value: &str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        return Err(FieldError::new(field, format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Scores are a closed 1..=10 range.
pub fn validate_score(value: i16) -> Result<(), FieldError> {
    if !(1..=10).contains(&value) {
        return Err(FieldError::new("score", "score must be between 1 and 10"));
    }
    Ok(())
}

/// A title cannot be released in the future.
pub fn validate_year(value: i32) -> Result<(), FieldError> {
    let current = Utc::now().year();
    if value > current {
        return Err(FieldError::new(
            "year",
            format!("year cannot be greater than {current}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Utc};

    #[test]
    fn username_rules() {
        assert!(validate_username("bookworm_42").is_ok());
        assert!(validate_username("user.name@host+x-y").is_ok());
        assert!(validate_username("me").is_err());
        assert!(validate_username("").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("semi;colon").is_err());
        assert!(validate_username(&"a".repeat(151)).is_err());
        assert!(validate_username(&"a".repeat(150)).is_ok());
    }

    #[test]
    fn email_rules() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("a@b").is_err());
        assert!(validate_email("two@@example.com").is_err());
    }

    #[test]
    fn role_choices() {
        assert!(validate_role("user").is_ok());
        assert!(validate_role("moderator").is_ok());
        assert!(validate_role("admin").is_ok());
        assert!(validate_role("superuser").is_err());
        assert!(validate_role("").is_err());
    }

    #[test]
    fn slug_rules() {
        assert!(validate_slug("sci-fi_2").is_ok());
        assert!(validate_slug("").is_err());
        assert!(validate_slug("bad slug").is_err());
        assert!(validate_slug("ümlaut").is_err());
        assert!(validate_slug(&"s".repeat(51)).is_err());
    }

    #[test]
    fn score_closed_range() {
        assert!(validate_score(0).is_err());
        assert!(validate_score(1).is_ok());
        assert!(validate_score(10).is_ok());
        assert!(validate_score(11).is_err());
        assert!(validate_score(-3).is_err());
    }

    #[test]
    fn year_not_in_future() {
        let current = Utc::now().year();
        assert!(validate_year(current).is_ok());
        assert!(validate_year(current - 40).is_ok());
        assert!(validate_year(current + 1).is_err());
    }
}
