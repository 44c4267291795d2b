use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::{OsRng, RngCore};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::auth::{Claims, ObtainTokenRequest, SignUpRequest, SignUpResponse, TokenResponse},
    entity::{
        user_codes::{self, Entity as UserCodes},
        users::{self, Entity as Users},
    },
    error::{AppError, AppResult, FieldError, on_unique_violation},
    response::{ApiResponse, Meta},
    state::AppState,
    validators::{ROLE_USER, validate_email, validate_username},
};

/// Registers a user (or re-registers an existing one) and mails them a
/// fresh confirmation code. Re-signup with the exact same username/email
/// pair rotates the code; a pair that collides with a different user is
/// a validation error.
pub async fn sign_up(
    state: &AppState,
    payload: SignUpRequest,
) -> AppResult<ApiResponse<SignUpResponse>> {
    let mut errors = Vec::new();
    if let Err(err) = validate_username(&payload.username) {
        errors.push(err);
    }
    if let Err(err) = validate_email(&payload.email) {
        errors.push(err);
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let by_username = Users::find()
        .filter(users::Column::Username.eq(payload.username.as_str()))
        .one(&state.orm)
        .await?;
    let by_email = Users::find()
        .filter(users::Column::Email.eq(payload.email.as_str()))
        .one(&state.orm)
        .await?;

    let user = match (by_username, by_email) {
        (Some(u), Some(v)) if u.id == v.id => u,
        (None, None) => {
            let active = users::ActiveModel {
                id: Set(Uuid::new_v4()),
                username: Set(payload.username.clone()),
                email: Set(payload.email.clone()),
                first_name: Set(None),
                last_name: Set(None),
                bio: Set(None),
                role: Set(ROLE_USER.to_string()),
                created_at: NotSet,
            };
            active.insert(&state.orm).await.map_err(|err| {
                on_unique_violation(err, "username", "username or email is already taken")
            })?
        }
        (by_username, by_email) => {
            let mut errors = Vec::new();
            if by_username.is_some() {
                errors.push(FieldError::new("username", "username is already taken"));
            }
            if by_email.is_some() {
                errors.push(FieldError::new("email", "email is already taken"));
            }
            return Err(AppError::Validation(errors));
        }
    };

    let code = generate_confirmation_code();

    // Rotate: at most one outstanding code per user, and a re-signup
    // invalidates the previous one.
    let existing = UserCodes::find()
        .filter(user_codes::Column::UserId.eq(user.id))
        .one(&state.orm)
        .await?;
    match existing {
        Some(row) => {
            let mut active: user_codes::ActiveModel = row.into();
            active.confirmation_code = Set(code.clone());
            active.created_at = Set(Utc::now().into());
            active.update(&state.orm).await?;
        }
        None => {
            let active = user_codes::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(user.id),
                confirmation_code: Set(code.clone()),
                created_at: NotSet,
            };
            active.insert(&state.orm).await?;
        }
    }

    state.mailer.send_confirmation_code(&user.email, &code).await?;

    if let Err(err) = log_audit(
        &state.pool,
        user.id,
        "sign_up",
        "users",
        Some(serde_json::json!({ "username": user.username })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Confirmation code sent",
        SignUpResponse {
            username: user.username,
            email: user.email,
        },
        Some(Meta::empty()),
    ))
}

/// Exchanges a (username, confirmation code) pair for a signed access
/// token. The code is removed once used.
pub async fn obtain_token(
    state: &AppState,
    payload: ObtainTokenRequest,
) -> AppResult<ApiResponse<TokenResponse>> {
    let user = Users::find()
        .filter(users::Column::Username.eq(payload.username.as_str()))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let code_row = UserCodes::find()
        .filter(user_codes::Column::UserId.eq(user.id))
        .one(&state.orm)
        .await?;
    let code_row = match code_row {
        Some(row) if row.confirmation_code == payload.confirmation_code => row,
        _ => {
            return Err(AppError::validation(
                "confirmation_code",
                "username/confirmation_code pair is incorrect",
            ));
        }
    };

    let secret = std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(24))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.to_string(),
        role: user.role.clone(),
        exp: expiration.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    code_row.delete(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        user.id,
        "token_issued",
        "users",
        Some(serde_json::json!({ "username": user.username })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Token issued",
        TokenResponse { token },
        Some(Meta::empty()),
    ))
}

/// 20 random bytes, base64url without padding. Fits the 30-char column.
fn generate_confirmation_code() -> String {
    let mut bytes = [0u8; 20];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::generate_confirmation_code;

    #[test]
    fn codes_are_url_safe_and_unique() {
        let a = generate_confirmation_code();
        let b = generate_confirmation_code();
        assert_eq!(a.len(), 27);
        assert_ne!(a, b);
        assert!(
            a.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }
}
