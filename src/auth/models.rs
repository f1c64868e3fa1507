use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// ============================================================================
// User Models
// ============================================================================

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Both password fields of the registration form must be identical
fn validate_passwords_match(dto: &CreateUserDto) -> Result<(), ValidationError> {
    if dto.password != dto.password2 {
        let mut err = ValidationError::new("password_mismatch");
        err.message = Some("Password fields didn't match.".into());
        return Err(err);
    }
    Ok(())
}

/// Checked on the trimmed value, which is what gets stored
fn validate_username(username: &str) -> Result<(), ValidationError> {
    let username = username.trim();
    let length = username.chars().count();
    if !(1..=150).contains(&length) {
        let mut err = ValidationError::new("username_length");
        err.message = Some("Username must be 1-150 characters".into());
        return Err(err);
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        let mut err = ValidationError::new("username_characters");
        err.message = Some(
            "Username may contain only letters, numbers, and @/./+/-/_ characters".into(),
        );
        return Err(err);
    }
    Ok(())
}

/// Request body for user registration
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_passwords_match"))]
pub struct CreateUserDto {
    /// User's email address
    #[validate(email(message = "Enter a valid email address"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    /// Public user name: 1-150 letters, digits or @/./+/-/_ (surrounding spaces are trimmed)
    #[validate(custom(function = "validate_username"))]
    #[schema(example = "jdoe")]
    pub username: String,
    #[validate(length(max = 150, message = "First name must be at most 150 characters"))]
    #[serde(default)]
    #[schema(example = "John")]
    pub first_name: String,
    #[validate(length(max = 150, message = "Last name must be at most 150 characters"))]
    #[serde(default)]
    #[schema(example = "Doe")]
    pub last_name: String,
    /// Password (min 8 chars)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "Password123")]
    pub password: String,
    /// Password confirmation, must equal `password`
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "Password123")]
    pub password2: String,
}

/// User information returned in responses
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponseDto {
    /// Unique user identifier
    pub id: Uuid,
    /// User's email address
    #[schema(example = "user@example.com")]
    pub email: String,
    #[schema(example = "jdoe")]
    pub username: String,
    #[schema(example = "John")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl UserResponseDto {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            created_at: user.created_at,
        }
    }
}

/// Request body for user login
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginDto {
    /// User's email address
    #[schema(example = "user@example.com")]
    pub email: String,
    /// User's password
    #[schema(example = "Password123")]
    pub password: String,
}

// ============================================================================
// Token Models
// ============================================================================

/// JWT access token claims - short-lived (15 minutes)
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: Uuid,        // User ID
    pub email: String,    // User email
    pub username: String, // Public user name
    pub iat: usize,       // Issued at
    pub exp: usize,       // Expiration
}

/// Refresh token stored in database
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

/// Request body to refresh access token
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenDto {
    /// The refresh token obtained from login
    #[schema(example = "a1b2c3d4e5f6...")]
    pub refresh_token: String,
}

/// Response containing both access and refresh tokens
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokenResponse {
    /// JWT access token (short-lived, 15 minutes)
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Refresh token for obtaining new access tokens
    #[schema(example = "a1b2c3d4e5f6...")]
    pub refresh_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: &'static str,
    /// Access token expiry time in seconds
    #[schema(example = 900)]
    pub expires_in: u64,
    /// User information
    pub user: UserResponseDto,
}

impl AuthTokenResponse {
    pub fn new(access_token: String, refresh_token: String, user: &User) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "Bearer",
            expires_in: 15 * 60, // 15 minutes
            user: UserResponseDto::from_user(user),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(password: &str, password2: &str) -> CreateUserDto {
        CreateUserDto {
            email: "user@example.com".to_string(),
            username: "user".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            password: password.to_string(),
            password2: password2.to_string(),
        }
    }

    #[test]
    fn test_matching_passwords_validate() {
        assert!(registration("Password123", "Password123").validate().is_ok());
    }

    #[test]
    fn test_mismatched_passwords_fail() {
        let err = registration("Password123", "Password124")
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("didn't match"));
    }

    #[test]
    fn test_short_password_fails() {
        assert!(registration("short", "short").validate().is_err());
    }

    #[test]
    fn test_blank_username_fails_after_trimming() {
        let mut dto = registration("Password123", "Password123");
        dto.username = "   ".to_string();

        let err = dto.validate().unwrap_err();
        assert!(err.to_string().contains("1-150 characters"));
    }

    #[test]
    fn test_username_characters() {
        let mut dto = registration("Password123", "Password123");
        dto.username = "  j.doe+money@home_1-x ".to_string();
        assert!(dto.validate().is_ok());

        dto.username = "j doe".to_string();
        assert!(dto.validate().is_err());

        dto.username = "a".repeat(151);
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_invalid_email_fails() {
        let mut dto = registration("Password123", "Password123");
        dto.email = "not-an-email".to_string();
        assert!(dto.validate().is_err());
    }
}
