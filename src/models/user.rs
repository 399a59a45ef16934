use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Unknown => "unknown",
        }
    }
}

/// A user row. `password` holds the argon2 hash and is never serialized.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password: String,
    pub name: Option<String>,
    pub gender: String,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub is_active: bool,
    pub is_staff: bool,
    pub last_login: Option<i64>,
    pub create_time: i64,
    pub update_time: i64,
    pub is_delete: bool,
    pub delete_time: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub name: Option<String>,
    pub gender: String,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub is_active: bool,
    pub is_staff: bool,
    pub last_login: Option<i64>,
    pub create_time: i64,
    pub update_time: i64,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            username: user.username,
            name: user.name,
            gender: user.gender,
            mobile: user.mobile,
            email: user.email,
            avatar_url: user.avatar_url,
            is_active: user.is_active,
            is_staff: user.is_staff,
            last_login: user.last_login,
            create_time: user.create_time,
            update_time: user.update_time,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username or mobile number.
    #[validate(length(min = 1, max = 20, message = "username must not be empty"))]
    pub username: String,

    #[validate(length(min = 1, max = 128, message = "password must not be empty"))]
    pub password: String,
}

/// Login payload: profile fields plus a fresh token pair.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub id: String,
    pub username: String,
    pub name: Option<String>,
    pub gender: String,
    pub mobile: Option<String>,
    pub avatar_url: Option<String>,
    pub access: String,
    pub refresh: String,
}

impl LoginResponse {
    pub fn new(user: User, access: String, refresh: String) -> Self {
        LoginResponse {
            id: user.id,
            username: user.username,
            name: user.name,
            gender: user.gender,
            mobile: user.mobile,
            avatar_url: user.avatar_url,
            access,
            refresh,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, max = 500, message = "refresh token must not be empty"))]
    pub refresh: String,
}

#[derive(Debug, Serialize)]
pub struct TokenPairResponse {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,

    pub gender: Option<Gender>,

    #[validate(length(min = 5, max = 11))]
    pub mobile: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(url)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "id")]
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    pub token_type: TokenType,
}
