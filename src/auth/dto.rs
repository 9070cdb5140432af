use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::ApiError, extract::RequestBody, store::User};

pub const BAD_REGISTER_REQUEST: &str = "all field must be valid: email, password, username";

/// Request body for user registration. Missing fields decode as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub username: String,
}

impl RequestBody for RegisterRequest {
    const INVALID: &'static str = BAD_REGISTER_REQUEST;
}

impl RegisterRequest {
    /// Trims email and username; every field must then be non-empty.
    pub fn validate(mut self) -> Result<Self, ApiError> {
        self.email = self.email.trim().to_string();
        self.username = self.username.trim().to_string();
        if self.email.is_empty()
            || self.password.is_empty()
            || self.username.is_empty()
        {
            return Err(ApiError::Validation(BAD_REGISTER_REQUEST));
        }
        Ok(self)
    }
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl RequestBody for LoginRequest {
    const INVALID: &'static str = "invalid request body";
}

/// Public user data returned to clients.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub username: String,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            username: u.username,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenData {
    pub token: String,
}
