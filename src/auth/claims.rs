use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who is making the request. Resolved from a verified token, lives for one request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub username: String,
}

/// JWT payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,         // user ID
    pub username: String, // display name at signing time
    pub exp: i64,         // expires at (unix timestamp)
    pub iat: i64,         // issued at (unix timestamp)
    pub nbf: i64,         // not before (unix timestamp)
}

impl From<Claims> for Identity {
    fn from(c: Claims) -> Self {
        Self {
            id: c.id,
            username: c.username,
        }
    }
}
