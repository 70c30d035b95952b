use serde::{Deserialize, Serialize};

pub const ISSUER: &str = "noda";
pub const SUBJECT: &str = "authentication";

/// JWT payload used for authentication.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub iss: String,  // issuer
    pub sub: String,  // token purpose, always SUBJECT
    pub iat: i64,     // issued at (unix timestamp)
    pub exp: i64,     // expires at (unix timestamp)
    pub user_id: i64, // subject identity
}
