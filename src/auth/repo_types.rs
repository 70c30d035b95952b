use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

use super::dto::{SignUpRequest, UpdateProfileRequest};

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub surname: Option<String>,
    pub email: String,
    pub phone_number: String,
    pub picture_url: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 PHC string, not exposed in JSON
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// What sign-in needs to check a password.
#[derive(Debug, Clone, FromRow)]
pub struct StoredCredentials {
    pub id: i64,
    pub password_hash: String,
}

/// A trimmed sign-up ready for insertion. Empty optional names become NULL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub surname: Option<String>,
    pub email: String,
    pub phone_number: String,
}

impl From<&SignUpRequest> for NewUser {
    fn from(req: &SignUpRequest) -> Self {
        Self {
            first_name: req.first_name.trim().to_string(),
            middle_name: non_empty(&req.middle_name),
            last_name: non_empty(&req.last_name),
            surname: non_empty(&req.surname),
            email: req.email.trim().to_string(),
            phone_number: req.phone_number.trim().to_string(),
        }
    }
}

/// A trimmed profile patch. Empty strings mean "keep the stored value".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub surname: String,
    pub email: String,
    pub phone_number: String,
    pub picture_url: String,
    pub password_hash: Option<String>,
}

impl ProfilePatch {
    pub fn from_request(req: &UpdateProfileRequest, password_hash: Option<String>) -> Self {
        Self {
            first_name: req.first_name.trim().to_string(),
            middle_name: req.middle_name.trim().to_string(),
            last_name: req.last_name.trim().to_string(),
            surname: req.surname.trim().to_string(),
            email: req.email.trim().to_string(),
            phone_number: req.phone_number.trim().to_string(),
            picture_url: req.picture_url.trim().to_string(),
            password_hash,
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_trims_and_nulls_empty_optionals() {
        let req = SignUpRequest {
            first_name: "  Ana ".into(),
            middle_name: "   ".into(),
            last_name: " Silva".into(),
            surname: String::new(),
            email: " a@b.com ".into(),
            phone_number: " 555 ".into(),
            password: " pw with spaces ".into(),
        };
        let user = NewUser::from(&req);
        assert_eq!(user.first_name, "Ana");
        assert_eq!(user.middle_name, None);
        assert_eq!(user.last_name.as_deref(), Some("Silva"));
        assert_eq!(user.surname, None);
        assert_eq!(user.email, "a@b.com");
        assert_eq!(user.phone_number, "555");
    }

    #[test]
    fn email_case_is_preserved() {
        let req = SignUpRequest {
            email: "Mixed@Case.COM".into(),
            ..Default::default()
        };
        assert_eq!(NewUser::from(&req).email, "Mixed@Case.COM");
    }

    #[test]
    fn whitespace_only_patch_fields_become_no_change() {
        let req = UpdateProfileRequest {
            first_name: "   ".into(),
            phone_number: " 123 ".into(),
            ..Default::default()
        };
        let patch = ProfilePatch::from_request(&req, None);
        assert_eq!(patch.first_name, "");
        assert_eq!(patch.phone_number, "123");
        assert_eq!(patch.password_hash, None);
    }

    #[test]
    fn user_serialization_hides_password_hash() {
        let user = User {
            id: 1,
            first_name: "Ana".into(),
            middle_name: None,
            last_name: None,
            surname: None,
            email: "a@b.com".into(),
            phone_number: "555".into(),
            picture_url: None,
            password_hash: "$argon2id$secret".into(),
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("a@b.com"));
        assert!(json.contains("1970-01-01T00:00:00Z"));
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));
    }
}
