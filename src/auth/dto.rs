use serde::{Deserialize, Deserializer, Serialize};

/// Request body for sign-up. Absent fields deserialize as empty strings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignUpRequest {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub surname: String,
    pub email: String,
    pub phone_number: String,
    pub password: String,
}

/// Request body for sign-in.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Profile patch. An empty string leaves the stored value unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateProfileRequest {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub surname: String,
    pub email: String,
    pub phone_number: String,
    pub picture_url: String,
    pub password: String,
}

/// `?page=`. A value that is not a number reads as absent, i.e. page 1.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default, deserialize_with = "lenient_page")]
    pub page: Option<i64>,
}

fn lenient_page<'de, D>(de: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(de)?;
    Ok(raw.and_then(|s| s.trim().parse().ok()))
}

#[derive(Debug, Serialize)]
pub struct InsertedResponse {
    pub inserted_id: i64,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}
