use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Request body for a new listing. There is no owner field: the owner is
/// always the authenticated caller, and unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateListingRequest {
    pub post_title: String,
    pub price: f32,
    #[serde(rename = "type")]
    pub kind: String,
    pub mileage: i64,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub engine: String,
    pub color: String,
    pub description: String,
    pub location: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingImage {
    pub id: i64,
    pub url: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub id: i64,
    pub owner_id: i64,
    pub post_title: String,
    pub price: f32,
    #[serde(rename = "type")]
    pub kind: String,
    pub mileage: i64,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub engine: String,
    pub color: String,
    pub description: String,
    pub location: String,
    pub images: Vec<ListingImage>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}
