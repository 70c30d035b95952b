use sqlx::FromRow;
use time::OffsetDateTime;

use super::dto::{CreateListingRequest, Listing, ListingImage};

#[derive(Debug, Clone, FromRow)]
pub struct ListingRow {
    pub id: i64,
    pub owner_id: i64,
    pub post_title: String,
    pub price: f32,
    #[sqlx(rename = "type")]
    pub kind: String,
    pub mileage: i64,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub engine: String,
    pub color: String,
    pub description: String,
    pub location: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct ImageRow {
    pub motorcycle_id: i64,
    pub id: i64,
    pub url: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// A trimmed listing bound to its owner.
#[derive(Debug, Clone, PartialEq)]
pub struct NewListing {
    pub owner_id: i64,
    pub post_title: String,
    pub price: f32,
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

impl NewListing {
    pub fn owned_by(owner_id: i64, req: &CreateListingRequest) -> Self {
        Self {
            owner_id,
            post_title: req.post_title.trim().to_string(),
            price: req.price,
            kind: req.kind.trim().to_string(),
            mileage: req.mileage,
            brand: req.brand.trim().to_string(),
            model: req.model.trim().to_string(),
            year: req.year,
            engine: req.engine.trim().to_string(),
            color: req.color.trim().to_string(),
            description: req.description.trim().to_string(),
            location: req.location.trim().to_string(),
        }
    }
}

impl From<ImageRow> for ListingImage {
    fn from(r: ImageRow) -> Self {
        Self {
            id: r.id,
            url: r.url,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

impl ListingRow {
    pub fn with_images(self, images: Vec<ListingImage>) -> Listing {
        Listing {
            id: self.id,
            owner_id: self.owner_id,
            post_title: self.post_title,
            price: self.price,
            kind: self.kind,
            mileage: self.mileage,
            brand: self.brand,
            model: self.model,
            year: self.year,
            engine: self.engine,
            color: self.color,
            description: self.description,
            location: self.location,
            images,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
