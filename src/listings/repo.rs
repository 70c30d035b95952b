use sqlx::{PgConnection, PgPool};

use super::repo_types::{ImageRow, ListingRow, NewListing};

pub async fn insert_listing(conn: &mut PgConnection, l: &NewListing) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO motorcycles (owner_id, post_title, price, type, mileage, brand,
                                 model, year, engine, color, description, location)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING id
        "#,
    )
    .bind(l.owner_id)
    .bind(&l.post_title)
    .bind(l.price)
    .bind(&l.kind)
    .bind(l.mileage)
    .bind(&l.brand)
    .bind(&l.model)
    .bind(l.year)
    .bind(&l.engine)
    .bind(&l.color)
    .bind(&l.description)
    .bind(&l.location)
    .fetch_one(conn)
    .await
}

/// One page of an owner's listings, newest first.
pub async fn list_by_owner(
    db: &PgPool,
    owner_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<ListingRow>, sqlx::Error> {
    sqlx::query_as::<_, ListingRow>(
        r#"
        SELECT id, owner_id, post_title, price, type, mileage, brand, model,
               year, engine, color, description, location, created_at, updated_at
          FROM motorcycles
         WHERE owner_id = $1
         ORDER BY created_at DESC, id DESC
         LIMIT $2 OFFSET $3
        "#,
    )
    .bind(owner_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
}

/// Images of the given listings, oldest first within each listing.
pub async fn images_for(db: &PgPool, listing_ids: &[i64]) -> Result<Vec<ImageRow>, sqlx::Error> {
    sqlx::query_as::<_, ImageRow>(
        r#"
        SELECT motorcycle_id, id, url, created_at, updated_at
          FROM motorcycle_images
         WHERE motorcycle_id = ANY($1)
         ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(listing_ids)
    .fetch_all(db)
    .await
}
