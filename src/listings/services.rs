use std::collections::HashMap;

use futures_util::FutureExt;
use tracing::info;

use super::{
    dto::{CreateListingRequest, Listing, ListingImage},
    repo,
    repo_types::NewListing,
};
use crate::{
    auth::Identity,
    db::{bounded_read, page_offset, WriteOp, PAGE_BUDGET, PAGE_SIZE},
    error::AppResult,
    state::AppState,
};

/// Creates a listing owned by `owner`. Ownership comes only from the identity.
pub async fn create(st: &AppState, owner: Identity, req: CreateListingRequest) -> AppResult<i64> {
    let listing = NewListing::owned_by(owner.user_id, &req);

    let id = st
        .writer
        .write(WriteOp::CreateListing, move |conn| {
            async move { repo::insert_listing(conn, &listing).await }.boxed()
        })
        .await?;

    info!(listing_id = id, owner_id = owner.user_id, "listing created");
    Ok(id)
}

/// One page of the caller's listings, newest first, each with its images.
pub async fn get_from_user(st: &AppState, owner: Identity, page: i64) -> AppResult<Vec<Listing>> {
    let rows = bounded_read(
        "list_listings",
        PAGE_BUDGET,
        repo::list_by_owner(&st.db, owner.user_id, PAGE_SIZE, page_offset(page)),
    )
    .await?;

    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let images = bounded_read("list_listing_images", PAGE_BUDGET, repo::images_for(&st.db, &ids)).await?;

    let mut by_listing: HashMap<i64, Vec<ListingImage>> = HashMap::new();
    for img in images {
        by_listing
            .entry(img.motorcycle_id)
            .or_default()
            .push(img.into());
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let images = by_listing.remove(&row.id).unwrap_or_default();
            row.with_images(images)
        })
        .collect())
}
