use futures_util::FutureExt;
use time::OffsetDateTime;
use tracing::{info, warn};

use super::{
    dto::{SignInRequest, SignUpRequest, UpdateProfileRequest},
    password::{hash_password, verify_dummy, verify_password, PasswordError},
    repo,
    repo_types::{NewUser, ProfilePatch, User},
};
use crate::{
    db::{bounded_read, page_offset, WriteOp, LOOKUP_BUDGET, PAGE_BUDGET, PAGE_SIZE},
    error::{AppError, AppResult},
    state::AppState,
};

/// Registers a user and returns the new id.
///
/// Profile text is trimmed. The password is hashed as given, before the
/// transaction opens.
pub async fn sign_up(st: &AppState, req: SignUpRequest) -> AppResult<i64> {
    let user = NewUser::from(&req);
    let password_hash = hash_password(&req.password)?;

    let id = st
        .writer
        .write(WriteOp::SignUp, move |conn| {
            async move { repo::insert_user(conn, &user, &password_hash).await }.boxed()
        })
        .await?;

    info!(user_id = id, "user signed up");
    Ok(id)
}

/// Exchanges credentials for a bearer token.
///
/// An unknown email and a wrong password produce the same error after the
/// same amount of hashing work.
pub async fn sign_in(st: &AppState, req: SignInRequest) -> AppResult<String> {
    let email = req.email.trim();
    let stored = bounded_read(
        "find_credentials",
        LOOKUP_BUDGET,
        repo::find_credentials_by_email(&st.db, email),
    )
    .await?;

    let Some(stored) = stored else {
        verify_dummy(&req.password);
        warn!("sign-in for unknown email");
        return Err(AppError::InvalidCredentials);
    };

    match verify_password(&req.password, &stored.password_hash) {
        Ok(()) => {}
        Err(PasswordError::Mismatch) => {
            warn!(user_id = stored.id, "sign-in with wrong password");
            return Err(AppError::InvalidCredentials);
        }
        Err(e) => return Err(e.into()),
    }

    let token = st.tokens.issue(stored.id, OffsetDateTime::now_utc())?;
    info!(user_id = stored.id, "user signed in");
    Ok(token)
}

pub async fn get_by_id(st: &AppState, id: i64) -> AppResult<User> {
    bounded_read("get_user", LOOKUP_BUDGET, repo::find_by_id(&st.db, id))
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn list(st: &AppState, page: i64) -> AppResult<Vec<User>> {
    bounded_read(
        "list_users",
        PAGE_BUDGET,
        repo::list(&st.db, PAGE_SIZE, page_offset(page)),
    )
    .await
}

/// Applies a profile patch with coalesce-on-empty semantics.
pub async fn update(st: &AppState, id: i64, req: UpdateProfileRequest) -> AppResult<()> {
    // A blank password leaves the stored hash alone; anything else is hashed as given.
    let password_hash = if req.password.trim().is_empty() {
        None
    } else {
        Some(hash_password(&req.password)?)
    };
    let patch = ProfilePatch::from_request(&req, password_hash);

    st.writer
        .write(WriteOp::UpdateProfile, move |conn| {
            async move { repo::update_profile(conn, id, &patch).await }.boxed()
        })
        .await?;

    info!(user_id = id, "profile updated");
    Ok(())
}
