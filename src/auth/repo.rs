use sqlx::{PgConnection, PgPool};

use super::repo_types::{NewUser, ProfilePatch, StoredCredentials, User};

const USER_COLUMNS: &str = r#"
    id, first_name, middle_name, last_name, surname, email,
    phone_number, picture_url, password_hash, created_at, updated_at
"#;

/// Insert a user and return the generated id.
pub async fn insert_user(
    conn: &mut PgConnection,
    user: &NewUser,
    password_hash: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO users (first_name, middle_name, last_name, surname, email, phone_number, password_hash)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(&user.first_name)
    .bind(&user.middle_name)
    .bind(&user.last_name)
    .bind(&user.surname)
    .bind(&user.email)
    .bind(&user.phone_number)
    .bind(password_hash)
    .fetch_one(conn)
    .await
}

/// Find the id and password hash for an email.
pub async fn find_credentials_by_email(
    db: &PgPool,
    email: &str,
) -> Result<Option<StoredCredentials>, sqlx::Error> {
    sqlx::query_as::<_, StoredCredentials>(
        r#"
        SELECT id, password_hash
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(db)
    .await
}

pub async fn find_by_id(db: &PgPool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn list(db: &PgPool, limit: i64, offset: i64) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY created_at, id LIMIT $1 OFFSET $2"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
}

/// Apply a coalesce-on-empty patch. Exactly one row must change, anything
/// else comes back as `RowNotFound`.
pub async fn update_profile(
    conn: &mut PgConnection,
    id: i64,
    patch: &ProfilePatch,
) -> Result<(), sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE users
           SET first_name    = COALESCE(NULLIF($2, ''), first_name),
               middle_name   = COALESCE(NULLIF($3, ''), middle_name),
               last_name     = COALESCE(NULLIF($4, ''), last_name),
               surname       = COALESCE(NULLIF($5, ''), surname),
               email         = COALESCE(NULLIF($6, ''), email),
               phone_number  = COALESCE(NULLIF($7, ''), phone_number),
               picture_url   = COALESCE(NULLIF($8, ''), picture_url),
               password_hash = COALESCE($9, password_hash),
               updated_at    = now()
         WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(&patch.first_name)
    .bind(&patch.middle_name)
    .bind(&patch.last_name)
    .bind(&patch.surname)
    .bind(&patch.email)
    .bind(&patch.phone_number)
    .bind(&patch.picture_url)
    .bind(&patch.password_hash)
    .execute(conn)
    .await?;

    if result.rows_affected() != 1 {
        return Err(sqlx::Error::RowNotFound);
    }
    Ok(())
}
