//! Transaction discipline for every mutating write.
//!
//! A write runs as BEGIN, SET TRANSACTION ISOLATION LEVEL SERIALIZABLE,
//! the caller's statements, then COMMIT. All of it races one deadline fixed
//! before BEGIN. Reads get the same deadline treatment through
//! [`bounded_read`], without a transaction.

use std::{future::Future, time::Duration};

use futures_util::future::BoxFuture;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{error, warn};

use crate::error::AppError;

pub const PAGE_SIZE: i64 = 10;

pub const LOOKUP_BUDGET: Duration = Duration::from_secs(2);
pub const PAGE_BUDGET: Duration = Duration::from_secs(5);

const SERIALIZATION_FAILURE: &str = "40001";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    SignUp,
    UpdateProfile,
    CreateListing,
}

impl WriteOp {
    pub fn budget(self) -> Duration {
        match self {
            WriteOp::SignUp => Duration::from_secs(2),
            WriteOp::UpdateProfile | WriteOp::CreateListing => Duration::from_secs(3),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            WriteOp::SignUp => "sign_up",
            WriteOp::UpdateProfile => "update_profile",
            WriteOp::CreateListing => "create_listing",
        }
    }
}

/// Runs closures inside serializable, deadline-bound transactions.
#[derive(Clone)]
pub struct TxWriter {
    pool: PgPool,
}

impl TxWriter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs `work` in its own serializable transaction and commits it only if
    /// every statement succeeded before the op's deadline.
    ///
    /// Closures get a plain connection and return `sqlx::Error`, so a
    /// `RowNotFound` from inside surfaces as [`AppError::NotFound`].
    pub async fn write<T, F>(&self, op: WriteOp, work: F) -> Result<T, AppError>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, Result<T, sqlx::Error>> + Send,
    {
        let deadline = Instant::now() + op.budget();

        let mut tx = match timeout_at(deadline, self.pool.begin()).await {
            Ok(Ok(tx)) => tx,
            Ok(Err(e)) => return Err(classify(op.name(), e)),
            Err(_) => return Err(timed_out(op.name())),
        };

        let outcome = timeout_at(deadline, run_serializable(&mut tx, work)).await;

        match outcome {
            Ok(Ok(value)) => match timeout_at(deadline, tx.commit()).await {
                Ok(Ok(())) => Ok(value),
                Ok(Err(e)) => Err(classify(op.name(), e)),
                Err(_) => Err(timed_out(op.name())),
            },
            Ok(Err(e)) => {
                rollback(tx, op).await;
                Err(classify(op.name(), e))
            }
            Err(_) => {
                // The statement may still be in flight; dropping the handle
                // queues the ROLLBACK for when the connection is next used.
                drop(tx);
                Err(timed_out(op.name()))
            }
        }
    }
}

async fn run_serializable<T, F>(
    tx: &mut Transaction<'_, Postgres>,
    work: F,
) -> Result<T, sqlx::Error>
where
    F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, Result<T, sqlx::Error>>,
{
    sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
        .execute(&mut **tx)
        .await?;
    work(&mut **tx).await
}

async fn rollback(tx: Transaction<'_, Postgres>, op: WriteOp) {
    if let Err(e) = tx.rollback().await {
        warn!(op = op.name(), error = %e, "rollback failed");
    }
}

/// Bounds a read-only query by `budget` and maps its error like a write.
pub async fn bounded_read<T, Fut>(op: &'static str, budget: Duration, fut: Fut) -> Result<T, AppError>
where
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    match timeout(budget, fut).await {
        Ok(res) => res.map_err(|e| classify(op, e)),
        Err(_) => Err(timed_out(op)),
    }
}

/// Offset for a 1-indexed page. Pages below 1 are treated as page 1.
pub fn page_offset(page: i64) -> i64 {
    (page.max(1) - 1).saturating_mul(PAGE_SIZE)
}

fn timed_out(op: &'static str) -> AppError {
    warn!(op, "deadline exceeded");
    AppError::Timeout(op)
}

pub(crate) fn classify(op: &'static str, err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or("unique").to_string();
            warn!(op, %constraint, "unique violation");
            return AppError::Conflict(constraint);
        }
        if db_err.code().as_deref() == Some(SERIALIZATION_FAILURE) {
            warn!(op, "serialization failure");
            return AppError::Conflict("serialization failure".into());
        }
    }

    match err {
        sqlx::Error::RowNotFound => AppError::NotFound,
        sqlx::Error::PoolTimedOut => timed_out(op),
        other => {
            error!(op, error = %other, "storage fault");
            AppError::Storage(other)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::FutureExt;

    #[test]
    fn budgets_are_bounded_per_op() {
        assert_eq!(WriteOp::SignUp.budget(), Duration::from_secs(2));
        assert_eq!(WriteOp::CreateListing.budget(), Duration::from_secs(3));
        assert_eq!(WriteOp::UpdateProfile.budget(), Duration::from_secs(3));
        assert!(PAGE_BUDGET > LOOKUP_BUDGET);
    }

    #[test]
    fn page_offset_clamps_and_saturates() {
        assert_eq!(page_offset(1), 0);
        assert_eq!(page_offset(3), 20);
        assert_eq!(page_offset(0), 0);
        assert_eq!(page_offset(-5), 0);
        assert_eq!(page_offset(i64::MAX), i64::MAX);
    }

    #[test]
    fn classify_maps_plain_errors() {
        assert!(matches!(
            classify("t", sqlx::Error::RowNotFound),
            AppError::NotFound
        ));
        assert!(matches!(
            classify("t", sqlx::Error::PoolTimedOut),
            AppError::Timeout("t")
        ));
        assert!(matches!(
            classify("t", sqlx::Error::PoolClosed),
            AppError::Storage(_)
        ));
    }

    #[tokio::test]
    async fn bounded_read_times_out() {
        let slow = async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, sqlx::Error>(1)
        };
        let err = bounded_read("slow", Duration::from_millis(10), slow)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Timeout("slow")));
    }

    #[tokio::test]
    async fn bounded_read_passes_values_through() {
        let v = bounded_read("fast", Duration::from_secs(1), async { Ok::<_, sqlx::Error>(5) })
            .await
            .expect("value");
        assert_eq!(v, 5);
    }

    async fn count_rows(pool: &PgPool, marker: &str) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT count(*) FROM users WHERE email = $1")
            .bind(marker)
            .fetch_one(pool)
            .await
            .expect("count")
    }

    #[tokio::test]
    async fn writes_run_at_serializable_isolation() {
        let Some(state) = crate::state::connect_for_tests().await else {
            eprintln!("DATABASE_URL not set; skipping");
            return;
        };
        let isolation = state
            .writer
            .write(WriteOp::CreateListing, |conn| {
                async move {
                    sqlx::query_scalar::<_, String>(
                        "SELECT current_setting('transaction_isolation')",
                    )
                    .fetch_one(&mut *conn)
                    .await
                }
                .boxed()
            })
            .await
            .expect("write");
        assert_eq!(isolation, "serializable");
    }

    #[tokio::test]
    async fn failed_write_leaves_nothing_behind() {
        let Some(state) = crate::state::connect_for_tests().await else {
            eprintln!("DATABASE_URL not set; skipping");
            return;
        };
        let email = format!("rollback-{}@example.com", uuid::Uuid::new_v4());
        let marker = email.clone();

        let res: Result<(), AppError> = state
            .writer
            .write(WriteOp::SignUp, move |conn| {
                async move {
                    sqlx::query(
                        "INSERT INTO users (first_name, email, phone_number, password_hash) \
                         VALUES ('x', $1, '0', 'h')",
                    )
                    .bind(&email)
                    .execute(&mut *conn)
                    .await?;
                    Err(sqlx::Error::RowNotFound)
                }
                .boxed()
            })
            .await;

        assert!(matches!(res, Err(AppError::NotFound)));
        assert_eq!(count_rows(&state.db, &marker).await, 0);
    }

    #[tokio::test]
    async fn overrunning_write_times_out_and_rolls_back() {
        let Some(state) = crate::state::connect_for_tests().await else {
            eprintln!("DATABASE_URL not set; skipping");
            return;
        };
        let email = format!("slow-{}@example.com", uuid::Uuid::new_v4());
        let marker = email.clone();

        let res: Result<(), AppError> = state
            .writer
            .write(WriteOp::SignUp, move |conn| {
                async move {
                    sqlx::query(
                        "INSERT INTO users (first_name, email, phone_number, password_hash) \
                         VALUES ('x', $1, '0', 'h')",
                    )
                    .bind(&email)
                    .execute(&mut *conn)
                    .await?;
                    sqlx::query("SELECT pg_sleep(5)").execute(&mut *conn).await?;
                    Ok(())
                }
                .boxed()
            })
            .await;

        assert!(matches!(res, Err(AppError::Timeout("sign_up"))));
        assert_eq!(count_rows(&state.db, &marker).await, 0);
    }
}
