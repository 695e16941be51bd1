use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

/// A calendar date manually closed for bookings by an administrator,
/// independent of slot occupancy.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BlockedDate {
    /// DD.MM.YYYY
    pub blocked_date: String,
}

impl BlockedDate {
    pub async fn all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, BlockedDate>(
            "SELECT blocked_date FROM blocked_dates ORDER BY blocked_date",
        )
        .fetch_all(pool)
        .await
    }

    /// Returns false when the date was already blocked.
    pub async fn block(pool: &SqlitePool, date: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("INSERT OR IGNORE INTO blocked_dates (blocked_date) VALUES (?)")
            .bind(date)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Returns false when the date was not blocked to begin with.
    pub async fn unblock(pool: &SqlitePool, date: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM blocked_dates WHERE blocked_date = ?")
            .bind(date)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
