use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Promocode {
    pub code: String,
    pub discount_percent: i64,
    /// YYYY-MM-DD
    pub start_date: String,
    /// YYYY-MM-DD
    pub end_date: String,
    /// None means unlimited.
    pub usage_limit: Option<i64>,
    pub times_used: i64,
}

impl Promocode {
    /// Codes are case-insensitive: stored and looked up uppercase.
    pub async fn find(pool: &SqlitePool, code: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Promocode>(
            "SELECT code, discount_percent, start_date, end_date, usage_limit, times_used \
             FROM promocodes WHERE code = ?",
        )
        .bind(code.trim().to_uppercase())
        .fetch_optional(pool)
        .await
    }

    /// Looks the code up and applies the validity rules for `today`.
    pub async fn find_usable(
        pool: &SqlitePool,
        code: &str,
        today: NaiveDate,
    ) -> Result<Option<Self>, sqlx::Error> {
        Ok(Self::find(pool, code).await?.filter(|p| p.is_usable_on(today)))
    }

    /// Usable when the validity window contains `today` and the usage counter
    /// is below the limit (when a limit is set). Unparseable window dates make
    /// the code unusable rather than erroring out a booking flow.
    pub fn is_usable_on(&self, today: NaiveDate) -> bool {
        let window = NaiveDate::parse_from_str(&self.start_date, "%Y-%m-%d")
            .and_then(|start| {
                NaiveDate::parse_from_str(&self.end_date, "%Y-%m-%d").map(|end| (start, end))
            })
            .ok();
        let Some((start, end)) = window else {
            return false;
        };
        if today < start || today > end {
            return false;
        }
        match self.usage_limit {
            Some(limit) => self.times_used < limit,
            None => true,
        }
    }

    /// Creates or replaces a code. Replacing resets the usage counter.
    pub async fn upsert(
        pool: &SqlitePool,
        code: &str,
        discount_percent: i64,
        start_date: &str,
        end_date: &str,
        usage_limit: Option<i64>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT OR REPLACE INTO promocodes \
             (code, discount_percent, start_date, end_date, usage_limit, times_used) \
             VALUES (?, ?, ?, ?, ?, 0)",
        )
        .bind(code.trim().to_uppercase())
        .bind(discount_percent)
        .bind(start_date)
        .bind(end_date)
        .bind(usage_limit)
        .execute(pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn promo(start: &str, end: &str, limit: Option<i64>, used: i64) -> Promocode {
        Promocode {
            code: "SALE10".to_string(),
            discount_percent: 10,
            start_date: start.to_string(),
            end_date: end.to_string(),
            usage_limit: limit,
            times_used: used,
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn usable_inside_window_without_limit() {
        let p = promo("2024-01-01", "2099-12-31", None, 1_000_000);
        assert!(p.is_usable_on(day("2026-06-15")));
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let p = promo("2026-01-01", "2026-01-31", None, 0);
        assert!(p.is_usable_on(day("2026-01-01")));
        assert!(p.is_usable_on(day("2026-01-31")));
        assert!(!p.is_usable_on(day("2025-12-31")));
        assert!(!p.is_usable_on(day("2026-02-01")));
    }

    #[test]
    fn limit_boundary() {
        let p = promo("2024-01-01", "2099-12-31", Some(100), 99);
        assert!(p.is_usable_on(day("2026-06-15")));
        let p = promo("2024-01-01", "2099-12-31", Some(100), 100);
        assert!(!p.is_usable_on(day("2026-06-15")));
    }

    #[test]
    fn garbage_window_is_unusable() {
        let p = promo("not-a-date", "2099-12-31", None, 0);
        assert!(!p.is_usable_on(day("2026-06-15")));
    }
}
