use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

/// Lifecycle states of a booking. Cancellation is a status transition, rows are
/// never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    PendingConfirmation,
    Confirmed,
    Completed,
    CancelledByUser,
    CancelledByAdmin,
}

impl BookingStatus {
    /// Statuses that count toward slot capacity.
    pub fn is_active(self) -> bool {
        matches!(self, Self::PendingConfirmation | Self::Confirmed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PendingConfirmation => "pending confirmation",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::CancelledByUser => "cancelled by you",
            Self::CancelledByAdmin => "cancelled by the studio",
        }
    }
}

/// SQL fragment matching the statuses that count toward capacity. Inlined into
/// queries so the capacity checks stay single statements.
pub const ACTIVE_STATUSES_SQL: &str = "('pending_confirmation', 'confirmed')";

const BOOKING_COLUMNS: &str = "id, user_id, user_full_name, user_username, service, \
     booking_date, booking_time, price, discount, promocode, comment, status, created_at";

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub user_id: i64,
    pub user_full_name: String,
    pub user_username: Option<String>,
    pub service: String,
    /// DD.MM.YYYY
    pub booking_date: String,
    /// HH:MM, one of the working-hour slots
    pub booking_time: String,
    pub price: i64,
    pub discount: i64,
    pub promocode: Option<String>,
    pub comment: Option<String>,
    pub status: BookingStatus,
    pub created_at: String,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BookingMedia {
    pub id: i64,
    pub booking_id: i64,
    pub file_id: String,
    pub file_type: String,
}

impl Booking {
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Active bookings of one user, soonest first by insertion order.
    pub async fn active_for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE user_id = ? AND status IN {ACTIVE_STATUSES_SQL} ORDER BY id"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// All active bookings. Used at startup to re-schedule reminders and by the
    /// report generator; the data set is a single-studio calendar, so a full
    /// scan is fine.
    pub async fn all_active(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE status IN {ACTIVE_STATUSES_SQL} ORDER BY id"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn media(pool: &SqlitePool, booking_id: i64) -> Result<Vec<BookingMedia>, sqlx::Error> {
        sqlx::query_as::<_, BookingMedia>(
            "SELECT id, booking_id, file_id, file_type FROM booking_media \
             WHERE booking_id = ? ORDER BY id",
        )
        .bind(booking_id)
        .fetch_all(pool)
        .await
    }
}
