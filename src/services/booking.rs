//! Booking commit protocol and status transitions.
//!
//! The calendar a user saw is only a hint: between rendering and confirmation
//! another user can fill the slot. The capacity check therefore runs again at
//! commit time, as part of a single guarded INSERT statement inside the same
//! transaction that writes the media rows and redeems the promo code. The
//! database transaction, not task scheduling, is what upholds the capacity
//! invariant.

use crate::database::models::{Booking, BookingStatus, ACTIVE_STATUSES_SQL};
use crate::utils::validation::{validate_booking_date, validate_time_slot};
use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum BookingError {
    /// Expected under concurrency; the caller must reprompt for another time.
    #[error("slot {time} on {date} is fully booked")]
    SlotUnavailable { date: String, time: String },
    /// The promo code hit its usage limit between validation and commit.
    #[error("promo code is no longer available")]
    PromoExhausted,
    /// Absent, foreign, or already inactive. Deliberately indistinguishable so
    /// non-owners learn nothing about other users' bookings.
    #[error("booking not found")]
    NotFound,
    #[error("invalid booking date: {0}")]
    InvalidDate(String),
    #[error("invalid time slot: {0}")]
    InvalidSlot(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// A finalized wizard selection, ready to persist.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: i64,
    pub user_full_name: String,
    pub user_username: Option<String>,
    pub service: String,
    /// DD.MM.YYYY
    pub date: String,
    /// HH:MM working-hour slot
    pub time: String,
    pub price: i64,
    pub discount: i64,
    pub promocode: Option<String>,
    pub comment: Option<String>,
    pub media: Vec<MediaRef>,
}

#[derive(Debug, Clone)]
pub struct MediaRef {
    pub file_id: String,
    /// "photo" or "video"
    pub file_type: String,
}

pub enum Canceller {
    User(i64),
    Admin,
}

/// Persists a new reservation, enforcing the per-slot capacity invariant.
///
/// Malformed date/time input is rejected before the transaction is opened.
/// Inside the transaction the capacity check and the insert are one atomic
/// statement, so two concurrent submissions for the last free place can never
/// both succeed; the loser gets [`BookingError::SlotUnavailable`].
pub async fn create_booking(
    pool: &SqlitePool,
    capacity: u32,
    new: NewBooking,
) -> Result<Booking, BookingError> {
    validate_booking_date(&new.date).map_err(|e| BookingError::InvalidDate(e.to_string()))?;
    validate_time_slot(&new.time).map_err(|e| BookingError::InvalidSlot(e.to_string()))?;

    let mut tx = pool.begin().await?;

    let inserted = sqlx::query(&format!(
        "INSERT INTO bookings (user_id, user_full_name, user_username, service, \
                               booking_date, booking_time, price, discount, \
                               promocode, comment, status, created_at) \
         SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 'pending_confirmation', ?11 \
         WHERE (SELECT COUNT(*) FROM bookings \
                WHERE booking_date = ?5 AND booking_time = ?6 \
                  AND status IN {ACTIVE_STATUSES_SQL}) < ?12"
    ))
    .bind(new.user_id)
    .bind(&new.user_full_name)
    .bind(&new.user_username)
    .bind(&new.service)
    .bind(&new.date)
    .bind(&new.time)
    .bind(new.price)
    .bind(new.discount)
    .bind(&new.promocode)
    .bind(&new.comment)
    .bind(Utc::now().to_rfc3339())
    .bind(capacity as i64)
    .execute(&mut tx)
    .await?;

    if inserted.rows_affected() == 0 {
        tx.rollback().await?;
        warn!(
            "Slot conflict: user {} lost the race for {} {}",
            new.user_id, new.date, new.time
        );
        return Err(BookingError::SlotUnavailable {
            date: new.date,
            time: new.time,
        });
    }
    let booking_id = inserted.last_insert_rowid();

    for media in &new.media {
        sqlx::query("INSERT INTO booking_media (booking_id, file_id, file_type) VALUES (?, ?, ?)")
            .bind(booking_id)
            .bind(&media.file_id)
            .bind(&media.file_type)
            .execute(&mut tx)
            .await?;
    }

    // Redeem the promo code in the same transaction, guarded by the usage
    // limit. A concurrent redemption that exhausted the limit rolls this
    // booking back instead of letting the counter overshoot.
    if let Some(code) = &new.promocode {
        let redeemed = sqlx::query(
            "UPDATE promocodes SET times_used = times_used + 1 \
             WHERE code = ? AND (usage_limit IS NULL OR times_used < usage_limit)",
        )
        .bind(code)
        .execute(&mut tx)
        .await?;
        if redeemed.rows_affected() == 0 {
            tx.rollback().await?;
            warn!("Promo code {} exhausted during commit by user {}", code, new.user_id);
            return Err(BookingError::PromoExhausted);
        }
    }

    tx.commit().await?;
    info!(
        "User {} created booking #{} for {} at {}",
        new.user_id, booking_id, new.date, new.time
    );

    Booking::find_by_id(pool, booking_id)
        .await?
        .ok_or(BookingError::NotFound)
}

/// Transitions a booking to the matching cancelled status and returns the
/// prior record. Users may only cancel their own active bookings; admins may
/// cancel any active booking. Already-cancelled or completed bookings count as
/// absent.
pub async fn cancel_booking(
    pool: &SqlitePool,
    booking_id: i64,
    canceller: Canceller,
) -> Result<Booking, BookingError> {
    let mut tx = pool.begin().await?;

    let booking: Option<Booking> = sqlx::query_as(&format!(
        "SELECT id, user_id, user_full_name, user_username, service, booking_date, \
                booking_time, price, discount, promocode, comment, status, created_at \
         FROM bookings WHERE id = ? AND status IN {ACTIVE_STATUSES_SQL}"
    ))
    .bind(booking_id)
    .fetch_optional(&mut tx)
    .await?;

    let Some(booking) = booking else {
        return Err(BookingError::NotFound);
    };

    let new_status = match canceller {
        Canceller::User(user_id) => {
            if booking.user_id != user_id {
                // Same outcome as a missing id: no existence leak.
                warn!(
                    "User {} tried to cancel foreign booking #{}",
                    user_id, booking_id
                );
                return Err(BookingError::NotFound);
            }
            BookingStatus::CancelledByUser
        }
        Canceller::Admin => BookingStatus::CancelledByAdmin,
    };

    sqlx::query("UPDATE bookings SET status = ? WHERE id = ?")
        .bind(new_status)
        .bind(booking_id)
        .execute(&mut tx)
        .await?;
    tx.commit().await?;

    info!("Booking #{} cancelled ({:?})", booking_id, new_status);
    Ok(booking)
}

/// pending_confirmation -> confirmed, by an administrator. Any other current
/// status reports NotFound.
pub async fn confirm_booking(pool: &SqlitePool, booking_id: i64) -> Result<Booking, BookingError> {
    let updated = sqlx::query(
        "UPDATE bookings SET status = 'confirmed' \
         WHERE id = ? AND status = 'pending_confirmation'",
    )
    .bind(booking_id)
    .execute(pool)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(BookingError::NotFound);
    }

    info!("Booking #{} confirmed", booking_id);
    Booking::find_by_id(pool, booking_id)
        .await?
        .ok_or(BookingError::NotFound)
}
