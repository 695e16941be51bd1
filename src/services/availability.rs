//! Slot-occupancy calculator.
//!
//! Derives per-slot active-reservation counts for a date and the set of
//! unavailable dates for a month from the bookings table. There is no caching:
//! everything is recomputed per calendar render, which is fine for a
//! single-studio, human-scale calendar.

use crate::catalog::WORKING_HOURS;
use crate::database::models::ACTIVE_STATUSES_SQL;
use crate::utils::datetime::{format_date, in_month, month_like_pattern, parse_date};
use chrono::{Local, NaiveDate};
use sqlx::SqlitePool;
use std::collections::{HashMap, HashSet};

/// Number of active bookings per slot label for one date. Absent slots mean
/// zero. Dates strictly before today report every slot at capacity so callers
/// never offer back-dated slots.
pub async fn slot_occupancy(
    pool: &SqlitePool,
    date: NaiveDate,
    capacity: u32,
) -> Result<HashMap<String, u32>, sqlx::Error> {
    if date < Local::now().date_naive() {
        return Ok(WORKING_HOURS
            .iter()
            .map(|slot| (slot.to_string(), capacity))
            .collect());
    }

    let rows: Vec<(String, i64)> = sqlx::query_as(&format!(
        "SELECT booking_time, COUNT(*) FROM bookings \
         WHERE booking_date = ? AND status IN {ACTIVE_STATUSES_SQL} \
         GROUP BY booking_time"
    ))
    .bind(format_date(date))
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(slot, count)| (slot, count.max(0) as u32))
        .collect())
}

/// Whether one more booking fits into a slot given its occupancy map.
pub fn slot_has_room(occupancy: &HashMap<String, u32>, slot: &str, capacity: u32) -> bool {
    occupancy.get(slot).copied().unwrap_or(0) < capacity
}

/// Sorted dates in the given month a user cannot book: manually blocked by an
/// administrator, or with every working-hour slot at capacity. Past dates are
/// not listed here; the calendar renderer disables them on its own.
pub async fn unavailable_dates(
    pool: &SqlitePool,
    year: i32,
    month: u32,
    capacity: u32,
) -> Result<Vec<NaiveDate>, sqlx::Error> {
    let mut unavailable: HashSet<NaiveDate> = HashSet::new();

    let blocked: Vec<(String,)> = sqlx::query_as("SELECT blocked_date FROM blocked_dates")
        .fetch_all(pool)
        .await?;
    for (raw,) in blocked {
        if let Ok(date) = parse_date(&raw) {
            if in_month(date, year, month) {
                unavailable.insert(date);
            }
        }
    }

    // (date, slot) pairs already at capacity within the month.
    let full_slots: Vec<(String, String)> = sqlx::query_as(&format!(
        "SELECT booking_date, booking_time FROM bookings \
         WHERE booking_date LIKE ? AND status IN {ACTIVE_STATUSES_SQL} \
         GROUP BY booking_date, booking_time \
         HAVING COUNT(*) >= ?"
    ))
    .bind(month_like_pattern(year, month))
    .bind(capacity as i64)
    .fetch_all(pool)
    .await?;

    let mut full_per_day: HashMap<NaiveDate, usize> = HashMap::new();
    for (raw_date, slot) in full_slots {
        // Slots outside working hours can only come from hand-edited data and
        // never make a day unavailable.
        if !WORKING_HOURS.contains(&slot.as_str()) {
            continue;
        }
        if let Ok(date) = parse_date(&raw_date) {
            *full_per_day.entry(date).or_insert(0) += 1;
        }
    }
    for (date, full_count) in full_per_day {
        if full_count >= WORKING_HOURS.len() {
            unavailable.insert(date);
        }
    }

    let mut result: Vec<NaiveDate> = unavailable.into_iter().collect();
    result.sort();
    Ok(result)
}
