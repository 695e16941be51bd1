use crate::database::models::{Booking, BookingStatus};
use crate::utils::datetime::parse_date;
use chrono::NaiveDate;
use sqlx::SqlitePool;

/// Plain-text summary of bookings scheduled within [from, to], inclusive.
/// Sent to administrators by the scheduled report jobs and on demand.
pub async fn period_report(
    pool: &SqlitePool,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<String, sqlx::Error> {
    let bookings = Booking::all_active(pool).await?;

    let mut pending = 0u32;
    let mut confirmed = 0u32;
    let mut revenue = 0i64;
    let mut lines: Vec<String> = Vec::new();

    for booking in &bookings {
        let Ok(date) = parse_date(&booking.booking_date) else {
            continue;
        };
        if date < from || date > to {
            continue;
        }
        match booking.status {
            BookingStatus::PendingConfirmation => pending += 1,
            BookingStatus::Confirmed => {
                confirmed += 1;
                revenue += booking.price;
            }
            _ => {}
        }
        lines.push(format!(
            "  #{} {} at {} — {} ({})",
            booking.id,
            booking.booking_date,
            booking.booking_time,
            booking.service,
            booking.status.as_str()
        ));
    }

    let mut report = format!(
        "📊 Bookings from {} to {}\n\nPending: {}\nConfirmed: {}\nExpected revenue: {} ₽\n",
        from.format("%d.%m.%Y"),
        to.format("%d.%m.%Y"),
        pending,
        confirmed,
        revenue
    );
    if lines.is_empty() {
        report.push_str("\nNo bookings in this period.");
    } else {
        report.push('\n');
        report.push_str(&lines.join("\n"));
    }
    Ok(report)
}
