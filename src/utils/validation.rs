use crate::catalog;
use crate::utils::datetime::parse_date;
use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate};

/// Validates a user-supplied DD.MM.YYYY date that must be today or later.
pub fn validate_booking_date(raw: &str) -> Result<NaiveDate> {
    let date = parse_date(raw)?;
    if date < Local::now().date_naive() {
        return Err(anyhow!("Date {} is in the past", raw.trim()));
    }
    Ok(date)
}

/// Validates that a slot label is one of the defined working hours.
pub fn validate_time_slot(raw: &str) -> Result<()> {
    let slot = raw.trim();
    if catalog::is_working_hour(slot) {
        Ok(())
    } else {
        Err(anyhow!("'{slot}' is not a bookable time slot"))
    }
}

/// Promo codes as typed by users: short alphanumeric tokens, case-insensitive.
pub fn validate_promocode_format(raw: &str) -> Result<String> {
    let code = raw.trim();
    if code.is_empty() {
        return Err(anyhow!("Promo code cannot be empty"));
    }
    if code.len() > 32 {
        return Err(anyhow!("Promo code is too long"));
    }
    if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(anyhow!("Promo code can only contain letters and digits"));
    }
    Ok(code.to_uppercase())
}

/// Free-text comments attached to a booking.
pub fn validate_comment(raw: &str) -> Result<String> {
    let comment = raw.trim();
    if comment.is_empty() {
        return Err(anyhow!("Comment cannot be empty"));
    }
    if comment.len() > 1000 {
        return Err(anyhow!("Comment cannot be longer than 1000 characters"));
    }
    Ok(comment.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn booking_date_accepts_today_and_future() {
        let today = Local::now().date_naive();
        assert!(validate_booking_date(&today.format("%d.%m.%Y").to_string()).is_ok());
        let tomorrow = today + Duration::days(1);
        assert!(validate_booking_date(&tomorrow.format("%d.%m.%Y").to_string()).is_ok());
    }

    #[test]
    fn booking_date_rejects_past_and_garbage() {
        let yesterday = Local::now().date_naive() - Duration::days(1);
        assert!(validate_booking_date(&yesterday.format("%d.%m.%Y").to_string()).is_err());
        assert!(validate_booking_date("31.02.2099").is_err());
        assert!(validate_booking_date("tomorrow").is_err());
    }

    #[test]
    fn time_slot_must_be_a_working_hour() {
        assert!(validate_time_slot("08:00").is_ok());
        assert!(validate_time_slot(" 18:00 ").is_ok());
        assert!(validate_time_slot("19:00").is_err());
        assert!(validate_time_slot("10:30").is_err());
        assert!(validate_time_slot("").is_err());
    }

    #[test]
    fn promocode_format() {
        assert_eq!(validate_promocode_format("sale10").unwrap(), "SALE10");
        assert_eq!(validate_promocode_format("  Limited25 ").unwrap(), "LIMITED25");
        assert!(validate_promocode_format("").is_err());
        assert!(validate_promocode_format("with space").is_err());
        assert!(validate_promocode_format(&"A".repeat(33)).is_err());
    }

    #[test]
    fn comment_limits() {
        assert_eq!(validate_comment(" hello ").unwrap(), "hello");
        assert!(validate_comment("   ").is_err());
        assert!(validate_comment(&"x".repeat(1001)).is_err());
    }
}
