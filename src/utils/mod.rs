/// Date/time parsing and formatting for the DD.MM.YYYY calendar format
pub mod datetime;
/// Consistent log line formats for handlers and services
pub mod logging;
/// User-input validation for dates, slots, and promo codes
pub mod validation;
