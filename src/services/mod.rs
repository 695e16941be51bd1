/// Slot-occupancy calculator for calendar and time-picker rendering
pub mod availability;
/// Booking commit protocol, confirmation, and cancellation
pub mod booking;
/// HTTP health endpoints served next to the bot
pub mod health;
/// Per-booking reminder jobs and scheduled admin reports
pub mod reminder;
/// Plain-text activity reports for administrators
pub mod reports;
