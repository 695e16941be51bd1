//! # Detailing Booking Bot
//!
//! A Telegram bot for booking car-detailing services.
//!
//! ## Features
//! - Guided booking wizard: service, calendar date, hourly time slot
//! - Capacity-checked slot commit (parallel work stations, atomic guard)
//! - Promo codes with validity windows and usage limits
//! - Client comments and photo/video attachments on a booking
//! - Reminders before the appointment, daily and weekly admin reports
//! - Persistent storage with SQLite

/// Telegram update handling: commands, the booking wizard, keyboards
pub mod bot;
/// The service catalog and working hours
pub mod catalog;
/// Configuration management and environment variables
pub mod config;
/// Database models, connections, and migrations
pub mod database;
/// Availability, booking commits, reminders, reports, health checks
pub mod services;
/// Utility functions for datetime, validation, and logging
pub mod utils;
