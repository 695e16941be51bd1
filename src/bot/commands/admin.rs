use crate::bot::handlers::HandlerResult;
use crate::config::Config;
use crate::database::connection::DatabaseManager;
use crate::database::models::BlockedDate;
use crate::services::booking::{self, BookingError, Canceller};
use crate::services::reminder::ReminderService;
use crate::services::reports::period_report;
use crate::utils::datetime::{format_date, parse_date};
use crate::utils::logging::{log_admin_denied, log_command_error, log_command_success};
use chrono::{Duration, Local};
use std::sync::Arc;
use teloxide::prelude::*;

/// Replies and returns false when the sender is not an administrator.
async fn require_admin(
    bot: &Bot,
    msg: &Message,
    config: &Config,
    command: &str,
) -> Result<bool, teloxide::RequestError> {
    let Some(user) = msg.from() else {
        return Ok(false);
    };
    if config.is_admin(user.id.0 as i64) {
        return Ok(true);
    }
    log_admin_denied(command, user.full_name().as_str(), user.id.0 as i64);
    bot.send_message(msg.chat.id, "This command is only available to administrators.")
        .await?;
    Ok(false)
}

/// Admin-side cancellation: no ownership check, the affected user is notified.
pub async fn handle_cancel_booking(
    bot: Bot,
    msg: Message,
    id: i64,
    db: DatabaseManager,
    config: Arc<Config>,
    reminders: Arc<ReminderService>,
) -> HandlerResult {
    if !require_admin(&bot, &msg, &config, "/cancelbooking").await? {
        return Ok(());
    }

    match booking::cancel_booking(&db.pool, id, Canceller::Admin).await {
        Ok(cancelled) => {
            reminders.cancel_for(cancelled.id).await;
            bot.send_message(
                msg.chat.id,
                format!(
                    "Booking #{} ({} on {} at {}) has been cancelled.",
                    cancelled.id, cancelled.service, cancelled.booking_date, cancelled.booking_time
                ),
            )
            .await?;
            let notice = format!(
                "❌ Unfortunately, your booking #{} for {} on {} at {} was cancelled by the studio.\n\
                 Please contact us or use /book to pick another time.",
                cancelled.id, cancelled.service, cancelled.booking_date, cancelled.booking_time
            );
            if let Err(e) = bot.send_message(ChatId(cancelled.user_id), notice).await {
                log_command_error(
                    "/cancelbooking",
                    "admin",
                    cancelled.user_id,
                    &format!("failed to notify user: {e}"),
                );
            }
        }
        Err(BookingError::NotFound) => {
            bot.send_message(msg.chat.id, format!("Booking #{id} not found."))
                .await?;
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

pub async fn handle_block_date(
    bot: Bot,
    msg: Message,
    date: String,
    db: DatabaseManager,
    config: Arc<Config>,
) -> HandlerResult {
    if !require_admin(&bot, &msg, &config, "/blockdate").await? {
        return Ok(());
    }
    let parsed = match parse_date(&date) {
        Ok(parsed) => parsed,
        Err(e) => {
            bot.send_message(msg.chat.id, format!("{e}. Example: /blockdate 24.12.2026"))
                .await?;
            return Ok(());
        }
    };

    let normalized = format_date(parsed);
    let newly_blocked = BlockedDate::block(&db.pool, &normalized).await?;
    let reply = if newly_blocked {
        format!("Date {normalized} is now closed for bookings.")
    } else {
        format!("Date {normalized} was already blocked.")
    };
    bot.send_message(msg.chat.id, reply).await?;
    log_command_success("/blockdate", "admin", 0, Some(&normalized));
    Ok(())
}

pub async fn handle_unblock_date(
    bot: Bot,
    msg: Message,
    date: String,
    db: DatabaseManager,
    config: Arc<Config>,
) -> HandlerResult {
    if !require_admin(&bot, &msg, &config, "/unblockdate").await? {
        return Ok(());
    }
    let parsed = match parse_date(&date) {
        Ok(parsed) => parsed,
        Err(e) => {
            bot.send_message(msg.chat.id, format!("{e}. Example: /unblockdate 24.12.2026"))
                .await?;
            return Ok(());
        }
    };

    let normalized = format_date(parsed);
    let removed = BlockedDate::unblock(&db.pool, &normalized).await?;
    let reply = if removed {
        format!("Date {normalized} is open for bookings again.")
    } else {
        format!("Date {normalized} was not blocked.")
    };
    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}

pub async fn handle_report(
    bot: Bot,
    msg: Message,
    days: i64,
    db: DatabaseManager,
    config: Arc<Config>,
) -> HandlerResult {
    if !require_admin(&bot, &msg, &config, "/report").await? {
        return Ok(());
    }
    if days < 1 || days > 366 {
        bot.send_message(msg.chat.id, "Give a period between 1 and 366 days, e.g. /report 7")
            .await?;
        return Ok(());
    }

    let to = Local::now().date_naive();
    let from = to - Duration::days(days - 1);
    let report = period_report(&db.pool, from, to).await?;
    bot.send_message(msg.chat.id, report).await?;
    Ok(())
}
