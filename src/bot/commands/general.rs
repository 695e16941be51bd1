use crate::bot::commands::Command;
use crate::bot::handlers::{BookingDialogue, HandlerResult};
use crate::bot::keyboards;
use crate::bot::state::BookingState;
use crate::database::connection::DatabaseManager;
use crate::database::models::Booking;
use crate::utils::logging::{log_command_start, log_command_success};
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

pub async fn handle_help(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, Command::descriptions().to_string())
        .await?;
    Ok(())
}

pub async fn handle_start(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(
        msg.chat.id,
        "🚗 Welcome to the detailing studio bot!\n\n\
         Use /book to make an appointment.\n\
         Use /mybookings to see or cancel your bookings.\n\
         Use /help to see all commands.",
    )
    .await?;
    Ok(())
}

/// Entry point of the booking wizard: show the service catalog.
pub async fn handle_book(bot: Bot, msg: Message, dialogue: BookingDialogue) -> HandlerResult {
    if let Some(user) = msg.from() {
        log_command_start("/book", user.full_name().as_str(), user.id.0 as i64, None);
    }
    bot.send_message(msg.chat.id, "What service would you like to book?")
        .reply_markup(keyboards::service_keyboard())
        .await?;
    dialogue.update(BookingState::ChoosingService).await?;
    Ok(())
}

pub async fn handle_my_bookings(bot: Bot, msg: Message, db: DatabaseManager) -> HandlerResult {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;
    let bookings = Booking::active_for_user(&db.pool, user_id).await?;

    if bookings.is_empty() {
        bot.send_message(msg.chat.id, "You have no active bookings. Use /book to make one.")
            .await?;
        return Ok(());
    }

    let lines: Vec<String> = bookings
        .iter()
        .map(|b| {
            format!(
                "#{} — {} on {} at {} ({})",
                b.id,
                b.service,
                b.booking_date,
                b.booking_time,
                b.status.as_str()
            )
        })
        .collect();
    let rows: Vec<(i64, String, String)> = bookings
        .iter()
        .map(|b| (b.id, b.booking_date.clone(), b.booking_time.clone()))
        .collect();

    bot.send_message(
        msg.chat.id,
        format!("Your active bookings:\n\n{}", lines.join("\n")),
    )
    .reply_markup(keyboards::my_bookings_keyboard(&rows))
    .await?;
    log_command_success(
        "/mybookings",
        user.full_name().as_str(),
        user_id,
        Some(&format!("{} bookings", bookings.len())),
    );
    Ok(())
}

/// Anything that is neither a command nor a wizard step.
pub async fn handle_other(bot: Bot, msg: Message) -> HandlerResult {
    if msg.chat.is_private() && msg.text().is_some() {
        bot.send_message(
            msg.chat.id,
            "Use /book to make an appointment or /help to see all commands.",
        )
        .await?;
    }
    Ok(())
}
