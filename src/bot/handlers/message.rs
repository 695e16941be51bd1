use crate::bot::commands::{admin, general, Command};
use crate::bot::handlers::{BookingDialogue, HandlerResult};
use crate::bot::keyboards;
use crate::bot::state::{BookingDraft, BookingState, MAX_MEDIA_FILES};
use crate::config::Config;
use crate::database::connection::DatabaseManager;
use crate::database::models::Promocode;
use crate::services::booking::MediaRef;
use crate::services::reminder::ReminderService;
use crate::utils::validation::{validate_comment, validate_promocode_format};
use chrono::Local;
use std::sync::Arc;
use teloxide::prelude::*;

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    dialogue: BookingDialogue,
    db: DatabaseManager,
    config: Arc<Config>,
    reminders: Arc<ReminderService>,
) -> HandlerResult {
    match cmd {
        Command::Help => general::handle_help(bot, msg).await,
        Command::Start => general::handle_start(bot, msg).await,
        Command::Book => general::handle_book(bot, msg, dialogue).await,
        Command::MyBookings => general::handle_my_bookings(bot, msg, db).await,
        Command::CancelBooking { id } => {
            admin::handle_cancel_booking(bot, msg, id, db, config, reminders).await
        }
        Command::BlockDate { date } => {
            admin::handle_block_date(bot, msg, date, db, config).await
        }
        Command::UnblockDate { date } => {
            admin::handle_unblock_date(bot, msg, date, db, config).await
        }
        Command::Report { days } => admin::handle_report(bot, msg, days, db, config).await,
    }
}

/// Text sent while the wizard waits for a promo code.
pub async fn promo_entered(
    bot: Bot,
    msg: Message,
    dialogue: BookingDialogue,
    mut draft: BookingDraft,
    db: DatabaseManager,
) -> HandlerResult {
    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, "Send the promo code as text, or press Skip.")
            .await?;
        return Ok(());
    };

    let code = match validate_promocode_format(text) {
        Ok(code) => code,
        Err(e) => {
            bot.send_message(msg.chat.id, format!("{e}. Try again or press Skip."))
                .reply_markup(keyboards::promo_keyboard())
                .await?;
            return Ok(());
        }
    };

    let today = Local::now().date_naive();
    match Promocode::find_usable(&db.pool, &code, today).await? {
        Some(promo) => {
            draft.promocode = Some(promo.code.clone());
            draft.discount_percent = promo.discount_percent;
            bot.send_message(
                msg.chat.id,
                format!(
                    "✅ Promo code '{}' accepted! Your discount: {}%.",
                    promo.code, promo.discount_percent
                ),
            )
            .await?;
            ask_for_comment(&bot, &msg, &dialogue, draft).await
        }
        None => {
            bot.send_message(
                msg.chat.id,
                format!("Promo code '{code}' is invalid or expired. Try another or press Skip."),
            )
            .reply_markup(keyboards::promo_keyboard())
            .await?;
            Ok(())
        }
    }
}

/// Text or media sent while the wizard collects the optional comment.
pub async fn comment_entered(
    bot: Bot,
    msg: Message,
    dialogue: BookingDialogue,
    mut draft: BookingDraft,
) -> HandlerResult {
    if let Some(text) = msg.text() {
        match validate_comment(text) {
            Ok(comment) => {
                draft.comment = Some(comment);
                bot.send_message(
                    msg.chat.id,
                    "Comment saved. Add photos/videos if you like, then press Done.",
                )
                .reply_markup(keyboards::comment_keyboard())
                .await?;
            }
            Err(e) => {
                bot.send_message(msg.chat.id, format!("{e}."))
                    .reply_markup(keyboards::comment_keyboard())
                    .await?;
            }
        }
        dialogue
            .update(BookingState::EnteringComment { draft })
            .await?;
        return Ok(());
    }

    let media = if let Some(photos) = msg.photo() {
        photos.last().map(|p| MediaRef {
            file_id: p.file.id.clone(),
            file_type: "photo".to_string(),
        })
    } else {
        msg.video().map(|v| MediaRef {
            file_id: v.file.id.clone(),
            file_type: "video".to_string(),
        })
    };

    match media {
        Some(_) if draft.media.len() >= MAX_MEDIA_FILES => {
            bot.send_message(
                msg.chat.id,
                format!("You can attach at most {MAX_MEDIA_FILES} files. Press Done to continue."),
            )
            .reply_markup(keyboards::comment_keyboard())
            .await?;
        }
        Some(media) => {
            draft.media.push(media);
            bot.send_message(
                msg.chat.id,
                format!(
                    "Attached ({}/{MAX_MEDIA_FILES}). Send more or press Done.",
                    draft.media.len()
                ),
            )
            .reply_markup(keyboards::comment_keyboard())
            .await?;
        }
        None => {
            bot.send_message(
                msg.chat.id,
                "Send a text comment, a photo, or a video — or press Done.",
            )
            .reply_markup(keyboards::comment_keyboard())
            .await?;
        }
    }

    dialogue
        .update(BookingState::EnteringComment { draft })
        .await?;
    Ok(())
}

/// Shared transition into the comment step.
pub async fn ask_for_comment(
    bot: &Bot,
    msg: &Message,
    dialogue: &BookingDialogue,
    draft: BookingDraft,
) -> HandlerResult {
    bot.send_message(
        msg.chat.id,
        format!(
            "Would you like to leave a comment or attach photos/videos (up to {MAX_MEDIA_FILES})?\n\
             Send them now, then press Done.",
        ),
    )
    .reply_markup(keyboards::comment_keyboard())
    .await?;
    dialogue
        .update(BookingState::EnteringComment { draft })
        .await?;
    Ok(())
}
