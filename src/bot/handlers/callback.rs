use crate::bot::handlers::{message, BookingDialogue, HandlerResult};
use crate::bot::keyboards;
use crate::bot::state::{BookingDraft, BookingState};
use crate::catalog;
use crate::config::Config;
use crate::database::connection::DatabaseManager;
use crate::services::availability::{slot_has_room, slot_occupancy, unavailable_dates};
use crate::services::booking::{self, BookingError, Canceller, NewBooking};
use crate::services::reminder::ReminderService;
use crate::utils::datetime::{format_date, next_month, parse_date, prev_month};
use chrono::{Datelike, Local, NaiveDate};
use std::collections::HashSet;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::Message;
use tracing::{error, info, warn};

/// Callbacks that live on previously sent messages (admin notifications,
/// /mybookings lists) and must work regardless of the dialogue state.
pub fn is_global(data: &str) -> bool {
    data == keyboards::NOOP || data.starts_with("adm_confirm:") || data.starts_with("cancel:")
}

pub async fn global_callback(
    bot: Bot,
    q: CallbackQuery,
    db: DatabaseManager,
    config: Arc<Config>,
    reminders: Arc<ReminderService>,
) -> HandlerResult {
    let Some(data) = q.data.clone() else {
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };

    if data == keyboards::NOOP {
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    }

    if let Some(raw_id) = data.strip_prefix("adm_confirm:") {
        return admin_confirm(bot, q, raw_id, db, config).await;
    }
    if let Some(raw_id) = data.strip_prefix("cancel:") {
        return user_cancel(bot, q, raw_id, db, config, reminders).await;
    }

    bot.answer_callback_query(q.id).await?;
    Ok(())
}

/// Administrator pressed "Confirm booking" on a new-request notification.
async fn admin_confirm(
    bot: Bot,
    q: CallbackQuery,
    raw_id: &str,
    db: DatabaseManager,
    config: Arc<Config>,
) -> HandlerResult {
    if !config.is_admin(q.from.id.0 as i64) {
        bot.answer_callback_query(q.id)
            .text("Only administrators can confirm bookings.")
            .show_alert(true)
            .await?;
        return Ok(());
    }
    let Ok(booking_id) = raw_id.parse::<i64>() else {
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };

    match booking::confirm_booking(&db.pool, booking_id).await {
        Ok(confirmed) => {
            let notice = format!(
                "✅ Your booking #{} is confirmed!\n\n{} on {} at {}.\nSee you there!",
                confirmed.id, confirmed.service, confirmed.booking_date, confirmed.booking_time
            );
            if let Err(e) = bot.send_message(ChatId(confirmed.user_id), notice).await {
                error!(
                    "Failed to notify user {} about confirmation of #{}: {}",
                    confirmed.user_id, confirmed.id, e
                );
            }
            if let Some(msg) = q.message.as_ref() {
                let text = msg.text().unwrap_or_default();
                bot.edit_message_text(msg.chat.id, msg.id, format!("{text}\n\n✅ Confirmed"))
                    .await?;
            }
            bot.answer_callback_query(q.id)
                .text(format!("Booking #{booking_id} confirmed"))
                .await?;
        }
        Err(BookingError::NotFound) => {
            bot.answer_callback_query(q.id)
                .text("Booking not found or already handled.")
                .show_alert(true)
                .await?;
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// User pressed a cancel button on their /mybookings list.
async fn user_cancel(
    bot: Bot,
    q: CallbackQuery,
    raw_id: &str,
    db: DatabaseManager,
    config: Arc<Config>,
    reminders: Arc<ReminderService>,
) -> HandlerResult {
    let Ok(booking_id) = raw_id.parse::<i64>() else {
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };
    let user_id = q.from.id.0 as i64;

    match booking::cancel_booking(&db.pool, booking_id, Canceller::User(user_id)).await {
        Ok(cancelled) => {
            reminders.cancel_for(cancelled.id).await;
            bot.answer_callback_query(q.id)
                .text(format!("Booking #{booking_id} cancelled"))
                .await?;
            if let Some(msg) = q.message.as_ref() {
                bot.send_message(
                    msg.chat.id,
                    format!(
                        "Your booking #{} ({} on {} at {}) is cancelled.",
                        cancelled.id,
                        cancelled.service,
                        cancelled.booking_date,
                        cancelled.booking_time
                    ),
                )
                .await?;
            }
            for admin_id in &config.admin_ids {
                let notice = format!(
                    "ℹ️ Client {} cancelled booking #{} ({} on {} at {}).",
                    cancelled.user_full_name,
                    cancelled.id,
                    cancelled.service,
                    cancelled.booking_date,
                    cancelled.booking_time
                );
                if let Err(e) = bot.send_message(ChatId(*admin_id), notice).await {
                    error!("Failed to notify admin {}: {}", admin_id, e);
                }
            }
        }
        Err(BookingError::NotFound) => {
            // Same message for "absent" and "not yours".
            bot.answer_callback_query(q.id)
                .text("Booking not found.")
                .show_alert(true)
                .await?;
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// First wizard step: a service was picked from the catalog.
pub async fn service_chosen(
    bot: Bot,
    q: CallbackQuery,
    dialogue: BookingDialogue,
    db: DatabaseManager,
    config: Arc<Config>,
) -> HandlerResult {
    let Some(data) = q.data.clone() else {
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };
    let Some(msg) = q.message.clone() else {
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };

    if data == "booking:abort" {
        bot.edit_message_text(msg.chat.id, msg.id, "Booking cancelled.")
            .await?;
        dialogue.exit().await?;
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    }

    let Some(service) = data.strip_prefix("svc:").and_then(catalog::service_by_id) else {
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };

    let draft = BookingDraft {
        service_id: service.id.to_string(),
        service_name: service.name.to_string(),
        base_price: service.price,
        ..Default::default()
    };

    let now = Local::now().date_naive();
    show_calendar(
        &bot,
        &msg,
        &db,
        &config,
        now.year(),
        now.month(),
        &format!(
            "{} — {} ₽\n\nNow pick a convenient date:",
            service.name, service.price
        ),
    )
    .await?;
    dialogue.update(BookingState::ChoosingDate { draft }).await?;
    bot.answer_callback_query(q.id).await?;
    Ok(())
}

/// Calendar navigation and day selection.
pub async fn date_step(
    bot: Bot,
    q: CallbackQuery,
    dialogue: BookingDialogue,
    mut draft: BookingDraft,
    db: DatabaseManager,
    config: Arc<Config>,
) -> HandlerResult {
    let Some(data) = q.data.clone() else {
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };
    let Some(msg) = q.message.clone() else {
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };

    if data == "back:services" {
        bot.edit_message_text(msg.chat.id, msg.id, "What service would you like to book?")
            .reply_markup(keyboards::service_keyboard())
            .await?;
        dialogue.update(BookingState::ChoosingService).await?;
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    }

    let parts: Vec<&str> = data.split(':').collect();
    match parts.as_slice() {
        ["cal", nav @ ("prev" | "next"), year, month] => {
            let (Ok(year), Ok(month)) = (year.parse::<i32>(), month.parse::<u32>()) else {
                bot.answer_callback_query(q.id).await?;
                return Ok(());
            };
            let (year, month) = if *nav == "prev" {
                prev_month(year, month)
            } else {
                next_month(year, month)
            };
            let unavailable = unavailable_set(&db, &config, year, month).await?;
            bot.edit_message_reply_markup(msg.chat.id, msg.id)
                .reply_markup(keyboards::calendar_keyboard(year, month, &unavailable))
                .await?;
            bot.answer_callback_query(q.id).await?;
        }
        ["cal", "day", year, month, day] => {
            let date = (|| {
                NaiveDate::from_ymd_opt(
                    year.parse().ok()?,
                    month.parse().ok()?,
                    day.parse().ok()?,
                )
            })();
            let Some(date) = date else {
                bot.answer_callback_query(q.id).await?;
                return Ok(());
            };
            if date < Local::now().date_naive() {
                bot.answer_callback_query(q.id)
                    .text("That date has already passed.")
                    .show_alert(true)
                    .await?;
                return Ok(());
            }

            draft.date = Some(format_date(date));
            show_time_slots(&bot, &msg, &db, &config, date, None).await?;
            dialogue.update(BookingState::ChoosingTime { draft }).await?;
            bot.answer_callback_query(q.id).await?;
        }
        _ => {
            bot.answer_callback_query(q.id).await?;
        }
    }
    Ok(())
}

/// Time-slot selection with an occupancy re-check before moving on. This check
/// is only a fast path for a friendlier message; the commit transaction is the
/// real gate.
pub async fn time_step(
    bot: Bot,
    q: CallbackQuery,
    dialogue: BookingDialogue,
    mut draft: BookingDraft,
    db: DatabaseManager,
    config: Arc<Config>,
) -> HandlerResult {
    let Some(data) = q.data.clone() else {
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };
    let Some(msg) = q.message.clone() else {
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };

    if data == "back:calendar" {
        let now = Local::now().date_naive();
        let (year, month) = draft
            .date
            .as_deref()
            .and_then(|raw| parse_date(raw).ok())
            .map(|d| (d.year(), d.month()))
            .unwrap_or((now.year(), now.month()));
        show_calendar(&bot, &msg, &db, &config, year, month, "Pick a convenient date:").await?;
        dialogue.update(BookingState::ChoosingDate { draft }).await?;
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    }

    let Some(slot) = data.strip_prefix("time:") else {
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };
    let Some(date) = draft.date.as_deref().and_then(|raw| parse_date(raw).ok()) else {
        warn!("Time step reached without a date in the draft");
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };

    let occupancy = slot_occupancy(&db.pool, date, config.max_parallel_bookings).await?;
    if !slot_has_room(&occupancy, slot, config.max_parallel_bookings) {
        bot.answer_callback_query(q.id)
            .text("This time was just taken!")
            .show_alert(true)
            .await?;
        show_time_slots(
            &bot,
            &msg,
            &db,
            &config,
            date,
            Some(&format!(
                "Sorry, {slot} was taken a moment ago.\n\nPick another time (❌ = full):"
            )),
        )
        .await?;
        return Ok(());
    }

    draft.time = Some(slot.to_string());
    bot.edit_message_text(
        msg.chat.id,
        msg.id,
        "Do you have a promo code? Send it as a message, or press Skip.",
    )
    .reply_markup(keyboards::promo_keyboard())
    .await?;
    dialogue.update(BookingState::EnteringPromo { draft }).await?;
    bot.answer_callback_query(q.id).await?;
    Ok(())
}

/// The Skip button of the promo step.
pub async fn promo_step(
    bot: Bot,
    q: CallbackQuery,
    dialogue: BookingDialogue,
    draft: BookingDraft,
) -> HandlerResult {
    if q.data.as_deref() == Some("promo:skip") {
        if let Some(msg) = q.message.clone() {
            message::ask_for_comment(&bot, &msg, &dialogue, draft).await?;
        }
    }
    bot.answer_callback_query(q.id).await?;
    Ok(())
}

/// The Done button of the comment step: show the summary for confirmation.
pub async fn comment_step(
    bot: Bot,
    q: CallbackQuery,
    dialogue: BookingDialogue,
    draft: BookingDraft,
) -> HandlerResult {
    if q.data.as_deref() == Some("comment:done") {
        if let Some(msg) = q.message.as_ref() {
            bot.send_message(
                msg.chat.id,
                format!("Please check your booking:\n\n{}", draft.summary()),
            )
            .reply_markup(keyboards::confirm_keyboard())
            .await?;
        }
        dialogue.update(BookingState::Confirming { draft }).await?;
    }
    bot.answer_callback_query(q.id).await?;
    Ok(())
}

/// Final step: persist the booking through the commit protocol and fan out
/// notifications.
pub async fn confirm_step(
    bot: Bot,
    q: CallbackQuery,
    dialogue: BookingDialogue,
    mut draft: BookingDraft,
    db: DatabaseManager,
    config: Arc<Config>,
    reminders: Arc<ReminderService>,
) -> HandlerResult {
    let Some(data) = q.data.clone() else {
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };
    let Some(msg) = q.message.clone() else {
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };

    if data == "booking:abort" {
        bot.edit_message_text(msg.chat.id, msg.id, "Booking cancelled.")
            .await?;
        dialogue.exit().await?;
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    }
    if data != "booking:confirm" {
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    }

    let (Some(date), Some(time)) = (draft.date.clone(), draft.time.clone()) else {
        bot.edit_message_text(msg.chat.id, msg.id, "Something went missing. Start over with /book.")
            .await?;
        dialogue.exit().await?;
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };

    let new_booking = NewBooking {
        user_id: q.from.id.0 as i64,
        user_full_name: q.from.full_name(),
        user_username: q.from.username.clone(),
        service: draft.service_name.clone(),
        date,
        time,
        price: draft.final_price(),
        discount: draft.discount_amount(),
        promocode: draft.promocode.clone(),
        comment: draft.comment.clone(),
        media: draft.media.clone(),
    };

    match booking::create_booking(&db.pool, config.max_parallel_bookings, new_booking).await {
        Ok(created) => {
            if let Err(e) = reminders.schedule_for(&created).await {
                error!("Failed to schedule reminder for booking #{}: {}", created.id, e);
            }
            notify_admins(&bot, &config, &created.user_full_name, created.id, &draft).await;
            bot.edit_message_text(
                msg.chat.id,
                msg.id,
                "✅ Your request is in!\n\n\
                 An administrator will contact you shortly to confirm the booking.",
            )
            .await?;
            dialogue.exit().await?;
            bot.answer_callback_query(q.id).await?;
            info!("Booking #{} submitted by user {}", created.id, q.from.id);
        }
        Err(BookingError::SlotUnavailable { date, time }) => {
            bot.answer_callback_query(q.id)
                .text("This time was just taken!")
                .show_alert(true)
                .await?;
            draft.time = None;
            if let Ok(parsed) = parse_date(&date) {
                show_time_slots(
                    &bot,
                    &msg,
                    &db,
                    &config,
                    parsed,
                    Some(&format!(
                        "Sorry, {time} on {date} was just taken.\n\nPick another time (❌ = full):"
                    )),
                )
                .await?;
            }
            dialogue.update(BookingState::ChoosingTime { draft }).await?;
        }
        Err(BookingError::PromoExhausted) => {
            draft.promocode = None;
            draft.discount_percent = 0;
            bot.edit_message_text(
                msg.chat.id,
                msg.id,
                "Your promo code just reached its usage limit.\n\
                 Enter another code, or press Skip to book without a discount.",
            )
            .reply_markup(keyboards::promo_keyboard())
            .await?;
            dialogue.update(BookingState::EnteringPromo { draft }).await?;
            bot.answer_callback_query(q.id).await?;
        }
        Err(e) => {
            error!("Booking commit failed for user {}: {}", q.from.id, e);
            bot.edit_message_text(
                msg.chat.id,
                msg.id,
                "Something went wrong on our side. Please try again a bit later.",
            )
            .await?;
            dialogue.exit().await?;
            bot.answer_callback_query(q.id).await?;
        }
    }
    Ok(())
}

/// Callbacks with no matching dialogue state (stale keyboards).
pub async fn stray_callback(bot: Bot, q: CallbackQuery) -> HandlerResult {
    bot.answer_callback_query(q.id)
        .text("This menu has expired. Use /book to start again.")
        .await?;
    Ok(())
}

async fn unavailable_set(
    db: &DatabaseManager,
    config: &Config,
    year: i32,
    month: u32,
) -> Result<HashSet<NaiveDate>, sqlx::Error> {
    let dates = unavailable_dates(&db.pool, year, month, config.max_parallel_bookings).await?;
    Ok(dates.into_iter().collect())
}

async fn show_calendar(
    bot: &Bot,
    msg: &Message,
    db: &DatabaseManager,
    config: &Config,
    year: i32,
    month: u32,
    text: &str,
) -> HandlerResult {
    let unavailable = unavailable_set(db, config, year, month).await?;
    bot.edit_message_text(msg.chat.id, msg.id, text)
        .reply_markup(keyboards::calendar_keyboard(year, month, &unavailable))
        .await?;
    Ok(())
}

async fn show_time_slots(
    bot: &Bot,
    msg: &Message,
    db: &DatabaseManager,
    config: &Config,
    date: NaiveDate,
    text: Option<&str>,
) -> HandlerResult {
    let occupancy = slot_occupancy(&db.pool, date, config.max_parallel_bookings).await?;
    let default_text = format!(
        "You picked {}.\n\nNow choose a convenient time (❌ = full):",
        format_date(date)
    );
    bot.edit_message_text(msg.chat.id, msg.id, text.unwrap_or(&default_text))
        .reply_markup(keyboards::time_slot_keyboard(
            &occupancy,
            config.max_parallel_bookings,
        ))
        .await?;
    Ok(())
}

async fn notify_admins(
    bot: &Bot,
    config: &Config,
    client_name: &str,
    booking_id: i64,
    draft: &BookingDraft,
) {
    let text = format!(
        "🔔 New booking request #{booking_id}\n\nClient: {client_name}\n\n{}",
        draft.summary()
    );
    for admin_id in &config.admin_ids {
        if let Err(e) = bot
            .send_message(ChatId(*admin_id), text.clone())
            .reply_markup(keyboards::admin_confirm_keyboard(booking_id))
            .await
        {
            error!("Failed to notify admin {} about booking #{}: {}", admin_id, booking_id, e);
        }
    }
}
