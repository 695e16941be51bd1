//! Inline keyboard builders for the booking wizard.
//!
//! These only render occupancy data handed to them; which slots are actually
//! free is always decided again at commit time.

use crate::catalog::{Service, SERVICES, WORKING_HOURS};
use crate::utils::datetime::days_in_month;
use chrono::{Datelike, Local, NaiveDate};
use std::collections::{HashMap, HashSet};
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

/// Callback data for buttons that must do nothing.
pub const NOOP: &str = "noop";

pub fn service_keyboard() -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = SERVICES
        .iter()
        .map(|Service { id, name, price }| {
            vec![InlineKeyboardButton::callback(
                format!("{name} — {price} ₽"),
                format!("svc:{id}"),
            )]
        })
        .collect();
    rows.push(vec![InlineKeyboardButton::callback(
        "❌ Cancel",
        "booking:abort",
    )]);
    InlineKeyboardMarkup::new(rows)
}

/// Month grid with unavailable and past days disabled.
pub fn calendar_keyboard(
    year: i32,
    month: u32,
    unavailable: &HashSet<NaiveDate>,
) -> InlineKeyboardMarkup {
    let today = Local::now().date_naive();
    let mut rows: Vec<Vec<InlineKeyboardButton>> = Vec::new();

    let title = NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%B %Y").to_string())
        .unwrap_or_else(|| format!("{month:02}.{year}"));
    rows.push(vec![
        InlineKeyboardButton::callback("<", format!("cal:prev:{year}:{month}")),
        InlineKeyboardButton::callback(title, NOOP),
        InlineKeyboardButton::callback(">", format!("cal:next:{year}:{month}")),
    ]);
    rows.push(
        ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"]
            .iter()
            .map(|d| InlineKeyboardButton::callback(*d, NOOP))
            .collect(),
    );

    let blank = || InlineKeyboardButton::callback(" ", NOOP);
    let first_weekday = NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.weekday().num_days_from_monday() as usize)
        .unwrap_or(0);

    let mut week: Vec<InlineKeyboardButton> = (0..first_weekday).map(|_| blank()).collect();
    for day in 1..=days_in_month(year, month) {
        let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
            continue;
        };
        let button = if date < today || unavailable.contains(&date) {
            InlineKeyboardButton::callback(day.to_string(), NOOP)
        } else {
            InlineKeyboardButton::callback(
                day.to_string(),
                format!("cal:day:{year}:{month}:{day}"),
            )
        };
        week.push(button);
        if week.len() == 7 {
            rows.push(std::mem::take(&mut week));
        }
    }
    if !week.is_empty() {
        while week.len() < 7 {
            week.push(blank());
        }
        rows.push(week);
    }

    rows.push(vec![InlineKeyboardButton::callback(
        "⬅️ Back to services",
        "back:services",
    )]);
    InlineKeyboardMarkup::new(rows)
}

/// Working-hour slots, three per row; full slots are crossed out and inert.
pub fn time_slot_keyboard(occupancy: &HashMap<String, u32>, capacity: u32) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = Vec::new();
    for chunk in WORKING_HOURS.chunks(3) {
        rows.push(
            chunk
                .iter()
                .map(|slot| {
                    let count = occupancy.get(*slot).copied().unwrap_or(0);
                    if count >= capacity {
                        InlineKeyboardButton::callback(format!("❌ {slot}"), NOOP)
                    } else {
                        InlineKeyboardButton::callback(*slot, format!("time:{slot}"))
                    }
                })
                .collect(),
        );
    }
    rows.push(vec![InlineKeyboardButton::callback(
        "⬅️ Back to calendar",
        "back:calendar",
    )]);
    InlineKeyboardMarkup::new(rows)
}

pub fn promo_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "Skip",
        "promo:skip",
    )]])
}

pub fn comment_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "Done ➡️",
        "comment:done",
    )]])
}

pub fn confirm_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("✅ Confirm", "booking:confirm"),
        InlineKeyboardButton::callback("❌ Cancel", "booking:abort"),
    ]])
}

/// One cancel button per active booking for /mybookings.
pub fn my_bookings_keyboard(bookings: &[(i64, String, String)]) -> InlineKeyboardMarkup {
    let rows = bookings
        .iter()
        .map(|(id, date, time)| {
            vec![InlineKeyboardButton::callback(
                format!("❌ Cancel #{id} ({date} {time})"),
                format!("cancel:{id}"),
            )]
        })
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(rows)
}

/// Confirm button attached to the admin notification for a new request.
pub fn admin_confirm_keyboard(booking_id: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "✅ Confirm booking",
        format!("adm_confirm:{booking_id}"),
    )]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::InlineKeyboardButtonKind;

    fn callback_data(button: &InlineKeyboardButton) -> &str {
        match &button.kind {
            InlineKeyboardButtonKind::CallbackData(data) => data,
            _ => panic!("expected callback button"),
        }
    }

    #[test]
    fn calendar_disables_unavailable_days() {
        let blocked: HashSet<NaiveDate> =
            [NaiveDate::from_ymd_opt(2099, 1, 15).unwrap()].into_iter().collect();
        let markup = calendar_keyboard(2099, 1, &blocked);

        let day_buttons: Vec<&InlineKeyboardButton> = markup
            .inline_keyboard
            .iter()
            .flatten()
            .filter(|b| b.text == "15" || b.text == "16")
            .collect();
        let fifteen = day_buttons.iter().find(|b| b.text == "15").unwrap();
        let sixteen = day_buttons.iter().find(|b| b.text == "16").unwrap();
        assert_eq!(callback_data(fifteen), NOOP);
        assert_eq!(callback_data(sixteen), "cal:day:2099:1:16");
    }

    #[test]
    fn calendar_has_navigation_and_grid() {
        let markup = calendar_keyboard(2099, 2, &HashSet::new());
        let nav = &markup.inline_keyboard[0];
        assert_eq!(callback_data(&nav[0]), "cal:prev:2099:2");
        assert_eq!(callback_data(&nav[2]), "cal:next:2099:2");
        // Every week row has exactly seven cells.
        for row in &markup.inline_keyboard[2..markup.inline_keyboard.len() - 1] {
            assert_eq!(row.len(), 7);
        }
    }

    #[test]
    fn full_slots_are_inert() {
        let mut occupancy = HashMap::new();
        occupancy.insert("10:00".to_string(), 2);
        occupancy.insert("11:00".to_string(), 1);
        let markup = time_slot_keyboard(&occupancy, 2);

        let buttons: Vec<&InlineKeyboardButton> =
            markup.inline_keyboard.iter().flatten().collect();
        let full = buttons.iter().find(|b| b.text.contains("10:00")).unwrap();
        let free = buttons.iter().find(|b| b.text == "11:00").unwrap();
        assert_eq!(callback_data(full), NOOP);
        assert!(full.text.starts_with('❌'));
        assert_eq!(callback_data(free), "time:11:00");
    }

    #[test]
    fn service_rows_carry_service_ids() {
        let markup = service_keyboard();
        assert_eq!(markup.inline_keyboard.len(), SERVICES.len() + 1);
        assert_eq!(callback_data(&markup.inline_keyboard[0][0]), "svc:polishing");
    }

    #[test]
    fn today_is_selectable_in_current_month() {
        let today = Local::now().date_naive();
        let markup = calendar_keyboard(today.year(), today.month(), &HashSet::new());
        let expected = format!(
            "cal:day:{}:{}:{}",
            today.year(),
            today.month(),
            today.day()
        );
        let found = markup
            .inline_keyboard
            .iter()
            .flatten()
            .any(|b| callback_data(b) == expected);
        assert!(found, "today must stay bookable, checked {expected}");
    }
}
