//! Explicit dialogue state for the booking wizard.
//!
//! One state per wizard step, each carrying the draft accumulated so far. This
//! replaces per-step handler dispatch with a plain state enum the dispatcher
//! can branch on.

use crate::services::booking::MediaRef;

/// How many photo/video attachments a booking may carry.
pub const MAX_MEDIA_FILES: usize = 5;

/// Everything the user has selected so far.
#[derive(Debug, Clone, Default)]
pub struct BookingDraft {
    pub service_id: String,
    pub service_name: String,
    pub base_price: i64,
    /// DD.MM.YYYY, set in the date step.
    pub date: Option<String>,
    /// HH:MM, set in the time step.
    pub time: Option<String>,
    pub promocode: Option<String>,
    pub discount_percent: i64,
    pub comment: Option<String>,
    pub media: Vec<MediaRef>,
}

impl BookingDraft {
    /// Absolute discount derived from the promo percentage.
    pub fn discount_amount(&self) -> i64 {
        self.base_price * self.discount_percent / 100
    }

    pub fn final_price(&self) -> i64 {
        self.base_price - self.discount_amount()
    }

    /// Human-readable summary used in confirmations and admin notifications.
    pub fn summary(&self) -> String {
        let mut lines = vec![format!("Service: {}", self.service_name)];
        if let (Some(date), Some(time)) = (&self.date, &self.time) {
            lines.push(format!("Date and time: {date} at {time}"));
        }
        lines.push(format!("Price: {} ₽", self.base_price));
        if self.discount_percent > 0 {
            lines.push(format!(
                "Discount ({}%): -{} ₽",
                self.discount_percent,
                self.discount_amount()
            ));
            lines.push(format!("Total: {} ₽", self.final_price()));
        }
        if let Some(code) = &self.promocode {
            lines.push(format!("Promo code: {code}"));
        }
        if let Some(comment) = &self.comment {
            lines.push(format!("Comment: {comment}"));
        }
        if !self.media.is_empty() {
            lines.push(format!("Attachments: {}", self.media.len()));
        }
        lines.join("\n")
    }
}

#[derive(Debug, Clone, Default)]
pub enum BookingState {
    #[default]
    Idle,
    ChoosingService,
    ChoosingDate { draft: BookingDraft },
    ChoosingTime { draft: BookingDraft },
    EnteringPromo { draft: BookingDraft },
    EnteringComment { draft: BookingDraft },
    Confirming { draft: BookingDraft },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> BookingDraft {
        BookingDraft {
            service_id: "ceramics".to_string(),
            service_name: "Ceramic coating".to_string(),
            base_price: 15000,
            date: Some("01.01.2099".to_string()),
            time: Some("10:00".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn price_without_discount() {
        let d = draft();
        assert_eq!(d.discount_amount(), 0);
        assert_eq!(d.final_price(), 15000);
    }

    #[test]
    fn price_with_discount() {
        let mut d = draft();
        d.promocode = Some("SALE10".to_string());
        d.discount_percent = 10;
        assert_eq!(d.discount_amount(), 1500);
        assert_eq!(d.final_price(), 13500);
    }

    #[test]
    fn summary_mentions_selection() {
        let mut d = draft();
        d.discount_percent = 25;
        d.promocode = Some("LIMITED25".to_string());
        let summary = d.summary();
        assert!(summary.contains("Ceramic coating"));
        assert!(summary.contains("01.01.2099 at 10:00"));
        assert!(summary.contains("LIMITED25"));
        assert!(summary.contains("-3750"));
    }
}
