//! Static service catalog and working hours for the studio.
//!
//! The slot grid is fixed: one bookable slot per working hour. The last slot
//! starts at 18:00 since the studio closes at 19:00.

/// A bookable detailing service with its base price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Service {
    pub id: &'static str,
    pub name: &'static str,
    pub price: i64,
}

/// Everything the studio offers through the booking wizard.
pub const SERVICES: &[Service] = &[
    Service { id: "polishing", name: "✨ Body polishing", price: 6000 },
    Service { id: "ceramics", name: "🛡️ Ceramic coating", price: 15000 },
    Service { id: "dry_cleaning", name: "🛋️ Interior dry cleaning", price: 8000 },
    Service { id: "wrapping", name: "🎨 Body wrapping", price: 20000 },
    Service { id: "washing", name: "💧 Three-phase wash", price: 2500 },
    Service { id: "glass_polishing", name: "🔍 Glass polishing", price: 3500 },
];

/// Hourly booking slots within working hours.
pub const WORKING_HOURS: &[&str] = &[
    "08:00", "09:00", "10:00", "11:00", "12:00", "13:00",
    "14:00", "15:00", "16:00", "17:00", "18:00",
];

pub fn service_by_id(id: &str) -> Option<&'static Service> {
    SERVICES.iter().find(|s| s.id == id)
}

pub fn is_working_hour(slot: &str) -> bool {
    WORKING_HOURS.contains(&slot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn working_hours_are_hourly_and_sorted() {
        for pair in WORKING_HOURS.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        for slot in WORKING_HOURS {
            assert_eq!(slot.len(), 5);
            assert!(slot.ends_with(":00"));
        }
    }

    #[test]
    fn service_lookup() {
        assert_eq!(service_by_id("ceramics").map(|s| s.price), Some(15000));
        assert!(service_by_id("unknown").is_none());
    }

    #[test]
    fn slot_membership() {
        assert!(is_working_hour("10:00"));
        assert!(!is_working_hour("19:00"));
        assert!(!is_working_hour("10:30"));
    }
}
