pub mod blocked_date;
pub mod booking;
pub mod promocode;

pub use blocked_date::*;
pub use booking::*;
pub use promocode::*;
