pub mod admin;
pub mod general;

use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Detailing studio bot commands:")]
pub enum Command {
    #[command(description = "Display this help message")]
    Help,
    #[command(description = "Start the bot")]
    Start,
    #[command(description = "Book a detailing service")]
    Book,
    #[command(description = "Show your active bookings")]
    MyBookings,
    #[command(description = "Cancel any booking by id (admin)")]
    CancelBooking { id: i64 },
    #[command(description = "Close a date for bookings, DD.MM.YYYY (admin)")]
    BlockDate { date: String },
    #[command(description = "Reopen a date for bookings, DD.MM.YYYY (admin)")]
    UnblockDate { date: String },
    #[command(description = "Bookings report for the last N days (admin)")]
    Report { days: i64 },
}
