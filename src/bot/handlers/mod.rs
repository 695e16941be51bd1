pub mod callback;
pub mod message;

use crate::bot::commands::Command;
use crate::bot::state::BookingState;
use dptree::case;
use teloxide::dispatching::{dialogue, dialogue::InMemStorage, UpdateHandler};
use teloxide::prelude::*;

pub type BookingDialogue = Dialogue<BookingState, InMemStorage<BookingState>>;
pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Full update-handling tree: commands, wizard steps keyed off the dialogue
/// state, and state-independent callbacks (admin confirm, user cancel).
pub fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    let command_handler = teloxide::filter_command::<Command, _>()
        .endpoint(message::command_handler);

    let message_handler = Update::filter_message()
        .branch(command_handler)
        .branch(case![BookingState::EnteringPromo { draft }].endpoint(message::promo_entered))
        .branch(case![BookingState::EnteringComment { draft }].endpoint(message::comment_entered))
        .branch(dptree::endpoint(crate::bot::commands::general::handle_other));

    let callback_handler = Update::filter_callback_query()
        // Buttons that live on old messages must work in any dialogue state.
        .branch(
            dptree::filter(|q: CallbackQuery| {
                q.data.as_deref().map(callback::is_global).unwrap_or(false)
            })
            .endpoint(callback::global_callback),
        )
        .branch(case![BookingState::ChoosingService].endpoint(callback::service_chosen))
        .branch(case![BookingState::ChoosingDate { draft }].endpoint(callback::date_step))
        .branch(case![BookingState::ChoosingTime { draft }].endpoint(callback::time_step))
        .branch(case![BookingState::EnteringPromo { draft }].endpoint(callback::promo_step))
        .branch(case![BookingState::EnteringComment { draft }].endpoint(callback::comment_step))
        .branch(case![BookingState::Confirming { draft }].endpoint(callback::confirm_step))
        .branch(dptree::endpoint(callback::stray_callback));

    dialogue::enter::<Update, InMemStorage<BookingState>, BookingState, _>()
        .branch(message_handler)
        .branch(callback_handler)
}
