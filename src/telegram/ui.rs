//! Reply keyboard helpers for Telegram messages.

use teloxide::types::{KeyboardButton, KeyboardMarkup, KeyboardRemove, ReplyMarkup};

use crate::flow::Menu;

/// Build a one-time, resized reply keyboard from rows of labels.
pub fn choice_keyboard(rows: &[Vec<String>]) -> KeyboardMarkup {
    let keyboard = rows
        .iter()
        .map(|row| row.iter().map(KeyboardButton::new).collect::<Vec<_>>())
        .collect::<Vec<_>>();
    KeyboardMarkup::new(keyboard)
        .resize_keyboard()
        .one_time_keyboard()
}

/// Translate a prompt menu into Telegram reply markup.
///
/// [`Menu::Keep`] maps to `None` so the current keyboard stays on screen.
pub fn reply_markup(menu: &Menu) -> Option<ReplyMarkup> {
    match menu {
        Menu::Keep => None,
        Menu::Choices(rows) => Some(ReplyMarkup::Keyboard(choice_keyboard(rows))),
        Menu::Remove => Some(ReplyMarkup::KeyboardRemove(KeyboardRemove::new())),
    }
}
