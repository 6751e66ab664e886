//! Fixed prompt texts and choice menus shown to the user.

use super::validate::FlowRules;
use super::Step;

/// Reply keyboard change attached to a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Menu {
    /// Leave whatever keyboard the user currently has.
    Keep,
    /// Show a one-time keyboard with these rows of labels.
    Choices(Vec<Vec<String>>),
    /// Remove the keyboard so the user types free text.
    Remove,
}

/// One outbound message to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// Message text.
    pub text: String,
    /// Keyboard change to apply with the message.
    pub menu: Menu,
}

impl Prompt {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            menu: Menu::Keep,
        }
    }

    fn with_menu(text: impl Into<String>, menu: Menu) -> Self {
        Self {
            text: text.into(),
            menu,
        }
    }
}

fn yes_no_menu(rules: &FlowRules) -> Menu {
    Menu::Choices(vec![vec![rules.yes.clone(), rules.no.clone()]])
}

/// Greeting with the passenger/driver menu, sent on `/start`.
pub fn role_menu(rules: &FlowRules) -> Prompt {
    Prompt::with_menu(
        "Salom! Siz foydalanuvchimisiz yoki taxi haydovchi?",
        Menu::Choices(vec![vec![
            rules.passenger_label.clone(),
            rules.driver_label.clone(),
        ]]),
    )
}

/// Question asked on entering `step`.
pub fn question(step: Step, rules: &FlowRules) -> Prompt {
    match step {
        Step::Route => Prompt::with_menu(
            "Qayerdan qayergacha yo\u{02bb}nalishni tanlang:",
            Menu::Choices(rules.routes.iter().map(|r| vec![r.clone()]).collect()),
        ),
        Step::Phone => Prompt::with_menu(
            "Iltimos, telefon raqamingizni yuboring:",
            Menu::Remove,
        ),
        Step::Seats => Prompt::with_menu(
            "Mashinangizda nechta bo\u{2018}sh joy bor?",
            Menu::Choices(vec![(1..=4).map(|n: u8| n.to_string()).collect()]),
        ),
        Step::Woman => {
            Prompt::with_menu("Mashinada ayol yo\u{2018}lovchi bormi?", yes_no_menu(rules))
        }
        Step::Ac => Prompt::with_menu("Mashinada konditsioner bormi?", yes_no_menu(rules)),
        Step::Time => Prompt::with_menu(
            "Jo\u{2018}nash vaqtini kiriting (masalan: 14:00):",
            Menu::Remove,
        ),
        Step::Post => Prompt::with_menu("Poshta qabul qilasizmi?", yes_no_menu(rules)),
    }
}

/// Corrective message repeated when input for `step` fails validation.
pub fn retry(step: Step, rules: &FlowRules) -> Prompt {
    match step {
        Step::Route => Prompt::plain("Iltimos, menyudan yo\u{2018}nalishni tanlang!"),
        Step::Phone => Prompt::plain(
            "Iltimos, telefon raqamini to\u{2018}g\u{2018}ri formatda yuboring (masalan: +998901234567)",
        ),
        Step::Seats => Prompt::plain("Iltimos, 1 dan 4 gacha raqamni tanlang."),
        Step::Woman | Step::Ac | Step::Post => Prompt::plain(format!(
            "Iltimos, \"{}\" yoki \"{}\" ni tanlang.",
            rules.yes, rules.no
        )),
        Step::Time => Prompt::plain(
            "Iltimos, vaqtni HH:MM formatda kiriting (masalan: 08:30 yoki 17:45)",
        ),
    }
}

/// Instruction sent when there is no flow in progress.
pub fn restart() -> Prompt {
    Prompt::plain("Iltimos, /start buyrug\u{2018}ini yuboring va menyudan foydalaning.")
}

/// Confirmation after the submission reached its channel.
pub fn received() -> Prompt {
    Prompt::with_menu("Ma'lumot qabul qilindi. Rahmat!", Menu::Remove)
}

/// Apology after a terminal delivery failure.
pub fn delivery_failed() -> Prompt {
    Prompt::with_menu(
        "Xatolik yuz berdi, iltimos keyinroq urinib ko\u{2018}ring.",
        Menu::Remove,
    )
}

/// Generic message for any unexpected processing error.
pub fn unexpected_error() -> Prompt {
    Prompt::with_menu("Kutilmagan xatolik yuz berdi.", Menu::Remove)
}
