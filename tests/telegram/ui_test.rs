//! Telegram reply keyboard tests.

use ride_relay::flow::{prompts, FlowRules, Menu, Step};
use ride_relay::telegram::ui::{choice_keyboard, reply_markup};
use teloxide::types::ReplyMarkup;

#[test]
fn choice_keyboard_keeps_row_layout() {
    let rows = vec![
        vec!["1".to_owned(), "2".to_owned()],
        vec!["3".to_owned()],
    ];
    let kb = choice_keyboard(&rows);
    assert_eq!(kb.keyboard.len(), 2);
    assert_eq!(kb.keyboard[0].len(), 2);
    assert_eq!(kb.keyboard[0][1].text, "2");
    assert_eq!(kb.keyboard[1][0].text, "3");
}

#[test]
fn keep_menu_sends_no_markup() {
    assert!(reply_markup(&Menu::Keep).is_none());
}

#[test]
fn remove_menu_removes_keyboard() {
    assert!(matches!(
        reply_markup(&Menu::Remove),
        Some(ReplyMarkup::KeyboardRemove(_))
    ));
}

#[test]
fn seat_question_renders_single_row_of_four() {
    let prompt = prompts::question(Step::Seats, &FlowRules::default());
    match reply_markup(&prompt.menu) {
        Some(ReplyMarkup::Keyboard(kb)) => {
            let labels: Vec<&str> = kb.keyboard[0].iter().map(|b| b.text.as_str()).collect();
            assert_eq!(labels, vec!["1", "2", "3", "4"]);
        }
        other => panic!("expected keyboard, got {other:?}"),
    }
}
