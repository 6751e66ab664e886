//! Step machine transition tests.

use ride_relay::flow::{
    prompts, ConversationState, Input, Menu, Role, Step, StepMachine, StepOutcome,
    SubmissionDetails,
};

const ROUTE: &str = "Beshariq \u{27a1}\u{fe0f} Farg\u{02bb}ona";
const PHONE: &str = "+998901234567";
const NO: &str = "Yo\u{2018}q";

fn feed(
    machine: &StepMachine,
    state: &mut ConversationState,
    text: &str,
) -> StepOutcome {
    let input = Input::classify(text, machine.rules());
    match machine.advance(state, input, Some("Ali")) {
        Ok(outcome) => outcome,
        Err(err) => panic!("unexpected flow error on {text:?}: {err}"),
    }
}

#[test]
fn start_shows_role_menu_and_clears_state() {
    let machine = StepMachine::default();
    let mut state = ConversationState::default();

    let outcome = feed(&machine, &mut state, "/start");
    match outcome {
        StepOutcome::Advanced(prompt) => {
            assert_eq!(
                prompt.menu,
                Menu::Choices(vec![vec![
                    "Yo'lovchi".to_owned(),
                    "Taxi Haydovchi".to_owned()
                ]])
            );
        }
        other => panic!("expected role menu, got {other:?}"),
    }
    assert!(state.is_empty());
}

#[test]
fn driver_flow_produces_one_submission() {
    let machine = StepMachine::default();
    let mut state = ConversationState::default();

    let steps = [
        "/start",
        "Taxi Haydovchi",
        ROUTE,
        PHONE,
        "2",
        NO,
        "Ha",
        "14:00",
    ];
    for text in steps {
        let outcome = feed(&machine, &mut state, text);
        assert!(
            matches!(outcome, StepOutcome::Advanced(_)),
            "{text:?} should advance, got {outcome:?}"
        );
    }
    assert_eq!(state.step, Some(Step::Post));

    let submission = match feed(&machine, &mut state, "Ha") {
        StepOutcome::Finished(submission) => submission,
        other => panic!("expected finished flow, got {other:?}"),
    };

    assert_eq!(submission.role(), Role::Driver);
    assert_eq!(submission.route, ROUTE);
    assert_eq!(submission.phone, PHONE);
    assert_eq!(submission.display_name.as_deref(), Some("Ali"));
    let SubmissionDetails::Driver(details) = submission.details else {
        panic!("expected driver details");
    };
    assert_eq!(details.seats, 2);
    assert!(!details.has_woman);
    assert!(details.has_ac);
    assert_eq!(details.time.format("%H:%M").to_string(), "14:00");
    assert!(details.accepts_post);
}

#[test]
fn passenger_flow_finishes_after_route_and_phone() {
    let machine = StepMachine::default();
    let mut state = ConversationState::default();

    feed(&machine, &mut state, "/start");
    feed(&machine, &mut state, "Yo'lovchi");
    assert_eq!(state.role, Some(Role::Passenger));
    assert_eq!(state.step, Some(Step::Route));

    assert!(matches!(
        feed(&machine, &mut state, ROUTE),
        StepOutcome::Advanced(_)
    ));
    let outcome = feed(&machine, &mut state, PHONE);
    let StepOutcome::Finished(submission) = outcome else {
        panic!("passenger flow should finish after the phone step");
    };
    assert_eq!(submission.role(), Role::Passenger);
    assert_eq!(submission.details, SubmissionDetails::Passenger);
}

#[test]
fn invalid_phone_leaves_state_untouched() {
    let machine = StepMachine::default();
    let mut state = ConversationState::default();
    feed(&machine, &mut state, "Taxi Haydovchi");
    feed(&machine, &mut state, ROUTE);
    let before = state.clone();

    for _ in 0..3 {
        let outcome = feed(&machine, &mut state, "12345");
        assert_eq!(
            outcome,
            StepOutcome::Rejected(prompts::retry(Step::Phone, machine.rules()))
        );
        assert_eq!(state, before);
    }
}

#[test]
fn invalid_seat_count_is_retried_not_propagated() {
    let machine = StepMachine::default();
    let mut state = ConversationState::default();
    for text in ["Taxi Haydovchi", ROUTE, PHONE] {
        feed(&machine, &mut state, text);
    }

    for bad in ["0", "5", "two", "99999999999999999999"] {
        assert!(matches!(
            feed(&machine, &mut state, bad),
            StepOutcome::Rejected(_)
        ));
        assert_eq!(state.step, Some(Step::Seats));
        assert_eq!(state.seats, None);
    }
}

#[test]
fn text_without_flow_asks_for_start() {
    let machine = StepMachine::default();
    let mut state = ConversationState::default();

    assert_eq!(
        feed(&machine, &mut state, "hello"),
        StepOutcome::Unrecognized(prompts::restart())
    );
    assert!(state.is_empty());
}

#[test]
fn step_outside_role_chain_asks_for_start() {
    let machine = StepMachine::default();
    let mut state = ConversationState {
        step: Some(Step::Seats),
        role: Some(Role::Passenger),
        ..ConversationState::default()
    };

    assert_eq!(
        feed(&machine, &mut state, "2"),
        StepOutcome::Unrecognized(prompts::restart())
    );
}

#[test]
fn start_resets_from_any_step() {
    let machine = StepMachine::default();
    let mut state = ConversationState::default();
    for text in ["Taxi Haydovchi", ROUTE, PHONE, "3", "Ha"] {
        feed(&machine, &mut state, text);
    }
    assert_eq!(state.step, Some(Step::Ac));

    let outcome = feed(&machine, &mut state, "/start");
    assert_eq!(
        outcome,
        StepOutcome::Advanced(prompts::role_menu(machine.rules()))
    );
    assert!(state.is_empty());
}

#[test]
fn role_selection_mid_flow_starts_over() {
    let machine = StepMachine::default();
    let mut state = ConversationState::default();
    for text in ["Taxi Haydovchi", ROUTE, PHONE] {
        feed(&machine, &mut state, text);
    }

    feed(&machine, &mut state, "Yo'lovchi");
    assert_eq!(
        state,
        ConversationState {
            step: Some(Step::Route),
            role: Some(Role::Passenger),
            ..ConversationState::default()
        }
    );
}

#[test]
fn input_is_trimmed_before_validation() {
    let machine = StepMachine::default();
    let mut state = ConversationState::default();
    feed(&machine, &mut state, "  Taxi Haydovchi ");
    assert_eq!(state.role, Some(Role::Driver));
    feed(&machine, &mut state, ROUTE);
    feed(&machine, &mut state, &format!(" {PHONE}\n"));
    assert_eq!(state.phone.as_deref(), Some(PHONE));
}
