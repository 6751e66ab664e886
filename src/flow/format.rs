//! Plain-text summaries posted to the notification groups.
//!
//! Template wording is fixed Uzbek. Yes/no answers are echoed with the
//! configured [`FlowRules`] tokens, so the summary repeats what the user
//! was offered in the menu.

use super::{DriverDetails, FlowRules, Submission, SubmissionDetails};

/// Shown when the submitter has no first name.
const UNNAMED: &str = "Ismsiz";

/// "Available" for the woman passenger and air conditioning flags.
const PRESENT: &str = "Bor";

fn present(flag: bool, rules: &FlowRules) -> &str {
    if flag {
        PRESENT
    } else {
        &rules.no
    }
}

fn yes_no(flag: bool, rules: &FlowRules) -> &str {
    if flag {
        &rules.yes
    } else {
        &rules.no
    }
}

/// Render a submission with the template for its role.
pub fn render(submission: &Submission, rules: &FlowRules) -> String {
    let name = submission.display_name.as_deref().unwrap_or(UNNAMED);
    match &submission.details {
        SubmissionDetails::Passenger => format!(
            "\u{1f695} Yangi yo\u{2018}lovchi:\n\
             \u{1f6e3} Yo\u{2018}nalish: {route}\n\
             \u{1f4de} Tel: {phone}\n\
             \u{1f464} {name}",
            route = submission.route,
            phone = submission.phone,
        ),
        SubmissionDetails::Driver(details) => render_driver(submission, details, name, rules),
    }
}

fn render_driver(
    submission: &Submission,
    details: &DriverDetails,
    name: &str,
    rules: &FlowRules,
) -> String {
    format!(
        "\u{1f696} Taxi haydovchi:\n\
         \u{1f6e3} Yo\u{2018}nalish: {route}\n\
         \u{1f4de} Tel: {phone}\n\
         \u{1f465} Joylar: {seats}\n\
         \u{1f469} Ayol yo\u{2018}lovchi: {woman}\n\
         \u{2744}\u{fe0f} Konditsioner: {ac}\n\
         \u{23f0} Vaqt: {time}\n\
         \u{1f4ee} Poshta: {post}\n\
         \u{1f464} {name}",
        route = submission.route,
        phone = submission.phone,
        seats = details.seats,
        woman = present(details.has_woman, rules),
        ac = present(details.has_ac, rules),
        time = details.time.format("%H:%M"),
        post = yes_no(details.accepts_post, rules),
    )
}
