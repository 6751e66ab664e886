//! Conversation flow: per-user state, the step machine, validators,
//! prompts, and the submission formatter.
//!
//! The machine is a strictly forward chain per role. Each step owns one
//! validator and one field of [`ConversationState`]; invalid input loops on
//! the same step without touching state. The step after the last one for a
//! role is terminal and yields a [`Submission`].

use chrono::{DateTime, NaiveTime, Utc};
use tracing::debug;
use uuid::Uuid;

pub mod format;
pub mod prompts;
pub mod validate;

pub use prompts::{Menu, Prompt};
pub use validate::FlowRules;

/// Which side of the ride the user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Looking for a ride.
    Passenger,
    /// Offering seats.
    Driver,
}

impl Role {
    /// Ordered data-entry steps for this role.
    pub fn steps(self) -> &'static [Step] {
        match self {
            Self::Passenger => PASSENGER_STEPS,
            Self::Driver => DRIVER_STEPS,
        }
    }

    /// Stable lowercase name for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Passenger => "passenger",
            Self::Driver => "driver",
        }
    }
}

/// A data-entry position in the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// Waiting for one of the two routes.
    Route,
    /// Waiting for a phone number.
    Phone,
    /// Waiting for a free seat count (driver).
    Seats,
    /// Waiting for "woman passenger on board" yes/no (driver).
    Woman,
    /// Waiting for "air conditioning" yes/no (driver).
    Ac,
    /// Waiting for departure time (driver).
    Time,
    /// Waiting for "accepts parcels" yes/no (driver).
    Post,
}

impl Step {
    /// Stable name for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Route => "route",
            Self::Phone => "phone",
            Self::Seats => "seats",
            Self::Woman => "woman",
            Self::Ac => "ac",
            Self::Time => "time",
            Self::Post => "post",
        }
    }
}

const PASSENGER_STEPS: &[Step] = &[Step::Route, Step::Phone];
const DRIVER_STEPS: &[Step] = &[
    Step::Route,
    Step::Phone,
    Step::Seats,
    Step::Woman,
    Step::Ac,
    Step::Time,
    Step::Post,
];

/// Returns `true` if `step` belongs to the chain of `role`.
///
/// An absent step or role is never known; the caller treats it as
/// "awaiting /start".
pub fn is_known_step(step: Option<Step>, role: Option<Role>) -> bool {
    match (step, role) {
        (Some(step), Some(role)) => role.steps().contains(&step),
        _ => false,
    }
}

/// Step that follows `step` for `role`, or `None` when the flow is complete.
pub fn next_step(step: Step, role: Role) -> Option<Step> {
    let steps = role.steps();
    let position = steps.iter().position(|s| *s == step)?;
    steps.get(position.saturating_add(1)).copied()
}

/// Answers collected so far for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationState {
    /// Current step; `None` means no flow in progress.
    pub step: Option<Step>,
    /// Chosen role.
    pub role: Option<Role>,
    /// Chosen route.
    pub route: Option<String>,
    /// Validated phone number.
    pub phone: Option<String>,
    /// Free seats (driver).
    pub seats: Option<u8>,
    /// Woman passenger already on board (driver).
    pub has_woman: Option<bool>,
    /// Car has air conditioning (driver).
    pub has_ac: Option<bool>,
    /// Departure time (driver).
    pub time: Option<NaiveTime>,
    /// Driver takes parcels (driver).
    pub accepts_post: Option<bool>,
}

impl ConversationState {
    /// Returns `true` if no field has been populated.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Driver-only part of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverDetails {
    /// Free seats, `1..=4`.
    pub seats: u8,
    /// Woman passenger already on board.
    pub has_woman: bool,
    /// Car has air conditioning.
    pub has_ac: bool,
    /// Departure time.
    pub time: NaiveTime,
    /// Driver takes parcels.
    pub accepts_post: bool,
}

/// Role-specific payload of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionDetails {
    /// Passenger request carries no extra fields.
    Passenger,
    /// Driver offer.
    Driver(DriverDetails),
}

/// A completed, fully validated request ready for relaying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Correlation id for logs.
    pub id: Uuid,
    /// When the flow completed.
    pub created_at: DateTime<Utc>,
    /// Chosen route.
    pub route: String,
    /// Validated phone number.
    pub phone: String,
    /// Telegram first name of the submitter, if any.
    pub display_name: Option<String>,
    /// Role-specific fields.
    pub details: SubmissionDetails,
}

impl Submission {
    /// Role that produced this submission.
    pub fn role(&self) -> Role {
        match self.details {
            SubmissionDetails::Passenger => Role::Passenger,
            SubmissionDetails::Driver(_) => Role::Driver,
        }
    }
}

/// One inbound user action, already classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// The `/start` command.
    Start,
    /// One of the two role menu labels.
    SelectRole(Role),
    /// Any other text.
    Text(String),
}

impl Input {
    /// Classify raw message text against the configured role labels.
    pub fn classify(raw: &str, rules: &FlowRules) -> Self {
        let text = raw.trim();
        if is_start_command(text) {
            Self::Start
        } else if text == rules.passenger_label {
            Self::SelectRole(Role::Passenger)
        } else if text == rules.driver_label {
            Self::SelectRole(Role::Driver)
        } else {
            Self::Text(text.to_owned())
        }
    }
}

/// Matches `/start`, `/start@bot_name` and `/start payload`.
pub fn is_start_command(text: &str) -> bool {
    let Some(rest) = text.strip_prefix('/') else {
        return false;
    };
    let command = rest.split_whitespace().next().unwrap_or_default();
    command.split('@').next() == Some("start")
}

/// Result of feeding one input to the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Input accepted (or flow started); ask the next question.
    Advanced(Prompt),
    /// Input failed validation; state unchanged, repeat the question.
    Rejected(Prompt),
    /// No flow in progress; tell the user to `/start`.
    Unrecognized(Prompt),
    /// Last step accepted; relay this submission.
    Finished(Submission),
}

/// Internal inconsistencies that abort the current flow.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// A field required for the submission was never collected.
    #[error("conversation state is missing `{0}` at completion")]
    MissingField(&'static str),
}

/// Deterministic transition function over [`ConversationState`].
#[derive(Debug, Clone, Default)]
pub struct StepMachine {
    rules: FlowRules,
}

impl StepMachine {
    /// Create a machine validating against `rules`.
    pub fn new(rules: FlowRules) -> Self {
        Self { rules }
    }

    /// The rules this machine validates against.
    pub fn rules(&self) -> &FlowRules {
        &self.rules
    }

    /// Apply one input to `state`.
    ///
    /// `display_name` is only read when the flow completes.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError`] if the state cannot produce a submission at the
    /// terminal step. The caller is expected to reset the state.
    pub fn advance(
        &self,
        state: &mut ConversationState,
        input: Input,
        display_name: Option<&str>,
    ) -> Result<StepOutcome, FlowError> {
        match input {
            Input::Start => {
                *state = ConversationState::default();
                Ok(StepOutcome::Advanced(prompts::role_menu(&self.rules)))
            }
            Input::SelectRole(role) => {
                *state = ConversationState {
                    step: Some(Step::Route),
                    role: Some(role),
                    ..ConversationState::default()
                };
                Ok(StepOutcome::Advanced(prompts::question(
                    Step::Route,
                    &self.rules,
                )))
            }
            Input::Text(text) => self.answer(state, &text, display_name),
        }
    }

    fn answer(
        &self,
        state: &mut ConversationState,
        text: &str,
        display_name: Option<&str>,
    ) -> Result<StepOutcome, FlowError> {
        let (Some(step), Some(role)) = (state.step, state.role) else {
            return Ok(StepOutcome::Unrecognized(prompts::restart()));
        };
        if !is_known_step(Some(step), Some(role)) {
            return Ok(StepOutcome::Unrecognized(prompts::restart()));
        }

        if !self.accept(step, text, state) {
            debug!(step = step.as_str(), role = role.as_str(), "input rejected");
            return Ok(StepOutcome::Rejected(prompts::retry(step, &self.rules)));
        }

        match next_step(step, role) {
            Some(next) => {
                state.step = Some(next);
                Ok(StepOutcome::Advanced(prompts::question(next, &self.rules)))
            }
            None => build_submission(state, role, display_name).map(StepOutcome::Finished),
        }
    }

    /// Validate `text` for `step` and store it. Leaves `state` untouched on
    /// failure.
    fn accept(&self, step: Step, text: &str, state: &mut ConversationState) -> bool {
        match step {
            Step::Route if self.rules.is_valid_route(text) => {
                state.route = Some(text.to_owned());
            }
            Step::Phone if self.rules.is_valid_phone(text) => {
                state.phone = Some(text.to_owned());
            }
            Step::Seats => match validate::parse_seat_count(text) {
                Some(seats) => state.seats = Some(seats),
                None => return false,
            },
            Step::Woman | Step::Ac | Step::Post => {
                let Some(answer) = self.rules.parse_yes_no(text) else {
                    return false;
                };
                let field = match step {
                    Step::Woman => &mut state.has_woman,
                    Step::Ac => &mut state.has_ac,
                    _ => &mut state.accepts_post,
                };
                *field = Some(answer);
            }
            Step::Time => match validate::parse_time(text) {
                Some(time) => state.time = Some(time),
                None => return false,
            },
            Step::Route | Step::Phone => return false,
        }
        true
    }
}

fn build_submission(
    state: &ConversationState,
    role: Role,
    display_name: Option<&str>,
) -> Result<Submission, FlowError> {
    let route = state.route.clone().ok_or(FlowError::MissingField("route"))?;
    let phone = state.phone.clone().ok_or(FlowError::MissingField("phone"))?;
    let details = match role {
        Role::Passenger => SubmissionDetails::Passenger,
        Role::Driver => SubmissionDetails::Driver(DriverDetails {
            seats: state.seats.ok_or(FlowError::MissingField("seats"))?,
            has_woman: state.has_woman.ok_or(FlowError::MissingField("has_woman"))?,
            has_ac: state.has_ac.ok_or(FlowError::MissingField("has_ac"))?,
            time: state.time.ok_or(FlowError::MissingField("time"))?,
            accepts_post: state
                .accepts_post
                .ok_or(FlowError::MissingField("accepts_post"))?,
        }),
    };

    Ok(Submission {
        id: Uuid::new_v4(),
        created_at: Utc::now(),
        route,
        phone,
        display_name: display_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_owned),
        details,
    })
}
