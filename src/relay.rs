//! Per-event orchestration: session lock, step machine, formatter,
//! dispatcher, reset.
//!
//! The user's session lock is held until the reply is decided, so a second
//! message from the same user waits for an in-flight delivery to finish and
//! then runs against the already-reset conversation.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::dispatch::{Destinations, ReliableDispatcher};
use crate::flow::{format, prompts, ConversationState, Input, Prompt, StepMachine, StepOutcome};
use crate::flow::{Submission, SubmissionDetails};
use crate::session::{SessionStore, UserId};

/// A text message received from a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Sender's user id.
    pub user_id: UserId,
    /// Sender's first name, if the transport provides one.
    pub display_name: Option<String>,
    /// Raw message text.
    pub text: String,
}

/// Connects the step machine to sessions and the notification channels.
#[derive(Debug)]
pub struct Relay {
    machine: StepMachine,
    sessions: Arc<SessionStore>,
    dispatcher: ReliableDispatcher,
    destinations: Destinations,
}

impl Relay {
    /// Assemble a relay from its collaborators.
    pub fn new(
        machine: StepMachine,
        sessions: Arc<SessionStore>,
        dispatcher: ReliableDispatcher,
        destinations: Destinations,
    ) -> Self {
        Self {
            machine,
            sessions,
            dispatcher,
            destinations,
        }
    }

    /// Session store backing this relay.
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Process one message and return the reply for the sender.
    ///
    /// Never fails: validation problems become retry prompts, delivery and
    /// internal errors become apology prompts with the session reset.
    pub async fn handle(&self, message: &InboundMessage) -> Prompt {
        let reply = {
            let mut state = self.sessions.lock(message.user_id).await;
            self.step(&mut state, message).await
        };
        self.sessions.release(message.user_id).await;
        reply
    }

    async fn step(&self, state: &mut ConversationState, message: &InboundMessage) -> Prompt {
        let input = Input::classify(&message.text, self.machine.rules());

        match self
            .machine
            .advance(state, input, message.display_name.as_deref())
        {
            Ok(StepOutcome::Advanced(prompt))
            | Ok(StepOutcome::Rejected(prompt))
            | Ok(StepOutcome::Unrecognized(prompt)) => prompt,
            Ok(StepOutcome::Finished(submission)) => {
                let reply = self.relay(message.user_id, &submission).await;
                *state = ConversationState::default();
                reply
            }
            Err(e) => {
                error!(user_id = message.user_id, error = %e, "flow aborted");
                *state = ConversationState::default();
                prompts::unexpected_error()
            }
        }
    }

    async fn relay(&self, user_id: UserId, submission: &Submission) -> Prompt {
        let role = submission.role();
        let channel = self.destinations.for_role(role);
        let text = format::render(submission, self.machine.rules());

        match self.dispatcher.send(channel, &text).await {
            Ok(()) => {
                let active_sessions = self.sessions.active_sessions().await;
                info!(
                    user_id,
                    submission_id = %submission.id,
                    role = role.as_str(),
                    channel,
                    seats = seats(submission),
                    active_sessions,
                    "submission relayed"
                );
                prompts::received()
            }
            Err(e) => {
                warn!(
                    user_id,
                    submission_id = %submission.id,
                    role = role.as_str(),
                    error = %e,
                    "submission discarded"
                );
                prompts::delivery_failed()
            }
        }
    }
}

fn seats(submission: &Submission) -> Option<u8> {
    match &submission.details {
        SubmissionDetails::Driver(details) => Some(details.seats),
        SubmissionDetails::Passenger => None,
    }
}
