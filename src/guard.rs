//! Two-step confirmation gate in front of `drop_namespace`.
//!
//! A drop runs only after the user answers `yes` (any case) to the intent
//! prompt and then types the database name exactly. The progress of one
//! attempt lives in a [`ConfirmationToken`] that [`run_guard`] creates and
//! consumes, so no authorization survives into the next attempt, for the
//! same database or any other.
//!
//! ```text
//!  Idle ─Begin─▶ AwaitingIntent ─"yes"─▶ AwaitingAuthorization ─name─▶ Authorized ─▶ Executed
//!                      │                          │
//!                      └──── anything else ───────┴──────────▶ Cancelled
//! ```

use std::fmt;

use anyhow::Result;

use crate::catalog::Catalog;
use crate::error::TidyError;
use crate::prompt::Prompter;

/// The intent answer that moves on to step two, compared case-insensitively.
pub const AFFIRMATIVE: &str = "yes";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    IntentDeclined,
    NameMismatch,
    /// An event arrived in a state that does not accept it.
    OutOfOrder,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::NameMismatch => {
                write!(f, "Database name did not match. Operation cancelled.")
            }
            CancelReason::IntentDeclined | CancelReason::OutOfOrder => {
                write!(f, "Operation cancelled.")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Idle,
    AwaitingIntent,
    AwaitingAuthorization,
    Authorized,
    Executed,
    Cancelled(CancelReason),
}

impl GuardState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GuardState::Executed | GuardState::Cancelled(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardEvent {
    Begin,
    Intent(String),
    Authorization(String),
    /// The drop primitive returned successfully.
    Executed,
}

/// Pure transition function of the guard.
///
/// Terminal states absorb every event.
pub fn transition(state: GuardState, namespace: &str, event: &GuardEvent) -> GuardState {
    use GuardState::*;

    match (state, event) {
        (s, _) if s.is_terminal() => s,
        (Idle, GuardEvent::Begin) => AwaitingIntent,
        (AwaitingIntent, GuardEvent::Intent(answer)) => {
            if answer.eq_ignore_ascii_case(AFFIRMATIVE) {
                AwaitingAuthorization
            } else {
                Cancelled(CancelReason::IntentDeclined)
            }
        }
        (AwaitingAuthorization, GuardEvent::Authorization(typed)) => {
            if typed == namespace {
                Authorized
            } else {
                Cancelled(CancelReason::NameMismatch)
            }
        }
        (Authorized, GuardEvent::Executed) => Executed,
        _ => Cancelled(CancelReason::OutOfOrder),
    }
}

/// Progress of a single deletion attempt.
///
/// Only [`ConfirmationToken::new`] creates one, always in `Idle`, and
/// [`apply`](ConfirmationToken::apply) consumes it.
#[derive(Debug)]
pub struct ConfirmationToken {
    proposed_namespace: String,
    stage: GuardState,
}

impl ConfirmationToken {
    pub fn new(namespace: &str) -> Self {
        Self {
            proposed_namespace: namespace.to_string(),
            stage: GuardState::Idle,
        }
    }

    pub fn apply(self, event: GuardEvent) -> Self {
        let stage = transition(self.stage, &self.proposed_namespace, &event);
        Self {
            proposed_namespace: self.proposed_namespace,
            stage,
        }
    }

    pub fn stage(&self) -> GuardState {
        self.stage
    }

    pub fn namespace(&self) -> &str {
        &self.proposed_namespace
    }

    pub fn is_authorized(&self) -> bool {
        self.stage == GuardState::Authorized
    }
}

/// How one guarded attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Dropped,
    Cancelled(CancelReason),
    /// The drop primitive failed; carries the driver's message.
    Failed(String),
}

impl GuardOutcome {
    pub fn into_result(self, namespace: &str) -> Result<(), TidyError> {
        match self {
            GuardOutcome::Dropped => Ok(()),
            GuardOutcome::Cancelled(reason) => Err(TidyError::ConfirmationRejected {
                namespace: namespace.to_string(),
                reason,
            }),
            GuardOutcome::Failed(cause) => Err(TidyError::DeletionFailure {
                namespace: namespace.to_string(),
                cause,
            }),
        }
    }

    /// The line shown to the user after the attempt.
    pub fn message(&self, namespace: &str) -> String {
        match self.clone().into_result(namespace) {
            Ok(()) => format!("Database '{}' has been dropped successfully!", namespace),
            Err(e) => e.to_string(),
        }
    }
}

pub fn intent_prompt(namespace: &str) -> String {
    format!(
        "Do you want to DROP the entire database '{}'? This action cannot be undone! (yes/no): ",
        namespace
    )
}

pub fn authorization_prompt(namespace: &str) -> String {
    format!(
        "Are you ABSOLUTELY SURE you want to delete '{}'? Type the database name to confirm: ",
        namespace
    )
}

/// Runs both confirmation steps for `namespace` and, if authorized, drops it.
///
/// The caller must already have checked that `namespace` exists. End of
/// input at either prompt counts as a negative answer. `Err` is returned
/// only when the prompter itself fails; a failed drop is a
/// [`GuardOutcome::Failed`].
pub async fn run_guard(
    catalog: &dyn Catalog,
    prompter: &mut dyn Prompter,
    namespace: &str,
) -> Result<GuardOutcome> {
    let mut token = ConfirmationToken::new(namespace).apply(GuardEvent::Begin);

    loop {
        token = match token.stage() {
            GuardState::AwaitingIntent => {
                let answer = prompter.ask(&intent_prompt(namespace))?.unwrap_or_default();
                token.apply(GuardEvent::Intent(answer))
            }
            GuardState::AwaitingAuthorization => {
                let typed = prompter
                    .ask(&authorization_prompt(namespace))?
                    .unwrap_or_default();
                token.apply(GuardEvent::Authorization(typed))
            }
            GuardState::Authorized => {
                let dropped = catalog.drop_namespace(token.namespace()).await;
                return Ok(match dropped {
                    Ok(()) => {
                        let token = token.apply(GuardEvent::Executed);
                        tracing::info!(namespace = token.namespace(), "database dropped");
                        GuardOutcome::Dropped
                    }
                    Err(e) => {
                        tracing::warn!(namespace, error = %e, "drop failed");
                        GuardOutcome::Failed(format!("{:#}", e))
                    }
                });
            }
            GuardState::Cancelled(reason) => {
                tracing::debug!(namespace, ?reason, "drop cancelled");
                return Ok(GuardOutcome::Cancelled(reason));
            }
            GuardState::Idle | GuardState::Executed => {
                return Ok(GuardOutcome::Cancelled(CancelReason::OutOfOrder));
            }
        };
    }
}
