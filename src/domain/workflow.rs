use super::identity::{AccountId, OnboardingLink, ProviderIdentity};
use crate::error::{OnboardingError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two visible steps of registration, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    CreateAccount,
    CompleteOnboarding,
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::CreateAccount => "create_account",
            Self::CompleteOnboarding => "complete_onboarding",
        };
        write!(f, "{s}")
    }
}

/// Registration state.
///
/// `CompleteOnboarding` always carries an identity, so a link can never be
/// requested for a provider that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationState {
    CreateAccount {
        identity: Option<ProviderIdentity>,
    },
    CompleteOnboarding {
        identity: ProviderIdentity,
    },
    /// Terminal: the page has been handed to the external onboarding URL.
    Redirected {
        identity: ProviderIdentity,
        link: OnboardingLink,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationEvent {
    AccountCreated(ProviderIdentity),
    Advance,
    GoBack,
    LinkIssued(OnboardingLink),
}

impl RegistrationEvent {
    fn name(&self) -> &'static str {
        match self {
            Self::AccountCreated(_) => "account_created",
            Self::Advance => "advance",
            Self::GoBack => "go_back",
            Self::LinkIssued(_) => "link_issued",
        }
    }
}

impl Default for RegistrationState {
    fn default() -> Self {
        Self::CreateAccount { identity: None }
    }
}

impl RegistrationState {
    /// The step shown to the user. `Redirected` still reports
    /// `CompleteOnboarding`, the last step the user saw.
    pub fn step(&self) -> WorkflowStep {
        match self {
            Self::CreateAccount { .. } => WorkflowStep::CreateAccount,
            Self::CompleteOnboarding { .. } | Self::Redirected { .. } => {
                WorkflowStep::CompleteOnboarding
            }
        }
    }

    pub fn identity(&self) -> Option<&ProviderIdentity> {
        match self {
            Self::CreateAccount { identity } => identity.as_ref(),
            Self::CompleteOnboarding { identity } | Self::Redirected { identity, .. } => {
                Some(identity)
            }
        }
    }

    pub fn account_id(&self) -> Option<&AccountId> {
        self.identity().map(|identity| &identity.account_id)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Redirected { .. })
    }

    /// Whether `event` has an entry in the transition table for this state.
    pub fn accepts(&self, event: &RegistrationEvent) -> bool {
        use RegistrationEvent::*;
        matches!(
            (self, event),
            (Self::CreateAccount { identity: None }, AccountCreated(_))
                | (Self::CreateAccount { identity: Some(_) }, Advance)
                | (Self::CompleteOnboarding { .. }, GoBack)
                | (Self::CompleteOnboarding { .. }, LinkIssued(_))
        )
    }

    /// Applies `event` and returns the resulting step.
    ///
    /// Events with no entry in the table are rejected and leave `self`
    /// untouched.
    pub fn apply(&mut self, event: RegistrationEvent) -> Result<WorkflowStep> {
        let current = std::mem::take(self);
        let (next, outcome) = match (current, event) {
            (
                Self::CreateAccount { identity: None },
                RegistrationEvent::AccountCreated(identity),
            ) => (Self::CompleteOnboarding { identity }, Ok(())),
            (Self::CreateAccount { identity: Some(identity) }, RegistrationEvent::Advance) => {
                (Self::CompleteOnboarding { identity }, Ok(()))
            }
            (Self::CompleteOnboarding { identity }, RegistrationEvent::GoBack) => (
                Self::CreateAccount {
                    identity: Some(identity),
                },
                Ok(()),
            ),
            (Self::CompleteOnboarding { identity }, RegistrationEvent::LinkIssued(link)) => {
                (Self::Redirected { identity, link }, Ok(()))
            }
            (state, event) => {
                let err = OnboardingError::InvalidTransition {
                    from: state.describe().to_string(),
                    event: event.name().to_string(),
                };
                (state, Err(err))
            }
        };
        *self = next;
        outcome.map(|()| self.step())
    }

    fn describe(&self) -> &'static str {
        match self {
            Self::CreateAccount { identity: None } => "create_account",
            Self::CreateAccount { identity: Some(_) } => "create_account(registered)",
            Self::CompleteOnboarding { .. } => "complete_onboarding",
            Self::Redirected { .. } => "redirected",
        }
    }
}
