//! Application layer: the onboarding workflows.
//!
//! Each workflow owns its transient session state and talks to the outside
//! world only through the ports in [`crate::domain::ports`]. Remote failures
//! never escape a workflow; they come back as a [`StepOutcome`] and a session
//! message the host can show.

pub mod dashboard;
pub mod reauth;
pub mod registration;
pub mod router;

use crate::domain::identity::OnboardingLink;
use crate::domain::route::Route;
use crate::domain::workflow::WorkflowStep;
use std::sync::atomic::{AtomicBool, Ordering};

/// What a user-triggered action ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The workflow moved to this step.
    Advanced(WorkflowStep),
    /// The page was handed off to the external onboarding URL.
    Redirected(OnboardingLink),
    /// The user was sent to one of the application's own routes.
    Navigated(Route),
    /// Field validation failed. No call was made.
    Invalid(String),
    /// The attempt failed. The message is now the session error.
    Failed(String),
    /// A call from this workflow is still outstanding.
    Busy,
    /// The control is disabled in the current state.
    Ignored,
}

/// Request-in-flight flag shared by a workflow's network-bound actions.
#[derive(Debug, Default)]
pub(crate) struct InFlight(AtomicBool);

impl InFlight {
    /// Claims the flag, or returns `None` when a call is already outstanding.
    pub(crate) fn try_begin(&self) -> Option<InFlightGuard<'_>> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard(&self.0))
    }

    pub(crate) fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Clears the in-flight flag when dropped, whichever way the call ended.
pub(crate) struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
