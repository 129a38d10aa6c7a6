use super::registration::LINK_FAILED;
use super::{InFlight, StepOutcome};
use crate::domain::identity::AccountId;
use crate::domain::ports::{NavigatorRef, PaymentServiceRef};
use crate::domain::route::Route;
use tokio::sync::RwLock;
use tracing::{info, warn};

pub const MISSING_ACCOUNT: &str =
    "Account ID is missing. Please start the onboarding process again.";
pub const START_OVER_FAILED: &str = "Could not return to the start. Please try again.";

/// Actions a reauthorization screen offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReauthAction {
    Reauthorize,
    StartOver,
}

/// The reauthorization screen, resolved once from the inbound URL.
///
/// Only [`ReauthEntry::Ready`] can request a link; without an account id the
/// user can only start over.
pub enum ReauthEntry {
    Ready(ReauthWorkflow),
    MissingAccount(MissingAccount),
}

impl ReauthEntry {
    pub fn resolve(
        account_id: Option<AccountId>,
        service: PaymentServiceRef,
        navigator: NavigatorRef,
    ) -> Self {
        match account_id {
            Some(account_id) => Self::Ready(ReauthWorkflow {
                account_id,
                service,
                navigator,
                session_error: RwLock::new(None),
                in_flight: InFlight::default(),
            }),
            None => {
                warn!("reauthorization reached without an account id");
                Self::MissingAccount(MissingAccount { navigator })
            }
        }
    }

    pub fn actions(&self) -> &'static [ReauthAction] {
        match self {
            Self::Ready(_) => &[ReauthAction::Reauthorize, ReauthAction::StartOver],
            Self::MissingAccount(_) => &[ReauthAction::StartOver],
        }
    }

    pub fn start_over(self) -> StepOutcome {
        match self {
            Self::Ready(workflow) => workflow.start_over(),
            Self::MissingAccount(missing) => missing.start_over(),
        }
    }
}

/// Reauthorization without an account id: an error and a way back.
pub struct MissingAccount {
    navigator: NavigatorRef,
}

impl MissingAccount {
    pub fn message(&self) -> &'static str {
        MISSING_ACCOUNT
    }

    /// Consumes the screen and returns to registration with nothing carried over.
    pub fn start_over(self) -> StepOutcome {
        start_over(&self.navigator)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReauthView {
    pub account_id: String,
    pub session_error: Option<String>,
    pub loading: bool,
    pub can_reauthorize: bool,
}

/// Issues a fresh onboarding link for an account that already exists.
///
/// Never creates an account. The id came in through the URL, so nothing is
/// written to the identity store.
pub struct ReauthWorkflow {
    account_id: AccountId,
    service: PaymentServiceRef,
    navigator: NavigatorRef,
    session_error: RwLock<Option<String>>,
    in_flight: InFlight,
}

impl ReauthWorkflow {
    pub fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    pub async fn reauthorize(&self) -> StepOutcome {
        let Some(_guard) = self.in_flight.try_begin() else {
            return StepOutcome::Busy;
        };
        *self.session_error.write().await = None;

        let account_id = &self.account_id;
        match self.service.create_onboarding_link(account_id).await {
            Ok(link) => {
                info!(%account_id, url = %link.as_str(), "fresh onboarding link issued");
                match self.navigator.redirect(&link) {
                    Ok(()) => StepOutcome::Redirected(link),
                    Err(e) => {
                        warn!(%account_id, error = %e, "redirect failed");
                        self.fail(LINK_FAILED).await
                    }
                }
            }
            Err(e) => {
                warn!(%account_id, error = %e, "reauthorization link request failed");
                self.fail(LINK_FAILED).await
            }
        }
    }

    pub fn start_over(self) -> StepOutcome {
        start_over(&self.navigator)
    }

    pub async fn view(&self) -> ReauthView {
        let loading = self.in_flight.is_set();
        ReauthView {
            account_id: self.account_id.to_string(),
            session_error: self.session_error.read().await.clone(),
            loading,
            can_reauthorize: !loading,
        }
    }

    async fn fail(&self, message: &str) -> StepOutcome {
        *self.session_error.write().await = Some(message.to_string());
        StepOutcome::Failed(message.to_string())
    }
}

fn start_over(navigator: &NavigatorRef) -> StepOutcome {
    match navigator.navigate(Route::Registration) {
        Ok(()) => StepOutcome::Navigated(Route::Registration),
        Err(e) => {
            warn!(error = %e, "start over navigation failed");
            StepOutcome::Failed(START_OVER_FAILED.to_string())
        }
    }
}
