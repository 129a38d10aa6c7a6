use super::{InFlight, StepOutcome};
use crate::config::OnboardingConfig;
use crate::domain::identity::{Email, ProviderIdentity};
use crate::domain::ports::{IdentityStoreRef, NavigatorRef, PaymentServiceRef};
use crate::domain::workflow::{RegistrationEvent, RegistrationState, WorkflowStep};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

pub const CREATE_ACCOUNT_FAILED: &str = "Failed to create account. Please try again.";
pub const LINK_FAILED: &str = "Failed to generate onboarding link. Please try again.";
pub const PERSIST_FAILED: &str = "Could not save your account details. Please try again.";
pub const REDIRECT_FAILED: &str = "Could not open the onboarding page. Please try again.";

#[derive(Debug, Default)]
struct Session {
    state: RegistrationState,
    email_draft: String,
    email_error: Option<String>,
    session_error: Option<String>,
}

/// Snapshot of the registration screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationView {
    pub step: WorkflowStep,
    pub email: String,
    pub account_id: Option<String>,
    pub email_error: Option<String>,
    pub session_error: Option<String>,
    pub in_flight: bool,
    pub redirected: bool,
    pub can_submit: bool,
    pub can_advance: bool,
    pub can_request_link: bool,
    pub can_go_back: bool,
}

/// Two-step enrollment: create the connected account, then hand the provider
/// to the platform's hosted onboarding.
///
/// The account id is written to the identity store only once a link has been
/// issued, and always before the redirect, since a browser host unloads the
/// page on redirect.
pub struct RegistrationWorkflow {
    service: PaymentServiceRef,
    store: IdentityStoreRef,
    navigator: NavigatorRef,
    identity_key: String,
    session: RwLock<Session>,
    in_flight: InFlight,
}

impl RegistrationWorkflow {
    pub fn new(
        service: PaymentServiceRef,
        store: IdentityStoreRef,
        navigator: NavigatorRef,
        config: &OnboardingConfig,
    ) -> Self {
        Self {
            service,
            store,
            navigator,
            identity_key: config.identity_key.clone(),
            session: RwLock::new(Session::default()),
            in_flight: InFlight::default(),
        }
    }

    /// Records a keystroke. A field error already on screen is re-checked so
    /// it disappears as soon as the input becomes valid.
    pub async fn edit_email(&self, input: &str) {
        let mut session = self.session.write().await;
        session.email_draft = input.to_string();
        if session.email_error.is_some() {
            session.email_error = Email::parse(input).err().map(str::to_string);
        }
    }

    /// Step one: validate the address and create the connected account.
    ///
    /// Validation runs even while a call is outstanding; only a valid address
    /// is turned away as `Busy`.
    pub async fn submit_email(&self, input: &str) -> StepOutcome {
        let email = {
            let mut session = self.session.write().await;
            if !matches!(session.state, RegistrationState::CreateAccount { identity: None }) {
                debug!(state = ?session.state.step(), "account already created, ignoring submit");
                return StepOutcome::Ignored;
            }

            session.email_draft = input.to_string();
            match Email::parse(input) {
                Ok(email) => {
                    session.email_error = None;
                    email
                }
                Err(message) => {
                    session.email_error = Some(message.to_string());
                    return StepOutcome::Invalid(message.to_string());
                }
            }
        };

        let Some(_guard) = self.in_flight.try_begin() else {
            return StepOutcome::Busy;
        };
        self.session.write().await.session_error = None;

        match self.service.create_account(&email).await {
            Ok(account_id) => {
                info!(%account_id, "connected account created");
                let mut session = self.session.write().await;
                let identity = ProviderIdentity { account_id, email };
                match session.state.apply(RegistrationEvent::AccountCreated(identity)) {
                    Ok(step) => StepOutcome::Advanced(step),
                    Err(e) => {
                        warn!(error = %e, "account created but state moved on");
                        StepOutcome::Ignored
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "account creation failed");
                self.fail(CREATE_ACCOUNT_FAILED).await
            }
        }
    }

    /// Returns to step two after a "go back". A no-op until an account exists.
    pub async fn advance_to_onboarding(&self) -> StepOutcome {
        let mut session = self.session.write().await;
        match session.state.apply(RegistrationEvent::Advance) {
            Ok(step) => StepOutcome::Advanced(step),
            Err(e) => {
                debug!(error = %e, "advance ignored");
                StepOutcome::Ignored
            }
        }
    }

    /// Step two: fetch a fresh onboarding link, persist the account id, then
    /// redirect.
    pub async fn request_onboarding_link(&self) -> StepOutcome {
        let Some(_guard) = self.in_flight.try_begin() else {
            return StepOutcome::Busy;
        };

        let account_id = {
            let mut session = self.session.write().await;
            let RegistrationState::CompleteOnboarding { identity } = &session.state else {
                debug!(
                    step = %session.state.step(),
                    "no account to onboard, ignoring link request"
                );
                return StepOutcome::Ignored;
            };
            let account_id = identity.account_id.clone();
            session.session_error = None;
            account_id
        };

        let link = match self.service.create_onboarding_link(&account_id).await {
            Ok(link) => link,
            Err(e) => {
                warn!(%account_id, error = %e, "onboarding link request failed");
                return self.fail(LINK_FAILED).await;
            }
        };

        if let Err(e) = self.store.set(&self.identity_key, account_id.as_str()).await {
            warn!(%account_id, error = %e, "could not persist account id, not redirecting");
            return self.fail(PERSIST_FAILED).await;
        }

        info!(%account_id, url = %link.as_str(), "onboarding link issued");
        if let Err(e) = self.navigator.redirect(&link) {
            warn!(%account_id, error = %e, "redirect failed");
            return self.fail(REDIRECT_FAILED).await;
        }

        let mut session = self.session.write().await;
        if let Err(e) = session.state.apply(RegistrationEvent::LinkIssued(link.clone())) {
            warn!(error = %e, "redirected but state moved on");
        }
        StepOutcome::Redirected(link)
    }

    /// Back to step one. The identity is kept.
    pub async fn go_back(&self) -> StepOutcome {
        if self.in_flight.is_set() {
            return StepOutcome::Busy;
        }

        let mut session = self.session.write().await;
        match session.state.apply(RegistrationEvent::GoBack) {
            Ok(step) => StepOutcome::Advanced(step),
            Err(e) => {
                debug!(error = %e, "go back ignored");
                StepOutcome::Ignored
            }
        }
    }

    pub async fn state(&self) -> RegistrationState {
        self.session.read().await.state.clone()
    }

    pub async fn view(&self) -> RegistrationView {
        let session = self.session.read().await;
        let in_flight = self.in_flight.is_set();
        let state = &session.state;

        RegistrationView {
            step: state.step(),
            email: session.email_draft.clone(),
            account_id: state.account_id().map(|id| id.to_string()),
            email_error: session.email_error.clone(),
            session_error: session.session_error.clone(),
            in_flight,
            redirected: state.is_terminal(),
            can_submit: !in_flight
                && matches!(state, RegistrationState::CreateAccount { identity: None }),
            can_advance: state.accepts(&RegistrationEvent::Advance),
            can_request_link: !in_flight
                && matches!(state, RegistrationState::CompleteOnboarding { .. }),
            can_go_back: !in_flight && state.accepts(&RegistrationEvent::GoBack),
        }
    }

    async fn fail(&self, message: &str) -> StepOutcome {
        self.session.write().await.session_error = Some(message.to_string());
        StepOutcome::Failed(message.to_string())
    }
}
