use super::dashboard::{DashboardReader, DashboardView};
use super::reauth::ReauthEntry;
use super::registration::RegistrationWorkflow;
use crate::config::OnboardingConfig;
use crate::domain::identity::AccountId;
use crate::domain::ports::{IdentityStoreRef, NavigatorRef, PaymentServiceRef};
use crate::domain::route::{InboundUrl, Route};
use tracing::debug;

/// The screen an inbound navigation lands on.
pub enum Screen {
    Registration(RegistrationWorkflow),
    Dashboard(DashboardView),
    Reauth(ReauthEntry),
}

impl Screen {
    pub fn route(&self) -> Route {
        match self {
            Self::Registration(_) => Route::Registration,
            Self::Dashboard(_) => Route::Dashboard,
            Self::Reauth(_) => Route::Reauth,
        }
    }
}

/// Wires the shared ports into whichever workflow a navigation asks for.
pub struct Router {
    service: PaymentServiceRef,
    store: IdentityStoreRef,
    navigator: NavigatorRef,
    config: OnboardingConfig,
}

impl Router {
    pub fn new(
        service: PaymentServiceRef,
        store: IdentityStoreRef,
        navigator: NavigatorRef,
        config: OnboardingConfig,
    ) -> Self {
        Self {
            service,
            store,
            navigator,
            config,
        }
    }

    pub fn config(&self) -> &OnboardingConfig {
        &self.config
    }

    /// A fresh registration session. Nothing from earlier sessions carries over.
    pub fn registration(&self) -> RegistrationWorkflow {
        RegistrationWorkflow::new(
            self.service.clone(),
            self.store.clone(),
            self.navigator.clone(),
            &self.config,
        )
    }

    pub fn dashboard(&self) -> DashboardReader {
        DashboardReader::new(
            self.service.clone(),
            self.store.clone(),
            self.navigator.clone(),
            &self.config,
        )
    }

    pub fn reauth(&self, account_id: Option<AccountId>) -> ReauthEntry {
        ReauthEntry::resolve(account_id, self.service.clone(), self.navigator.clone())
    }

    pub async fn dispatch(&self, inbound: InboundUrl) -> Screen {
        debug!(route = %inbound.route, has_account = inbound.account_id.is_some(), "dispatching");
        match inbound.route {
            Route::Registration => Screen::Registration(self.registration()),
            Route::Dashboard => Screen::Dashboard(self.dashboard().load(inbound.account_id).await),
            Route::Reauth => Screen::Reauth(self.reauth(inbound.account_id)),
        }
    }
}
