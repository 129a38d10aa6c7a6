use crate::config::OnboardingConfig;
use crate::domain::identity::{AccountId, AccountStatus};
use crate::domain::ports::{IdentityStoreRef, NavigatorRef, PaymentServiceRef};
use crate::domain::route::Route;
use crate::error::{OnboardingError, Result};
use std::fmt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub const NO_ACCOUNT_NOTICE: &str = "No account information found. Redirecting to home page...";
pub const STATUS_UNAVAILABLE: &str = "Could not load account information";
pub const PLACEHOLDER: &str = "N/A";

/// Where the dashboard found the account id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    Url,
    Store,
}

impl fmt::Display for IdentitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url => f.write_str("url"),
            Self::Store => f.write_str("store"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAccount {
    pub account_id: AccountId,
    pub source: IdentitySource,
}

/// Status fields ready for display. Missing values read [`PLACEHOLDER`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSummary {
    pub account_id: String,
    pub status: String,
    pub email: String,
    pub payouts: String,
}

impl AccountSummary {
    pub fn new(account_id: &AccountId, status: &AccountStatus) -> Self {
        let state = status.charges_enabled.or(status.details_submitted);
        Self {
            account_id: account_id.to_string(),
            status: label(state, "Active", "Pending"),
            email: status
                .email
                .clone()
                .filter(|email| !email.is_empty())
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            payouts: label(status.payouts_enabled, "Enabled", "Pending"),
        }
    }
}

fn label(flag: Option<bool>, yes: &str, no: &str) -> String {
    match flag {
        Some(true) => yes.to_string(),
        Some(false) => no.to_string(),
        None => PLACEHOLDER.to_string(),
    }
}

impl fmt::Display for AccountSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Account ID: {}", self.account_id)?;
        writeln!(f, "Status:     {}", self.status)?;
        writeln!(f, "Email:      {}", self.email)?;
        write!(f, "Payouts:    {}", self.payouts)
    }
}

/// The delayed trip back to registration scheduled when no account resolves.
pub struct PendingRedirect {
    handle: JoinHandle<Result<()>>,
}

impl PendingRedirect {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the grace period to end and the navigation to happen.
    pub async fn wait(self) -> Result<()> {
        self.handle
            .await
            .map_err(|e| OnboardingError::InternalError(Box::new(e)))?
    }

    /// Drops the redirect, for a host leaving the view before it fires.
    pub fn cancel(self) {
        self.handle.abort();
    }
}

pub enum DashboardView {
    /// Nothing to show; the user is sent home once the grace period ends.
    NoAccount {
        notice: &'static str,
        redirect: PendingRedirect,
    },
    Loaded {
        source: IdentitySource,
        summary: AccountSummary,
    },
    /// The status call failed. The id stays on screen for diagnostics.
    Unavailable {
        account_id: AccountId,
        source: IdentitySource,
        error: &'static str,
    },
}

/// Read-only landing page after hosted onboarding.
pub struct DashboardReader {
    service: PaymentServiceRef,
    store: IdentityStoreRef,
    navigator: NavigatorRef,
    identity_key: String,
    redirect_grace: Duration,
}

impl DashboardReader {
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
            redirect_grace: config.redirect_grace,
        }
    }

    /// The URL's account id wins over the stored one.
    pub async fn resolve(&self, url_account_id: Option<AccountId>) -> Option<ResolvedAccount> {
        if let Some(account_id) = url_account_id {
            return Some(ResolvedAccount {
                account_id,
                source: IdentitySource::Url,
            });
        }

        match self.store.get(&self.identity_key).await {
            Ok(Some(raw)) => match AccountId::new(raw) {
                Ok(account_id) => Some(ResolvedAccount {
                    account_id,
                    source: IdentitySource::Store,
                }),
                Err(e) => {
                    warn!(error = %e, "ignoring unusable stored account id");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "identity store read failed");
                None
            }
        }
    }

    pub async fn load(&self, url_account_id: Option<AccountId>) -> DashboardView {
        let Some(resolved) = self.resolve(url_account_id).await else {
            info!(
                grace_ms = self.redirect_grace.as_millis() as u64,
                "no account, scheduling redirect home"
            );
            return DashboardView::NoAccount {
                notice: NO_ACCOUNT_NOTICE,
                redirect: self.schedule_home(),
            };
        };

        let ResolvedAccount { account_id, source } = resolved;
        match self.service.get_account_status(&account_id).await {
            Ok(status) => DashboardView::Loaded {
                source,
                summary: AccountSummary::new(&account_id, &status),
            },
            Err(e) => {
                warn!(%account_id, %source, error = %e, "account status unavailable");
                DashboardView::Unavailable {
                    account_id,
                    source,
                    error: STATUS_UNAVAILABLE,
                }
            }
        }
    }

    fn schedule_home(&self) -> PendingRedirect {
        let navigator = self.navigator.clone();
        let grace = self.redirect_grace;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            navigator.navigate(Route::Registration)
        });
        PendingRedirect { handle }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> AccountId {
        AccountId::new("acct_1").unwrap()
    }

    #[test]
    fn test_summary_from_complete_status() {
        let status = AccountStatus {
            email: Some("doc@example.com".to_string()),
            payouts_enabled: Some(true),
            charges_enabled: Some(true),
            details_submitted: Some(true),
        };
        let summary = AccountSummary::new(&id(), &status);
        assert_eq!(summary.status, "Active");
        assert_eq!(summary.payouts, "Enabled");
        assert_eq!(summary.email, "doc@example.com");
    }

    #[test]
    fn test_summary_uses_placeholder_for_absent_fields() {
        let summary = AccountSummary::new(&id(), &AccountStatus::default());
        assert_eq!(summary.account_id, "acct_1");
        assert_eq!(summary.status, PLACEHOLDER);
        assert_eq!(summary.email, PLACEHOLDER);
        assert_eq!(summary.payouts, PLACEHOLDER);
    }

    #[test]
    fn test_summary_pending_states() {
        let status = AccountStatus {
            payouts_enabled: Some(false),
            details_submitted: Some(false),
            ..Default::default()
        };
        let summary = AccountSummary::new(&id(), &status);
        assert_eq!(summary.status, "Pending");
        assert_eq!(summary.payouts, "Pending");
    }

    #[test]
    fn test_summary_display() {
        let summary = AccountSummary::new(&id(), &AccountStatus::default());
        let rendered = summary.to_string();
        assert!(rendered.contains("Account ID: acct_1"));
        assert!(rendered.contains("Payouts:    N/A"));
    }
}
