use super::identity::{AccountId, AccountStatus, Email, OnboardingLink};
use super::route::Route;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Durable key-value slot that survives the page leaving the application.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn get(&self, key: &str) -> Result<Option<String>>;
}

/// The backend that fronts the payment platform.
///
/// Every call is a single attempt. Retrying is up to the user.
#[async_trait]
pub trait PaymentService: Send + Sync {
    async fn create_account(&self, email: &Email) -> Result<AccountId>;
    async fn create_onboarding_link(&self, account_id: &AccountId) -> Result<OnboardingLink>;
    async fn get_account_status(&self, account_id: &AccountId) -> Result<AccountStatus>;
}

/// Where the host sends the user next.
pub trait Navigator: Send + Sync {
    /// Full-page redirect away from the application. Nothing after this
    /// call is guaranteed to run in a browser host.
    fn redirect(&self, link: &OnboardingLink) -> Result<()>;
    /// In-application navigation to one of our own routes.
    fn navigate(&self, route: Route) -> Result<()>;
}

pub type IdentityStoreRef = Arc<dyn IdentityStore>;
pub type PaymentServiceRef = Arc<dyn PaymentService>;
pub type NavigatorRef = Arc<dyn Navigator>;
