#![allow(dead_code)]

use async_trait::async_trait;
use provider_onboarding::config::OnboardingConfig;
use provider_onboarding::domain::identity::{AccountId, AccountStatus, Email, OnboardingLink};
use provider_onboarding::domain::ports::PaymentService;
use provider_onboarding::error::{OnboardingError, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

pub const ACCOUNT_ID: &str = "acct_1";
pub const ONBOARDING_URL: &str = "https://pay.example/onboard/xyz";

/// Payment service double with per-operation call counters and switchable
/// failures. Clones share their counters and script.
#[derive(Clone, Default)]
pub struct ScriptedPaymentService {
    inner: Arc<Script>,
}

#[derive(Default)]
struct Script {
    create_calls: AtomicUsize,
    link_calls: AtomicUsize,
    status_calls: AtomicUsize,
    fail_create: AtomicBool,
    fail_link: AtomicBool,
    fail_status: AtomicBool,
    hold: AtomicBool,
    release: Notify,
    status: Mutex<AccountStatus>,
    seen_ids: Mutex<Vec<String>>,
}

impl ScriptedPaymentService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(status: AccountStatus) -> Self {
        let service = Self::default();
        if let Ok(mut current) = service.inner.status.lock() {
            *current = status;
        }
        service
    }

    pub fn fail_create(&self, fail: bool) {
        self.inner.fail_create.store(fail, Ordering::SeqCst);
    }

    pub fn fail_link(&self, fail: bool) {
        self.inner.fail_link.store(fail, Ordering::SeqCst);
    }

    pub fn fail_status(&self, fail: bool) {
        self.inner.fail_status.store(fail, Ordering::SeqCst);
    }

    /// Makes every following call wait until [`Self::release`] is called.
    pub fn hold(&self) {
        self.inner.hold.store(true, Ordering::SeqCst);
    }

    pub fn release(&self) {
        self.inner.hold.store(false, Ordering::SeqCst);
        self.inner.release.notify_waiters();
    }

    pub fn create_calls(&self) -> usize {
        self.inner.create_calls.load(Ordering::SeqCst)
    }

    pub fn link_calls(&self) -> usize {
        self.inner.link_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.inner.status_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.create_calls() + self.link_calls() + self.status_calls()
    }

    /// Account ids passed to link and status calls, in call order.
    pub fn seen_ids(&self) -> Vec<String> {
        self.inner
            .seen_ids
            .lock()
            .map(|ids| ids.clone())
            .unwrap_or_default()
    }

    async fn gate(&self) {
        while self.inner.hold.load(Ordering::SeqCst) {
            let released = self.inner.release.notified();
            if !self.inner.hold.load(Ordering::SeqCst) {
                break;
            }
            released.await;
        }
    }

    fn record(&self, account_id: &AccountId) {
        if let Ok(mut ids) = self.inner.seen_ids.lock() {
            ids.push(account_id.to_string());
        }
    }
}

fn unavailable() -> OnboardingError {
    OnboardingError::ServiceStatus {
        status: 500,
        body: "upstream unavailable".to_string(),
    }
}

#[async_trait]
impl PaymentService for ScriptedPaymentService {
    async fn create_account(&self, _email: &Email) -> Result<AccountId> {
        self.inner.create_calls.fetch_add(1, Ordering::SeqCst);
        self.gate().await;
        if self.inner.fail_create.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        AccountId::new(ACCOUNT_ID)
    }

    async fn create_onboarding_link(&self, account_id: &AccountId) -> Result<OnboardingLink> {
        self.inner.link_calls.fetch_add(1, Ordering::SeqCst);
        self.record(account_id);
        self.gate().await;
        if self.inner.fail_link.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        OnboardingLink::parse(ONBOARDING_URL)
    }

    async fn get_account_status(&self, account_id: &AccountId) -> Result<AccountStatus> {
        self.inner.status_calls.fetch_add(1, Ordering::SeqCst);
        self.record(account_id);
        self.gate().await;
        if self.inner.fail_status.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(self
            .inner
            .status
            .lock()
            .map(|status| status.clone())
            .unwrap_or_default())
    }
}

pub fn config() -> OnboardingConfig {
    OnboardingConfig::default().with_redirect_grace(Duration::from_millis(20))
}
