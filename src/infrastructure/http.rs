use crate::domain::identity::{AccountId, AccountStatus, Email, OnboardingLink};
use crate::domain::ports::PaymentService;
use crate::error::{OnboardingError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

#[derive(Serialize)]
struct CreateAccountRequest<'a> {
    email: &'a str,
}

#[derive(Deserialize)]
struct CreateAccountResponse {
    id: String,
}

#[derive(Deserialize)]
struct OnboardingLinkResponse {
    url: String,
}

/// [`PaymentService`] over the application backend's JSON API.
///
/// Routes are resolved relative to `base_url`:
///
/// * `POST {base}/create-connected-account` with `{ "email" }` -> `{ "id" }`
/// * `POST {base}/create-onboarding-link/{id}` -> `{ "url" }`
/// * `GET  {base}/account/{id}` -> `{ "email", "payoutsEnabled", ... }`
///
/// No timeout and no retries: a call either answers or fails once.
#[derive(Clone)]
pub struct HttpPaymentService {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpPaymentService {
    pub fn new(base_url: Url) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client, base_url })
    }

    pub fn with_client(client: reqwest::Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| OnboardingError::InvalidConfig {
                key: "api_base_url".to_string(),
                message: format!("{} cannot be used as a base URL", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OnboardingError::ServiceStatus {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| OnboardingError::InvalidResponse(format!("Failed to decode body: {}", e)))
    }
}

#[async_trait]
impl PaymentService for HttpPaymentService {
    async fn create_account(&self, email: &Email) -> Result<AccountId> {
        let url = self.endpoint(&["create-connected-account"])?;
        debug!(%url, "creating connected account");

        let response = self
            .client
            .post(url)
            .json(&CreateAccountRequest {
                email: email.as_str(),
            })
            .send()
            .await?;

        let body: CreateAccountResponse = self.handle_response(response).await?;
        AccountId::new(body.id).map_err(|_| {
            OnboardingError::InvalidResponse("account creation returned an empty id".to_string())
        })
    }

    async fn create_onboarding_link(&self, account_id: &AccountId) -> Result<OnboardingLink> {
        let url = self.endpoint(&["create-onboarding-link", account_id.as_str()])?;
        debug!(%url, "requesting onboarding link");

        let response = self.client.post(url).send().await?;
        let body: OnboardingLinkResponse = self.handle_response(response).await?;
        OnboardingLink::parse(&body.url)
    }

    async fn get_account_status(&self, account_id: &AccountId) -> Result<AccountStatus> {
        let url = self.endpoint(&["account", account_id.as_str()])?;
        debug!(%url, "fetching account status");

        let response = self.client.get(url).send().await?;
        self.handle_response(response).await
    }
}
