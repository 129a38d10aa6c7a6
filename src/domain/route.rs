use super::identity::AccountId;
use crate::error::Result;
use std::fmt;
use url::Url;

/// Query parameter the payment platform appends when it sends the browser back.
pub const ACCOUNT_ID_PARAM: &str = "accountId";

/// The application's navigable entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Registration,
    Dashboard,
    Reauth,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Registration => "/",
            Self::Dashboard => "/dashboard",
            Self::Reauth => "/reauth",
        }
    }

    /// Maps a path to a route. Anything unrecognised lands on registration.
    pub fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "/dashboard" => Self::Dashboard,
            "/reauth" => Self::Reauth,
            _ => Self::Registration,
        }
    }

    /// Absolute URL of this route under `app_base`.
    pub fn url(&self, app_base: &Url, account_id: Option<&AccountId>) -> Url {
        let mut url = app_base.clone();
        let prefix = app_base.path().trim_end_matches('/');
        url.set_path(&format!("{}{}", prefix, self.path()));
        url.set_query(None);
        if let Some(id) = account_id {
            url.query_pairs_mut()
                .append_pair(ACCOUNT_ID_PARAM, id.as_str());
        }
        url
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A navigation arriving at the application, reduced to what the workflows read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundUrl {
    pub route: Route,
    pub account_id: Option<AccountId>,
}

impl InboundUrl {
    pub fn new(route: Route, account_id: Option<AccountId>) -> Self {
        Self { route, account_id }
    }

    /// Parses an absolute URL, or a path resolved against `app_base`.
    pub fn parse(raw: &str, app_base: &Url) -> Result<Self> {
        let url = match Url::parse(raw) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => app_base.join(raw)?,
            Err(e) => return Err(e.into()),
        };
        Ok(Self::from_url(&url, app_base))
    }

    pub fn from_url(url: &Url, app_base: &Url) -> Self {
        let prefix = app_base.path().trim_end_matches('/');
        let path = url.path();
        let relative = path.strip_prefix(prefix).unwrap_or(path);
        let relative = if relative.is_empty() { "/" } else { relative };

        Self {
            route: Route::from_path(relative),
            account_id: account_id_from_query(url),
        }
    }
}

/// Reads `accountId` from the query string. Blank values count as absent.
pub fn account_id_from_query(url: &Url) -> Option<AccountId> {
    url.query_pairs()
        .find(|(key, _)| key == ACCOUNT_ID_PARAM)
        .and_then(|(_, value)| AccountId::new(value.into_owned()).ok())
}
