use crate::domain::identity::OnboardingLink;
use crate::domain::ports::{IdentityStore, Navigator};
use crate::domain::route::Route;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;

/// A thread-safe in-memory identity store.
///
/// Clones share the same map, so a test can hand one clone to a workflow and
/// inspect another.
#[derive(Default, Clone)]
pub struct InMemoryIdentityStore {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryIdentityStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `key = value`, as if a previous
    /// page load had written it.
    pub fn with_value(key: &str, value: &str) -> Self {
        let mut values = HashMap::new();
        values.insert(key.to_string(), value.to_string());
        Self {
            values: Arc::new(RwLock::new(values)),
        }
    }

    /// Number of keys held. Never more than one in normal use.
    pub async fn len(&self) -> usize {
        self.values.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.values.read().await.is_empty()
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.write().await;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.read().await;
        Ok(values.get(key).cloned())
    }
}

/// A navigation performed through [`RecordingNavigator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Redirect(String),
    Route(Route),
}

/// A navigator that only records what it was asked to do.
#[derive(Default, Clone)]
pub struct RecordingNavigator {
    history: Arc<Mutex<Vec<Navigation>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<Navigation> {
        self.history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }

    fn push(&self, navigation: Navigation) {
        if let Ok(mut history) = self.history.lock() {
            history.push(navigation);
        }
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, link: &OnboardingLink) -> Result<()> {
        self.push(Navigation::Redirect(link.as_str().to_string()));
        Ok(())
    }

    fn navigate(&self, route: Route) -> Result<()> {
        self.push(Navigation::Route(route));
        Ok(())
    }
}
