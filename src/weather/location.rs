use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::storage::LocationStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherLocation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl WeatherLocation {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }
}

pub fn default_location() -> WeatherLocation {
    WeatherLocation::new("São Paulo", -23.5505, -46.6333)
}

/// A source of the listener's location, such as device position or IP lookup.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    fn name(&self) -> &str;
    async fn locate(&self) -> anyhow::Result<WeatherLocation>;
}

/// Location fixed in the application settings.
pub struct ConfiguredLocationProvider {
    location: Option<WeatherLocation>,
}

impl ConfiguredLocationProvider {
    pub fn new(location: Option<WeatherLocation>) -> Self {
        Self { location }
    }
}

#[async_trait]
impl LocationProvider for ConfiguredLocationProvider {
    fn name(&self) -> &str {
        "settings"
    }

    async fn locate(&self) -> anyhow::Result<WeatherLocation> {
        self.location
            .clone()
            .ok_or_else(|| anyhow::anyhow!("no location configured"))
    }
}

/// Saved location first, then each provider in order, then São Paulo.
/// Whatever is found is saved for next time.
pub async fn resolve_location(
    store: &LocationStore,
    providers: &[Box<dyn LocationProvider>],
) -> anyhow::Result<WeatherLocation> {
    if let Some(saved) = store.load().await? {
        log::debug!("Using saved location {}", saved.name);
        return Ok(saved);
    }

    let mut resolved = None;
    for provider in providers {
        match provider.locate().await {
            Ok(location) => {
                log::info!("Location {} found via {}", location.name, provider.name());
                resolved = Some(location);
                break;
            }
            Err(error) => log::warn!("Location provider {} failed: {error:#}", provider.name()),
        }
    }

    let location = resolved.unwrap_or_else(|| {
        log::warn!("Falling back to the default location");
        default_location()
    });
    store.save(&location).await?;

    Ok(location)
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;
    use crate::storage::{InMemoryKeyValueStore, KeyValueStore, LOCATION_KEY};

    struct FailingProvider {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl LocationProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        async fn locate(&self) -> anyhow::Result<WeatherLocation> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("lookup timed out")
        }
    }

    fn campinas() -> WeatherLocation {
        WeatherLocation::new("Campinas", -22.9056, -47.0608)
    }

    #[tokio::test]
    async fn falls_through_failing_providers() {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let store = LocationStore::new(kv.clone());
        let calls = Arc::new(AtomicUsize::new(0));
        let providers: Vec<Box<dyn LocationProvider>> = vec![
            Box::new(FailingProvider { calls: calls.clone() }),
            Box::new(ConfiguredLocationProvider::new(Some(campinas()))),
        ];

        let location = resolve_location(&store, &providers).await.unwrap();

        assert_eq!(location, campinas());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(kv.get(LOCATION_KEY).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn saved_location_skips_providers() {
        let store = LocationStore::new(Arc::new(InMemoryKeyValueStore::new()));
        store.save(&campinas()).await.unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let providers: Vec<Box<dyn LocationProvider>> =
            vec![Box::new(FailingProvider { calls: calls.clone() })];

        let location = resolve_location(&store, &providers).await.unwrap();

        assert_eq!(location, campinas());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn defaults_to_sao_paulo() {
        let store = LocationStore::new(Arc::new(InMemoryKeyValueStore::new()));
        let providers: Vec<Box<dyn LocationProvider>> =
            vec![Box::new(ConfiguredLocationProvider::new(None))];

        let location = resolve_location(&store, &providers).await.unwrap();

        assert_eq!(location, default_location());
        assert_eq!(store.load().await.unwrap(), Some(default_location()));
    }
}
