use std::sync::Arc;

use crate::weather::WeatherLocation;

use super::{KeyValueStore, StorageError};

pub const LOCATION_KEY: &str = "radio520_weather_location";

pub struct LocationStore {
    store: Arc<dyn KeyValueStore>,
}

impl LocationStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Returns the saved location. Malformed entries are removed and ignored.
    pub async fn load(&self) -> Result<Option<WeatherLocation>, StorageError> {
        let Some(raw) = self.store.get(LOCATION_KEY).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(location) => Ok(Some(location)),
            Err(error) => {
                log::warn!("Clearing malformed saved location: {error}");
                self.store.remove(LOCATION_KEY).await?;
                Ok(None)
            }
        }
    }

    pub async fn save(&self, location: &WeatherLocation) -> Result<(), StorageError> {
        self.store
            .set(LOCATION_KEY, serde_json::to_string(location)?)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryKeyValueStore;

    #[tokio::test]
    async fn saved_location_is_loaded() {
        let locations = LocationStore::new(Arc::new(InMemoryKeyValueStore::new()));
        let location = WeatherLocation::new("Campinas", -22.9056, -47.0608);

        locations.save(&location).await.unwrap();

        assert_eq!(locations.load().await.unwrap(), Some(location));
    }

    #[tokio::test]
    async fn malformed_location_is_cleared() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        store
            .set(LOCATION_KEY, "{\"name\":\"Nowhere\"}".to_owned())
            .await
            .unwrap();
        let locations = LocationStore::new(store.clone());

        assert_eq!(locations.load().await.unwrap(), None);
        assert_eq!(store.get(LOCATION_KEY).await.unwrap(), None);
    }
}
