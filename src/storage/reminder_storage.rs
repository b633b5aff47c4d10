use std::sync::Arc;

use tokio::sync::RwLock;

use crate::delivery::{NotificationChannel, StationNotification};

use super::{KeyValueStore, StorageError};

pub const REMINDERS_KEY: &str = "radio520-reminders";
pub const LEGACY_REMINDERS_KEY: &str = "radio520_reminders";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderToggle {
    Added,
    Removed,
}

/// Program names the listener asked to be reminded about, kept in insertion order.
pub struct ReminderStore {
    store: Arc<dyn KeyValueStore>,
    channel: Arc<dyn NotificationChannel>,
    names: RwLock<Vec<String>>,
}

impl ReminderStore {
    /// Reads the persisted set once, migrating the legacy key if needed.
    pub async fn load(
        store: Arc<dyn KeyValueStore>,
        channel: Arc<dyn NotificationChannel>,
    ) -> Result<Self, StorageError> {
        let names = match store.get(REMINDERS_KEY).await? {
            Some(raw) => parse_or_clear(store.as_ref(), REMINDERS_KEY, &raw).await?,
            None => migrate_legacy(store.as_ref()).await?,
        };

        Ok(Self {
            store,
            channel,
            names: RwLock::new(names),
        })
    }

    pub async fn toggle(&self, name: &str) -> Result<ReminderToggle, StorageError> {
        let mut names = self.names.write().await;
        let mut updated = names.clone();
        let outcome = match updated.iter().position(|n| n == name) {
            Some(index) => {
                updated.remove(index);
                ReminderToggle::Removed
            }
            None => {
                updated.push(name.to_owned());
                ReminderToggle::Added
            }
        };
        persist(self.store.as_ref(), &updated).await?;
        *names = updated;
        drop(names);

        let notification = match outcome {
            ReminderToggle::Added => StationNotification::ReminderSet(name.to_owned()),
            ReminderToggle::Removed => StationNotification::ReminderRemoved(name.to_owned()),
        };
        self.channel.send_notification(notification).await;

        Ok(outcome)
    }

    /// Records a calendar reminder. Returns `true` if the name was not tracked yet.
    pub async fn insert(&self, name: &str) -> Result<bool, StorageError> {
        let mut names = self.names.write().await;
        let added = !names.iter().any(|n| n == name);
        if added {
            let mut updated = names.clone();
            updated.push(name.to_owned());
            persist(self.store.as_ref(), &updated).await?;
            *names = updated;
        }
        drop(names);

        self.channel
            .send_notification(StationNotification::ReminderCreated(name.to_owned()))
            .await;
        Ok(added)
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.names.read().await.iter().any(|n| n == name)
    }

    pub async fn names(&self) -> Vec<String> {
        self.names.read().await.clone()
    }
}

async fn persist(store: &dyn KeyValueStore, names: &[String]) -> Result<(), StorageError> {
    store.set(REMINDERS_KEY, serde_json::to_string(names)?).await
}

async fn parse_or_clear(
    store: &dyn KeyValueStore,
    key: &str,
    raw: &str,
) -> Result<Vec<String>, StorageError> {
    match serde_json::from_str(raw) {
        Ok(names) => Ok(names),
        Err(error) => {
            log::warn!("Clearing malformed reminders under {key}: {error}");
            store.remove(key).await?;
            Ok(Vec::new())
        }
    }
}

async fn migrate_legacy(store: &dyn KeyValueStore) -> Result<Vec<String>, StorageError> {
    let Some(raw) = store.get(LEGACY_REMINDERS_KEY).await? else {
        return Ok(Vec::new());
    };

    let names = parse_or_clear(store, LEGACY_REMINDERS_KEY, &raw).await?;
    if !names.is_empty() {
        persist(store, &names).await?;
        log::info!("Migrated {} reminders from {LEGACY_REMINDERS_KEY}", names.len());
    }
    store.remove(LEGACY_REMINDERS_KEY).await?;

    Ok(names)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::{delivery::test_channel::TestNotificationChannel, storage::InMemoryKeyValueStore};

    struct TestContext {
        store: Arc<InMemoryKeyValueStore>,
        channel: TestNotificationChannel,
    }

    impl TestContext {
        fn new() -> Self {
            Self {
                store: Arc::new(InMemoryKeyValueStore::new()),
                channel: TestNotificationChannel::default(),
            }
        }

        async fn load(&self) -> ReminderStore {
            ReminderStore::load(self.store.clone(), Arc::new(self.channel.clone()))
                .await
                .unwrap()
        }
    }

    #[tokio::test]
    async fn toggle_adds_then_removes() {
        let ctx = TestContext::new();
        let reminders = ctx.load().await;

        assert_eq!(reminders.toggle("ZONA MISTA").await.unwrap(), ReminderToggle::Added);
        assert!(reminders.contains("ZONA MISTA").await);
        assert_eq!(
            ctx.store.get(REMINDERS_KEY).await.unwrap().as_deref(),
            Some("[\"ZONA MISTA\"]")
        );

        assert_eq!(reminders.toggle("ZONA MISTA").await.unwrap(), ReminderToggle::Removed);
        assert!(!reminders.contains("ZONA MISTA").await);
        assert_eq!(
            ctx.channel.received(),
            vec![
                StationNotification::ReminderSet("ZONA MISTA".to_owned()),
                StationNotification::ReminderRemoved("ZONA MISTA".to_owned()),
            ]
        );
    }

    #[tokio::test]
    async fn persisted_set_is_reloaded() {
        let ctx = TestContext::new();
        ctx.load().await.toggle("TOP BILLBOARD").await.unwrap();

        let reloaded = ctx.load().await;

        assert_eq!(reloaded.names().await, vec!["TOP BILLBOARD".to_owned()]);
    }

    #[tokio::test]
    async fn legacy_key_is_migrated() {
        let ctx = TestContext::new();
        ctx.store
            .set(LEGACY_REMINDERS_KEY, "[\"DANCE CLUB\"]".to_owned())
            .await
            .unwrap();

        let reminders = ctx.load().await;

        assert!(reminders.contains("DANCE CLUB").await);
        assert_eq!(ctx.store.get(LEGACY_REMINDERS_KEY).await.unwrap(), None);
        assert_eq!(
            ctx.store.get(REMINDERS_KEY).await.unwrap().as_deref(),
            Some("[\"DANCE CLUB\"]")
        );
    }

    #[tokio::test]
    async fn malformed_data_is_cleared() {
        let ctx = TestContext::new();
        ctx.store.set(REMINDERS_KEY, "{oops".to_owned()).await.unwrap();

        let reminders = ctx.load().await;

        assert!(reminders.names().await.is_empty());
        assert_eq!(ctx.store.get(REMINDERS_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn insert_is_add_only() {
        let ctx = TestContext::new();
        let reminders = ctx.load().await;

        assert!(reminders.insert("DANCE CLUB").await.unwrap());
        assert!(!reminders.insert("DANCE CLUB").await.unwrap());

        assert_eq!(reminders.names().await, vec!["DANCE CLUB".to_owned()]);
        assert_eq!(
            ctx.channel.received().last(),
            Some(&StationNotification::ReminderCreated("DANCE CLUB".to_owned()))
        );
    }

    #[tokio::test]
    async fn empty_legacy_list_is_dropped() {
        let ctx = TestContext::new();
        ctx.store.set(LEGACY_REMINDERS_KEY, "[]".to_owned()).await.unwrap();

        let reminders = ctx.load().await;

        assert!(reminders.names().await.is_empty());
        assert_eq!(ctx.store.get(LEGACY_REMINDERS_KEY).await.unwrap(), None);
    }

    struct ReadOnlyStore;

    #[async_trait::async_trait]
    impl KeyValueStore for ReadOnlyStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: String) -> Result<(), StorageError> {
            Err(std::io::Error::other("disk full").into())
        }

        async fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn failed_write_keeps_memory_and_stays_quiet() {
        let channel = TestNotificationChannel::default();
        let reminders = ReminderStore::load(Arc::new(ReadOnlyStore), Arc::new(channel.clone()))
            .await
            .unwrap();

        assert!(reminders.toggle("ZONA MISTA").await.is_err());
        assert!(reminders.insert("DANCE CLUB").await.is_err());

        assert!(reminders.names().await.is_empty());
        assert!(channel.received().is_empty());
    }

    fn tokio_rt() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread().build().unwrap()
    }

    proptest! {
        #[test]
        fn toggling_twice_restores_membership(
            existing in prop::collection::vec("[A-Z ]{1,12}", 0..5),
            name in "[A-Z ]{1,12}"
        ) {
            tokio_rt().block_on(async {
                let ctx = TestContext::new();
                let reminders = ctx.load().await;
                for existing in &existing {
                    reminders.insert(existing).await.unwrap();
                }
                let before = reminders.contains(&name).await;

                reminders.toggle(&name).await.unwrap();
                prop_assert_ne!(reminders.contains(&name).await, before);
                reminders.toggle(&name).await.unwrap();
                prop_assert_eq!(reminders.contains(&name).await, before);
                Ok(())
            })?;
        }
    }
}
