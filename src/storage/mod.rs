mod key_value;
mod location_storage;
mod reminder_storage;

use thiserror::Error;

pub use key_value::{FileKeyValueStore, InMemoryKeyValueStore, KeyValueStore};
pub use location_storage::{LOCATION_KEY, LocationStore};
pub use reminder_storage::{LEGACY_REMINDERS_KEY, REMINDERS_KEY, ReminderStore, ReminderToggle};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
