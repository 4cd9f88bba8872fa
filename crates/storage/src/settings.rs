use dramashelf_core::Settings;

use crate::{SlotStore, StorageError};

pub const SETTINGS_KEY: &str = "touhou-settings";

/// Stored settings merged over the defaults. An unreadable slot falls back to
/// defaults; a slot that is not a JSON object is also deleted.
pub fn load_settings<S: SlotStore + ?Sized>(slots: &S) -> Settings {
    let raw = match slots.get(SETTINGS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Settings::default(),
        Err(err) => {
            tracing::warn!("reading settings failed, using defaults: {err}");
            return Settings::default();
        }
    };

    match serde_json::from_str::<serde_json::Value>(&raw) {
        Ok(serde_json::Value::Object(stored)) => Settings::merged_from(&stored),
        Ok(other) => {
            tracing::warn!("discarding settings of unexpected shape: {other}");
            discard(slots);
            Settings::default()
        }
        Err(err) => {
            tracing::warn!("discarding corrupted settings ({err})");
            discard(slots);
            Settings::default()
        }
    }
}

fn discard<S: SlotStore + ?Sized>(slots: &S) {
    if let Err(err) = slots.remove(SETTINGS_KEY) {
        tracing::warn!("clearing corrupted settings failed: {err}");
    }
}

pub fn save_settings<S: SlotStore + ?Sized>(
    slots: &S,
    settings: &Settings,
) -> Result<(), StorageError> {
    let mut settings = settings.clone();
    settings.normalize();
    let json = serde_json::to_string(&settings).map_err(|source| StorageError::Encode {
        key: SETTINGS_KEY.to_string(),
        source,
    })?;
    slots.set(SETTINGS_KEY, &json)
}
