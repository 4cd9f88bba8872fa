use std::cell::RefCell;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use dramashelf_core::{FavoritesSet, Work, WorkId};
use serde::Serialize;

use crate::{SlotStore, StorageError};

pub const FAVORITES_KEY: &str = "touhou-favorites";

/// Result of flipping one favorite.
#[derive(Debug)]
pub struct Toggled {
    pub is_favorite: bool,
    /// The set after the flip. Authoritative for the session even when
    /// `warning` is set.
    pub favorites: FavoritesSet,
    /// Set when the new state could not be persisted.
    pub warning: Option<StorageError>,
}

#[derive(Debug)]
pub struct BatchOutcome {
    /// Ids whose membership actually changed.
    pub changed: usize,
    pub favorites: FavoritesSet,
    pub warning: Option<StorageError>,
}

/// Favorites persisted as a JSON array of work ids in one slot.
///
/// The slot is read once; afterwards the store answers from its session
/// copy, which every change updates whether or not the write succeeds.
#[derive(Debug)]
pub struct FavoritesStore<'s, S: SlotStore + ?Sized> {
    slots: &'s S,
    session: RefCell<Option<FavoritesSet>>,
}

impl<'s, S: SlotStore + ?Sized> FavoritesStore<'s, S> {
    pub fn new(slots: &'s S) -> Self {
        Self {
            slots,
            session: RefCell::new(None),
        }
    }

    /// Current favorites. Never fails: a missing slot is an empty set, and a
    /// slot holding anything but an array of ids is deleted and treated as
    /// empty.
    pub fn load(&self) -> FavoritesSet {
        if let Some(favorites) = self.session.borrow().as_ref() {
            return favorites.clone();
        }
        let favorites = self.read_slot();
        *self.session.borrow_mut() = Some(favorites.clone());
        favorites
    }

    fn read_slot(&self) -> FavoritesSet {
        let raw = match self.slots.get(FAVORITES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return FavoritesSet::new(),
            Err(err) => {
                tracing::warn!("reading favorites failed, using none: {err}");
                return FavoritesSet::new();
            }
        };

        match serde_json::from_str::<Vec<WorkId>>(&raw) {
            Ok(ids) => ids.into_iter().collect(),
            Err(err) => {
                tracing::warn!("discarding corrupted favorites ({err})");
                if let Err(err) = self.slots.remove(FAVORITES_KEY) {
                    tracing::warn!("clearing corrupted favorites failed: {err}");
                }
                FavoritesSet::new()
            }
        }
    }

    /// Writes `favorites` and adopts it as the session state, even if the
    /// write is rejected.
    pub fn save(&self, favorites: &FavoritesSet) -> Result<(), StorageError> {
        *self.session.borrow_mut() = Some(favorites.clone());
        let ids: Vec<WorkId> = favorites.iter().copied().collect();
        let json = serde_json::to_string(&ids).map_err(|source| StorageError::Encode {
            key: FAVORITES_KEY.to_string(),
            source,
        })?;
        self.slots.set(FAVORITES_KEY, &json)
    }

    pub fn is_favorite(&self, id: WorkId) -> bool {
        self.load().contains(&id)
    }

    /// Flips `id` and persists the result. The returned state reflects the
    /// flip even when saving failed.
    pub fn toggle(&self, id: WorkId) -> Toggled {
        let mut favorites = self.load();
        let is_favorite = if favorites.remove(&id) {
            false
        } else {
            favorites.insert(id);
            true
        };
        let warning = self.save(&favorites).err();
        if let Some(err) = &warning {
            tracing::warn!(%id, "favorite toggled but not saved: {err}");
        } else {
            tracing::info!(%id, is_favorite, "favorite toggled");
        }
        Toggled {
            is_favorite,
            favorites,
            warning,
        }
    }

    /// Adds every id in `ids`, e.g. all works of the current filter.
    pub fn favorite_all(&self, ids: impl IntoIterator<Item = WorkId>) -> BatchOutcome {
        let mut favorites = self.load();
        let mut changed = 0;
        for id in ids {
            if favorites.insert(id) {
                changed += 1;
            }
        }
        self.finish_batch(favorites, changed)
    }

    pub fn unfavorite_all(&self, ids: impl IntoIterator<Item = WorkId>) -> BatchOutcome {
        let mut favorites = self.load();
        let mut changed = 0;
        for id in ids {
            if favorites.remove(&id) {
                changed += 1;
            }
        }
        self.finish_batch(favorites, changed)
    }

    fn finish_batch(&self, favorites: FavoritesSet, changed: usize) -> BatchOutcome {
        let warning = if changed > 0 {
            self.save(&favorites).err()
        } else {
            None
        };
        if let Some(err) = &warning {
            tracing::warn!(changed, "batch favorite change not saved: {err}");
        }
        BatchOutcome {
            changed,
            favorites,
            warning,
        }
    }

    pub fn export(&self, works: &[Work]) -> FavoritesExport {
        FavoritesExport::build(works, &self.load(), Utc::now())
    }
}

/// Snapshot of favorited works for download or backup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoritesExport {
    pub export_date: String,
    pub total_count: usize,
    pub favorites: Vec<Work>,
}

impl FavoritesExport {
    /// Favorited works in catalog order. Ids missing from the catalog are
    /// left out.
    pub fn build(works: &[Work], favorites: &FavoritesSet, now: DateTime<Utc>) -> Self {
        let favorites: Vec<Work> = works
            .iter()
            .filter(|w| favorites.contains(&w.id))
            .cloned()
            .collect();
        Self {
            export_date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            total_count: favorites.len(),
            favorites,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub fn export_file_name(day: NaiveDate) -> String {
    format!("touhou-favorites-{}.json", day.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemorySlots, Storage};
    use chrono::TimeZone as _;
    use dramashelf_test::sample_catalog;
    use pretty_assertions::assert_eq;

    fn set(ids: &[u32]) -> FavoritesSet {
        ids.iter().copied().map(WorkId).collect()
    }

    #[test]
    fn missing_slot_is_empty() {
        let slots = MemorySlots::new();
        assert!(FavoritesStore::new(&slots).load().is_empty());
    }

    #[test]
    fn save_then_load_roundtrips() -> anyhow::Result<()> {
        let storage = Storage::open_in_memory()?;
        let store = FavoritesStore::new(&storage);
        let favorites = set(&[9, 1, 4000000000]);
        store.save(&favorites)?;
        assert_eq!(store.load(), favorites);
        assert_eq!(storage.get(FAVORITES_KEY)?.as_deref(), Some("[1,9,4000000000]"));

        store.save(&FavoritesSet::new())?;
        assert!(store.load().is_empty());
        Ok(())
    }

    #[test]
    fn corrupted_slot_is_discarded() {
        for raw in ["not json", "{\"ids\":[1]}", "[1,\"2\"]", "[-1]", "null"] {
            let slots = MemorySlots::new().with_value(FAVORITES_KEY, raw);
            let store = FavoritesStore::new(&slots);
            assert!(store.load().is_empty(), "{raw} should load as empty");
            assert!(!slots.contains(FAVORITES_KEY), "{raw} should be cleared");
        }
    }

    #[test]
    fn toggle_flips_membership() {
        let slots = MemorySlots::new();
        let store = FavoritesStore::new(&slots);
        let first = store.toggle(WorkId(3));
        assert!(first.is_favorite);
        assert!(first.warning.is_none());
        assert!(store.is_favorite(WorkId(3)));

        let second = store.toggle(WorkId(3));
        assert!(!second.is_favorite);
        assert!(!store.is_favorite(WorkId(3)));
    }

    #[test]
    fn toggle_keeps_session_state_when_write_fails() -> anyhow::Result<()> {
        let slots = MemorySlots::new().with_value(FAVORITES_KEY, "[1]");
        slots.set_reject_writes(true);
        let store = FavoritesStore::new(&slots);
        let toggled = store.toggle(WorkId(2));
        assert!(toggled.is_favorite);
        assert!(matches!(toggled.warning, Some(StorageError::Write { .. })));
        assert_eq!(toggled.favorites, set(&[1, 2]));
        assert!(toggled.favorites.contains(&WorkId(2)));

        assert!(store.is_favorite(WorkId(2)));
        assert_eq!(store.load(), set(&[1, 2]));

        let again = store.toggle(WorkId(1));
        assert!(!again.is_favorite);
        assert_eq!(again.favorites, set(&[2]));
        assert_eq!(slots.get(FAVORITES_KEY)?.as_deref(), Some("[1]"));
        Ok(())
    }

    #[test]
    fn batch_operations_count_changes() {
        let slots = MemorySlots::new().with_value(FAVORITES_KEY, "[1,2]");
        let store = FavoritesStore::new(&slots);

        let added = store.favorite_all([WorkId(2), WorkId(3), WorkId(4)]);
        assert_eq!(added.changed, 2);
        assert_eq!(added.favorites, set(&[1, 2, 3, 4]));

        let removed = store.unfavorite_all([WorkId(1), WorkId(9)]);
        assert_eq!(removed.changed, 1);
        assert_eq!(store.load(), set(&[2, 3, 4]));
    }

    #[test]
    fn export_lists_known_favorites_in_catalog_order() -> anyhow::Result<()> {
        let catalog = sample_catalog();
        let now = Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap();
        let export = FavoritesExport::build(&catalog, &set(&[4, 1, 77]), now);
        assert_eq!(export.total_count, 2);
        let ids: Vec<u32> = export.favorites.iter().map(|w| w.id.0).collect();
        assert_eq!(ids, vec![1, 4]);

        let json: serde_json::Value = serde_json::from_str(&export.to_json()?)?;
        assert_eq!(json["exportDate"], "2025-03-04T05:06:07.000Z");
        assert_eq!(json["totalCount"], 2);
        assert_eq!(json["favorites"][0]["dateAdded"], "2023-06-18");
        Ok(())
    }

    #[test]
    fn export_file_name_uses_the_day() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();
        assert_eq!(export_file_name(day), "touhou-favorites-2025-01-09.json");
    }
}
