use thiserror::Error;
use tracing::{debug, info};

use crate::entry::{Entry, EntryKey};
use crate::model::ArtworkId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionError {
    #[error("artwork {0} is already listed")]
    Duplicate(ArtworkId),
}

/// Raised once per created entry whose metadata must be fetched. The key pins
/// the result to that entry instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub id: ArtworkId,
    pub key: EntryKey,
}

/// Ordered, id-unique list of entries. Insertion order is display order.
#[derive(Debug, Default)]
pub struct EntryCollection {
    entries: Vec<Entry>,
    next_key: u64,
    scheduled: Vec<FetchTicket>,
}

impl EntryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from `(id, metadata_load_disabled)` pairs.
    /// Repeated ids after the first are skipped.
    pub fn seeded<I>(seed: I) -> Self
    where
        I: IntoIterator<Item = (ArtworkId, bool)>,
    {
        let mut collection = Self::new();
        for (id, disabled) in seed {
            if let Err(err) = collection.insert(id, disabled) {
                debug!(%err, "skipping seed entry");
            }
        }
        collection
    }

    pub fn add(&mut self, id: ArtworkId) -> Result<&Entry, CollectionError> {
        self.insert(id, false)
    }

    fn insert(&mut self, id: ArtworkId, disabled: bool) -> Result<&Entry, CollectionError> {
        if self.contains(id) {
            return Err(CollectionError::Duplicate(id));
        }
        self.next_key += 1;
        let key = EntryKey(self.next_key);
        let mut entry = Entry::new(id, key, disabled);
        if entry.begin_load() {
            self.scheduled.push(FetchTicket { id, key });
        }
        info!(%id, disabled, "entry added");
        self.entries.push(entry);
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Remove `id` if present. Returns whether an entry was removed.
    pub fn remove(&mut self, id: ArtworkId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id() != id);
        self.scheduled.retain(|t| t.id != id);
        let removed = self.entries.len() != before;
        if removed {
            info!(%id, "entry removed");
        }
        removed
    }

    pub fn find(&self, id: ArtworkId) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id() == id)
    }

    pub fn find_mut(&mut self, id: ArtworkId) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.id() == id)
    }

    /// The entry instance identified by `key`, if it is still listed.
    pub fn find_live_mut(&mut self, id: ArtworkId, key: EntryKey) -> Option<&mut Entry> {
        self.find_mut(id).filter(|e| e.key() == key)
    }

    pub fn contains(&self, id: ArtworkId) -> bool {
        self.find(id).is_some()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drain the "entry created" fetch requests raised since the last call.
    pub fn take_scheduled(&mut self) -> Vec<FetchTicket> {
        std::mem::take(&mut self.scheduled)
    }
}
