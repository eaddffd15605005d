use thiserror::Error;
use tracing::info;

use crate::collection::EntryCollection;
use crate::model::ArtworkId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeleteError {
    #[error("artwork {0} is not listed")]
    EntryMissing(ArtworkId),
    #[error("artwork {0} has a rating in progress or recorded and cannot be deleted")]
    NotDeletable(ArtworkId),
}

/// Confirmation prompt for the pending deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePrompt {
    pub id: ArtworkId,
    pub title: String,
    pub body: String,
}

/// Two-phase removal: request, then confirm or cancel. At most one id is
/// pending; a new request replaces it.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeletionWorkflow {
    pending: Option<ArtworkId>,
}

impl DeletionWorkflow {
    pub fn pending(&self) -> Option<ArtworkId> {
        self.pending
    }

    pub fn request(&mut self, id: ArtworkId, entries: &EntryCollection) -> Result<(), DeleteError> {
        let entry = entries.find(id).ok_or(DeleteError::EntryMissing(id))?;
        if !entry.can_delete() {
            return Err(DeleteError::NotDeletable(id));
        }
        if let Some(prev) = self.pending.replace(id) {
            info!(%prev, %id, "replacing pending deletion");
        }
        Ok(())
    }

    /// Remove the pending entry. Returns the removed id, or `None` when
    /// nothing was pending or the entry is already gone. The pending slot is
    /// cleared either way.
    ///
    /// The entry is re-checked: a rating submitted after the request was
    /// made blocks the removal.
    pub fn confirm(&mut self, entries: &mut EntryCollection) -> Result<Option<ArtworkId>, DeleteError> {
        let Some(id) = self.pending.take() else {
            return Ok(None);
        };
        if let Some(entry) = entries.find(id) {
            if !entry.can_delete() {
                return Err(DeleteError::NotDeletable(id));
            }
        }
        if !entries.remove(id) {
            info!(%id, "pending deletion already gone");
            return Ok(None);
        }
        Ok(Some(id))
    }

    /// Drop `id` from the pending slot if it is the one waiting.
    pub fn forget(&mut self, id: ArtworkId) {
        if self.pending == Some(id) {
            self.pending = None;
        }
    }

    pub fn cancel(&mut self) -> Option<ArtworkId> {
        self.pending.take()
    }

    pub fn prompt(&self, entries: &EntryCollection) -> Option<DeletePrompt> {
        let id = self.pending?;
        let title = entries
            .find(id)
            .and_then(|e| e.metadata())
            .map(|m| m.title.clone())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| format!("#{}", id));
        Some(DeletePrompt {
            id,
            title: "Delete artwork?".to_string(),
            body: format!("\"{}\" will be removed from the list.", title),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u32) -> ArtworkId {
        ArtworkId::new(raw).unwrap()
    }

    fn seeded() -> EntryCollection {
        EntryCollection::seeded([(id(1), false), (id(2), false), (id(3), true)])
    }

    #[test]
    fn confirm_removes_only_pending_entry() {
        let mut c = seeded();
        let mut wf = DeletionWorkflow::default();
        wf.request(id(2), &c).unwrap();
        assert_eq!(wf.confirm(&mut c), Ok(Some(id(2))));
        assert_eq!(wf.pending(), None);
        let ids: Vec<u32> = c.entries().iter().map(|e| e.id().get()).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn cancel_leaves_collection() {
        let c = seeded();
        let mut wf = DeletionWorkflow::default();
        wf.request(id(1), &c).unwrap();
        assert_eq!(wf.cancel(), Some(id(1)));
        assert_eq!(wf.pending(), None);
        assert_eq!(c.len(), 3);
    }

    #[test]
    fn second_request_replaces_first() {
        let mut c = seeded();
        let mut wf = DeletionWorkflow::default();
        wf.request(id(1), &c).unwrap();
        wf.request(id(3), &c).unwrap();
        assert_eq!(wf.pending(), Some(id(3)));
        wf.confirm(&mut c).unwrap();
        assert!(c.contains(id(1)));
        assert!(!c.contains(id(3)));
    }

    #[test]
    fn confirm_without_pending_is_noop() {
        let mut c = seeded();
        let mut wf = DeletionWorkflow::default();
        assert_eq!(wf.confirm(&mut c), Ok(None));
        assert_eq!(c.len(), 3);
    }

    #[test]
    fn unknown_or_rated_entries_cannot_be_requested() {
        let mut c = seeded();
        let mut wf = DeletionWorkflow::default();
        assert_eq!(wf.request(id(9), &c), Err(DeleteError::EntryMissing(id(9))));

        let e = c.find_mut(id(1)).unwrap();
        e.select_rating(4).unwrap();
        e.begin_submit().unwrap();
        assert_eq!(wf.request(id(1), &c), Err(DeleteError::NotDeletable(id(1))));
        assert_eq!(wf.pending(), None);
    }

    #[test]
    fn rating_started_after_request_blocks_confirm() {
        let mut c = seeded();
        let mut wf = DeletionWorkflow::default();
        wf.request(id(1), &c).unwrap();
        let e = c.find_mut(id(1)).unwrap();
        e.select_rating(2).unwrap();
        e.begin_submit().unwrap();
        assert_eq!(wf.confirm(&mut c), Err(DeleteError::NotDeletable(id(1))));
        assert_eq!(wf.pending(), None);
        assert!(c.contains(id(1)));
    }

    #[test]
    fn confirm_of_vanished_entry_removes_nothing() {
        let mut c = seeded();
        let mut wf = DeletionWorkflow::default();
        wf.request(id(2), &c).unwrap();
        c.remove(id(2));
        assert_eq!(wf.confirm(&mut c), Ok(None));
        assert_eq!(wf.pending(), None);
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn forget_only_clears_matching_id() {
        let c = seeded();
        let mut wf = DeletionWorkflow::default();
        wf.request(id(1), &c).unwrap();
        wf.forget(id(2));
        assert_eq!(wf.pending(), Some(id(1)));
        wf.forget(id(1));
        assert_eq!(wf.pending(), None);
    }

    #[test]
    fn prompt_names_pending_artwork() {
        let c = seeded();
        let mut wf = DeletionWorkflow::default();
        assert!(wf.prompt(&c).is_none());
        wf.request(id(3), &c).unwrap();
        let prompt = wf.prompt(&c).unwrap();
        assert_eq!(prompt.id, id(3));
        assert!(prompt.body.contains("#3"));
    }
}
