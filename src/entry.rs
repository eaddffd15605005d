//! Per-artwork lifecycle: metadata loading and rating submission.
//!
//! An [`Entry`] is only ever mutated through its transition methods. Both
//! channels (metadata and submission) are one-shot: metadata is requested at
//! most once per entry and a rating is submitted at most once.
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::model::{
    ArtworkId, ArtworkMetadata, MetadataState, RatingRequest, SubmissionStatus, MAX_RATING,
    MIN_RATING,
};

pub const RATED_INLINE_MESSAGE: &str = "Artwork rated successfully";
pub const FAILED_INLINE_MESSAGE: &str = "Ran into an error, please refresh and try again";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("artwork {0} is not listed")]
    EntryMissing(ArtworkId),
    #[error("rating is locked once submission has started (status: {})", .0.as_str())]
    RatingLocked(SubmissionStatus),
    #[error("rating {0} is outside 1..=5")]
    RatingOutOfRange(u8),
    #[error("no rating selected")]
    NoRatingSelected,
    #[error("no submission in flight")]
    NotSubmitting,
}

/// Identity of one entry instance. Re-adding a removed id yields a new key,
/// so results addressed to the old instance can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryKey(pub(crate) u64);

#[derive(Debug, Clone)]
pub struct Entry {
    id: ArtworkId,
    key: EntryKey,
    metadata_load_disabled: bool,
    metadata: Option<ArtworkMetadata>,
    metadata_state: MetadataState,
    selected_rating: Option<u8>,
    status: SubmissionStatus,
}

impl Entry {
    pub(crate) fn new(id: ArtworkId, key: EntryKey, metadata_load_disabled: bool) -> Self {
        Self {
            id,
            key,
            metadata_load_disabled,
            metadata: None,
            metadata_state: MetadataState::Unloaded,
            selected_rating: None,
            status: SubmissionStatus::NotRated,
        }
    }

    pub fn id(&self) -> ArtworkId {
        self.id
    }

    pub fn key(&self) -> EntryKey {
        self.key
    }

    pub fn metadata_load_disabled(&self) -> bool {
        self.metadata_load_disabled
    }

    pub fn metadata(&self) -> Option<&ArtworkMetadata> {
        self.metadata.as_ref()
    }

    pub fn metadata_state(&self) -> MetadataState {
        self.metadata_state
    }

    pub fn selected_rating(&self) -> Option<u8> {
        self.selected_rating
    }

    pub fn status(&self) -> SubmissionStatus {
        self.status
    }

    pub fn can_rate(&self) -> bool {
        self.status == SubmissionStatus::NotRated
    }

    pub fn can_submit(&self) -> bool {
        self.selected_rating.is_some() && self.status == SubmissionStatus::NotRated
    }

    pub fn can_delete(&self) -> bool {
        self.status == SubmissionStatus::NotRated
    }

    /// `Unloaded -> Loading`. Returns false (and does nothing) for
    /// metadata-disabled entries or when a load was already started.
    pub(crate) fn begin_load(&mut self) -> bool {
        if self.metadata_load_disabled || self.metadata_state != MetadataState::Unloaded {
            return false;
        }
        self.metadata_state = MetadataState::Loading;
        true
    }

    /// Apply the outcome of the metadata fetch. `None` means the remote call
    /// failed or returned no payload. A payload for a different id is treated
    /// as malformed.
    pub(crate) fn finish_load(&mut self, fetched: Option<ArtworkMetadata>) -> MetadataState {
        if self.metadata_state != MetadataState::Loading {
            debug!(id=%self.id, state=self.metadata_state.as_str(), "ignoring metadata result");
            return self.metadata_state;
        }
        match fetched {
            Some(meta) if meta.id == self.id => {
                debug!(id=%self.id, title=%meta.title, "metadata loaded");
                self.metadata = Some(meta);
                self.metadata_state = MetadataState::Loaded;
            }
            Some(meta) => {
                warn!(id=%self.id, got=%meta.id, "metadata for wrong artwork");
                self.metadata_state = MetadataState::LoadFailed;
            }
            None => {
                warn!(id=%self.id, "metadata load failed");
                self.metadata_state = MetadataState::LoadFailed;
            }
        }
        self.metadata_state
    }

    pub fn select_rating(&mut self, rating: u8) -> Result<(), TransitionError> {
        if self.status != SubmissionStatus::NotRated {
            return Err(TransitionError::RatingLocked(self.status));
        }
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(TransitionError::RatingOutOfRange(rating));
        }
        self.selected_rating = Some(rating);
        Ok(())
    }

    /// `NotRated -> Submitting`, freezing the selected rating. The returned
    /// request is what must be sent to the rating service.
    pub(crate) fn begin_submit(&mut self) -> Result<RatingRequest, TransitionError> {
        if self.status != SubmissionStatus::NotRated {
            return Err(TransitionError::RatingLocked(self.status));
        }
        let rating = self
            .selected_rating
            .ok_or(TransitionError::NoRatingSelected)?;
        self.status = SubmissionStatus::Submitting;
        info!(id=%self.id, rating, "submitting rating");
        Ok(RatingRequest {
            id: self.id,
            rating,
        })
    }

    pub(crate) fn finish_submit(
        &mut self,
        accepted: bool,
    ) -> Result<SubmissionStatus, TransitionError> {
        if self.status != SubmissionStatus::Submitting {
            return Err(TransitionError::NotSubmitting);
        }
        self.status = if accepted {
            SubmissionStatus::Submitted
        } else {
            SubmissionStatus::Failed
        };
        Ok(self.status)
    }

    pub fn inline_message(&self) -> Option<&'static str> {
        match self.status {
            SubmissionStatus::Submitted => Some(RATED_INLINE_MESSAGE),
            SubmissionStatus::Failed => Some(FAILED_INLINE_MESSAGE),
            _ => None,
        }
    }

    pub fn view(&self, image_base: &str) -> EntryView {
        let meta = self.metadata.as_ref();
        EntryView {
            id: self.id,
            metadata_state: self.metadata_state,
            status: self.status,
            title: meta.map(|m| m.title.clone()),
            artist_title: meta.map(|m| m.artist_title.clone()),
            image_url: meta.and_then(|m| m.image_url(image_base)),
            selected_rating: self.selected_rating,
            placeholder: self.metadata_load_disabled,
            controls_visible: self.metadata_state == MetadataState::Loaded,
            rate_enabled: self.can_rate(),
            submit_enabled: self.can_submit(),
            delete_enabled: self.can_delete(),
            inline_message: self.inline_message(),
        }
    }
}

/// Read-only projection of an entry for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryView {
    pub id: ArtworkId,
    pub metadata_state: MetadataState,
    pub status: SubmissionStatus,
    pub title: Option<String>,
    pub artist_title: Option<String>,
    pub image_url: Option<String>,
    pub selected_rating: Option<u8>,
    /// Shown as a "no image" card; metadata is never requested.
    pub placeholder: bool,
    /// Rating buttons are only rendered once metadata is present.
    pub controls_visible: bool,
    pub rate_enabled: bool,
    pub submit_enabled: bool,
    pub delete_enabled: bool,
    pub inline_message: Option<&'static str>,
}
