//! Validation for adding an artwork to the list.
//!
//! Checks run cheapest first: parse, then the local duplicate check, and
//! only then the remote existence lookup. Errors stay on the form until the
//! input is edited again.
use thiserror::Error;
use tracing::{instrument, warn};

use crate::collection::{CollectionError, EntryCollection};
use crate::gateway::ArtworkGateway;
use crate::model::ArtworkId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddError {
    /// Input is not a positive integer. Shown with the same text as
    /// `NotFound` since, to the user, no such artwork exists.
    #[error("Artwork does not exist")]
    InvalidInput,
    #[error("Artwork already listed")]
    DuplicateEntry(ArtworkId),
    #[error("Artwork does not exist")]
    NotFound(ArtworkId),
}

impl From<CollectionError> for AddError {
    fn from(err: CollectionError) -> Self {
        match err {
            CollectionError::Duplicate(id) => AddError::DuplicateEntry(id),
        }
    }
}

/// State of the "add artwork" form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdditionForm {
    input: String,
    error: Option<AddError>,
}

impl AdditionForm {
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn error(&self) -> Option<&AddError> {
        self.error.as_ref()
    }

    /// Replace the input text. Any displayed error is cleared.
    pub fn edit(&mut self, text: impl Into<String>) {
        self.input = text.into();
        self.error = None;
    }

    /// Local checks. No network call is made for input that fails here.
    pub fn precheck(&self, raw: &str, entries: &EntryCollection) -> Result<ArtworkId, AddError> {
        let id: ArtworkId = raw.parse().map_err(|_| AddError::InvalidInput)?;
        if entries.contains(id) {
            return Err(AddError::DuplicateEntry(id));
        }
        Ok(id)
    }

    pub(crate) fn fail(&mut self, err: AddError) {
        self.error = Some(err);
    }

    pub(crate) fn succeed(&mut self) {
        self.input.clear();
        self.error = None;
    }
}

/// Ask the catalog whether `id` exists. Any failure of the lookup counts as
/// "does not exist". The fetched metadata is discarded; the new entry loads
/// its own.
#[instrument(skip_all, fields(%id))]
pub async fn check_exists(gateway: &dyn ArtworkGateway, id: ArtworkId) -> Result<(), AddError> {
    match gateway.fetch_artwork(id).await {
        Ok(resp) if resp.data.is_some() => Ok(()),
        Ok(_) => Err(AddError::NotFound(id)),
        Err(err) => {
            warn!(?err, "existence check failed");
            Err(AddError::NotFound(id))
        }
    }
}
