use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;
use thiserror::Error;

/// Lowest and highest rating a user may select.
pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Acknowledgement the rating service returns for an accepted rating.
pub const RATING_SUCCESS_MESSAGE: &str = "Success";

/// External catalog key of an artwork. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtworkId(NonZeroU32);

impl ArtworkId {
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for ArtworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("artwork id must be a positive integer")]
pub struct ParseArtworkIdError;

impl FromStr for ArtworkId {
    type Err = ParseArtworkIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .ok()
            .and_then(ArtworkId::new)
            .ok_or(ParseArtworkIdError)
    }
}

/// Catalog metadata for one artwork. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtworkMetadata {
    pub id: ArtworkId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub artist_title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub image_id: String,
}

impl ArtworkMetadata {
    /// IIIF image URL for this artwork under `image_base`, or `None` when the
    /// catalog has no image for it.
    pub fn image_url(&self, image_base: &str) -> Option<String> {
        if self.image_id.is_empty() {
            return None;
        }
        let base = image_base.trim_end_matches('/');
        Some(format!("{}/{}/full/843,/0/default.jpg", base, self.image_id))
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MetadataState {
    Unloaded,
    Loading,
    Loaded,
    LoadFailed,
}

impl MetadataState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetadataState::Unloaded => "unloaded",
            MetadataState::Loading => "loading",
            MetadataState::Loaded => "loaded",
            MetadataState::LoadFailed => "load_failed",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SubmissionStatus {
    NotRated,
    Submitting,
    Submitted,
    Failed,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::NotRated => "not_rated",
            SubmissionStatus::Submitting => "submitting",
            SubmissionStatus::Submitted => "submitted",
            SubmissionStatus::Failed => "failed",
        }
    }
}

/// Body of the artwork lookup response. `data` is absent for unknown ids.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ArtworkResponse {
    #[serde(default)]
    pub data: Option<ArtworkMetadata>,
}

/// Payload posted to the rating service.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct RatingRequest {
    pub id: ArtworkId,
    pub rating: u8,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct RatingResponse {
    #[serde(default)]
    pub message: Option<String>,
}

impl RatingResponse {
    pub fn is_success(&self) -> bool {
        self.message.as_deref() == Some(RATING_SUCCESS_MESSAGE)
    }
}
