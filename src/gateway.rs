use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::fmt;
use tracing::debug;

use crate::config::Config;
use crate::model::{ArtworkId, ArtworkResponse, RatingRequest, RatingResponse};

const ARTWORK_API_BASE: &str = "https://api.artic.edu/api/v1/";
const RATING_ENDPOINT: &str = "https://v0867.mocklab.io/rating";
const ARTWORK_FIELDS: &str = "id,title,artist_title,image_id";

/// The two remote calls the rater depends on.
///
/// Implementations report transport failures, non-success statuses and
/// undecodable bodies as `Err`; callers map those onto their own outcomes.
#[async_trait]
pub trait ArtworkGateway: Send + Sync {
    async fn fetch_artwork(&self, id: ArtworkId) -> Result<ArtworkResponse>;

    async fn submit_rating(&self, rating: RatingRequest) -> Result<RatingResponse>;
}

#[derive(Clone)]
pub struct ArticClient {
    http: Client,
    artwork_base_url: Url,
    rating_url: Url,
}

impl fmt::Debug for ArticClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArticClient")
            .field("artwork_base_url", &self.artwork_base_url)
            .field("rating_url", &self.rating_url)
            .finish_non_exhaustive()
    }
}

impl ArticClient {
    pub fn new() -> Result<Self> {
        let artwork_base_url = Url::parse(ARTWORK_API_BASE).context("default artwork URL")?;
        let rating_url = Url::parse(RATING_ENDPOINT).context("default rating URL")?;
        Self::with_urls(artwork_base_url, rating_url, "art-rater/0.1")
    }

    pub fn with_urls(artwork_base_url: Url, rating_url: Url, user_agent: &str) -> Result<Self> {
        let http = Client::builder()
            .user_agent(user_agent)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            artwork_base_url,
            rating_url,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        let artwork_base_url =
            Url::parse(&cfg.gateway.artwork_base_url).context("invalid gateway.artwork_base_url")?;
        let rating_url = Url::parse(&cfg.gateway.rating_url).context("invalid gateway.rating_url")?;
        Self::with_urls(artwork_base_url, rating_url, &cfg.gateway.user_agent)
    }

    pub fn build_fetch_request(&self, id: ArtworkId) -> Result<reqwest::Request> {
        let mut endpoint = self
            .artwork_base_url
            .join(&format!("artworks/{}", id))
            .context("invalid artwork base URL")?;
        endpoint
            .query_pairs_mut()
            .append_pair("fields", ARTWORK_FIELDS);
        self.http
            .get(endpoint)
            .build()
            .context("failed to build artwork request")
    }

    pub fn build_rating_request(&self, rating: &RatingRequest) -> Result<reqwest::Request> {
        self.http
            .post(self.rating_url.clone())
            .header("Content-Type", "application/json")
            .json(rating)
            .build()
            .context("failed to build rating request")
    }

    async fn execute<T: DeserializeOwned>(&self, request: reqwest::Request) -> Result<T> {
        debug!(method=%request.method(), url=%request.url(), "sending gateway request");
        let res = self
            .http
            .execute(request)
            .await
            .context("failed to reach remote service")?;

        let status = res.status();
        let body = res.bytes().await.context("failed to read response body")?;
        decode_response(status, &body)
    }
}

/// Non-success statuses and bodies that do not decode as `T` are errors.
pub fn decode_response<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T> {
    if !status.is_success() {
        return Err(anyhow!(
            "remote error {}: {}",
            status,
            String::from_utf8_lossy(body)
        ));
    }
    serde_json::from_slice(body).context("invalid response body")
}

#[async_trait]
impl ArtworkGateway for ArticClient {
    async fn fetch_artwork(&self, id: ArtworkId) -> Result<ArtworkResponse> {
        let request = self.build_fetch_request(id)?;
        self.execute(request).await
    }

    async fn submit_rating(&self, rating: RatingRequest) -> Result<RatingResponse> {
        let request = self.build_rating_request(&rating)?;
        self.execute(request).await
    }
}
