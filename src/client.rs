//! Content client: listing and voting against the remote API.
//!
//! The client is stateless; vote bookkeeping lives with the dispatcher.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::command::VoteDirection;
use crate::nav::{SortMode, TimeFilter};

/// A post as returned by a listing request.
#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub score: i64,
}

/// Listing payload shape: `{ data: { children: [ { data: {...} } ] } }`.
#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: Post,
}

/// The two remote operations the dispatcher needs. Tests substitute stubs.
#[async_trait]
pub trait ContentApi {
    async fn list(
        &self,
        collection: &str,
        sort: SortMode,
        time: TimeFilter,
        token: Option<&str>,
    ) -> Result<Vec<Post>>;

    async fn vote(&self, post_id: &str, direction: VoteDirection, token: &str) -> Result<()>;
}

/// reqwest-backed client for the real service.
pub struct RedditClient {
    api_base: String,
    http: reqwest::Client,
}

impl RedditClient {
    pub fn new(api_base: String) -> Self {
        Self {
            api_base,
            http: reqwest::Client::new(),
        }
    }
}

/// Builds the listing URL. The time filter is appended only for sorts it
/// applies to, and only when it narrows the window.
pub fn listing_url(api_base: &str, collection: &str, sort: SortMode, time: TimeFilter) -> String {
    let mut url = format!("{}/r/{}/{}", api_base, collection, sort.as_str());
    if sort.is_time_filtered() && time != TimeFilter::All {
        url.push_str("?t=");
        url.push_str(time.as_str());
    }
    url
}

#[async_trait]
impl ContentApi for RedditClient {
    async fn list(
        &self,
        collection: &str,
        sort: SortMode,
        time: TimeFilter,
        token: Option<&str>,
    ) -> Result<Vec<Post>> {
        let url = listing_url(&self.api_base, collection, sort, time);
        tracing::debug!(%url, "fetching listing");

        let mut request = self.http.get(&url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.context("Listing request failed")?;
        if !response.status().is_success() {
            bail!("Listing request returned {}", response.status());
        }

        let listing: Listing = response
            .json()
            .await
            .context("Failed to parse listing response")?;

        Ok(listing.data.children.into_iter().map(|c| c.data).collect())
    }

    async fn vote(&self, post_id: &str, direction: VoteDirection, token: &str) -> Result<()> {
        let url = format!("{}/api/vote", self.api_base);
        tracing::debug!(%url, post_id, dir = direction.as_dir(), "casting vote");

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .form(&[
                ("dir", direction.as_dir().to_string()),
                // Fully-qualified thing id: t3_ is the link type prefix.
                ("id", format!("t3_{}", post_id)),
            ])
            .send()
            .await
            .context("Vote request failed")?;

        if !response.status().is_success() {
            bail!("Vote request returned {}", response.status());
        }
        Ok(())
    }
}
