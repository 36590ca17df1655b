//! Unsplash API client

use super::{Photo, SearchResults, UnsplashPhoto, UnsplashSearch};
use crate::{Error, Result, UnsplashConfig};
use serde::de::DeserializeOwned;

/// Thin async wrapper over the Unsplash REST API
#[derive(Debug, Clone)]
pub struct UnsplashClient {
    client: reqwest::Client,
    config: UnsplashConfig,
}

impl UnsplashClient {
    pub fn new(config: UnsplashConfig) -> Result<Self> {
        if config.access_key.is_none() {
            log::warn!("Unsplash API key is missing; requests will likely be rejected");
        }
        let client = reqwest::Client::builder()
            .user_agent(concat!("collagekit/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    /// Default feed, one page at a time (pages start at 1).
    pub async fn fetch_default(&self, page: u32) -> Result<Vec<Photo>> {
        let photos: Vec<UnsplashPhoto> = self
            .get("/photos", &[("page", page.max(1).to_string())])
            .await?;
        Ok(photos.into_iter().map(Photo::from).collect())
    }

    /// Full-text search. Blank queries are rejected before any request is made.
    pub async fn search(&self, query: &str, page: u32) -> Result<SearchResults> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::Validation("Search query cannot be empty".into()));
        }
        let found: UnsplashSearch = self
            .get(
                "/search/photos",
                &[("query", query.to_string()), ("page", page.max(1).to_string())],
            )
            .await?;
        Ok(found.into())
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str, params: &[(&str, String)]) -> Result<T> {
        let base = self.config.base_url.trim_end_matches('/');
        let mut url = url::Url::parse(&format!("{}{}", base, endpoint))
            .map_err(|e| Error::ConfigError(format!("invalid Unsplash base URL: {}", e)))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("per_page", &self.config.per_page.to_string());
        }

        log::debug!("GET {}", url);
        let mut req = self.client.get(url);
        if let Some(key) = &self.config.access_key {
            req = req.header(reqwest::header::AUTHORIZATION, format!("Client-ID {}", key));
        }
        let resp = req.send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            log::warn!("Unsplash error: {} {}", status.as_u16(), body);
            return Err(Error::Network {
                status: Some(status.as_u16()),
                body,
            });
        }
        Ok(resp.json::<T>().await?)
    }
}
