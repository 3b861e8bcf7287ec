use std::time::Duration;

use cheapo_core::{SearchPayload, SearchQuery, Store};
use engine_logging::engine_debug;
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use url::Url;

use crate::wire::{SearchBody, StoreLookupBody};
use crate::{FailureKind, FetchError};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub stores_url: String,
    pub search_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
    pub allowed_content_types: Vec<String>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            stores_url: "http://127.0.0.1:8080/stores".to_string(),
            search_url: "http://127.0.0.1:8080/search".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 5 * 1024 * 1024,
            allowed_content_types: vec!["application/json".to_string(), "text/json".to_string()],
        }
    }
}

/// Finds stores near a point.
#[async_trait::async_trait]
pub trait StoreLocator: Send + Sync {
    async fn nearby_stores(&self, lat: f64, lon: f64) -> Result<Vec<Store>, FetchError>;
}

/// Fetches one page of catalog results.
#[async_trait::async_trait]
pub trait CatalogSearch: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<SearchPayload, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    settings: FetchSettings,
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    fn is_content_type_allowed(&self, content_type: &str) -> bool {
        let ct = content_type.split(';').next().unwrap_or(content_type).trim();
        self.settings
            .allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ct))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        engine_debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(self.too_large(content_len));
            }
        }

        if let Some(ct) = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
        {
            if !self.is_content_type_allowed(ct) {
                return Err(FetchError::new(
                    FailureKind::UnsupportedContentType {
                        content_type: ct.to_string(),
                    },
                    "unsupported content type",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(self.too_large(next_len));
            }
            bytes.extend_from_slice(&chunk);
        }

        serde_json::from_slice(&bytes)
            .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))
    }

    fn too_large(&self, actual: u64) -> FetchError {
        FetchError::new(
            FailureKind::TooLarge {
                max_bytes: self.settings.max_bytes,
                actual: Some(actual),
            },
            "response too large",
        )
    }
}

#[async_trait::async_trait]
impl StoreLocator for ReqwestFetcher {
    async fn nearby_stores(&self, lat: f64, lon: f64) -> Result<Vec<Store>, FetchError> {
        let url = endpoint(
            &self.settings.stores_url,
            &[("latitude", lat.to_string()), ("longitude", lon.to_string())],
        )?;
        let body: StoreLookupBody = self.get_json(url).await?;
        Ok(body.into_stores())
    }
}

#[async_trait::async_trait]
impl CatalogSearch for ReqwestFetcher {
    async fn search(&self, query: &SearchQuery) -> Result<SearchPayload, FetchError> {
        let url = endpoint(&self.settings.search_url, &search_params(query))?;
        let body: SearchBody = self.get_json(url).await?;
        Ok(body.into_payload())
    }
}

/// Absent filters are sent as empty values.
fn search_params(query: &SearchQuery) -> [(&'static str, String); 4] {
    [
        ("storeId", query.store_id.clone().unwrap_or_default()),
        ("categoryId", query.category_id.clone().unwrap_or_default()),
        ("keyword", query.keyword.clone().unwrap_or_default()),
        ("startIndex", query.start_index().to_string()),
    ]
}

fn endpoint(base: &str, params: &[(&str, String)]) -> Result<Url, FetchError> {
    let mut url =
        Url::parse(base).map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
    url.query_pairs_mut()
        .extend_pairs(params.iter().map(|(key, value)| (*key, value.as_str())));
    Ok(url)
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return FetchError::new(FailureKind::Decode, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
