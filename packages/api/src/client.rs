//! # LawSphere AI API client
//!
//! | Call | Request | Response |
//! |------|---------|----------|
//! | [`ask`](LawAssistant::ask) | `POST api/ask {query, language}` | [`ChatResponse`] |
//! | [`compare`](LawAssistant::compare) | `POST api/compare {section1, section2}` | [`ChatResponse`] |
//! | [`news`](LawAssistant::news) | `GET api/news` | `[NewsArticle]` |
//!
//! Every response field is optional on the wire. Non-2xx responses surface as
//! [`ApiError::Server`] carrying the status and body.

use std::future::Future;
use std::time::Duration;

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::models::NewsArticle;
use crate::settings::ApiSettings;

/// Answer language requested from the assistant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Hindi,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest<'a> {
    pub query: &'a str,
    pub language: Language,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompareRequest<'a> {
    pub section1: &'a str,
    pub section2: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievedSource {
    #[serde(default)]
    pub source_number: u32,
    #[serde(default)]
    pub snippet: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    #[serde(default)]
    pub formatted_answer: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub semantic_tags: Option<Vec<String>>,
    #[serde(default)]
    pub retrieved_sources: Option<Vec<RetrievedSource>>,
}

/// The remote legal assistant.
pub trait LawAssistant: Send + Sync {
    fn ask(
        &self,
        query: &str,
        language: Language,
    ) -> impl Future<Output = Result<ChatResponse, ApiError>> + Send;

    fn compare(
        &self,
        section1: &str,
        section2: &str,
    ) -> impl Future<Output = Result<ChatResponse, ApiError>> + Send;

    fn news(&self) -> impl Future<Output = Result<Vec<NewsArticle>, ApiError>> + Send;
}

/// HTTP client for the LawSphere API.
#[derive(Debug, Clone)]
pub struct LawApiClient {
    client: reqwest::Client,
    base_url: Url,
}

impl LawApiClient {
    /// `base_url` is the API root, e.g. `http://10.0.2.2:3000/`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).map_err(|e| ApiError::BaseUrl(format!("{base}: {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self { client, base_url })
    }

    pub fn from_settings(settings: &ApiSettings) -> Result<Self, ApiError> {
        Self::new(&settings.base_url, settings.timeout())
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::BaseUrl(e.to_string()))
    }

    async fn read<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json().await?)
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        tracing::info!(url = %url, "calling law api");
        let resp = self.client.post(url).json(body).send().await?;
        Self::read(resp).await
    }
}

impl LawAssistant for LawApiClient {
    async fn ask(&self, query: &str, language: Language) -> Result<ChatResponse, ApiError> {
        self.post("api/ask", &ChatRequest { query, language }).await
    }

    async fn compare(&self, section1: &str, section2: &str) -> Result<ChatResponse, ApiError> {
        self.post("api/compare", &CompareRequest { section1, section2 })
            .await
    }

    async fn news(&self) -> Result<Vec<NewsArticle>, ApiError> {
        let url = self.endpoint("api/news")?;
        tracing::info!(url = %url, "fetching legal news");
        let resp = self.client.get(url).send().await?;
        let articles: Vec<NewsArticle> = Self::read(resp).await?;
        tracing::info!(count = articles.len(), "fetched legal news");
        Ok(articles)
    }
}
