//! Indexer search client.
//!
//! The indexer answers `{"items": [...]}` pages. Items are returned as raw
//! JSON; parsing into typed records happens in `unqstake_core::records`.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::config::join_url;
use crate::error::ChainError;

/// Page size for indexer searches. A shorter page ends the scan.
pub const PAGE_SIZE: usize = 1000;

/// Extrinsic search filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtrinsicQuery {
    pub signer: String,
    pub sections: Vec<String>,
    pub methods: Vec<String>,
    pub limit: usize,
    pub offset: usize,
}

/// Event search filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub address: String,
    pub methods: Vec<String>,
    pub limit: usize,
    pub offset: usize,
}

/// Search port of the indexer.
#[async_trait]
pub trait IndexerClient: Send + Sync {
    async fn search_extrinsics(&self, query: &ExtrinsicQuery) -> Result<Vec<Value>, ChainError>;
    async fn search_events(&self, query: &EventQuery) -> Result<Vec<Value>, ChainError>;
}

#[derive(Debug, Deserialize)]
struct ItemsResponse {
    #[serde(default)]
    items: Vec<Value>,
}

/// Indexer reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpIndexer {
    client: reqwest::Client,
    base_url: String,
}

impl HttpIndexer {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ChainError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_items(&self, path: &str, params: &[(&str, String)]) -> Result<Vec<Value>, ChainError> {
        let url = join_url(&self.base_url, path);
        tracing::debug!("GET {} {:?}", url, params);

        let response = self.client.get(&url).query(params).send().await?;
        if !response.status().is_success() {
            return Err(ChainError::Status {
                url,
                status: response.status().as_u16(),
            });
        }

        let body: ItemsResponse = response.json().await?;
        Ok(body.items)
    }
}

fn repeated<'a>(key: &'static str, values: &'a [String]) -> impl Iterator<Item = (&'static str, String)> + 'a {
    values.iter().map(move |v| (key, v.clone()))
}

#[async_trait]
impl IndexerClient for HttpIndexer {
    async fn search_extrinsics(&self, query: &ExtrinsicQuery) -> Result<Vec<Value>, ChainError> {
        let mut params = vec![("signerIn", query.signer.clone())];
        params.extend(repeated("sectionIn", &query.sections));
        params.extend(repeated("methodIn", &query.methods));
        params.push(("limit", query.limit.to_string()));
        params.push(("offset", query.offset.to_string()));
        self.get_items("extrinsics", &params).await
    }

    async fn search_events(&self, query: &EventQuery) -> Result<Vec<Value>, ChainError> {
        let mut params = vec![("address", query.address.clone())];
        params.extend(repeated("methodIn", &query.methods));
        params.push(("limit", query.limit.to_string()));
        params.push(("offset", query.offset.to_string()));
        self.get_items("events", &params).await
    }
}

/// Call `fetch(offset)` until a page shorter than `page_size` comes back.
pub async fn collect_pages<F, Fut>(page_size: usize, mut fetch: F) -> Result<Vec<Value>, ChainError>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<Vec<Value>, ChainError>>,
{
    let page_size = page_size.max(1);
    let mut items = Vec::new();
    let mut offset = 0;
    loop {
        let page = fetch(offset).await?;
        let count = page.len();
        items.extend(page);
        if count < page_size {
            break;
        }
        offset += count;
    }
    Ok(items)
}

/// All staking extrinsics signed by `signer`.
pub async fn fetch_all_extrinsics<I>(
    indexer: &I,
    signer: &str,
    sections: &[&str],
    methods: &[&str],
    page_size: usize,
) -> Result<Vec<Value>, ChainError>
where
    I: IndexerClient + ?Sized,
{
    let base = ExtrinsicQuery {
        signer: signer.to_string(),
        sections: sections.iter().map(|s| s.to_string()).collect(),
        methods: methods.iter().map(|m| m.to_string()).collect(),
        limit: page_size,
        offset: 0,
    };
    collect_pages(page_size, |offset| {
        let query = ExtrinsicQuery {
            offset,
            ..base.clone()
        };
        async move { indexer.search_extrinsics(&query).await }
    })
    .await
}

/// All events of the given methods involving `address`.
pub async fn fetch_all_events<I>(
    indexer: &I,
    address: &str,
    methods: &[&str],
    page_size: usize,
) -> Result<Vec<Value>, ChainError>
where
    I: IndexerClient + ?Sized,
{
    let base = EventQuery {
        address: address.to_string(),
        methods: methods.iter().map(|m| m.to_string()).collect(),
        limit: page_size,
        offset: 0,
    };
    collect_pages(page_size, |offset| {
        let query = EventQuery {
            offset,
            ..base.clone()
        };
        async move { indexer.search_events(&query).await }
    })
    .await
}
