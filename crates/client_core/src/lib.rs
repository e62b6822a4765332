use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Product, ProductDraft, ProductId},
    error::CatalogError,
    protocol::{
        item_path, CreatedProductEnvelope, ErrorBody, UpdatedProductEnvelope, ADD_ITEM_PATH,
        DELETE_ITEM_PATH, LIST_ITEMS_PATH, UPDATE_ITEM_PATH,
    },
};
use tracing::{debug, warn};
use url::Url;

pub mod config;

pub use config::ClientSettings;

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

const ERROR_BODY_PREVIEW_CHARS: usize = 200;

/// The four remote catalog operations.
///
/// Every call is fire-once: no retry, no idempotency key, no version check.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list(&self) -> CatalogResult<Vec<Product>>;
    async fn create(&self, draft: &ProductDraft) -> CatalogResult<Product>;
    /// Full-record replacement keyed by `id`.
    async fn update(&self, id: &ProductId, draft: &ProductDraft) -> CatalogResult<Product>;
    async fn delete(&self, id: &ProductId) -> CatalogResult<()>;
}

/// Stand-in used when no usable API endpoint is configured.
pub struct MissingCatalogApi {
    reason: String,
}

impl MissingCatalogApi {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn unavailable<T>(&self) -> CatalogResult<T> {
        Err(CatalogError::Network(format!(
            "catalog API unavailable: {}",
            self.reason
        )))
    }
}

#[async_trait]
impl CatalogApi for MissingCatalogApi {
    async fn list(&self) -> CatalogResult<Vec<Product>> {
        self.unavailable()
    }

    async fn create(&self, _draft: &ProductDraft) -> CatalogResult<Product> {
        self.unavailable()
    }

    async fn update(&self, _id: &ProductId, _draft: &ProductDraft) -> CatalogResult<Product> {
        self.unavailable()
    }

    async fn delete(&self, _id: &ProductId) -> CatalogResult<()> {
        self.unavailable()
    }
}

pub struct HttpCatalogClient {
    http: Client,
    base_url: Url,
}

impl HttpCatalogClient {
    pub fn new(base_url: &str) -> CatalogResult<Self> {
        Self::with_timeout(base_url, None)
    }

    pub fn from_settings(settings: &ClientSettings) -> CatalogResult<Self> {
        Self::with_timeout(&settings.api_base_url, settings.request_timeout())
    }

    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> CatalogResult<Self> {
        let base_url = parse_base_url(base_url)?;
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| CatalogError::Network(format!("failed to build http client: {err}")))?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint<I>(&self, segments: I) -> CatalogResult<Url>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                CatalogError::Validation(format!("base url `{}` cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogClient {
    async fn list(&self) -> CatalogResult<Vec<Product>> {
        let url = self.endpoint(LIST_ITEMS_PATH.split('/'))?;
        debug!(%url, "catalog: list");
        let result: CatalogResult<Vec<Product>> = async {
            let res = self.http.get(url).send().await.map_err(map_transport_error)?;
            decode_json::<Vec<Product>>(ensure_success(res).await?).await
        }
        .await;
        log_failure("list", &result);
        result
    }

    async fn create(&self, draft: &ProductDraft) -> CatalogResult<Product> {
        let url = self.endpoint(ADD_ITEM_PATH.split('/'))?;
        debug!(%url, name = %draft.name, "catalog: create");
        let result: CatalogResult<Product> = async {
            let res = self
                .http
                .post(url)
                .json(draft)
                .send()
                .await
                .map_err(map_transport_error)?;
            let body: CreatedProductEnvelope = decode_json(ensure_success(res).await?).await?;
            Ok(body.new_product)
        }
        .await;
        log_failure("create", &result);
        result
    }

    async fn update(&self, id: &ProductId, draft: &ProductDraft) -> CatalogResult<Product> {
        let url = self.endpoint(item_path(UPDATE_ITEM_PATH, id))?;
        debug!(%url, %id, "catalog: update");
        let record = Product::from_draft(id.clone(), draft.clone());
        let result: CatalogResult<Product> = async {
            let res = self
                .http
                .put(url)
                .json(&record)
                .send()
                .await
                .map_err(map_transport_error)?;
            let body: UpdatedProductEnvelope = decode_json(ensure_success(res).await?).await?;
            Ok(body.updated_product)
        }
        .await;
        log_failure("update", &result);
        result
    }

    async fn delete(&self, id: &ProductId) -> CatalogResult<()> {
        let url = self.endpoint(item_path(DELETE_ITEM_PATH, id))?;
        debug!(%url, %id, "catalog: delete");
        let result: CatalogResult<()> = async {
            let res = self
                .http
                .delete(url)
                .send()
                .await
                .map_err(map_transport_error)?;
            ensure_success(res).await?;
            Ok(())
        }
        .await;
        log_failure("delete", &result);
        result
    }
}

fn parse_base_url(raw: &str) -> CatalogResult<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|err| CatalogError::Validation(format!("invalid base url `{raw}`: {err}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(CatalogError::Validation(format!(
            "base url must use http or https, got `{other}`"
        ))),
    }
}

fn map_transport_error(err: reqwest::Error) -> CatalogError {
    if err.is_decode() {
        CatalogError::InvalidResponse(err.to_string())
    } else if err.is_timeout() {
        CatalogError::Network(format!("request timed out: {err}"))
    } else {
        CatalogError::Network(err.to_string())
    }
}

async fn ensure_success(res: Response) -> CatalogResult<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let body = res.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|parsed| parsed.message)
        .unwrap_or_else(|| body.trim().chars().take(ERROR_BODY_PREVIEW_CHARS).collect());
    Err(CatalogError::from_status(status.as_u16(), message))
}

async fn decode_json<T: DeserializeOwned>(res: Response) -> CatalogResult<T> {
    let bytes = res.bytes().await.map_err(map_transport_error)?;
    serde_json::from_slice(&bytes).map_err(|err| CatalogError::InvalidResponse(err.to_string()))
}

fn log_failure<T>(operation: &'static str, result: &CatalogResult<T>) {
    if let Err(err) = result {
        warn!(operation, error = %err, "catalog: request failed");
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
