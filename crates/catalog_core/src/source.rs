use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::protocol::{CategoryDescriptor, ProductPage};
use tracing::debug;
use url::Url;

use crate::{
    config::Settings,
    error::CatalogError,
    query::{categories_url, CatalogQuery},
};

/// Remote side of the catalog. The controller only talks to this seam.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_products(&self, query: &CatalogQuery) -> Result<ProductPage, CatalogError>;
    async fn fetch_categories(&self) -> Result<Vec<CategoryDescriptor>, CatalogError>;
}

pub struct HttpCatalogSource {
    http: Client,
    base_url: Url,
}

impl HttpCatalogSource {
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, CatalogError> {
        let base_url = settings.base_url()?;
        let mut builder = Client::builder();
        if let Some(timeout) = settings.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, CatalogError> {
        debug!(%url, "catalog GET");
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch_products(&self, query: &CatalogQuery) -> Result<ProductPage, CatalogError> {
        let url = query.to_url(&self.base_url)?;
        self.get_json(url).await
    }

    async fn fetch_categories(&self) -> Result<Vec<CategoryDescriptor>, CatalogError> {
        let url = categories_url(&self.base_url)?;
        self.get_json(url).await
    }
}

#[cfg(test)]
#[path = "tests/source_tests.rs"]
mod tests;
