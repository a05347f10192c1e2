use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::connectors::{CmsConnector, ConnectorError};
use crate::forms::{ProductSubmission, Suggestion};
use crate::models::{Page, Product, ProductFilter};
use crate::services::feed::{FeedError, FeedLoader, FeedSnapshot, PageSource};
use crate::services::viewer::ViewerToken;
use crate::session::AuthenticatedUser;

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogError {
    Validation(String),
    Feed(FeedError),
    Connector(ConnectorError),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Validation(msg) => write!(f, "Invalid submission: {}", msg),
            CatalogError::Feed(err) => write!(f, "{}", err),
            CatalogError::Connector(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<FeedError> for CatalogError {
    fn from(err: FeedError) -> Self {
        CatalogError::Feed(err)
    }
}

impl From<ConnectorError> for CatalogError {
    fn from(err: ConnectorError) -> Self {
        CatalogError::Connector(err)
    }
}

/// Catalog listing under a filter.
pub struct ProductSource {
    connector: Arc<dyn CmsConnector>,
    viewer: ViewerToken,
}

impl ProductSource {
    pub fn new(connector: Arc<dyn CmsConnector>, viewer: ViewerToken) -> Self {
        Self { connector, viewer }
    }
}

#[async_trait]
impl PageSource for ProductSource {
    type Key = ProductFilter;
    type Item = Product;

    async fn fetch(
        &self,
        filter: &ProductFilter,
        page: u32,
        page_size: u32,
    ) -> Result<Page<Product>, ConnectorError> {
        let token = self.viewer.get();
        self.connector
            .list_products(token.as_deref(), filter, page, page_size)
            .await
    }
}

pub struct Catalog {
    connector: Arc<dyn CmsConnector>,
    viewer: ViewerToken,
    feed: FeedLoader<ProductSource>,
}

impl Catalog {
    pub fn new(connector: Arc<dyn CmsConnector>, page_size: u32) -> Self {
        let viewer = ViewerToken::new();
        Self {
            feed: FeedLoader::new(
                ProductSource::new(connector.clone(), viewer.clone()),
                page_size,
            ),
            viewer,
            connector,
        }
    }

    /// Token used for catalog reads from now on. `None` reads anonymously.
    pub fn set_token(&self, token: Option<String>) {
        self.viewer.set(token);
    }

    /// Replaces the listing with page 1 under `filter`.
    pub async fn browse(&self, filter: ProductFilter) -> Result<FeedSnapshot<Product>, CatalogError> {
        Ok(self.feed.load(filter).await?)
    }

    pub async fn load_more(&self) -> Result<FeedSnapshot<Product>, CatalogError> {
        Ok(self.feed.load_more().await?)
    }

    pub fn products(&self) -> Vec<Product> {
        self.feed.items()
    }

    pub fn feed(&self) -> &FeedLoader<ProductSource> {
        &self.feed
    }

    pub async fn product_by_slug(&self, slug: &str) -> Result<Option<Product>, CatalogError> {
        let token = self.viewer.get();
        Ok(self
            .connector
            .get_product_by_slug(token.as_deref(), slug)
            .await?)
    }

    /// The first `limit` products of the unfiltered catalog.
    pub async fn featured(&self, limit: u32) -> Result<Vec<Product>, CatalogError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let token = self.viewer.get();
        let page = self
            .connector
            .list_products(token.as_deref(), &ProductFilter::default(), 1, limit)
            .await?;
        Ok(page.items)
    }

    /// Up to `limit` other products from the same category.
    pub async fn related(&self, product: &Product, limit: u32) -> Result<Vec<Product>, CatalogError> {
        let Some(category) = product.category else {
            return Ok(Vec::new());
        };
        if limit == 0 {
            return Ok(Vec::new());
        }
        let filter = ProductFilter {
            category: Some(category),
            is_real: None,
        };
        // one extra in case the product itself is among the results
        let token = self.viewer.get();
        let page = self
            .connector
            .list_products(token.as_deref(), &filter, 1, limit.saturating_add(1))
            .await?;
        Ok(page
            .items
            .into_iter()
            .filter(|p| p.id != product.id)
            .take(limit as usize)
            .collect())
    }

    pub async fn submit_product(
        &self,
        user: &AuthenticatedUser,
        submission: ProductSubmission,
    ) -> Result<Product, CatalogError> {
        submission.check().map_err(CatalogError::Validation)?;
        let submission = submission.with_slug();
        let product = self
            .connector
            .submit_product(&user.token, &submission)
            .await?;
        tracing::info!(product_id = %product.id, "product submitted");
        Ok(product)
    }

    /// Returns the id of the stored suggestion.
    pub async fn submit_suggestion(
        &self,
        user: &AuthenticatedUser,
        suggestion: &Suggestion,
    ) -> Result<String, CatalogError> {
        suggestion.check().map_err(CatalogError::Validation)?;
        let id = self
            .connector
            .submit_suggestion(&user.token, suggestion)
            .await?;
        tracing::info!(suggestion_id = %id, "suggestion submitted");
        Ok(id)
    }
}
