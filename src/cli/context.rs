use std::sync::Arc;

use crate::cli::error::CliError;
use crate::configuration::Settings;
use crate::connectors::cms;
use crate::connectors::CmsConnector;
use crate::models::Product;
use crate::services::{Catalog, CommentThread, RatingAggregator};
use crate::session::{FileTokenStore, Session, TokenStore};

/// Everything a command needs for one run: settings, the CMS connector, the
/// restored session and the services built on top of them.
pub struct AppContext {
    pub settings: Settings,
    pub connector: Arc<dyn CmsConnector>,
    pub session: Session<Box<dyn TokenStore>>,
    pub catalog: Catalog,
    pub comments: CommentThread,
    pub ratings: RatingAggregator,
}

impl AppContext {
    /// Builds the connector from settings and restores the on-disk session.
    pub async fn init(settings: Settings) -> Result<Self, CliError> {
        let connector = cms::init(&settings.cms)?;
        let path = settings
            .session
            .token_path
            .clone()
            .unwrap_or_else(FileTokenStore::default_path);
        let store: Box<dyn TokenStore> = Box::new(FileTokenStore::new(path));
        Self::from_parts(settings, connector, store).await
    }

    pub async fn from_parts(
        settings: Settings,
        connector: Arc<dyn CmsConnector>,
        store: Box<dyn TokenStore>,
    ) -> Result<Self, CliError> {
        let session = Session::init(connector.clone(), store).await?;
        let ctx = Self {
            catalog: Catalog::new(connector.clone(), settings.feeds.products_page_size),
            comments: CommentThread::new(connector.clone(), settings.feeds.comments_page_size),
            ratings: RatingAggregator::new(connector.clone()),
            settings,
            connector,
            session,
        };
        ctx.sync_read_token().await;
        Ok(ctx)
    }

    /// Reads go out with the session token while signed in.
    /// Call again whenever the session changes.
    pub async fn sync_read_token(&self) {
        let token = self.session.token().await;
        self.catalog.set_token(token.clone());
        self.comments.set_token(token);
    }

    /// Looks a product up by slug and starts tracking its rating.
    pub async fn product(&self, slug: &str) -> Result<Product, CliError> {
        let product = self
            .catalog
            .product_by_slug(slug)
            .await?
            .ok_or_else(|| CliError::ProductNotFound {
                slug: slug.to_string(),
            })?;
        self.ratings.track(&product);
        Ok(product)
    }
}
