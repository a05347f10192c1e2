use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::connectors::{CmsConnector, ConnectorError};
use crate::forms::NewComment;
use crate::models::{Comment, Page};
use crate::services::feed::{FeedError, FeedLoader, FeedSnapshot, PageSource};
use crate::services::viewer::ViewerToken;
use crate::session::AuthenticatedUser;

#[derive(Debug, Clone, PartialEq)]
pub enum CommentError {
    /// No product thread has been opened yet.
    NotOpen,
    Validation(String),
    Feed(FeedError),
    Connector(ConnectorError),
}

impl fmt::Display for CommentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommentError::NotOpen => write!(f, "No comment thread is open"),
            CommentError::Validation(msg) => write!(f, "Invalid comment: {}", msg),
            CommentError::Feed(err) => write!(f, "{}", err),
            CommentError::Connector(err) => write!(f, "Failed to post comment: {}", err),
        }
    }
}

impl std::error::Error for CommentError {}

impl From<FeedError> for CommentError {
    fn from(err: FeedError) -> Self {
        CommentError::Feed(err)
    }
}

impl From<ConnectorError> for CommentError {
    fn from(err: ConnectorError) -> Self {
        CommentError::Connector(err)
    }
}

/// Comments of one product, newest first.
pub struct CommentSource {
    connector: Arc<dyn CmsConnector>,
    viewer: ViewerToken,
}

impl CommentSource {
    pub fn new(connector: Arc<dyn CmsConnector>, viewer: ViewerToken) -> Self {
        Self { connector, viewer }
    }
}

#[async_trait]
impl PageSource for CommentSource {
    type Key = String;
    type Item = Comment;

    async fn fetch(
        &self,
        product_id: &String,
        page: u32,
        page_size: u32,
    ) -> Result<Page<Comment>, ConnectorError> {
        let token = self.viewer.get();
        self.connector
            .list_comments(token.as_deref(), product_id, page, page_size)
            .await
    }
}

/// Comment section of a product page.
pub struct CommentThread {
    connector: Arc<dyn CmsConnector>,
    viewer: ViewerToken,
    feed: FeedLoader<CommentSource>,
}

impl CommentThread {
    pub fn new(connector: Arc<dyn CmsConnector>, page_size: u32) -> Self {
        let viewer = ViewerToken::new();
        Self {
            feed: FeedLoader::new(
                CommentSource::new(connector.clone(), viewer.clone()),
                page_size,
            ),
            viewer,
            connector,
        }
    }

    /// Token used for listing comments from now on. `None` reads anonymously.
    pub fn set_token(&self, token: Option<String>) {
        self.viewer.set(token);
    }

    /// Switches the thread to `product_id` and loads its newest comments.
    pub async fn open(&self, product_id: &str) -> Result<FeedSnapshot<Comment>, CommentError> {
        Ok(self.feed.load(product_id.to_string()).await?)
    }

    pub async fn load_more(&self) -> Result<FeedSnapshot<Comment>, CommentError> {
        Ok(self.feed.load_more().await?)
    }

    /// Posts as `user` and restarts the thread from page 1 so the new comment
    /// shows first. A failed post leaves the loaded comments alone.
    pub async fn post(
        &self,
        user: &AuthenticatedUser,
        comment: &NewComment,
    ) -> Result<Comment, CommentError> {
        let product_id = self.feed.key().ok_or(CommentError::NotOpen)?;
        comment.check().map_err(CommentError::Validation)?;

        let created = self
            .connector
            .create_comment(
                &user.token,
                &product_id,
                user.profile_id(),
                comment.content.trim(),
            )
            .await?;
        tracing::info!(product_id = %product_id, comment_id = %created.id, "comment posted");

        self.viewer.set(Some(user.token.clone()));
        if let Err(err) = self.feed.reload().await {
            tracing::warn!("comment posted but thread reload failed: {}", err);
        }
        Ok(created)
    }

    pub fn product_id(&self) -> Option<String> {
        self.feed.key()
    }

    pub fn comments(&self) -> Vec<Comment> {
        self.feed.items()
    }

    pub fn feed(&self) -> &FeedLoader<CommentSource> {
        &self.feed
    }
}
