//! Paginated feed over any CMS list endpoint.
//!
//! A [`FeedLoader`] owns one ordered buffer for one subject (a product's
//! comments, a filtered catalog). The internal lock is never held across a
//! fetch; a generation counter decides whether a finished fetch still belongs
//! to the current subject.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::connectors::ConnectorError;
use crate::models::Page;

/// Where a feed gets its pages from.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Feed subject, e.g. a product id or a catalog filter.
    type Key: Clone + Send + Sync;
    type Item: Clone + Send;

    async fn fetch(
        &self,
        key: &Self::Key,
        page: u32,
        page_size: u32,
    ) -> Result<Page<Self::Item>, ConnectorError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
    Idle,
    LoadingInitial,
    Ready { has_more: bool },
    LoadingMore,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedError {
    /// A fetch for this feed is already outstanding.
    Busy,
    /// The last loaded page was the final one.
    Exhausted,
    NotLoaded,
    /// A newer load replaced the subject while this fetch was in flight.
    Superseded,
    Connector(ConnectorError),
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::Busy => write!(f, "A page is already loading"),
            FeedError::Exhausted => write!(f, "No more pages to load"),
            FeedError::NotLoaded => write!(f, "Feed has not been loaded yet"),
            FeedError::Superseded => write!(f, "Result discarded: feed was reloaded"),
            FeedError::Connector(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for FeedError {}

impl From<ConnectorError> for FeedError {
    fn from(err: ConnectorError) -> Self {
        FeedError::Connector(err)
    }
}

/// Point-in-time copy of a feed's buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSnapshot<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub state: FeedState,
}

impl<T> FeedSnapshot<T> {
    pub fn has_more(&self) -> bool {
        matches!(self.state, FeedState::Ready { has_more: true })
    }
}

struct FeedInner<K, T> {
    key: Option<K>,
    items: Vec<T>,
    page: u32,
    state: FeedState,
    generation: u64,
    last_error: Option<ConnectorError>,
}

impl<K, T: Clone> FeedInner<K, T> {
    fn snapshot(&self) -> FeedSnapshot<T> {
        FeedSnapshot {
            items: self.items.clone(),
            page: self.page,
            state: self.state,
        }
    }
}

pub struct FeedLoader<S: PageSource> {
    source: S,
    page_size: u32,
    inner: Mutex<FeedInner<S::Key, S::Item>>,
}

impl<S: PageSource> FeedLoader<S> {
    pub fn new(source: S, page_size: u32) -> Self {
        Self {
            source,
            page_size: page_size.max(1),
            inner: Mutex::new(FeedInner {
                key: None,
                items: Vec::new(),
                page: 0,
                state: FeedState::Idle,
                generation: 0,
                last_error: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FeedInner<S::Key, S::Item>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Discards the buffer and loads page 1 of `key`.
    pub async fn load(&self, key: S::Key) -> Result<FeedSnapshot<S::Item>, FeedError> {
        let generation = {
            let mut inner = self.lock();
            inner.generation += 1;
            inner.key = Some(key.clone());
            inner.items.clear();
            inner.page = 0;
            inner.state = FeedState::LoadingInitial;
            inner.last_error = None;
            inner.generation
        };

        let result = self.source.fetch(&key, 1, self.page_size).await;

        let mut inner = self.lock();
        if inner.generation != generation {
            tracing::debug!("discarding superseded initial page");
            return Err(FeedError::Superseded);
        }
        match result {
            Ok(page) => {
                let has_more = page.has_more();
                inner.items = page.items;
                inner.page = 1;
                inner.state = FeedState::Ready { has_more };
                Ok(inner.snapshot())
            }
            Err(err) => {
                tracing::error!("Failed to load first page: {}", err);
                inner.state = FeedState::Error;
                inner.last_error = Some(err.clone());
                Err(FeedError::Connector(err))
            }
        }
    }

    /// Appends the next page. The buffer is left as is when the fetch fails.
    pub async fn load_more(&self) -> Result<FeedSnapshot<S::Item>, FeedError> {
        let (key, next, generation) = {
            let mut inner = self.lock();
            match inner.state {
                FeedState::Ready { has_more: true } => {}
                FeedState::Ready { has_more: false } => return Err(FeedError::Exhausted),
                FeedState::LoadingInitial | FeedState::LoadingMore => {
                    return Err(FeedError::Busy)
                }
                FeedState::Idle | FeedState::Error => return Err(FeedError::NotLoaded),
            }
            let key = inner.key.clone().ok_or(FeedError::NotLoaded)?;
            inner.state = FeedState::LoadingMore;
            (key, inner.page + 1, inner.generation)
        };

        let result = self.source.fetch(&key, next, self.page_size).await;

        let mut inner = self.lock();
        if inner.generation != generation {
            tracing::debug!(page = next, "discarding superseded page");
            return Err(FeedError::Superseded);
        }
        match result {
            Ok(page) => {
                let has_more = page.has_more();
                inner.items.extend(page.items);
                inner.page = next;
                inner.state = FeedState::Ready { has_more };
                Ok(inner.snapshot())
            }
            Err(err) => {
                tracing::error!(page = next, "Failed to load page: {}", err);
                inner.state = FeedState::Ready { has_more: true };
                inner.last_error = Some(err.clone());
                Err(FeedError::Connector(err))
            }
        }
    }

    /// Restarts the current subject from page 1.
    pub async fn reload(&self) -> Result<FeedSnapshot<S::Item>, FeedError> {
        let key = self.lock().key.clone().ok_or(FeedError::NotLoaded)?;
        self.load(key).await
    }

    /// Drops the subject; fetches still in flight are discarded on return.
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.key = None;
        inner.items.clear();
        inner.page = 0;
        inner.state = FeedState::Idle;
        inner.last_error = None;
    }

    pub fn snapshot(&self) -> FeedSnapshot<S::Item> {
        self.lock().snapshot()
    }

    pub fn items(&self) -> Vec<S::Item> {
        self.lock().items.clone()
    }

    pub fn key(&self) -> Option<S::Key> {
        self.lock().key.clone()
    }

    pub fn state(&self) -> FeedState {
        self.lock().state
    }

    pub fn has_more(&self) -> bool {
        matches!(self.state(), FeedState::Ready { has_more: true })
    }

    pub fn is_loading(&self) -> bool {
        self.state() == FeedState::LoadingInitial
    }

    pub fn is_loading_more(&self) -> bool {
        self.state() == FeedState::LoadingMore
    }

    pub fn last_error(&self) -> Option<ConnectorError> {
        self.lock().last_error.clone()
    }
}
