//! Client-side maintenance of a product's denormalized `(avg, count)`.
//!
//! The CMS stores individual rating records and, separately, the aggregate on
//! the product record. Nothing on the server keeps the two in step, so each
//! vote recomputes the aggregate incrementally and pushes it back.
//!
//! Votes on one product are serialized in-process by a per-product async
//! lock held for the whole lookup / write / push cycle. Writers in other
//! processes are not coordinated.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::connectors::{CmsConnector, ConnectorError};
use crate::forms::Vote;
use crate::models::{Product, Rating, RatingStats, Score};
use crate::services::background::best_effort;
use crate::session::AuthenticatedUser;

#[derive(Debug, Clone, PartialEq)]
pub enum VoteError {
    /// The signed-in user has no storefront profile to attach the vote to.
    ProfileMissing,
    Validation(String),
    Connector(ConnectorError),
}

impl fmt::Display for VoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoteError::ProfileMissing => write!(f, "User profile not found"),
            VoteError::Validation(msg) => write!(f, "Invalid vote: {}", msg),
            VoteError::Connector(err) => write!(f, "Failed to submit rating: {}", err),
        }
    }
}

impl std::error::Error for VoteError {}

impl From<ConnectorError> for VoteError {
    fn from(err: ConnectorError) -> Self {
        VoteError::Connector(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteKind {
    New,
    Changed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VoteOutcome {
    pub stats: RatingStats,
    pub rating: Rating,
    pub kind: VoteKind,
    /// `false` when the aggregate could not be written back to the product.
    pub stats_persisted: bool,
}

type StatsSlot = Arc<tokio::sync::Mutex<RatingStats>>;

pub struct RatingAggregator {
    connector: Arc<dyn CmsConnector>,
    products: Mutex<HashMap<String, StatsSlot>>,
}

impl RatingAggregator {
    pub fn new(connector: Arc<dyn CmsConnector>) -> Self {
        Self {
            connector,
            products: Mutex::new(HashMap::new()),
        }
    }

    /// Slot for `product_id`, created with `seed` when untracked.
    fn slot(&self, product_id: &str, seed: RatingStats) -> StatsSlot {
        let mut products = self.products.lock().unwrap_or_else(PoisonError::into_inner);
        products
            .entry(product_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(seed)))
            .clone()
    }

    /// Starts tracking a product from a fresh read. Already tracked products
    /// keep their local stats.
    pub fn track(&self, product: &Product) {
        self.slot(&product.id, product.rating);
    }

    /// Overwrites the local stats with an authoritative read.
    /// Waits for a vote on the same product to finish first.
    pub async fn refresh(&self, product_id: &str, stats: RatingStats) {
        let slot = self.slot(product_id, stats);
        *slot.lock().await = stats;
    }

    pub async fn stats(&self, product_id: &str) -> Option<RatingStats> {
        let slot = self
            .products
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(product_id)
            .cloned()?;
        let stats = *slot.lock().await;
        Some(stats)
    }

    /// The caller's current rating of the product, if any.
    pub async fn user_vote(
        &self,
        user: &AuthenticatedUser,
        product_id: &str,
    ) -> Result<Option<Rating>, VoteError> {
        let Some(profile_id) = user.profile_id() else {
            return Ok(None);
        };
        Ok(self
            .connector
            .find_rating(&user.token, product_id, profile_id)
            .await?)
    }

    /// Validates a submitted vote form and casts it.
    pub async fn submit(
        &self,
        user: &AuthenticatedUser,
        product: &Product,
        vote: &Vote,
    ) -> Result<VoteOutcome, VoteError> {
        crate::forms::validate_form(vote).map_err(VoteError::Validation)?;
        let score = vote
            .score()
            .map_err(|err| VoteError::Validation(err.to_string()))?;
        self.cast_vote(user, product, score).await
    }

    /// Records `score` as the user's vote and updates the product aggregate.
    ///
    /// A failed rating write leaves the local stats untouched. A failed
    /// aggregate push is logged and reported through `stats_persisted`.
    pub async fn cast_vote(
        &self,
        user: &AuthenticatedUser,
        product: &Product,
        score: Score,
    ) -> Result<VoteOutcome, VoteError> {
        let profile_id = user.profile_id().ok_or(VoteError::ProfileMissing)?;
        let token = user.token.as_str();

        let slot = self.slot(&product.id, product.rating);
        let mut current = slot.lock().await;

        let existing = self
            .connector
            .find_rating(token, &product.id, profile_id)
            .await?;

        let (stats, rating, kind) = match existing {
            Some(previous) => {
                if current.count == 0 {
                    tracing::warn!(
                        product_id = %product.id,
                        rating_id = %previous.id,
                        "existing vote on a product with no recorded votes, counting it as new"
                    );
                }
                let stats = current.with_changed_vote(previous.score, score);
                let rating = self
                    .connector
                    .update_rating(token, &previous.id, score)
                    .await?;
                (stats, rating, VoteKind::Changed)
            }
            None => {
                let stats = current.with_new_vote(score);
                let rating = self
                    .connector
                    .create_rating(token, &product.id, profile_id, score)
                    .await?;
                (stats, rating, VoteKind::New)
            }
        };
        *current = stats;

        let stats_persisted = best_effort(
            "push_rating_stats",
            self.connector.update_product_stats(token, &product.id, stats),
        )
        .await
        .is_some();
        drop(current);

        tracing::info!(
            product_id = %product.id,
            score = score.value(),
            avg = stats.avg,
            count = stats.count,
            "vote recorded"
        );

        Ok(VoteOutcome {
            stats,
            rating,
            kind,
            stats_persisted,
        })
    }
}
