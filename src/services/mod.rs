pub mod background;
pub mod catalog;
pub mod comments;
pub mod feed;
pub mod rating_aggregator;
pub mod viewer;

pub use catalog::{Catalog, CatalogError, ProductSource};
pub use comments::{CommentError, CommentSource, CommentThread};
pub use feed::{FeedError, FeedLoader, FeedSnapshot, FeedState, PageSource};
pub use rating_aggregator::{RatingAggregator, VoteError, VoteKind, VoteOutcome};
pub use viewer::ViewerToken;
