use super::types::AuthGrant;
use crate::connectors::errors::ConnectorError;
use crate::forms::{ProductSubmission, Suggestion};
use crate::models::{
    Comment, Page, Product, ProductFilter, Profile, Rating, RatingStats, Score, User,
};

/// Trait for CMS integration
/// Allows mocking in tests and swapping implementations
///
/// `token` is the caller's session token. Implementations fall back to their
/// own API token when it is `None`.
#[async_trait::async_trait]
pub trait CmsConnector: Send + Sync {
    /// List one page of products matching the equality filters
    async fn list_products(
        &self,
        token: Option<&str>,
        filter: &ProductFilter,
        page: u32,
        page_size: u32,
    ) -> Result<Page<Product>, ConnectorError>;

    /// Look a product up by its URL slug
    async fn get_product_by_slug(
        &self,
        token: Option<&str>,
        slug: &str,
    ) -> Result<Option<Product>, ConnectorError>;

    /// Create a product record
    async fn submit_product(
        &self,
        token: &str,
        product: &ProductSubmission,
    ) -> Result<Product, ConnectorError>;

    /// Overwrite the denormalized rating stats on a product record
    async fn update_product_stats(
        &self,
        token: &str,
        product_id: &str,
        stats: RatingStats,
    ) -> Result<(), ConnectorError>;

    /// Create an Idea Lab suggestion, returns its id
    async fn submit_suggestion(
        &self,
        token: &str,
        suggestion: &Suggestion,
    ) -> Result<String, ConnectorError>;

    /// List one page of a product's comments, newest first
    async fn list_comments(
        &self,
        token: Option<&str>,
        product_id: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Page<Comment>, ConnectorError>;

    /// Create a comment linked to the product and, if known, the author's profile
    async fn create_comment(
        &self,
        token: &str,
        product_id: &str,
        profile_id: Option<&str>,
        content: &str,
    ) -> Result<Comment, ConnectorError>;

    /// The rating a profile gave a product, if any
    async fn find_rating(
        &self,
        token: &str,
        product_id: &str,
        profile_id: &str,
    ) -> Result<Option<Rating>, ConnectorError>;

    async fn create_rating(
        &self,
        token: &str,
        product_id: &str,
        profile_id: &str,
        score: Score,
    ) -> Result<Rating, ConnectorError>;

    async fn update_rating(
        &self,
        token: &str,
        rating_id: &str,
        score: Score,
    ) -> Result<Rating, ConnectorError>;

    /// Calls POST /api/auth/local
    async fn login(&self, identifier: &str, password: &str) -> Result<AuthGrant, ConnectorError>;

    /// Calls POST /api/auth/local/register
    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthGrant, ConnectorError>;

    /// Auth identity behind a token (GET /api/users/me)
    async fn current_user(&self, token: &str) -> Result<User, ConnectorError>;

    /// Storefront profile linked to an auth identity
    async fn find_profile(
        &self,
        token: &str,
        user_id: &str,
    ) -> Result<Option<Profile>, ConnectorError>;

    /// Create the storefront profile for a freshly registered identity
    async fn create_profile(&self, token: &str, user: &User) -> Result<Profile, ConnectorError>;
}
