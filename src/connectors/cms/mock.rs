use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::connectors::errors::ConnectorError;
use crate::forms::{ProductSubmission, Suggestion};
use crate::models::{
    Category, Comment, CommentAuthor, Feature, Page, Pagination, Product, ProductFilter,
    Profile, Rating, RatingStats, Score, User, PLACEHOLDER_IMAGE,
};

use super::types::AuthGrant;
use super::CmsConnector;

/// Operations of [`MockCmsConnector`] that can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOperation {
    ListProducts,
    GetProduct,
    SubmitProduct,
    UpdateProductStats,
    SubmitSuggestion,
    ListComments,
    CreateComment,
    FindRating,
    CreateRating,
    UpdateRating,
    Login,
    Register,
    CurrentUser,
    FindProfile,
    CreateProfile,
}

#[derive(Debug, Clone)]
struct Account {
    user: User,
    password: String,
    token: String,
}

#[derive(Debug, Clone)]
struct StoredComment {
    product_id: String,
    comment: Comment,
}

#[derive(Default)]
struct MockState {
    products: Vec<Product>,
    comments: Vec<StoredComment>,
    ratings: Vec<Rating>,
    accounts: Vec<Account>,
    profiles: HashMap<String, Profile>, // keyed by auth user id
    suggestions: Vec<Suggestion>,
    failing: HashSet<MockOperation>,
    calls: HashMap<MockOperation, usize>,
    next_id: u64,
    clock: i64,
}

impl MockState {
    fn next_id(&mut self) -> String {
        self.next_id += 1;
        self.next_id.to_string()
    }

    /// Strictly increasing creation times so recency ordering is deterministic.
    fn tick(&mut self) -> DateTime<Utc> {
        self.clock += 1;
        epoch() + Duration::seconds(self.clock)
    }

    fn enter(&mut self, op: MockOperation) -> Result<(), ConnectorError> {
        *self.calls.entry(op).or_default() += 1;
        if self.failing.contains(&op) {
            return Err(ConnectorError::ServiceUnavailable(format!(
                "mock failure injected for {:?}",
                op
            )));
        }
        Ok(())
    }

    fn account_by_token(&self, token: &str) -> Result<&Account, ConnectorError> {
        self.accounts
            .iter()
            .find(|a| a.token == token)
            .ok_or_else(|| ConnectorError::Unauthorized("Invalid token".to_string()))
    }

    fn product_mut(&mut self, product_id: &str) -> Result<&mut Product, ConnectorError> {
        self.products
            .iter_mut()
            .find(|p| p.id == product_id)
            .ok_or_else(|| ConnectorError::NotFound(format!("Product {} not found", product_id)))
    }
}

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

fn paginate<T: Clone>(items: &[T], page: u32, page_size: u32) -> Page<T> {
    let total = u32::try_from(items.len()).unwrap_or(u32::MAX);
    let pagination = Pagination::from_total(page, page_size, total);
    let start = (page.saturating_sub(1) as usize).saturating_mul(page_size as usize);
    let items = items
        .iter()
        .skip(start)
        .take(page_size as usize)
        .cloned()
        .collect();
    Page { items, pagination }
}

/// In-memory CMS used when the real one is disabled and throughout the tests.
///
/// Behaves like the REST API it stands in for: tokens are checked on
/// mutations, comments list newest first, ratings are plain records without
/// any aggregate bookkeeping. Every call yields to the scheduler once so
/// concurrent callers interleave the way they would over the network.
#[derive(Default)]
pub struct MockCmsConnector {
    state: Mutex<MockState>,
}

impl MockCmsConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handful of catalog entries plus one account (`ned` / `okilydokily`)
    /// with a linked profile.
    pub fn seeded() -> Self {
        let mock = Self::new();
        for product in seed_products() {
            mock.insert_product(product);
        }
        let user = mock.insert_account("ned", "ned@leftorium.test", "okilydokily");
        mock.insert_profile(&user.id);
        mock
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert_product(&self, product: Product) {
        self.state().products.push(product);
    }

    /// Registers an account directly and returns its user (no profile).
    pub fn insert_account(&self, username: &str, email: &str, password: &str) -> User {
        let mut state = self.state();
        let id = state.next_id();
        let user = User {
            id: id.clone(),
            username: username.to_string(),
            email: email.to_string(),
            avatar: None,
            profile_id: None,
        };
        state.accounts.push(Account {
            user: user.clone(),
            password: password.to_string(),
            token: format!("mock-jwt-{}", id),
        });
        user
    }

    pub fn insert_profile(&self, user_id: &str) -> Option<Profile> {
        let mut state = self.state();
        let account = state.accounts.iter().find(|a| a.user.id == user_id)?.clone();
        let profile = Profile {
            id: format!("p{}", state.next_id()),
            username: Some(account.user.username.clone()),
            email: Some(account.user.email.clone()),
            avatar: None,
        };
        state.profiles.insert(user_id.to_string(), profile.clone());
        Some(profile)
    }

    /// Token the mock issues for `username`, as if they had logged in.
    pub fn token_for(&self, username: &str) -> Option<String> {
        self.state()
            .accounts
            .iter()
            .find(|a| a.user.username == username)
            .map(|a| a.token.clone())
    }

    pub fn fail(&self, op: MockOperation) {
        self.state().failing.insert(op);
    }

    pub fn recover(&self, op: MockOperation) {
        self.state().failing.remove(&op);
    }

    pub fn calls(&self, op: MockOperation) -> usize {
        self.state().calls.get(&op).copied().unwrap_or(0)
    }

    pub fn product(&self, product_id: &str) -> Option<Product> {
        self.state()
            .products
            .iter()
            .find(|p| p.id == product_id)
            .cloned()
    }

    pub fn ratings_for(&self, product_id: &str) -> Vec<Rating> {
        self.state()
            .ratings
            .iter()
            .filter(|r| r.product_id.as_deref() == Some(product_id))
            .cloned()
            .collect()
    }

    pub fn suggestions(&self) -> Vec<Suggestion> {
        self.state().suggestions.clone()
    }

    /// Adds a comment with a controlled author, bypassing auth.
    pub fn insert_comment(&self, product_id: &str, username: &str, content: &str) -> Comment {
        let mut state = self.state();
        let comment = Comment {
            id: state.next_id(),
            content: content.to_string(),
            created_at: state.tick(),
            author: CommentAuthor {
                username: username.to_string(),
                avatar: None,
            },
        };
        state.comments.push(StoredComment {
            product_id: product_id.to_string(),
            comment: comment.clone(),
        });
        comment
    }
}

#[async_trait::async_trait]
impl CmsConnector for MockCmsConnector {
    async fn list_products(
        &self,
        _token: Option<&str>,
        filter: &ProductFilter,
        page: u32,
        page_size: u32,
    ) -> Result<Page<Product>, ConnectorError> {
        tokio::task::yield_now().await;
        let mut state = self.state();
        state.enter(MockOperation::ListProducts)?;
        let matching: Vec<Product> = state
            .products
            .iter()
            .filter(|p| filter.category.map_or(true, |c| p.category == Some(c)))
            .filter(|p| filter.is_real.map_or(true, |real| p.is_real == real))
            .cloned()
            .collect();
        Ok(paginate(&matching, page, page_size))
    }

    async fn get_product_by_slug(
        &self,
        _token: Option<&str>,
        slug: &str,
    ) -> Result<Option<Product>, ConnectorError> {
        tokio::task::yield_now().await;
        let mut state = self.state();
        state.enter(MockOperation::GetProduct)?;
        Ok(state
            .products
            .iter()
            .find(|p| p.slug.as_deref() == Some(slug))
            .cloned())
    }

    async fn submit_product(
        &self,
        token: &str,
        product: &ProductSubmission,
    ) -> Result<Product, ConnectorError> {
        tokio::task::yield_now().await;
        let mut state = self.state();
        state.enter(MockOperation::SubmitProduct)?;
        state.account_by_token(token)?;
        let created = Product {
            id: state.next_id(),
            slug: product.slug.clone(),
            name: product.title.clone(),
            description: product.short_description.clone(),
            category: Some(product.category),
            price: product.price.clone(),
            image: product
                .art_url
                .clone()
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            is_real: product.is_real,
            features: product.features.clone(),
            long_description: product.description.clone(),
            rating: RatingStats::default(),
        };
        state.products.push(created.clone());
        Ok(created)
    }

    async fn update_product_stats(
        &self,
        token: &str,
        product_id: &str,
        stats: RatingStats,
    ) -> Result<(), ConnectorError> {
        tokio::task::yield_now().await;
        let mut state = self.state();
        state.enter(MockOperation::UpdateProductStats)?;
        state.account_by_token(token)?;
        state.product_mut(product_id)?.rating = stats;
        Ok(())
    }

    async fn submit_suggestion(
        &self,
        token: &str,
        suggestion: &Suggestion,
    ) -> Result<String, ConnectorError> {
        tokio::task::yield_now().await;
        let mut state = self.state();
        state.enter(MockOperation::SubmitSuggestion)?;
        state.account_by_token(token)?;
        state.suggestions.push(suggestion.clone());
        Ok(state.next_id())
    }

    async fn list_comments(
        &self,
        _token: Option<&str>,
        product_id: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Page<Comment>, ConnectorError> {
        tokio::task::yield_now().await;
        let mut state = self.state();
        state.enter(MockOperation::ListComments)?;
        let mut matching: Vec<Comment> = state
            .comments
            .iter()
            .filter(|c| c.product_id == product_id)
            .map(|c| c.comment.clone())
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(&matching, page, page_size))
    }

    async fn create_comment(
        &self,
        token: &str,
        product_id: &str,
        profile_id: Option<&str>,
        content: &str,
    ) -> Result<Comment, ConnectorError> {
        tokio::task::yield_now().await;
        let mut state = self.state();
        state.enter(MockOperation::CreateComment)?;
        let account = state.account_by_token(token)?.clone();
        if content.trim().is_empty() {
            return Err(ConnectorError::HttpError("content must not be empty".to_string()));
        }
        let profile = state.profiles.get(&account.user.id).cloned();
        let author = match (&profile, profile_id) {
            (Some(p), Some(pid)) if p.id == pid => CommentAuthor {
                username: p.username.clone().unwrap_or(account.user.username),
                avatar: p.avatar.clone(),
            },
            _ => CommentAuthor::default(),
        };
        let comment = Comment {
            id: state.next_id(),
            content: content.to_string(),
            created_at: state.tick(),
            author,
        };
        state.comments.push(StoredComment {
            product_id: product_id.to_string(),
            comment: comment.clone(),
        });
        Ok(comment)
    }

    async fn find_rating(
        &self,
        token: &str,
        product_id: &str,
        profile_id: &str,
    ) -> Result<Option<Rating>, ConnectorError> {
        tokio::task::yield_now().await;
        let mut state = self.state();
        state.enter(MockOperation::FindRating)?;
        state.account_by_token(token)?;
        Ok(state
            .ratings
            .iter()
            .find(|r| {
                r.product_id.as_deref() == Some(product_id)
                    && r.user_id.as_deref() == Some(profile_id)
            })
            .cloned())
    }

    async fn create_rating(
        &self,
        token: &str,
        product_id: &str,
        profile_id: &str,
        score: Score,
    ) -> Result<Rating, ConnectorError> {
        tokio::task::yield_now().await;
        let mut state = self.state();
        state.enter(MockOperation::CreateRating)?;
        state.account_by_token(token)?;
        let rating = Rating {
            id: state.next_id(),
            score,
            product_id: Some(product_id.to_string()),
            user_id: Some(profile_id.to_string()),
        };
        state.ratings.push(rating.clone());
        Ok(rating)
    }

    async fn update_rating(
        &self,
        token: &str,
        rating_id: &str,
        score: Score,
    ) -> Result<Rating, ConnectorError> {
        tokio::task::yield_now().await;
        let mut state = self.state();
        state.enter(MockOperation::UpdateRating)?;
        state.account_by_token(token)?;
        let rating = state
            .ratings
            .iter_mut()
            .find(|r| r.id == rating_id)
            .ok_or_else(|| ConnectorError::NotFound(format!("Rating {} not found", rating_id)))?;
        rating.score = score;
        Ok(rating.clone())
    }

    async fn login(&self, identifier: &str, password: &str) -> Result<AuthGrant, ConnectorError> {
        tokio::task::yield_now().await;
        let mut state = self.state();
        state.enter(MockOperation::Login)?;
        state
            .accounts
            .iter()
            .find(|a| {
                (a.user.username == identifier || a.user.email == identifier)
                    && a.password == password
            })
            .map(|a| AuthGrant {
                jwt: a.token.clone(),
                user: a.user.clone(),
            })
            .ok_or_else(|| ConnectorError::HttpError("Invalid identifier or password".to_string()))
    }

    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthGrant, ConnectorError> {
        tokio::task::yield_now().await;
        {
            let mut state = self.state();
            state.enter(MockOperation::Register)?;
            if state
                .accounts
                .iter()
                .any(|a| a.user.username == username || a.user.email == email)
            {
                return Err(ConnectorError::HttpError(
                    "Email or Username are already taken".to_string(),
                ));
            }
        }
        let user = self.insert_account(username, email, password);
        let jwt = self.token_for(username).unwrap_or_default();
        Ok(AuthGrant { jwt, user })
    }

    async fn current_user(&self, token: &str) -> Result<User, ConnectorError> {
        tokio::task::yield_now().await;
        let mut state = self.state();
        state.enter(MockOperation::CurrentUser)?;
        Ok(state.account_by_token(token)?.user.clone())
    }

    async fn find_profile(
        &self,
        token: &str,
        user_id: &str,
    ) -> Result<Option<Profile>, ConnectorError> {
        tokio::task::yield_now().await;
        let mut state = self.state();
        state.enter(MockOperation::FindProfile)?;
        state.account_by_token(token)?;
        Ok(state.profiles.get(user_id).cloned())
    }

    async fn create_profile(&self, token: &str, user: &User) -> Result<Profile, ConnectorError> {
        tokio::task::yield_now().await;
        {
            let mut state = self.state();
            state.enter(MockOperation::CreateProfile)?;
            state.account_by_token(token)?;
        }
        self.insert_profile(&user.id)
            .ok_or_else(|| ConnectorError::NotFound(format!("User {} not found", user.id)))
    }
}

fn seed_products() -> Vec<Product> {
    let product = |id: &str,
                   slug: &str,
                   name: &str,
                   description: &str,
                   category: Category,
                   price: Option<&str>,
                   is_real: bool,
                   features: &[(&str, &str)]| Product {
        id: id.to_string(),
        slug: Some(slug.to_string()),
        name: name.to_string(),
        description: description.to_string(),
        category: Some(category),
        price: price.map(str::to_string),
        image: PLACEHOLDER_IMAGE.to_string(),
        is_real,
        features: features
            .iter()
            .map(|(text, icon)| Feature {
                text: text.to_string(),
                icon: icon.to_string(),
            })
            .collect(),
        long_description: None,
        rating: RatingStats::default(),
    };

    vec![
        product(
            "1",
            "spiral-notebook",
            "Spiral Notebook",
            "Spiral on the right side prevents smudging and wire interference.",
            Category::Office,
            Some("$12.99"),
            true,
            &[("Right-side spiral", "menu_book"), ("Smudge-resistant paper", "verified")],
        ),
        product(
            "2",
            "mirrored-tape-measure",
            "Mirrored Tape Measure",
            "Numbers printed in reverse for right-to-left measuring.",
            Category::Workshop,
            None,
            false,
            &[("Reverse numbering", "swap_horiz"), ("Southpaw lock mechanism", "lock")],
        ),
        product(
            "3",
            "precision-scissors",
            "Precision Scissors",
            "Blades are physically reversed to provide a clear sightline.",
            Category::Workshop,
            Some("$24.50"),
            true,
            &[("Reversed blades", "content_cut")],
        ),
        product(
            "4",
            "southpaw-ladle",
            "Southpaw Soup Ladle",
            "Pouring lip on the correct side, for once.",
            Category::Kitchen,
            Some("$9.00"),
            true,
            &[("Left pouring lip", "soup_kitchen")],
        ),
        product(
            "5",
            "reverse-boomerang",
            "Reverse Boomerang",
            "Comes back to the other hand.",
            Category::Sports,
            None,
            false,
            &[("Counter-clockwise flight", "rotate_left")],
        ),
    ]
}
