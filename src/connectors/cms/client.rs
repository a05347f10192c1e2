use crate::connectors::config::CmsConfig;
use crate::connectors::errors::ConnectorError;
use crate::forms::{ProductSubmission, Suggestion};
use crate::models::{
    Comment, Page, Product, ProductFilter, Profile, Rating, RatingStats, Score, User,
};

use futures::FutureExt;
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde_json::Value;
use tracing::Instrument;

use super::connector::CmsConnector;
use super::mapping;
use super::types::{
    AuthGrant, AuthResponse, CommentData, DataEnvelope, ErrorEnvelope, ItemEnvelope,
    ListEnvelope, LoginPayload, ProductStatsData, ProfileData, RatingData, RatingScoreData,
    RegisterPayload,
};

const PRODUCTS: &str = "/api/leftorium-products";
const COMMENTS: &str = "/api/leftorium-comments";
const RATINGS: &str = "/api/leftorium-ratings";
const PROFILES: &str = "/api/leftorium-users";
const SUGGESTIONS: &str = "/api/leftorium-suggestions";

type Query = Vec<(String, String)>;

/// HTTP-based CMS client
pub struct CmsClient {
    pub(crate) base_url: String,
    pub(crate) http_client: reqwest::Client,
    pub(crate) api_token: Option<String>,
    pub(crate) retry_attempts: usize,
}

impl CmsClient {
    /// Create new CMS client
    pub fn new(config: CmsConfig) -> Result<Self, ConnectorError> {
        let timeout = std::time::Duration::from_secs(config.timeout_secs);
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConnectorError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http_client,
            api_token: config.api_token,
            retry_attempts: config.retry_attempts.max(1),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Session token first, configured API token second.
    fn bearer(&self, token: Option<&str>) -> Option<String> {
        token
            .map(str::to_string)
            .or_else(|| self.api_token.clone())
    }

    /// Retry helper with exponential backoff, transient failures only
    pub(crate) async fn retry_request<F, T>(&self, mut f: F) -> Result<T, ConnectorError>
    where
        F: FnMut() -> futures::future::BoxFuture<'static, Result<T, ConnectorError>>,
    {
        let mut attempt = 0;
        loop {
            match f().await {
                Ok(result) => return Ok(result),
                Err(err) => {
                    attempt += 1;
                    if attempt >= self.retry_attempts || !err.is_transient() {
                        return Err(err);
                    }
                    // Exponential backoff: 200ms, 400ms, 800ms, etc.
                    let backoff =
                        std::time::Duration::from_millis(100 * 2_u64.pow(attempt as u32));
                    tracing::debug!("retrying after {:?}: {}", backoff, err);
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }

    /// GET with retries. The request is rebuilt for every attempt.
    async fn get_json(
        &self,
        path: &str,
        token: Option<&str>,
        query: Query,
    ) -> Result<Value, ConnectorError> {
        let http = self.http_client.clone();
        let url = self.url(path);
        let auth = self.bearer(token);
        self.retry_request(move || {
            let mut req = http.get(&url).query(&query);
            if let Some(token) = auth.as_deref() {
                req = req.bearer_auth(token);
            }
            send_json(req).boxed()
        })
        .await
    }

    /// Mutations are sent once; a duplicate create is worse than a failure.
    async fn send_data<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> Result<Value, ConnectorError> {
        let mut req = self.http_client.request(method, self.url(path)).json(body);
        if let Some(token) = self.bearer(token) {
            req = req.bearer_auth(token);
        }
        send_json(req).await
    }

    async fn list(
        &self,
        path: &str,
        token: Option<&str>,
        query: Query,
    ) -> Result<ListEnvelope, ConnectorError> {
        let value = self.get_json(path, token, query).await?;
        Ok(serde_json::from_value(value)?)
    }

    fn item(value: Value) -> Result<Value, ConnectorError> {
        let envelope: ItemEnvelope = serde_json::from_value(value)?;
        envelope
            .data
            .ok_or_else(|| ConnectorError::InvalidResponse("response without data".to_string()))
    }
}

async fn send_json(req: RequestBuilder) -> Result<Value, ConnectorError> {
    let resp = req.send().await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let message = error_message(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
        return Err(ConnectorError::from_status(status, message));
    }
    let text = resp.text().await?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|_| ConnectorError::InvalidResponse(text))
}

/// Human-readable message from the CMS error envelope, if the body has one.
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()?
        .error?
        .message
        .filter(|m| !m.is_empty())
}

fn pagination_query(page: u32, page_size: u32) -> Query {
    vec![
        ("pagination[page]".to_string(), page.to_string()),
        ("pagination[pageSize]".to_string(), page_size.to_string()),
    ]
}

fn product_query(filter: &ProductFilter, page: u32, page_size: u32) -> Query {
    let mut query = vec![("populate".to_string(), "*".to_string())];
    query.extend(pagination_query(page, page_size));
    if let Some(category) = filter.category {
        query.push((
            "filters[category][$eq]".to_string(),
            category.label().to_string(),
        ));
    }
    if let Some(is_real) = filter.is_real {
        query.push(("filters[is_real][$eq]".to_string(), is_real.to_string()));
    }
    query
}

#[async_trait::async_trait]
impl CmsConnector for CmsClient {
    async fn list_products(
        &self,
        token: Option<&str>,
        filter: &ProductFilter,
        page: u32,
        page_size: u32,
    ) -> Result<Page<Product>, ConnectorError> {
        let span = tracing::info_span!("cms_list_products", page, page_size, ?filter);
        async {
            let envelope = self
                .list(PRODUCTS, token, product_query(filter, page, page_size))
                .await
                .map_err(|e| {
                    tracing::error!("list_products error: {:?}", e);
                    e
                })?;
            Ok(mapping::map_list(envelope, mapping::map_product))
        }
        .instrument(span)
        .await
    }

    async fn get_product_by_slug(
        &self,
        token: Option<&str>,
        slug: &str,
    ) -> Result<Option<Product>, ConnectorError> {
        let span = tracing::info_span!("cms_get_product_by_slug", slug = %slug);
        let query = vec![
            ("filters[slug][$eq]".to_string(), slug.to_string()),
            ("populate".to_string(), "*".to_string()),
        ];
        async {
            let envelope = self.list(PRODUCTS, token, query).await?;
            let first = envelope.data.unwrap_or_default().into_iter().next();
            first.as_ref().map(mapping::map_product).transpose()
        }
        .instrument(span)
        .await
    }

    async fn submit_product(
        &self,
        token: &str,
        product: &ProductSubmission,
    ) -> Result<Product, ConnectorError> {
        let span = tracing::info_span!("cms_submit_product", title = %product.title);
        let body = DataEnvelope { data: product };
        async {
            let value = self
                .send_data(Method::POST, PRODUCTS, Some(token), &body)
                .await
                .map_err(|e| {
                    tracing::error!("submit_product error: {:?}", e);
                    e
                })?;
            mapping::map_product(&Self::item(value)?)
        }
        .instrument(span)
        .await
    }

    async fn update_product_stats(
        &self,
        token: &str,
        product_id: &str,
        stats: RatingStats,
    ) -> Result<(), ConnectorError> {
        let span = tracing::info_span!(
            "cms_update_product_stats",
            product_id = %product_id,
            avg = stats.avg,
            count = stats.count
        );
        let body = DataEnvelope {
            data: ProductStatsData {
                rating_avg: stats.avg,
                rating_count: stats.count,
            },
        };
        let path = format!("{}/{}", PRODUCTS, product_id);
        self.send_data(Method::PUT, &path, Some(token), &body)
            .instrument(span)
            .await
            .map(|_| ())
    }

    async fn submit_suggestion(
        &self,
        token: &str,
        suggestion: &Suggestion,
    ) -> Result<String, ConnectorError> {
        let span = tracing::info_span!("cms_submit_suggestion", name = %suggestion.name);
        let body = DataEnvelope { data: suggestion };
        async {
            let value = self
                .send_data(Method::POST, SUGGESTIONS, Some(token), &body)
                .await?;
            let item = Self::item(value)?;
            mapping::entity_id(&item).ok_or_else(|| {
                ConnectorError::InvalidResponse("suggestion without id".to_string())
            })
        }
        .instrument(span)
        .await
    }

    async fn list_comments(
        &self,
        token: Option<&str>,
        product_id: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Page<Comment>, ConnectorError> {
        let span = tracing::info_span!("cms_list_comments", product_id = %product_id, page);
        let mut query = vec![
            ("filters[product][id][$eq]".to_string(), product_id.to_string()),
            (
                "populate[leftorium_user][populate]".to_string(),
                "avatar".to_string(),
            ),
            ("sort".to_string(), "createdAt:desc".to_string()),
        ];
        query.extend(pagination_query(page, page_size));
        async {
            let envelope = self.list(COMMENTS, token, query).await.map_err(|e| {
                tracing::error!("list_comments error: {:?}", e);
                e
            })?;
            Ok(mapping::map_list(envelope, mapping::map_comment))
        }
        .instrument(span)
        .await
    }

    async fn create_comment(
        &self,
        token: &str,
        product_id: &str,
        profile_id: Option<&str>,
        content: &str,
    ) -> Result<Comment, ConnectorError> {
        let span = tracing::info_span!("cms_create_comment", product_id = %product_id);
        let body = DataEnvelope {
            data: CommentData {
                content,
                product: product_id,
                leftorium_user: profile_id,
            },
        };
        async {
            let value = self
                .send_data(Method::POST, COMMENTS, Some(token), &body)
                .await
                .map_err(|e| {
                    tracing::error!("create_comment error: {:?}", e);
                    e
                })?;
            mapping::map_comment(&Self::item(value)?)
        }
        .instrument(span)
        .await
    }

    async fn find_rating(
        &self,
        token: &str,
        product_id: &str,
        profile_id: &str,
    ) -> Result<Option<Rating>, ConnectorError> {
        let span = tracing::info_span!(
            "cms_find_rating",
            product_id = %product_id,
            profile_id = %profile_id
        );
        let mut query = vec![
            ("filters[product][id][$eq]".to_string(), product_id.to_string()),
            (
                "filters[leftorium_user][id][$eq]".to_string(),
                profile_id.to_string(),
            ),
        ];
        query.extend(pagination_query(1, 1));
        async {
            let envelope = self.list(RATINGS, Some(token), query).await?;
            let first = envelope.data.unwrap_or_default().into_iter().next();
            first.as_ref().map(mapping::map_rating).transpose()
        }
        .instrument(span)
        .await
    }

    async fn create_rating(
        &self,
        token: &str,
        product_id: &str,
        profile_id: &str,
        score: Score,
    ) -> Result<Rating, ConnectorError> {
        let span = tracing::info_span!(
            "cms_create_rating",
            product_id = %product_id,
            profile_id = %profile_id,
            score = score.value()
        );
        let body = DataEnvelope {
            data: RatingData {
                score: score.value(),
                product: product_id,
                leftorium_user: profile_id,
            },
        };
        async {
            let value = self
                .send_data(Method::POST, RATINGS, Some(token), &body)
                .await?;
            let mut rating = mapping::map_rating(&Self::item(value)?)?;
            rating.product_id.get_or_insert_with(|| product_id.to_string());
            rating.user_id.get_or_insert_with(|| profile_id.to_string());
            Ok(rating)
        }
        .instrument(span)
        .await
    }

    async fn update_rating(
        &self,
        token: &str,
        rating_id: &str,
        score: Score,
    ) -> Result<Rating, ConnectorError> {
        let span = tracing::info_span!(
            "cms_update_rating",
            rating_id = %rating_id,
            score = score.value()
        );
        let body = DataEnvelope {
            data: RatingScoreData {
                score: score.value(),
            },
        };
        let path = format!("{}/{}", RATINGS, rating_id);
        async {
            let value = self.send_data(Method::PUT, &path, Some(token), &body).await?;
            mapping::map_rating(&Self::item(value)?)
        }
        .instrument(span)
        .await
    }

    async fn login(&self, identifier: &str, password: &str) -> Result<AuthGrant, ConnectorError> {
        let span = tracing::info_span!("cms_login", identifier = %identifier);
        let req = self
            .http_client
            .post(self.url("/api/auth/local"))
            .json(&LoginPayload {
                identifier,
                password,
            });
        async {
            let value = send_json(req).await?;
            let response: AuthResponse = serde_json::from_value(value)?;
            mapping::map_auth(response)
        }
        .instrument(span)
        .await
    }

    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthGrant, ConnectorError> {
        let span = tracing::info_span!("cms_register", username = %username);
        let req = self
            .http_client
            .post(self.url("/api/auth/local/register"))
            .json(&RegisterPayload {
                username,
                email,
                password,
            });
        async {
            let value = send_json(req).await?;
            let response: AuthResponse = serde_json::from_value(value)?;
            mapping::map_auth(response)
        }
        .instrument(span)
        .await
    }

    async fn current_user(&self, token: &str) -> Result<User, ConnectorError> {
        let span = tracing::info_span!("cms_current_user");
        async {
            let value = self.get_json("/api/users/me", Some(token), Vec::new()).await?;
            mapping::map_user(&value)
        }
        .instrument(span)
        .await
    }

    async fn find_profile(
        &self,
        token: &str,
        user_id: &str,
    ) -> Result<Option<Profile>, ConnectorError> {
        let span = tracing::info_span!("cms_find_profile", user_id = %user_id);
        let query = vec![
            ("filters[user][id][$eq]".to_string(), user_id.to_string()),
            ("populate".to_string(), "*".to_string()),
        ];
        async {
            let envelope = self.list(PROFILES, Some(token), query).await?;
            let first = envelope.data.unwrap_or_default().into_iter().next();
            first.as_ref().map(mapping::map_profile).transpose()
        }
        .instrument(span)
        .await
    }

    async fn create_profile(&self, token: &str, user: &User) -> Result<Profile, ConnectorError> {
        let span = tracing::info_span!("cms_create_profile", user_id = %user.id);
        let body = DataEnvelope {
            data: ProfileData {
                username: &user.username,
                email: &user.email,
                user: &user.id,
            },
        };
        async {
            let value = self
                .send_data(Method::POST, PROFILES, Some(token), &body)
                .await?;
            mapping::map_profile(&Self::item(value)?)
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    #[test]
    fn error_message_reads_strapi_envelope() {
        let body = r#"{"data":null,"error":{"status":400,"name":"ValidationError","message":"Invalid identifier or password"}}"#;
        assert_eq!(
            error_message(body).as_deref(),
            Some("Invalid identifier or password")
        );
        assert!(error_message("<html>oops</html>").is_none());
    }

    #[test]
    fn product_query_includes_filters() {
        let filter = ProductFilter {
            category: Some(Category::Kitchen),
            is_real: Some(false),
        };
        let query = product_query(&filter, 2, 8);
        assert!(query.contains(&("pagination[page]".to_string(), "2".to_string())));
        assert!(query.contains(&("pagination[pageSize]".to_string(), "8".to_string())));
        assert!(query.contains(&(
            "filters[category][$eq]".to_string(),
            "Kitchen Gear".to_string()
        )));
        assert!(query.contains(&("filters[is_real][$eq]".to_string(), "false".to_string())));
    }

    #[test]
    fn bearer_prefers_session_token() {
        let client = CmsClient::new(CmsConfig {
            api_token: Some("api".into()),
            ..CmsConfig::default()
        })
        .unwrap();
        assert_eq!(client.bearer(Some("jwt")).as_deref(), Some("jwt"));
        assert_eq!(client.bearer(None).as_deref(), Some("api"));
    }
}
