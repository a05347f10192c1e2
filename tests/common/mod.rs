#![allow(dead_code)]

use std::sync::Arc;

use leftorium::connectors::cms::MockCmsConnector;
use leftorium::connectors::{CmsClient, CmsConfig, CmsConnector};
use leftorium::models::{Product, RatingStats};
use leftorium::session::AuthenticatedUser;
use serde_json::{json, Value};
use wiremock::MockServer;

/// HTTP client pointed at a wiremock server.
pub fn cms_client(server: &MockServer, api_token: Option<&str>) -> CmsClient {
    CmsClient::new(CmsConfig {
        base_url: server.uri(),
        timeout_secs: 5,
        retry_attempts: 3,
        api_token: api_token.map(str::to_string),
        ..CmsConfig::default()
    })
    .expect("Failed to build CMS client")
}

pub fn seeded() -> Arc<MockCmsConnector> {
    Arc::new(MockCmsConnector::seeded())
}

/// Signs `username` in against the mock, profile merged, as the session would.
pub async fn sign_in(mock: &MockCmsConnector, username: &str) -> AuthenticatedUser {
    let token = mock.token_for(username).expect("unknown mock account");
    let user = mock.current_user(&token).await.expect("token rejected");
    let user = match mock.find_profile(&token, &user.id).await.expect("profile lookup") {
        Some(profile) => user.merge_profile(profile),
        None => user,
    };
    AuthenticatedUser { token, user }
}

/// Creates an account with a linked profile and signs it in.
pub async fn new_voter(mock: &MockCmsConnector, username: &str) -> AuthenticatedUser {
    let user = mock.insert_account(username, &format!("{username}@leftorium.test"), "secret1");
    mock.insert_profile(&user.id);
    sign_in(mock, username).await
}

/// Copy of a seeded product under a new id and slug with the given stats.
pub fn product_with_stats(mock: &MockCmsConnector, id: &str, stats: RatingStats) -> Product {
    let mut product = mock.product("1").expect("seeded product");
    product.id = id.to_string();
    product.slug = Some(format!("product-{id}"));
    product.rating = stats;
    mock.insert_product(product.clone());
    product
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

/// Flat (v5-style) product entry.
pub fn flat_product(document_id: &str, title: &str) -> Value {
    json!({
        "id": 11,
        "documentId": document_id,
        "title": title,
        "slug": "precision-scissors",
        "short_description": "Blades reversed for a clear sightline.",
        "category": "Workshop Tools",
        "price": "$24.50",
        "is_real": true,
        "art_url": "https://cdn.leftorium.test/scissors.png",
        "features": [{ "text": "Reversed blades", "icon": "content_cut" }],
        "rating_avg": 4.5,
        "rating_count": 2
    })
}

/// List response with Strapi's `meta.pagination` block.
pub fn list_body(items: Vec<Value>, page: u32, page_size: u32, total: u32) -> Value {
    let page_count = total.div_ceil(page_size);
    json!({
        "data": items,
        "meta": {
            "pagination": {
                "page": page,
                "pageSize": page_size,
                "pageCount": page_count,
                "total": total
            }
        }
    })
}
