use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{Pagination, User};

/// `{ data: [...], meta: { pagination } }` returned by list endpoints.
/// Items stay untyped until `mapping` normalizes them.
#[derive(Debug, Default, Deserialize)]
pub struct ListEnvelope {
    #[serde(default)]
    pub data: Option<Vec<Value>>,
    #[serde(default)]
    pub meta: Option<ListMeta>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListMeta {
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// `{ data: {...} }` returned by create/update endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ItemEnvelope {
    #[serde(default)]
    pub data: Option<Value>,
}

/// Strapi error body: `{ error: { status, name, message, details } }`.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    pub status: Option<u16>,
    pub name: Option<String>,
    pub message: Option<String>,
}

/// Raw `{ jwt, user }` reply of the auth endpoints.
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub jwt: String,
    pub user: Value,
}

/// Token plus identity, as handed to the session after login/registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthGrant {
    pub jwt: String,
    pub user: User,
}

/// Request wrapper expected by collection create/update endpoints.
#[derive(Debug, Serialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct LoginPayload<'a> {
    pub identifier: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RegisterPayload<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct CommentData<'a> {
    pub content: &'a str,
    pub product: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leftorium_user: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct RatingData<'a> {
    pub score: u8,
    pub product: &'a str,
    pub leftorium_user: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RatingScoreData {
    pub score: u8,
}

#[derive(Debug, Serialize)]
pub struct ProductStatsData {
    pub rating_avg: f64,
    pub rating_count: u32,
}

#[derive(Debug, Serialize)]
pub struct ProfileData<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub user: &'a str,
}
