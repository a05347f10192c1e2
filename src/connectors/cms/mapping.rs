//! Normalization of CMS entities into internal models.
//!
//! The CMS answers in two shapes depending on the schema version: flat
//! (`{ documentId, title, ... }`) and nested (`{ id, attributes: { title, ... } }`).
//! Every lookup below goes through a fixed priority order:
//!
//! 1. entity id: `documentId`, then `id`
//! 2. attributes: the `attributes` object when present, else the item itself
//! 3. field: snake_case wire name, then its camelCase alias
//! 4. relation: `rel.data.attributes`, `rel.attributes`, `rel`
//!
//! Absent optional fields fall back to defaults (placeholder image, default
//! icon, zero rating stats, anonymous author). Absent required fields are a
//! [`ConnectorError::InvalidResponse`]; inside a list that entry is skipped.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::types::{AuthGrant, AuthResponse, ListEnvelope};
use crate::connectors::errors::ConnectorError;
use crate::models::{
    Comment, CommentAuthor, Feature, Page, Pagination, Product, Profile, Rating, RatingStats,
    Score, User, DEFAULT_FEATURE_ICON, PLACEHOLDER_IMAGE,
};

pub fn entity_id(item: &Value) -> Option<String> {
    ["documentId", "id"]
        .iter()
        .find_map(|key| scalar_to_string(item.get(*key)?))
}

pub fn attributes(item: &Value) -> &Value {
    match item.get("attributes") {
        Some(attrs) if attrs.is_object() => attrs,
        _ => item,
    }
}

/// First present, non-null value among `names`.
fn field<'a>(data: &'a Value, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| data.get(*name))
        .find(|v| !v.is_null())
}

fn str_field(data: &Value, names: &[&str]) -> Option<String> {
    field(data, names).and_then(scalar_to_string)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn f64_field(data: &Value, names: &[&str]) -> Option<f64> {
    match field(data, names)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn u32_field(data: &Value, names: &[&str]) -> Option<u32> {
    match field(data, names)? {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn bool_field(data: &Value, names: &[&str]) -> Option<bool> {
    match field(data, names)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_i64().map(|v| v != 0),
        _ => None,
    }
}

/// The related entity (still carrying its id), unwrapping `{ data: ... }`.
/// A `{ data: null }` relation counts as absent.
pub fn relation_entity<'a>(data: &'a Value, names: &[&str]) -> Option<&'a Value> {
    let rel = field(data, names)?;
    match rel.get("data") {
        Some(inner) if inner.is_null() => None,
        Some(inner) => Some(inner),
        None => Some(rel),
    }
}

fn relation_id(data: &Value, names: &[&str]) -> Option<String> {
    let entity = relation_entity(data, names)?;
    scalar_to_string(entity).or_else(|| entity_id(entity))
}

/// Media URL lookup: `data.attributes.url`, `url`, plain string.
pub fn media_url(media: &Value) -> Option<String> {
    if let Some(url) = media
        .get("data")
        .and_then(|d| d.get("attributes"))
        .and_then(|a| a.get("url"))
        .and_then(Value::as_str)
    {
        return Some(url.to_string());
    }
    if let Some(url) = media.get("url").and_then(Value::as_str) {
        return Some(url.to_string());
    }
    media.as_str().map(str::to_string)
}

fn avatar(data: &Value) -> Option<String> {
    field(data, &["avatar"]).and_then(media_url)
}

fn features(data: &Value) -> Vec<Feature> {
    let Some(Value::Array(items)) = field(data, &["features"]) else {
        return Vec::new();
    };
    items
        .iter()
        .map(|item| match item {
            Value::String(text) => Feature::new(text.clone()),
            other => Feature {
                text: other
                    .get("text")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| other.to_string()),
                icon: other
                    .get("icon")
                    .and_then(Value::as_str)
                    .filter(|icon| !icon.is_empty())
                    .unwrap_or(DEFAULT_FEATURE_ICON)
                    .to_string(),
            },
        })
        .collect()
}

fn timestamp(data: &Value) -> Option<DateTime<Utc>> {
    let raw = str_field(data, &["createdAt", "created_at", "publishedAt"])?;
    DateTime::parse_from_rfc3339(&raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn map_product(item: &Value) -> Result<Product, ConnectorError> {
    let data = attributes(item);
    let id = entity_id(item)
        .ok_or_else(|| ConnectorError::InvalidResponse("product without id".to_string()))?;
    let name = str_field(data, &["title", "name"]).ok_or_else(|| {
        ConnectorError::InvalidResponse(format!("product {} without title", id))
    })?;

    let rating = RatingStats::new(
        f64_field(data, &["rating_avg", "ratingAvg"]).unwrap_or(0.0),
        u32_field(data, &["rating_count", "ratingCount"]).unwrap_or(0),
    );

    Ok(Product {
        id,
        slug: str_field(data, &["slug"]),
        name,
        description: str_field(data, &["short_description", "shortDescription"])
            .unwrap_or_default(),
        category: str_field(data, &["category"]).and_then(|c| c.parse().ok()),
        price: str_field(data, &["price"]),
        image: field(data, &["art_url", "artUrl", "image"])
            .and_then(media_url)
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
        is_real: bool_field(data, &["is_real", "isReal"]).unwrap_or(false),
        features: features(data),
        long_description: str_field(data, &["description", "long_description"]),
        rating,
    })
}

pub fn map_comment(item: &Value) -> Result<Comment, ConnectorError> {
    let data = attributes(item);
    let id = entity_id(item)
        .ok_or_else(|| ConnectorError::InvalidResponse("comment without id".to_string()))?;
    let content = str_field(data, &["content"]).ok_or_else(|| {
        ConnectorError::InvalidResponse(format!("comment {} without content", id))
    })?;
    let created_at = timestamp(data).ok_or_else(|| {
        ConnectorError::InvalidResponse(format!("comment {} without creation time", id))
    })?;

    let author = relation_entity(data, &["leftorium_user", "leftoriumUser"])
        .map(attributes)
        .map(|user| CommentAuthor {
            username: str_field(user, &["username"])
                .unwrap_or_else(|| CommentAuthor::default().username),
            avatar: avatar(user),
        })
        .unwrap_or_default();

    Ok(Comment {
        id,
        content,
        created_at,
        author,
    })
}

pub fn map_rating(item: &Value) -> Result<Rating, ConnectorError> {
    let data = attributes(item);
    let id = entity_id(item)
        .ok_or_else(|| ConnectorError::InvalidResponse("rating without id".to_string()))?;
    let raw = field(data, &["score"])
        .and_then(Value::as_i64)
        .ok_or_else(|| ConnectorError::InvalidResponse(format!("rating {} without score", id)))?;
    let score = Score::try_from(raw)
        .map_err(|e| ConnectorError::InvalidResponse(format!("rating {}: {}", id, e)))?;

    Ok(Rating {
        id,
        score,
        product_id: relation_id(data, &["product"]),
        user_id: relation_id(data, &["leftorium_user", "leftoriumUser"]),
    })
}

/// Auth identities are addressed by their numeric `id` in relation filters,
/// so `id` wins over `documentId` here.
pub fn map_user(value: &Value) -> Result<User, ConnectorError> {
    let data = attributes(value);
    let id = ["id", "documentId"]
        .iter()
        .find_map(|key| value.get(*key).and_then(scalar_to_string))
        .ok_or_else(|| ConnectorError::InvalidResponse("user without id".to_string()))?;

    Ok(User {
        id,
        username: str_field(data, &["username"]).unwrap_or_default(),
        email: str_field(data, &["email"]).unwrap_or_default(),
        avatar: avatar(data),
        profile_id: None,
    })
}

pub fn map_profile(item: &Value) -> Result<Profile, ConnectorError> {
    let data = attributes(item);
    let id = entity_id(item)
        .ok_or_else(|| ConnectorError::InvalidResponse("profile without id".to_string()))?;
    Ok(Profile {
        id,
        username: str_field(data, &["username"]),
        email: str_field(data, &["email"]),
        avatar: avatar(data),
    })
}

pub fn map_auth(response: AuthResponse) -> Result<AuthGrant, ConnectorError> {
    Ok(AuthGrant {
        user: map_user(&response.user)?,
        jwt: response.jwt,
    })
}

/// Maps every item of a list response. Items that fail to map are logged and
/// left out so one malformed entry does not hide the rest of the page.
/// Pagination comes from `meta` when the CMS sent it, otherwise the response
/// is treated as a single page.
pub fn map_list<T, F>(envelope: ListEnvelope, mut map: F) -> Page<T>
where
    F: FnMut(&Value) -> Result<T, ConnectorError>,
{
    let data = envelope.data.unwrap_or_default();
    let items: Vec<T> = data
        .iter()
        .filter_map(|item| match map(item) {
            Ok(mapped) => Some(mapped),
            Err(err) => {
                tracing::warn!("skipping malformed list entry: {}", err);
                None
            }
        })
        .collect();
    let pagination = envelope
        .meta
        .and_then(|meta| meta.pagination)
        .unwrap_or_else(|| Pagination::single_page(items.len()));
    Page { items, pagination }
}
