use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::RatingStats;

pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/300";
pub const DEFAULT_FEATURE_ICON: &str = "check_circle";
pub const PRICE_NOT_AVAILABLE: &str = "N/A";

/// Catalog section. The serialized form is the label the CMS stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Kitchen Gear")]
    Kitchen,
    #[serde(rename = "Office Supplies")]
    Office,
    #[serde(rename = "Workshop Tools")]
    Workshop,
    #[serde(rename = "Sports Equipment")]
    Sports,
    #[serde(rename = "Lab Prototype")]
    Lab,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Kitchen,
        Category::Office,
        Category::Workshop,
        Category::Sports,
        Category::Lab,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Kitchen => "Kitchen Gear",
            Self::Office => "Office Supplies",
            Self::Workshop => "Workshop Tools",
            Self::Sports => "Sports Equipment",
            Self::Lab => "Lab Prototype",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Accepts the CMS label ("Kitchen Gear") or the short name ("kitchen").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| {
                let label = c.label().to_lowercase();
                label == needle || label.split_whitespace().next() == Some(needle.as_str())
            })
            .ok_or_else(|| format!("unknown category: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub text: String,
    pub icon: String,
}

impl Feature {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            icon: DEFAULT_FEATURE_ICON.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub slug: Option<String>,
    pub name: String,
    pub description: String,
    pub category: Option<Category>,
    pub price: Option<String>,
    pub image: String,
    pub is_real: bool,
    pub features: Vec<Feature>,
    pub long_description: Option<String>,
    pub rating: RatingStats,
}

impl Product {
    pub fn display_price(&self) -> &str {
        self.price
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(PRICE_NOT_AVAILABLE)
    }

    pub fn kind_label(&self) -> &'static str {
        if self.is_real {
            "Real Product"
        } else {
            "Lab Prototype"
        }
    }
}

/// Equality filters accepted by the product list endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub category: Option<Category>,
    pub is_real: Option<bool>,
}
