use crate::models::{Category, Feature};
use serde::{Deserialize, Serialize};
use serde_valid::Validate;

/// Product record as submitted to the CMS. Field names are the wire names.
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct ProductSubmission {
    #[validate(min_length = 2)]
    #[validate(max_length = 120)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[validate(max_length = 280)]
    #[serde(default)]
    pub short_description: String,
    pub category: Category,
    #[validate(max_length = 32)]
    #[serde(default)]
    pub price: Option<String>,
    pub is_real: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub art_url: Option<String>,
    #[validate(max_items = 10)]
    #[serde(default)]
    pub features: Vec<Feature>,
    #[validate(max_length = 5000)]
    #[serde(default)]
    pub description: Option<String>,
}

impl ProductSubmission {
    pub fn check(&self) -> Result<(), String> {
        super::require_text("title", &self.title)?;
        super::validate_form(self)
    }

    /// Fills in the slug from the title when none was given.
    pub fn with_slug(mut self) -> Self {
        if self.slug.as_deref().map_or(true, |s| s.trim().is_empty()) {
            self.slug = Some(slugify(&self.title));
        }
        self
    }
}

pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(title: &str) -> ProductSubmission {
        ProductSubmission {
            title: title.into(),
            slug: None,
            short_description: "Blades reversed for a clear sightline.".into(),
            category: Category::Workshop,
            price: Some("$24.50".into()),
            is_real: true,
            art_url: None,
            features: vec![Feature::new("Reversed blades")],
            description: None,
        }
    }

    #[test]
    fn slug_is_derived_from_title() {
        assert_eq!(slugify("  Precision Scissors (Left) "), "precision-scissors-left");
        assert_eq!(slugify("A--B"), "a-b");
        let s = submission("Precision Scissors").with_slug();
        assert_eq!(s.slug.as_deref(), Some("precision-scissors"));
    }

    #[test]
    fn explicit_slug_is_kept() {
        let mut s = submission("Precision Scissors");
        s.slug = Some("scissors".into());
        assert_eq!(s.with_slug().slug.as_deref(), Some("scissors"));
    }

    #[test]
    fn title_is_required() {
        assert!(submission(" ").check().is_err());
        assert!(submission("Precision Scissors").check().is_ok());
    }
}
