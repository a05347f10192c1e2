use serde::{Deserialize, Serialize};
use serde_valid::Validate;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Real,
    Fake,
}

/// Idea Lab entry: a real product worth listing or a pitch for a fake one.
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct Suggestion {
    #[validate(min_length = 2)]
    #[validate(max_length = 120)]
    pub name: String,
    #[validate(max_length = 2048)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[validate(max_length = 5000)]
    pub reason: String,
    pub kind: SuggestionKind,
}

impl Suggestion {
    pub fn check(&self) -> Result<(), String> {
        super::require_text("name", &self.name)?;
        super::require_text("reason", &self.reason)?;
        if let Some(link) = self.link.as_deref() {
            if !(link.starts_with("http://") || link.starts_with("https://")) {
                return Err(format!("link must be an http(s) URL: {}", link));
            }
        }
        super::validate_form(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_must_be_http() {
        let mut suggestion = Suggestion {
            name: "Left-handed Can Opener Pro".into(),
            link: Some("ftp://example.com".into()),
            reason: "Turns the other way".into(),
            kind: SuggestionKind::Real,
        };
        assert!(suggestion.check().is_err());
        suggestion.link = Some("https://example.com/opener".into());
        assert!(suggestion.check().is_ok());
    }

    #[test]
    fn kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&SuggestionKind::Fake).unwrap(), "\"fake\"");
    }
}
