use serde::{Deserialize, Serialize};
use serde_valid::Validate;

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct NewComment {
    #[validate(max_length = 2000)]
    pub content: String,
}

impl NewComment {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn check(&self) -> Result<(), String> {
        super::require_text("content", &self.content)?;
        super::validate_form(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_comment_is_rejected() {
        assert!(NewComment::new("   \n").check().is_err());
        assert!(NewComment::new("x".repeat(2001)).check().is_err());
        assert!(NewComment::new("Finally, scissors that work!").check().is_ok());
    }
}
