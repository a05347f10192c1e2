use serde::{Deserialize, Serialize};
use serde_valid::Validate;

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct LoginForm {
    #[validate(min_length = 1)]
    #[validate(max_length = 255)]
    pub identifier: String, // username or email
    #[validate(min_length = 1)]
    pub password: String,
}

impl LoginForm {
    pub fn check(&self) -> Result<(), String> {
        super::require_text("identifier", &self.identifier)?;
        super::validate_form(self)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct RegisterForm {
    #[validate(min_length = 3)]
    #[validate(max_length = 50)]
    pub username: String,
    #[validate(max_length = 255)]
    pub email: String,
    #[validate(min_length = 6)]
    pub password: String,
}

impl RegisterForm {
    pub fn check(&self) -> Result<(), String> {
        super::require_text("username", &self.username)?;
        let email = self.email.trim();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
            _ => return Err(format!("invalid email address: {}", email)),
        }
        super::validate_form(self)
    }
}
