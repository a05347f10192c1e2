mod comment;
mod product;
mod rating;
mod suggestion;
pub mod user;

pub use comment::*;
pub use product::*;
pub use rating::*;
pub use suggestion::*;
pub use user::*;

use serde_valid::Validate;

/// Runs the derived `serde_valid` rules and flattens the report into one line.
pub(crate) fn validate_form<T: Validate>(form: &T) -> Result<(), String> {
    form.validate().map_err(|errors| errors.to_string())
}

pub(crate) fn require_text(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} must not be empty", field));
    }
    Ok(())
}
