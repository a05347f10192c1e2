mod account;
mod catalog;
mod comments;
mod rating;
mod submit;

pub use account::{LoginCommand, LogoutCommand, RegisterCommand, WhoamiCommand};
pub use catalog::{ListProductsCommand, ShowProductCommand};
pub use comments::{ListCommentsCommand, PostCommentCommand};
pub use rating::RateCommand;
pub use submit::{SubmitProductCommand, SuggestCommand};

use async_trait::async_trait;

use crate::cli::context::AppContext;
use crate::cli::error::CliError;

#[async_trait]
pub trait CallableTrait: Send + Sync {
    async fn call(&self, ctx: &AppContext) -> Result<(), CliError>;
}
