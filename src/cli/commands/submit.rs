use async_trait::async_trait;

use crate::cli::commands::CallableTrait;
use crate::cli::context::AppContext;
use crate::cli::error::CliError;
use crate::forms::{ProductSubmission, Suggestion};

/// `leftorium submit --title <t> --category <c> ...`
pub struct SubmitProductCommand {
    pub submission: ProductSubmission,
}

impl SubmitProductCommand {
    pub fn new(submission: ProductSubmission) -> Self {
        Self { submission }
    }
}

#[async_trait]
impl CallableTrait for SubmitProductCommand {
    async fn call(&self, ctx: &AppContext) -> Result<(), CliError> {
        let user = ctx.session.require_user().await?;
        let product = ctx
            .catalog
            .submit_product(&user, self.submission.clone())
            .await?;
        eprintln!(
            "✓ Submitted {} ({})",
            product.name,
            product.slug.as_deref().unwrap_or(&product.id)
        );
        Ok(())
    }
}

/// `leftorium suggest --name <n> --reason <r> [--link <url>] [--fake]`
pub struct SuggestCommand {
    pub suggestion: Suggestion,
}

impl SuggestCommand {
    pub fn new(suggestion: Suggestion) -> Self {
        Self { suggestion }
    }
}

#[async_trait]
impl CallableTrait for SuggestCommand {
    async fn call(&self, ctx: &AppContext) -> Result<(), CliError> {
        let user = ctx.session.require_user().await?;
        ctx.catalog.submit_suggestion(&user, &self.suggestion).await?;
        eprintln!("✓ Thanks! Your suggestion was sent to the Leftorium team.");
        Ok(())
    }
}
