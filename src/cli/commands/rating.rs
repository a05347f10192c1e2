use async_trait::async_trait;

use crate::cli::commands::CallableTrait;
use crate::cli::context::AppContext;
use crate::cli::error::CliError;
use crate::cli::render;
use crate::models::Score;
use crate::services::VoteKind;

/// `leftorium rate <slug> <1-5>`
pub struct RateCommand {
    pub slug: String,
    pub score: Score,
}

impl RateCommand {
    pub fn new(slug: String, score: Score) -> Self {
        Self { slug, score }
    }
}

#[async_trait]
impl CallableTrait for RateCommand {
    async fn call(&self, ctx: &AppContext) -> Result<(), CliError> {
        let user = ctx.session.require_user().await?;
        let product = ctx.product(&self.slug).await?;

        let outcome = ctx.ratings.cast_vote(&user, &product, self.score).await?;
        let verb = match outcome.kind {
            VoteKind::New => "recorded",
            VoteKind::Changed => "updated",
        };
        eprintln!("✓ Vote {} for {}", verb, product.name);
        println!("{}", render::rating_line(outcome.stats, Some(self.score)));
        if !outcome.stats_persisted {
            eprintln!("  Note: your vote is saved, but the product average could not be updated right now.");
        }
        Ok(())
    }
}
