use async_trait::async_trait;

use crate::cli::commands::CallableTrait;
use crate::cli::context::AppContext;
use crate::cli::error::CliError;
use crate::cli::{progress, render};
use crate::models::ProductFilter;
use crate::services::{CatalogError, FeedError};

/// `leftorium products [--category <name>] [--real | --fake] [--pages <n>]`
pub struct ListProductsCommand {
    pub filter: ProductFilter,
    pub pages: u32,
}

impl ListProductsCommand {
    pub fn new(filter: ProductFilter, pages: u32) -> Self {
        Self {
            filter,
            pages: pages.max(1),
        }
    }
}

#[async_trait]
impl CallableTrait for ListProductsCommand {
    async fn call(&self, ctx: &AppContext) -> Result<(), CliError> {
        let pb = progress::spinner("Loading products...");
        let mut snapshot = match ctx.catalog.browse(self.filter).await {
            Ok(snapshot) => snapshot,
            Err(CatalogError::Feed(FeedError::Connector(err))) => {
                progress::finish_error(&pb, &format!("No connection to the catalog: {}", err));
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        for _ in 1..self.pages {
            if !snapshot.has_more() {
                break;
            }
            match ctx.catalog.load_more().await {
                Ok(next) => snapshot = next,
                Err(err) => {
                    tracing::warn!("stopped loading products: {}", err);
                    break;
                }
            }
        }
        progress::finish_quiet(&pb);

        if snapshot.items.is_empty() {
            println!("No products match this filter.");
            return Ok(());
        }
        for product in &snapshot.items {
            ctx.ratings.track(product);
            println!("{}", render::product_row(product));
        }
        println!("{}", render::feed_footer(snapshot.items.len(), snapshot.has_more()));
        Ok(())
    }
}

/// `leftorium product <slug>`
pub struct ShowProductCommand {
    pub slug: String,
}

impl ShowProductCommand {
    pub fn new(slug: String) -> Self {
        Self { slug }
    }
}

#[async_trait]
impl CallableTrait for ShowProductCommand {
    async fn call(&self, ctx: &AppContext) -> Result<(), CliError> {
        let product = ctx.product(&self.slug).await?;

        let user_score = match ctx.session.require_user().await {
            Ok(user) => ctx
                .ratings
                .user_vote(&user, &product.id)
                .await
                .ok()
                .flatten()
                .map(|rating| rating.score),
            Err(_) => None,
        };
        println!("{}", render::product_detail(&product, user_score));

        match ctx.catalog.related(&product, 3).await {
            Ok(related) if !related.is_empty() => {
                println!("\nYou might also like:");
                for item in &related {
                    println!("  {}", render::product_row(item));
                }
            }
            Ok(_) => {}
            Err(err) => tracing::warn!("could not load related products: {}", err),
        }
        Ok(())
    }
}
