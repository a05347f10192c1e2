use async_trait::async_trait;

use crate::cli::commands::CallableTrait;
use crate::cli::context::AppContext;
use crate::cli::error::CliError;
use crate::cli::{progress, render};
use crate::forms::NewComment;
use crate::models::Comment;
use crate::services::{CommentError, FeedError};

fn print_comments(comments: &[Comment], has_more: bool) {
    if comments.is_empty() {
        println!("No comments yet. Be the first!");
        return;
    }
    for comment in comments {
        println!("{}", render::comment_block(comment));
    }
    println!("{}", render::feed_footer(comments.len(), has_more));
}

/// `leftorium comments <slug> [--pages <n>]`
pub struct ListCommentsCommand {
    pub slug: String,
    pub pages: u32,
}

impl ListCommentsCommand {
    pub fn new(slug: String, pages: u32) -> Self {
        Self {
            slug,
            pages: pages.max(1),
        }
    }
}

#[async_trait]
impl CallableTrait for ListCommentsCommand {
    async fn call(&self, ctx: &AppContext) -> Result<(), CliError> {
        let product = ctx.product(&self.slug).await?;

        let pb = progress::spinner("Loading comments...");
        let mut snapshot = match ctx.comments.open(&product.id).await {
            Ok(snapshot) => snapshot,
            Err(CommentError::Feed(FeedError::Connector(err))) => {
                progress::finish_error(&pb, &format!("Could not load comments: {}", err));
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };
        for _ in 1..self.pages {
            if !snapshot.has_more() {
                break;
            }
            match ctx.comments.load_more().await {
                Ok(next) => snapshot = next,
                Err(err) => {
                    tracing::warn!("stopped loading comments: {}", err);
                    break;
                }
            }
        }
        progress::finish_quiet(&pb);

        println!("Comments on {}", product.name);
        print_comments(&snapshot.items, snapshot.has_more());
        Ok(())
    }
}

/// `leftorium comment <slug> <text>`
pub struct PostCommentCommand {
    pub slug: String,
    pub content: String,
}

impl PostCommentCommand {
    pub fn new(slug: String, content: String) -> Self {
        Self { slug, content }
    }
}

#[async_trait]
impl CallableTrait for PostCommentCommand {
    async fn call(&self, ctx: &AppContext) -> Result<(), CliError> {
        let user = ctx.session.require_user().await?;
        let product = ctx.product(&self.slug).await?;
        ctx.comments.open(&product.id).await?;

        let created = ctx
            .comments
            .post(&user, &NewComment::new(self.content.clone()))
            .await?;
        eprintln!("✓ Comment posted as {}", created.author.username);

        let feed = ctx.comments.feed();
        print_comments(&feed.items(), feed.has_more());
        Ok(())
    }
}
