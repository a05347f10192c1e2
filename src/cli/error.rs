use std::fmt;

use crate::connectors::ConnectorError;
use crate::services::{CatalogError, CommentError, FeedError, VoteError};
use crate::session::SessionError;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CliError: every failure a subcommand can report
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug)]
pub enum CliError {
    // Config errors
    Config(config::ConfigError),

    // Input errors
    InvalidArgument(String),
    ProductNotFound { slug: String },

    // Service errors
    Connector(ConnectorError),
    Session(SessionError),
    Vote(VoteError),
    Feed(FeedError),
    Comment(CommentError),
    Catalog(CatalogError),

    // Prompt / IO errors
    Prompt(String),
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "Configuration error: {err}"),
            Self::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
            Self::ProductNotFound { slug } => write!(f, "Product not found: {slug}"),
            Self::Connector(err) => write!(f, "{err}"),
            Self::Session(err) => write!(f, "{err}"),
            Self::Vote(VoteError::ProfileMissing) => write!(
                f,
                "Your account has no storefront profile yet, so votes cannot be recorded"
            ),
            Self::Vote(err) => write!(f, "{err}"),
            Self::Feed(err) => write!(f, "{err}"),
            Self::Comment(err) => write!(f, "{err}"),
            Self::Catalog(err) => write!(f, "{err}"),
            Self::Prompt(msg) => write!(f, "Prompt failed: {msg}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<config::ConfigError> for CliError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<ConnectorError> for CliError {
    fn from(err: ConnectorError) -> Self {
        Self::Connector(err)
    }
}

impl From<SessionError> for CliError {
    fn from(err: SessionError) -> Self {
        Self::Session(err)
    }
}

impl From<VoteError> for CliError {
    fn from(err: VoteError) -> Self {
        Self::Vote(err)
    }
}

impl From<FeedError> for CliError {
    fn from(err: FeedError) -> Self {
        Self::Feed(err)
    }
}

impl From<CommentError> for CliError {
    fn from(err: CommentError) -> Self {
        Self::Comment(err)
    }
}

impl From<CatalogError> for CliError {
    fn from(err: CatalogError) -> Self {
        Self::Catalog(err)
    }
}

impl From<dialoguer::Error> for CliError {
    fn from(err: dialoguer::Error) -> Self {
        Self::Prompt(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
