mod client;
mod connector;
mod init;
pub mod mapping;
pub mod mock;
pub mod types;

#[cfg(test)]
mod tests;

pub use client::CmsClient;
pub use connector::CmsConnector;
pub use init::init;
pub use mock::{MockCmsConnector, MockOperation};
pub use types::AuthGrant;
