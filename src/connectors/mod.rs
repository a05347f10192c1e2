//! External Service Connectors
//!
//! Everything that talks to the headless CMS goes through [`cms::CmsConnector`].
//! Services hold an `Arc<dyn CmsConnector>` and never see HTTP details, so the
//! in-memory [`cms::MockCmsConnector`] can stand in for the real client in
//! tests and offline runs.
//!
//! ## Usage
//!
//! ```ignore
//! let connector = connectors::cms::init(&settings.cms)?;
//! let page = connector
//!     .list_products(None, &ProductFilter::default(), 1, 8)
//!     .await?;
//! ```

pub mod cms;
pub mod config;
pub mod errors;

pub use cms::{CmsClient, CmsConnector, MockCmsConnector};
pub use config::CmsConfig;
pub use errors::ConnectorError;
