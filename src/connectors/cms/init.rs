use std::sync::Arc;

use crate::connectors::config::CmsConfig;
use crate::connectors::cms::{mock, CmsClient, CmsConnector};
use crate::connectors::errors::ConnectorError;

/// Initialize the CMS connector from configuration
///
/// Returns the HTTP client when the CMS is enabled, otherwise the seeded
/// in-memory connector.
///
/// # Example
/// ```ignore
/// let settings = leftorium::configuration::get_configuration()?;
/// let cms = leftorium::connectors::cms::init(&settings.cms)?;
/// ```
pub fn init(config: &CmsConfig) -> Result<Arc<dyn CmsConnector>, ConnectorError> {
    if config.enabled {
        let mut config = config.clone();
        // Load the API token from the environment if not set in config
        if config.api_token.is_none() {
            config.api_token = std::env::var("LEFTORIUM_CMS_TOKEN")
                .or_else(|_| std::env::var("VITE_STRAPI_TOKEN"))
                .ok()
                .filter(|t| !t.is_empty());
        }
        tracing::info!("Initializing CMS connector: {}", config.base_url);
        Ok(Arc::new(CmsClient::new(config)?))
    } else {
        tracing::warn!("CMS connector disabled - using in-memory catalog");
        Ok(Arc::new(mock::MockCmsConnector::seeded()))
    }
}
