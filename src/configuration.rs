use std::path::PathBuf;

use crate::connectors::config::CmsConfig;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub cms: CmsConfig,
    #[serde(default)]
    pub feeds: FeedSettings,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct FeedSettings {
    #[serde(default = "FeedSettings::default_comments_page_size")]
    pub comments_page_size: u32,
    #[serde(default = "FeedSettings::default_products_page_size")]
    pub products_page_size: u32,
}

impl FeedSettings {
    const fn default_comments_page_size() -> u32 {
        5
    }

    const fn default_products_page_size() -> u32 {
        8
    }
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            comments_page_size: Self::default_comments_page_size(),
            products_page_size: Self::default_products_page_size(),
        }
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct SessionSettings {
    /// Where the bearer token is kept between runs.
    /// Defaults to `<config_dir>/leftorium/session.json`.
    pub token_path: Option<PathBuf>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cms: CmsConfig::default(),
            feeds: FeedSettings::default(),
            session: SessionSettings::default(),
            log_level: default_log_level(),
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let settings = config::Config::builder()
        // Optional `configuration.yaml` (or .json, .toml) next to the binary's cwd
        .add_source(config::File::with_name("configuration").required(false))
        // LEFTORIUM__CMS__BASE_URL=https://cms.example.com -> cms.base_url
        .add_source(
            config::Environment::with_prefix("LEFTORIUM")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let mut config: Settings = settings.try_deserialize()?;

    // The storefront's own variable names are honoured too
    if std::env::var("LEFTORIUM__CMS__BASE_URL").is_err() {
        if let Ok(url) = std::env::var("VITE_STRAPI_URL") {
            if !url.is_empty() {
                config.cms.base_url = url;
            }
        }
    }
    config.cms.api_token = std::env::var("LEFTORIUM_CMS_TOKEN")
        .or_else(|_| std::env::var("VITE_STRAPI_TOKEN"))
        .ok()
        .filter(|t| !t.is_empty());

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_storefront() {
        let settings = Settings::default();
        assert_eq!(settings.feeds.comments_page_size, 5);
        assert_eq!(settings.feeds.products_page_size, 8);
        assert_eq!(settings.cms.base_url, "http://localhost:1337");
        assert!(settings.session.token_path.is_none());
    }

    #[test]
    fn partial_yaml_fills_in_defaults() {
        let settings: Settings = config::Config::builder()
            .add_source(config::File::from_str(
                "cms:\n  base_url: https://cms.leftorium.test\nfeeds:\n  comments_page_size: 10\n",
                config::FileFormat::Yaml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(settings.cms.base_url, "https://cms.leftorium.test");
        assert_eq!(settings.cms.timeout_secs, 10);
        assert_eq!(settings.feeds.comments_page_size, 10);
        assert_eq!(settings.feeds.products_page_size, 8);
        assert_eq!(settings.log_level, "warn");
    }
}
