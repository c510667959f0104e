//! Configuration settings for MutualRisk.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration struct.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API configuration.
    pub api: ApiConfig,
    /// UI configuration.
    pub ui: UiConfig,
    /// Key bindings.
    pub keybindings: KeyBindings,
    /// Query cache configuration.
    pub cache: CacheConfig,
}

impl Config {
    /// Load configuration from file, then apply `MUTUALRISK_*` environment overrides.
    ///
    /// A missing file is not an error; every section falls back to its defaults.
    pub fn load(path: Option<PathBuf>) -> crate::Result<Self> {
        let config_path = path.unwrap_or_else(super::default_config_path);
        Self::load_from(&config_path)
    }

    fn load_from(config_path: &Path) -> crate::Result<Self> {
        let layered = ::config::Config::builder()
            .add_source(
                ::config::File::from(config_path)
                    .format(::config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                ::config::Environment::with_prefix(super::ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = layered.try_deserialize()?;
        tracing::debug!(path = %config_path.display(), base_url = %config.api.base_url, "Configuration loaded");
        Ok(config)
    }

    /// Save configuration to file.
    pub fn save(&self, path: Option<PathBuf>) -> crate::Result<()> {
        let config_path = path.unwrap_or_else(super::default_config_path);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::config(e.to_string()))?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }
}

/// Which query parameter carries the portfolio id on `/portfolio/backtest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BacktestIdParam {
    /// `portfolioId`, as the backend controller declares it.
    #[default]
    PortfolioId,
    /// `assetId`, as older frontends sent it.
    AssetId,
}

impl BacktestIdParam {
    /// Query parameter name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PortfolioId => "portfolioId",
            Self::AssetId => "assetId",
        }
    }
}

/// API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Backend base URL, including the API prefix.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Rate limit (requests per second).
    pub rate_limit: u32,
    /// Bearer token sent with every request (optional).
    pub access_token: Option<String>,
    /// Parameter name for the backtest portfolio id.
    pub backtest_id_param: BacktestIdParam,
    /// Number of days of closing prices to request for asset history.
    pub history_period_days: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api/v1".to_string(),
            timeout_secs: 10,
            rate_limit: 10,
            access_token: None,
            backtest_id_param: BacktestIdParam::default(),
            history_period_days: 30,
        }
    }
}

impl ApiConfig {
    /// Request timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// UI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Poll interval in milliseconds for terminal input.
    pub tick_rate_ms: u64,
    /// Enable mouse support.
    pub mouse_support: bool,
    /// Auto-refresh interval in seconds (0 to disable).
    pub auto_refresh_secs: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 100,
            mouse_support: true,
            auto_refresh_secs: 0,
        }
    }
}

/// Query cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// How long the portfolio list stays fresh, in seconds.
    pub portfolio_list_stale_secs: u64,
    /// Freshness of every other query, in seconds.
    pub default_stale_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            portfolio_list_stale_secs: 300,
            default_stale_secs: 60,
        }
    }
}

impl CacheConfig {
    pub fn portfolio_list_stale(&self) -> Duration {
        Duration::from_secs(self.portfolio_list_stale_secs)
    }

    pub fn default_stale(&self) -> Duration {
        Duration::from_secs(self.default_stale_secs)
    }
}

/// Key bindings configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    /// Quit the application.
    pub quit: String,
    /// Show help.
    pub help: String,
    /// Navigate up.
    pub up: String,
    /// Navigate down.
    pub down: String,
    /// Previous column.
    pub left: String,
    /// Next column.
    pub right: String,
    /// Select/confirm.
    pub select: String,
    /// Cancel/back.
    pub back: String,
    /// Refresh data.
    pub refresh: String,
    /// Switch to portfolios view.
    pub portfolios: String,
    /// Switch to backtest view.
    pub backtest: String,
    /// Switch to bookmarks view.
    pub bookmarks: String,
    /// Switch to constraints view.
    pub constraints: String,
    /// Toggle an asset in the working selection.
    pub toggle_select: String,
    /// Move the working selection into the constraint list.
    pub add_selection: String,
    /// Remove the highlighted bookmark or constraint row.
    pub remove: String,
    /// Cycle the bookmark sort order.
    pub sort: String,
    /// Edit the highlighted cell.
    pub edit: String,
    /// Edit the total cash.
    pub edit_cash: String,
    /// Add one cash unit to the total cash.
    pub add_cash: String,
    /// Cycle the cash unit.
    pub cash_unit: String,
    /// Submit the constraints as a new portfolio.
    pub submit: String,
    /// Toggle the backtest measure.
    pub measure: String,
    /// Bookmark the highlighted constraint asset.
    pub bookmark: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: "q".to_string(),
            help: "?".to_string(),
            up: "k".to_string(),
            down: "j".to_string(),
            left: "h".to_string(),
            right: "l".to_string(),
            select: "Enter".to_string(),
            back: "Esc".to_string(),
            refresh: "r".to_string(),
            portfolios: "1".to_string(),
            backtest: "2".to_string(),
            bookmarks: "3".to_string(),
            constraints: "4".to_string(),
            toggle_select: "Space".to_string(),
            add_selection: "a".to_string(),
            remove: "x".to_string(),
            sort: "o".to_string(),
            edit: "e".to_string(),
            edit_cash: "c".to_string(),
            add_cash: "+".to_string(),
            cash_unit: "u".to_string(),
            submit: "p".to_string(),
            measure: "v".to_string(),
            bookmark: "b".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let path = std::env::temp_dir().join("mutualrisk-missing-config.toml");
        let _ = std::fs::remove_file(&path);

        let config = Config::load(Some(path)).unwrap();
        assert_eq!(config.api.base_url, ApiConfig::default().base_url);
        assert_eq!(config.cache.portfolio_list_stale_secs, 300);
        assert_eq!(config.keybindings.quit, "q");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let path = std::env::temp_dir().join(format!(
            "mutualrisk-partial-{}.toml",
            uuid::Uuid::new_v4()
        ));
        std::fs::write(
            &path,
            "[api]\nbase_url = \"https://example.test/api/v1\"\nbacktest_id_param = \"assetId\"\n",
        )
        .unwrap();

        let config = Config::load(Some(path.clone())).unwrap();
        assert_eq!(config.api.base_url, "https://example.test/api/v1");
        assert_eq!(config.api.backtest_id_param, BacktestIdParam::AssetId);
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.ui.tick_rate_ms, 100);

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!(
            "mutualrisk-saved-{}.toml",
            uuid::Uuid::new_v4()
        ));
        let mut config = Config::default();
        config.api.history_period_days = 90;
        config.save(Some(path.clone())).unwrap();

        let loaded = Config::load(Some(path.clone())).unwrap();
        assert_eq!(loaded.api.history_period_days, 90);

        std::fs::remove_file(path).unwrap();
    }
}
