use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::discovery::SearchType;
use crate::navigation::DEFAULT_PAGE_SIZE;
use crate::ranking::SortMode;
use crate::session::{default_sort_mode, SessionOptions};

const APP_DIR_NAME: &str = "quickopen";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Sort mode per search type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortConfig {
    pub files: SortMode,
    pub symbols: SortMode,
    pub commands: SortMode,
    pub command_bars: SortMode,
    pub mixed: SortMode,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            files: default_sort_mode(SearchType::Files),
            symbols: default_sort_mode(SearchType::Symbols),
            commands: default_sort_mode(SearchType::Commands),
            command_bars: default_sort_mode(SearchType::CommandBars),
            mixed: default_sort_mode(SearchType::Mixed),
        }
    }
}

impl SortConfig {
    pub fn for_search_type(&self, search_type: SearchType) -> SortMode {
        match search_type {
            SearchType::Files => self.files,
            SearchType::Symbols => self.symbols,
            SearchType::Commands => self.commands,
            SearchType::CommandBars => self.command_bars,
            SearchType::Mixed => self.mixed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub page_size: usize,
    pub file_roots: Vec<PathBuf>,
    pub file_max_depth: usize,
    pub file_exclude_roots: Vec<PathBuf>,
    pub tags_path: Option<PathBuf>,
    pub command_table_path: Option<PathBuf>,
    pub log_filter: String,
    pub sort: SortConfig,
    #[serde(skip)]
    pub config_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            file_roots: vec![std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))],
            file_max_depth: 12,
            file_exclude_roots: Vec::new(),
            tags_path: None,
            command_table_path: None,
            log_filter: "info".to_string(),
            sort: SortConfig::default(),
            config_path: default_config_path(),
        }
    }
}

impl Config {
    pub fn session_options(&self, search_type: SearchType) -> SessionOptions {
        SessionOptions::new(
            search_type,
            self.sort.for_search_type(search_type),
            self.page_size,
        )
    }
}

/// Per-user data directory (logs live under it).
pub fn stable_app_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
        .join(CONFIG_FILE_NAME)
}

pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if !(1..=200).contains(&cfg.page_size) {
        return Err(ConfigError::Invalid("page_size out of range".into()));
    }

    if !(1..=64).contains(&cfg.file_max_depth) {
        return Err(ConfigError::Invalid("file_max_depth out of range".into()));
    }

    if cfg.log_filter.trim().is_empty() {
        return Err(ConfigError::Invalid("log_filter is required".into()));
    }

    Ok(())
}

/// Loads the config at `path` (or the default location). A missing file
/// yields defaults; `.json`/`.json5` files are read as JSON5, anything else
/// as TOML.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);

    let mut config = if config_path.exists() {
        let raw = std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Io {
            path: config_path.clone(),
            source,
        })?;
        parse(&raw, &config_path)?
    } else {
        Config::default()
    };
    config.config_path = config_path;

    validate(&config)?;
    Ok(config)
}

pub fn save(cfg: &Config) -> Result<(), ConfigError> {
    validate(cfg)?;
    if let Some(parent) = cfg.config_path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let encoded = toml::to_string_pretty(cfg)?;
    std::fs::write(&cfg.config_path, encoded).map_err(|source| ConfigError::Io {
        path: cfg.config_path.clone(),
        source,
    })
}

fn parse(raw: &str, path: &Path) -> Result<Config, ConfigError> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json") || ext.eq_ignore_ascii_case("json5"))
        .unwrap_or(false);

    let parsed = if is_json {
        json5::from_str::<Config>(raw).map_err(|error| error.to_string())
    } else {
        toml::from_str::<Config>(raw).map_err(|error| error.to_string())
    };

    parsed.map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::{default_config_path, stable_app_data_dir, SortConfig};
    use crate::discovery::SearchType;
    use crate::ranking::SortMode;

    #[test]
    fn app_dirs_are_namespaced() {
        assert!(stable_app_data_dir().ends_with("quickopen"));
        assert!(default_config_path().ends_with("quickopen/config.toml"));
    }

    #[test]
    fn sort_config_maps_every_search_type() {
        let sort = SortConfig {
            command_bars: SortMode::Alphabetical,
            ..SortConfig::default()
        };
        assert_eq!(sort.for_search_type(SearchType::CommandBars), SortMode::Alphabetical);
        assert_eq!(sort.for_search_type(SearchType::Symbols), SortMode::LineNumber);
        assert_eq!(sort.for_search_type(SearchType::Files), SortMode::Fuzzy);
    }
}
