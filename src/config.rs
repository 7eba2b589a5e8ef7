use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::utils;

/// Bumped when a field changes meaning
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Contents of `config.toml`. Every field is optional in the file; missing
/// ones take the values from `Default`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite file used by `serve`
    pub database_path: String,
    /// Address `serve` binds
    pub listen: String,
    /// Base URL the TUI and one-shot commands talk to
    pub server_url: String,
    pub key_bindings: KeyBindings,
    pub current_theme: String,
    /// User themes; looked up before the presets
    pub themes: HashMap<String, Theme>,
    pub config_version: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub quit: String,
    pub new: String,
    pub edit: String,
    pub save: String,
    pub delete: String,
    pub complete: String,
    pub filter: String,
    pub refresh: String,
    pub list_up: String,
    pub list_down: String,
    pub tab_left: String,
    pub tab_right: String,
    pub tab_1: String,
    pub tab_2: String,
    pub tab_3: String,
    pub help: String,
}

/// Color names or hex values, parsed by `tui::widgets::color::parse_color`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub fg: String,
    pub bg: String,
    pub highlight_bg: String,
    /// Empty means "pick black or white against highlight_bg"
    pub highlight_fg: String,
    pub tab_bg: String,
    /// Status column for tasks completed on time
    pub on_time: String,
    /// Status column for late tasks, and error messages
    pub late: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: Self::default_database_path_for_profile(utils::Profile::Prod),
            listen: "127.0.0.1:9000".to_string(),
            server_url: "http://localhost:9000".to_string(),
            key_bindings: KeyBindings::default(),
            current_theme: "default".to_string(),
            themes: HashMap::new(),
            config_version: Some(CURRENT_CONFIG_VERSION),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        let key = |k: &str| k.to_string();
        Self {
            quit: key("q"),
            new: key("n"),
            edit: key("e"),
            save: key("Ctrl+s"),
            delete: key("d"),
            complete: key("c"),
            filter: key("f"),
            refresh: key("r"),
            list_up: key("k"),
            list_down: key("j"),
            tab_left: key("Left"),
            tab_right: key("Right"),
            tab_1: key("1"),
            tab_2: key("2"),
            tab_3: key("3"),
            help: key("F1"),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::from_colors(["white", "black", "blue", "white", "gray", "green", "lightred"])
    }
}

impl Theme {
    /// fg, bg, highlight_bg, highlight_fg, tab_bg, on_time, late
    fn from_colors(colors: [&str; 7]) -> Self {
        let [fg, bg, highlight_bg, highlight_fg, tab_bg, on_time, late] = colors.map(str::to_string);
        Self { fg, bg, highlight_bg, highlight_fg, tab_bg, on_time, late }
    }

    /// Themes available without any configuration
    pub fn get_preset_themes() -> HashMap<String, Theme> {
        HashMap::from([
            ("default".to_string(), Theme::default()),
            (
                "light".to_string(),
                Theme::from_colors(["black", "white", "blue", "white", "gray", "green", "red"]),
            ),
            (
                "monochrome".to_string(),
                Theme::from_colors(["white", "black", "white", "black", "gray", "white", "white"]),
            ),
        ])
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    ConfigDirError,
    #[error("Cannot read {}: {source}", path.display())]
    ReadError { path: PathBuf, source: std::io::Error },
    #[error("Invalid config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Cannot write config: {0}")]
    WriteError(String),
}

impl Config {
    /// Load configuration from the profile's config file, or create it with
    /// defaults if missing
    pub fn load_with_profile(profile: utils::Profile) -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path(profile)?;
        Self::load_from_path(&config_path, profile)
    }

    /// Load configuration from an explicit file, creating it with defaults if missing
    pub fn load_from_path(config_path: &Path, profile: utils::Profile) -> Result<Self, ConfigError> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path).map_err(|source| ConfigError::ReadError {
                path: config_path.to_path_buf(),
                source,
            })?;
            let mut config: Config = toml::from_str(&contents)?;

            // Dev profile never shares the production database
            if profile == utils::Profile::Dev {
                config.database_path = Self::default_database_path_for_profile(profile);
            }

            Ok(config)
        } else {
            let mut config = Config::default();
            config.database_path = Self::default_database_path_for_profile(profile);
            if let Err(e) = config.save_to_path(config_path) {
                tracing::warn!(path = %config_path.display(), error = %e, "could not write default config");
                return Err(e);
            }
            Ok(config)
        }
    }

    /// Write the config as pretty TOML, stamping the current version
    pub fn save_to_path(&mut self, config_path: &Path) -> Result<(), ConfigError> {
        self.config_version = Some(CURRENT_CONFIG_VERSION);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }
        let toml_string = toml::to_string_pretty(self).map_err(|e| ConfigError::WriteError(e.to_string()))?;
        fs::write(config_path, toml_string).map_err(|e| ConfigError::WriteError(e.to_string()))
    }

    /// `config.toml` in the profile's config directory
    pub fn get_config_path(profile: utils::Profile) -> Result<PathBuf, ConfigError> {
        utils::get_config_dir(profile)
            .map(|dir| dir.join("config.toml"))
            .ok_or(ConfigError::ConfigDirError)
    }

    fn default_database_path_for_profile(profile: utils::Profile) -> String {
        match utils::get_data_dir(profile) {
            Some(data_dir) => data_dir.join("tasks.db").to_string_lossy().into_owned(),
            None => format!("~/.local/share/{}/tasks.db", profile.app_name()),
        }
    }

    /// Database path with `~` expanded
    pub fn get_database_path(&self) -> PathBuf {
        utils::expand_path(&self.database_path)
    }

    /// User theme by name, then preset, then the default theme
    pub fn get_active_theme(&self) -> Theme {
        use crate::tui::widgets::color::{parse_color, get_contrast_text_color, format_color_for_display};

        let mut theme = self
            .themes
            .get(&self.current_theme)
            .cloned()
            .or_else(|| Theme::get_preset_themes().remove(&self.current_theme))
            .unwrap_or_default();

        if theme.highlight_fg.is_empty() {
            let contrast = get_contrast_text_color(parse_color(&theme.highlight_bg));
            theme.highlight_fg = format_color_for_display(&contrast);
        }

        theme
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Profile;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("config.toml");

        let config = Config::load_from_path(&path, Profile::Prod).unwrap();
        assert!(path.exists());
        assert_eq!(config.listen, "127.0.0.1:9000");
        assert_eq!(config.server_url, "http://localhost:9000");
        assert_eq!(config.key_bindings.complete, "c");
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "server_url = \"http://tasks.internal:8080\"\ndatabase_path = \"/srv/tasks.db\"\n\n[key_bindings]\nquit = \"x\"\n",
        )
        .unwrap();

        let config = Config::load_from_path(&path, Profile::Prod).unwrap();
        assert_eq!(config.server_url, "http://tasks.internal:8080");
        assert_eq!(config.get_database_path(), PathBuf::from("/srv/tasks.db"));
        assert_eq!(config.key_bindings.quit, "x");
        assert_eq!(config.key_bindings.new, "n");
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "listen = [").unwrap();
        assert!(matches!(
            Config::load_from_path(&path, Profile::Prod),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn unknown_theme_falls_back_to_default() {
        let config = Config {
            current_theme: "nope".to_string(),
            ..Config::default()
        };
        assert_eq!(config.get_active_theme().fg, "white");

        let light = Config {
            current_theme: "light".to_string(),
            ..Config::default()
        };
        assert_eq!(light.get_active_theme().bg, "white");
    }
}
