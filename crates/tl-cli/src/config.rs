//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the time log file.
    pub log_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            log_path: data_dir.join("log.txt"),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    ///
    /// Later sources win: defaults, `<config_dir>/tl/config.toml`, `config_path`, then
    /// `TL_*` environment variables (e.g. `TL_LOG_PATH`).
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("TL_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for tl.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("tl"))
}

/// Returns the platform-specific data directory for tl.
///
/// On Linux: `~/.local/share/tl`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("tl"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    #[test]
    fn test_dirs_data_path_ends_with_tl() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "tl");
    }

    #[test]
    fn test_default_config_uses_data_dir_for_log() {
        let config = Config::default();
        let data_dir = dirs_data_path().unwrap();
        assert_eq!(config.log_path, data_dir.join("log.txt"));
    }

    #[test]
    fn test_config_file_overrides_log_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"log_path = "/tmp/tl-test/custom.log""#).unwrap();
        file.flush().unwrap();

        let config = Config::load_from(Some(file.path())).unwrap();
        assert_eq!(config.log_path, PathBuf::from("/tmp/tl-test/custom.log"));
    }

    #[test]
    fn test_debug_shows_log_path() {
        let config = Config {
            log_path: PathBuf::from("/var/log/tl.txt"),
        };
        assert_eq!(
            format!("{config:?}"),
            r#"Config { log_path: "/var/log/tl.txt" }"#
        );
    }
}
