use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Bridge configuration, read from the `[readline]` table of `~/.linorc`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BridgeConfig {
    /// Engine shared library to load. The `LINO_ENGINE` environment
    /// variable overrides this; the platform soname is the fallback.
    #[serde(default)]
    pub engine_library: Option<PathBuf>,

    /// History file loaded at setup and used by default for saves.
    #[serde(default = "default_history_file")]
    pub history_file: Option<PathBuf>,

    #[serde(default = "default_max_history")]
    pub max_history_size: usize,

    /// Multi-line editing mode.
    #[serde(default)]
    pub multiline: bool,

    /// Whether an interrupt during read-line raises a cancellation.
    #[serde(default)]
    pub catch_break: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            engine_library: None,
            history_file: default_history_file(),
            max_history_size: default_max_history(),
            multiline: false,
            catch_break: false,
        }
    }
}

impl BridgeConfig {
    /// Load configuration from `~/.linorc`, falling back to defaults.
    pub fn load() -> Self {
        let config_path = std::env::var_os("HOME")
            .map(PathBuf::from)
            .or_else(dirs::home_dir)
            .map(|h| h.join(".linorc"))
            .unwrap_or_else(|| PathBuf::from(".linorc"));

        if let Ok(content) = std::fs::read_to_string(&config_path) {
            match toml::from_str::<LinorcFile>(&content) {
                Ok(file) => return file.readline,
                Err(e) => log::warn!("ignoring malformed {}: {e}", config_path.display()),
            }
        }

        Self::default()
    }

    /// Resolve the engine library: environment override, then the
    /// configured path, then the platform soname.
    pub fn engine_library_path(&self) -> PathBuf {
        if let Some(path) = std::env::var_os("LINO_ENGINE") {
            return PathBuf::from(path);
        }
        self.engine_library
            .clone()
            .unwrap_or_else(|| PathBuf::from(default_soname()))
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct LinorcFile {
    #[serde(default)]
    readline: BridgeConfig,
}

fn default_history_file() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".lino_history"))
}

fn default_max_history() -> usize {
    1000
}

fn default_soname() -> &'static str {
    if cfg!(target_os = "macos") {
        "liblinenoise.dylib"
    } else {
        "liblinenoise.so"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.max_history_size, 1000);
        assert!(!config.multiline);
        assert!(!config.catch_break);
        assert!(config.engine_library.is_none());
    }

    #[test]
    fn test_partial_table_fills_from_defaults() {
        let file: LinorcFile = toml::from_str(
            "[readline]\nmax_history_size = 50\ncatch_break = true\n",
        )
        .unwrap();
        let config = file.readline;
        assert_eq!(config.max_history_size, 50);
        assert!(config.catch_break);
        assert!(!config.multiline);
        assert_eq!(config.history_file, default_history_file());
    }

    #[test]
    fn test_empty_file_parses_to_defaults() {
        let file: LinorcFile = toml::from_str("").unwrap();
        assert_eq!(file.readline.max_history_size, 1000);
    }

    #[test]
    fn test_configured_engine_library_wins_over_soname() {
        let config = BridgeConfig {
            engine_library: Some(PathBuf::from("/opt/engines/liblinenoise.so.1")),
            ..BridgeConfig::default()
        };
        if std::env::var_os("LINO_ENGINE").is_none() {
            assert_eq!(
                config.engine_library_path(),
                PathBuf::from("/opt/engines/liblinenoise.so.1")
            );
        }
    }
}
