use std::path::{Path, PathBuf};

use serde::Deserialize;

/// File looked up in the working directory at startup.
pub const CONFIG_FILE: &str = "fund-panda.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Startup settings. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Dataset read at startup.
    pub data_path: PathBuf,
    /// Initial window size in points.
    pub window_size: [f32; 2],
    /// Scatter marker radius in points.
    pub point_radius: f32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/data.parquet"),
            window_size: [1400.0, 900.0],
            point_radius: 2.5,
        }
    }
}

impl DashboardConfig {
    /// Read a config file. A missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Config from [`CONFIG_FILE`], falling back to defaults on any error.
    pub fn load() -> Self {
        match Self::from_file(Path::new(CONFIG_FILE)) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("ignoring config: {e}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = DashboardConfig::from_file(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(cfg, DashboardConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{ "data_path": "funds.csv", "point_radius": 4 }"#).unwrap();
        let cfg = DashboardConfig::from_file(&path).unwrap();
        assert_eq!(cfg.data_path, PathBuf::from("funds.csv"));
        assert_eq!(cfg.point_radius, 4.0);
        assert_eq!(cfg.window_size, DashboardConfig::default().window_size);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            DashboardConfig::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
