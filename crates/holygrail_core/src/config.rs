//! Database location resolution.
//!
//! Sources, first match wins:
//! 1. explicit path passed by the caller
//! 2. `HOLYGRAIL_DB` environment variable
//! 3. `holygrailrc` in the working directory
//! 4. `$HOME/.holygrailrc`
//!
//! Config files are TOML:
//!
//! ```toml
//! [holygrail]
//! uri = "sqlite:///home/me/grail.db"
//! ```

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DB_ENV_VAR: &str = "HOLYGRAIL_DB";
pub const LOCAL_CONFIG_FILE: &str = "holygrailrc";
pub const HOME_CONFIG_FILE: &str = ".holygrailrc";

const SQLITE_URI_PREFIX: &str = "sqlite://";

#[derive(Debug)]
pub enum ConfigError {
    /// No source named a database.
    NoDatabaseConfiguration,
    ReadConfigFile {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseConfigFile {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoDatabaseConfiguration => write!(
                f,
                "no database configured; set {DB_ENV_VAR} or add a [holygrail] uri to ~/{HOME_CONFIG_FILE}"
            ),
            Self::ReadConfigFile { path, source } => {
                write!(f, "failed to read `{}`: {source}", path.display())
            }
            Self::ParseConfigFile { path, source } => {
                write!(f, "failed to parse `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NoDatabaseConfiguration => None,
            Self::ReadConfigFile { source, .. } => Some(source),
            Self::ParseConfigFile { source, .. } => Some(source),
        }
    }
}

/// Where the database path came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Explicit,
    Environment,
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub source: ConfigSource,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    holygrail: Option<HolygrailSection>,
}

#[derive(Debug, Default, Deserialize)]
struct HolygrailSection {
    uri: Option<String>,
}

impl DatabaseConfig {
    /// Resolves against the process environment and working directory.
    pub fn resolve(explicit: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::resolve_with(explicit, Path::new("."), |key| std::env::var(key).ok())
    }

    /// Resolves with an injected working directory and env getter.
    pub fn resolve_with<F>(
        explicit: Option<PathBuf>,
        working_dir: &Path,
        env: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = explicit {
            return Ok(Self {
                path,
                source: ConfigSource::Explicit,
            });
        }

        if let Some(value) = env(DB_ENV_VAR).and_then(non_blank) {
            return Ok(Self {
                path: strip_sqlite_prefix(&value),
                source: ConfigSource::Environment,
            });
        }

        let mut candidates = vec![working_dir.join(LOCAL_CONFIG_FILE)];
        if let Some(home) = env("HOME").and_then(non_blank) {
            candidates.push(PathBuf::from(home).join(HOME_CONFIG_FILE));
        }
        for candidate in candidates {
            if !candidate.is_file() {
                continue;
            }
            if let Some(path) = read_config_file(&candidate)? {
                return Ok(Self {
                    path,
                    source: ConfigSource::File(candidate),
                });
            }
        }

        Err(ConfigError::NoDatabaseConfiguration)
    }
}

/// Reads the `[holygrail] uri` key; `Ok(None)` when the key is absent.
pub fn read_config_file(path: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadConfigFile {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile =
        toml::from_str(&text).map_err(|source| ConfigError::ParseConfigFile {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(parsed
        .holygrail
        .and_then(|section| section.uri)
        .and_then(non_blank)
        .map(|uri| strip_sqlite_prefix(&uri)))
}

fn strip_sqlite_prefix(uri: &str) -> PathBuf {
    PathBuf::from(uri.strip_prefix(SQLITE_URI_PREFIX).unwrap_or(uri))
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{read_config_file, ConfigError, ConfigSource, DatabaseConfig, DB_ENV_VAR};
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn explicit_path_wins() {
        let config = DatabaseConfig::resolve_with(
            Some(PathBuf::from("/tmp/explicit.db")),
            Path::new("/nonexistent"),
            env_from(&[(DB_ENV_VAR, "/tmp/env.db")]),
        )
        .expect("explicit path");
        assert_eq!(config.path, PathBuf::from("/tmp/explicit.db"));
        assert_eq!(config.source, ConfigSource::Explicit);
    }

    #[test]
    fn env_var_strips_sqlite_prefix() {
        let config = DatabaseConfig::resolve_with(
            None,
            Path::new("/nonexistent"),
            env_from(&[(DB_ENV_VAR, "sqlite:///var/grail.db")]),
        )
        .expect("env path");
        assert_eq!(config.path, PathBuf::from("/var/grail.db"));
        assert_eq!(config.source, ConfigSource::Environment);
    }

    #[test]
    fn local_file_is_preferred_over_home_file() {
        let work = tempfile::tempdir().expect("tempdir");
        let home = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            work.path().join("holygrailrc"),
            "[holygrail]\nuri = \"sqlite:///work/grail.db\"\n",
        )
        .expect("write local rc");
        std::fs::write(
            home.path().join(".holygrailrc"),
            "[holygrail]\nuri = \"/home/grail.db\"\n",
        )
        .expect("write home rc");

        let home_str = home.path().to_str().expect("utf-8 tempdir");
        let config =
            DatabaseConfig::resolve_with(None, work.path(), env_from(&[("HOME", home_str)]))
                .expect("local rc");
        assert_eq!(config.path, PathBuf::from("/work/grail.db"));
        assert_eq!(
            config.source,
            ConfigSource::File(work.path().join("holygrailrc"))
        );
    }

    #[test]
    fn home_file_is_used_when_nothing_else_is_set() {
        let work = tempfile::tempdir().expect("tempdir");
        let home = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            home.path().join(".holygrailrc"),
            "[holygrail]\nuri = \"/home/grail.db\"\n",
        )
        .expect("write home rc");

        let home_str = home.path().to_str().expect("utf-8 tempdir");
        let config =
            DatabaseConfig::resolve_with(None, work.path(), env_from(&[("HOME", home_str)]))
                .expect("home rc");
        assert_eq!(config.path, PathBuf::from("/home/grail.db"));
    }

    #[test]
    fn missing_configuration_is_reported() {
        let work = tempfile::tempdir().expect("tempdir");
        let error = DatabaseConfig::resolve_with(None, work.path(), env_from(&[]))
            .expect_err("nothing configured");
        assert!(matches!(error, ConfigError::NoDatabaseConfiguration));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("holygrailrc");
        std::fs::write(&path, "[holygrail\nuri = ").expect("write rc");
        assert!(matches!(
            read_config_file(&path),
            Err(ConfigError::ParseConfigFile { .. })
        ));
    }

    #[test]
    fn file_without_uri_is_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("holygrailrc");
        std::fs::write(&path, "[other]\nkey = 1\n").expect("write rc");
        assert_eq!(read_config_file(&path).expect("valid toml"), None);
    }
}
