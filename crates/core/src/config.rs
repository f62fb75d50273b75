use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use reqwest::Url;
use serde::Deserialize;

use crate::error::{Error, Result};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/analyze";
pub const ENDPOINT_ENV: &str = "SCENELENS_ENDPOINT";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

static DEFAULT_URL: LazyLock<Url> = LazyLock::new(|| {
    parse_endpoint(DEFAULT_ENDPOINT).expect("DEFAULT_ENDPOINT is a valid http URL")
});

/// Where and how to reach the analysis service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub endpoint: Url,
    pub connect_timeout_secs: u64,
}

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub endpoint: Option<String>,
    pub connect_timeout_secs: Option<u64>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_URL.clone(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl ServiceConfig {
    /// Resolve the configuration: explicit endpoint, then `SCENELENS_ENDPOINT`,
    /// then the user's config file, then the built-in default.
    pub fn resolve(endpoint_override: Option<&str>) -> Result<Self> {
        let env_endpoint = std::env::var(ENDPOINT_ENV).ok();
        let file = match config_path() {
            Some(path) => load_file(&path)?,
            None => None,
        };
        Self::from_sources(endpoint_override, env_endpoint.as_deref(), file)
    }

    pub fn from_sources(
        endpoint_override: Option<&str>,
        env_endpoint: Option<&str>,
        file: Option<ConfigFile>,
    ) -> Result<Self> {
        let file = file.unwrap_or_default();
        let endpoint = endpoint_override
            .or(env_endpoint)
            .or(file.endpoint.as_deref())
            .map(parse_endpoint)
            .transpose()?;

        let defaults = Self::default();
        Ok(Self {
            endpoint: endpoint.unwrap_or(defaults.endpoint),
            connect_timeout_secs: file
                .connect_timeout_secs
                .unwrap_or(defaults.connect_timeout_secs),
        })
    }
}

pub fn parse_endpoint(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| Error::Config {
        message: format!("invalid endpoint {raw:?}: {e}"),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::Config {
            message: format!("endpoint must use http or https, got {}", url.scheme()),
        });
    }
    Ok(url)
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("scenelens").join("config.toml"))
}

/// Read a config file. A missing file is not an error.
pub fn load_file(path: &Path) -> Result<Option<ConfigFile>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(Error::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    Ok(Some(toml::from_str(&content)?))
}
