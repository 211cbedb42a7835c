//! Server configuration
//!
//! Configuration is loaded from a TOML file or assembled from environment
//! variables. The core engine never reads this directly; the validator and
//! server are constructed from it once at startup.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    /// Directories all operations are confined to
    #[serde(default = "default_roots")]
    pub roots: Vec<String>,
}

fn default_roots() -> Vec<String> {
    vec!["/data".to_string()]
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            roots: default_roots(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Scopes granted to the connected client. Opaque strings; `admin`
    /// implies everything.
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
}

fn default_scopes() -> Vec<String> {
    vec!["read".to_string(), "write".to_string()]
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            scopes: default_scopes(),
        }
    }
}

impl AuthConfig {
    pub fn grants(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope || s == "admin")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Ignore patterns applied to searches when the caller supplies none
    #[serde(default = "default_ignore_patterns")]
    pub default_ignore: Vec<String>,
}

fn default_ignore_patterns() -> Vec<String> {
    [
        ".git/",
        ".svn/",
        "node_modules/",
        "target/",
        "__pycache__/",
        "*.log",
        ".DS_Store",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_ignore: default_ignore_patterns(),
        }
    }
}

impl Config {
    /// Load config from standard locations.
    ///
    /// Search order:
    /// 1. `REMOTEFS_CONFIG_PATH` env var
    /// 2. `./remotefs-mcp.toml`
    /// 3. `$XDG_CONFIG_HOME/remotefs-mcp/config.toml`
    /// 4. `~/.remotefs-mcp.toml`
    /// 5. `DATA_DIR` env var as the single root
    /// 6. Built-in defaults
    pub fn load() -> Self {
        if let Ok(env_path) = std::env::var("REMOTEFS_CONFIG_PATH") {
            let path = PathBuf::from(&env_path);
            if path.exists() {
                if let Some(config) = Self::try_file(&path) {
                    return config;
                }
            } else {
                tracing::warn!("REMOTEFS_CONFIG_PATH={} does not exist", env_path);
            }
        }

        let mut config_paths = vec![PathBuf::from("remotefs-mcp.toml")];
        if let Some(config_dir) = dirs::config_dir() {
            config_paths.push(config_dir.join("remotefs-mcp").join("config.toml"));
        }
        if let Some(home) = dirs::home_dir() {
            config_paths.push(home.join(".remotefs-mcp.toml"));
        }

        for path in config_paths {
            if path.exists() {
                if let Some(config) = Self::try_file(&path) {
                    return config;
                }
            }
        }

        if let Ok(data_dir) = std::env::var("DATA_DIR") {
            tracing::info!("Using DATA_DIR={} as the allowed root", data_dir);
            return Self {
                paths: PathConfig {
                    roots: vec![data_dir],
                },
                ..Default::default()
            };
        }

        tracing::info!("Using default configuration");
        Self::default()
    }

    fn try_file(path: &PathBuf) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str::<Self>(&content) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                Some(config)
            }
            Err(e) => {
                tracing::warn!("Failed to parse config {}: {}", path.display(), e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_roots_and_scopes() {
        let config = Config::default();
        assert_eq!(config.paths.roots, vec!["/data"]);
        assert!(config.auth.grants("read"));
        assert!(config.auth.grants("write"));
    }

    #[test]
    fn admin_scope_implies_all() {
        let auth = AuthConfig {
            scopes: vec!["admin".to_string()],
        };
        assert!(auth.grants("read"));
        assert!(auth.grants("write"));
        assert!(!AuthConfig { scopes: vec![] }.grants("read"));
    }

    #[test]
    fn parses_toml() {
        let config: Config = toml::from_str(
            r#"
            [paths]
            roots = ["/srv/files", "/srv/shared"]

            [auth]
            scopes = ["read"]
            "#,
        )
        .unwrap();
        assert_eq!(config.paths.roots.len(), 2);
        assert!(config.auth.grants("read"));
        assert!(!config.auth.grants("write"));
        assert!(!config.search.default_ignore.is_empty());
    }
}
