//! CLI configuration utilities

use anyhow::{Context, Result};
use gstpro_http::client::config::ClientConfig;
use std::path::{Path, PathBuf};

/// Config file looked up in the data directory when `--config` is not given
pub const CONFIG_FILE: &str = "config.toml";

/// Resolve the data directory: explicit flag, then `GSTPRO_STATE_DIR`, then
/// the platform data directory
pub fn data_dir(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| {
        if let Ok(state_dir) = std::env::var("GSTPRO_STATE_DIR") {
            PathBuf::from(state_dir)
        } else {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("gstpro")
        }
    })
}

/// Load client settings
///
/// Defaults are overlaid by the TOML file and then by `GSTPRO_*` variables.
/// An explicitly named file must exist; the default one is optional.
pub fn load_client_config(explicit: Option<&Path>, data_dir: &Path) -> Result<ClientConfig> {
    let defaults = ClientConfig::default();
    let (path, required) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => (data_dir.join(CONFIG_FILE), false),
    };

    let settings = config::Config::builder()
        .set_default("base_url", defaults.base_url)?
        .set_default("api_prefix", defaults.api_prefix)?
        .set_default("user_agent", defaults.user_agent)?
        .add_source(
            config::File::from(path.as_path())
                .format(config::FileFormat::Toml)
                .required(required),
        )
        .add_source(config::Environment::with_prefix("GSTPRO"))
        .build()
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_default_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_client_config(None, dir.path()).unwrap();
        assert_eq!(config.api_prefix, "/api/v1");
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "api_prefix = \"/api/v2\"\ntimeout_secs = 30\n",
        )
        .unwrap();

        let config = load_client_config(None, dir.path()).unwrap();
        assert_eq!(config.api_prefix, "/api/v2");
        assert_eq!(config.timeout_secs, Some(30));
        assert_eq!(config.user_agent, ClientConfig::default().user_agent);
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(load_client_config(Some(&missing), dir.path()).is_err());
    }

    #[test]
    fn test_explicit_data_dir_wins() {
        let dir = PathBuf::from("/tmp/gstpro-test");
        assert_eq!(data_dir(Some(dir.clone())), dir);
    }
}
