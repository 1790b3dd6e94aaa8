use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{
    env_subst::substitute_env,
    error::{Error, Result},
    schema::HublinkConfig,
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["hublink.toml", "hublink.yaml", "hublink.yml", "hublink.json"];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<HublinkConfig> {
    let raw = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./hublink.{toml,yaml,yml,json}` (project-local)
/// 2. `<user config dir>/hublink.{toml,yaml,yml,json}` (user-global)
///
/// Returns `HublinkConfig::default()` if no config file is found or the
/// file fails to load.
pub fn discover_and_load() -> HublinkConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    HublinkConfig::default()
}

/// Find the first config file in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    find_in(Path::new(".")).or_else(|| config_dir().and_then(|dir| find_in(&dir)))
}

fn find_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/hublink/` on Linux).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "hublink").map(|d| d.config_dir().to_path_buf())
}

/// Parse already-substituted config text, picking the format from the
/// extension of `path`. Files without an extension are read as TOML.
pub fn parse_config(raw: &str, path: &Path) -> Result<HublinkConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => toml::from_str(raw).map_err(|e| Error::parse(path, e)),
        "yaml" | "yml" => serde_yaml::from_str(raw).map_err(|e| Error::parse(path, e)),
        "json" => serde_json::from_str(raw).map_err(|e| Error::parse(path, e)),
        _ => Err(Error::UnsupportedFormat(ext.to_string())),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, hublink_protocol::Platform, secrecy::ExposeSecret, std::io::Write};

    fn write_config(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            "hublink.toml",
            r#"
[boundary]
name = "tg-main"
platform = "telegram"

[hub]
url = "wss://hub.example.org"
secret = "abc"
reconnect_delay_ms = 500
"#,
        );
        let config = load_config(&path).unwrap();
        assert_eq!(config.boundary.name, "tg-main");
        assert_eq!(config.boundary.platform, Platform::Telegram);
        assert_eq!(config.hub.url, "wss://hub.example.org");
        assert_eq!(config.hub.path, "/socket.io/");
        assert_eq!(config.hub.secret.unwrap().expose_secret(), "abc");
        assert_eq!(config.hub.reconnect_delay_ms, 500);
    }

    #[test]
    fn loads_yaml_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "hublink.yaml", "boundary:\n  name: dc\n");
        let config = load_config(&path).unwrap();
        assert_eq!(config.boundary.name, "dc");
        assert_eq!(config.boundary.platform, Platform::Console);
        assert_eq!(config.hub.url, crate::schema::DEFAULT_HUB_URL);
    }

    #[test]
    fn loads_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            "hublink.json",
            r#"{"hub": {"path": "/events"}, "boundary": {"platform": "slack"}}"#,
        );
        let config = load_config(&path).unwrap();
        assert_eq!(config.hub.path, "/events");
        assert_eq!(config.boundary.platform, Platform::Slack);
    }

    #[test]
    fn substitutes_defaults_before_parsing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            "hublink.toml",
            "[hub]\nurl = \"${HUBLINK_LOADER_TEST_UNSET_URL:-ws://fallback:1}\"\n",
        );
        let config = load_config(&path).unwrap();
        assert_eq!(config.hub.url, "ws://fallback:1");
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = parse_config("", Path::new("hublink.ini")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(ext) if ext == "ini"));
    }

    #[test]
    fn parse_error_names_the_file() {
        let err = parse_config("[boundary\n", Path::new("broken.toml")).unwrap_err();
        assert!(err.to_string().contains("broken.toml"), "{err}");
    }

    #[test]
    fn unknown_platform_fails_to_parse() {
        let err =
            parse_config("[boundary]\nplatform = \"fax\"\n", Path::new("x.toml")).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
    }

    #[test]
    fn find_in_prefers_toml() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "hublink.json", "{}");
        write_config(dir.path(), "hublink.toml", "");
        let found = find_in(dir.path()).unwrap();
        assert_eq!(found.file_name().unwrap(), "hublink.toml");
    }
}
