use serde::Deserialize;
use tracing::{debug, instrument};

use oskit_base::{FilePath, OsError, OsResult, PalHandle, Platform, ResultExt};

/// Facade configuration, usually read from `oskit.toml`.
///
/// Every field is optional; an empty file yields the defaults.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OsConfig {
    /// Platform the configuration was written for; `Os::from_config` refuses any other host.
    #[serde(default)]
    pub platform: Option<Platform>,
    /// Fixed seed for `random_string`, for reproducible output.
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Tracing filter directive such as `oskit=debug`.
    #[serde(default)]
    pub log_filter: Option<String>,
}

impl OsConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml(text: &str) -> OsResult<Self> {
        toml::from_str(text)
            .map_err(|e| Box::new(OsError::message(format!("Invalid configuration: {}", e.message()))))
    }
}

/// Load the configuration file at `path` through the PAL.
#[instrument(skip(pal), fields(path = %path))]
pub fn load_config(pal: &PalHandle, path: &FilePath) -> OsResult<OsConfig> {
    let text = pal
        .read_file_to_string(path)
        .with_context(|| format!("reading configuration {}", path))?;
    let config = OsConfig::from_toml(&text).with_context(|| format!("parsing configuration {}", path))?;
    debug!(?config, "configuration loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;
    use oskit_base::{FailureReason, MockPal};

    #[test]
    fn test_parse_full_config() {
        let config = OsConfig::from_toml(
            r#"
            platform = "windows"
            random_seed = 42
            log_filter = "oskit=debug"
            "#,
        )
        .unwrap();
        assert_eq!(
            config,
            OsConfig {
                platform: Some(Platform::Windows),
                random_seed: Some(42),
                log_filter: Some("oskit=debug".to_string()),
            }
        );
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(OsConfig::from_toml("").unwrap(), OsConfig::default());
    }

    #[test]
    fn test_unknown_platform_is_rejected() {
        let error = OsConfig::from_toml(r#"platform = "beos""#).unwrap_err();
        assert!(error.to_string().starts_with("Invalid configuration: "));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(OsConfig::from_toml("colour = true").is_err());
    }

    #[test]
    fn test_load_config_through_pal() {
        let mock = MockPal::new();
        mock.add_file("/etc/oskit.toml", "random_seed = 7\n");
        let pal = PalHandle::new(mock);

        let config = load_config(&pal, &FilePath::from("/etc/oskit.toml")).unwrap();
        assert_eq!(config.random_seed, Some(7));
        assert_eq!(config.platform, None);
    }

    #[test]
    fn test_load_config_missing_file() {
        let pal = PalHandle::new(MockPal::new());
        let error = load_config(&pal, &FilePath::from("/oskit.toml")).unwrap_err();

        assert_eq!(error.reason(), FailureReason::NotFound);
        expect![[r#"reading configuration /oskit.toml: File error at /oskit.toml: no such file or directory"#]]
            .assert_eq(&error.to_string());
    }
}
