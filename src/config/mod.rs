mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = ["./flvscope.toml", "~/.config/flvscope/config.toml"];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.session.queue_capacity == 0 {
        anyhow::bail!("Session queue capacity cannot be 0");
    }

    if config.session.idle_timeout_secs == 0 {
        anyhow::bail!("Session idle timeout cannot be 0");
    }

    if config.session.render_tick_ms == 0 {
        anyhow::bail!("Session render tick cannot be 0");
    }

    if config.display.window_capacity == Some(0) {
        anyhow::bail!("Display window capacity cannot be 0");
    }

    Ok(())
}

/// Settings that load fine but are probably not what the user meant.
///
/// Returned rather than logged so the caller can report them once logging
/// is set up.
pub fn config_warnings(config: &Config) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.session.settle_period_secs < config.session.idle_timeout_secs {
        warnings.push(format!(
            "Settle period ({}s) is shorter than the idle timeout ({}s)",
            config.session.settle_period_secs, config.session.idle_timeout_secs
        ));
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.session.queue_capacity, 10);
        assert_eq!(config.session.idle_timeout().as_secs(), 5);
        assert_eq!(config.session.settle_period().as_secs(), 10);
        assert_eq!(config.session.render_tick().as_millis(), 250);
        assert_eq!(config.display.window_capacity, None);
        assert_eq!(config.display.width_margin, 5);
        assert_eq!(config.display.y_floor_ms, 200);
        assert!(config.logging.file_path().ends_with("flvscope.log"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = write_config(
            r#"
[session]
queue_capacity = 32

[display]
window_capacity = 80

[source]
user_agent = "probe/1.0"
"#,
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.session.queue_capacity, 32);
        assert_eq!(config.session.idle_timeout_secs, 5);
        assert_eq!(config.display.window_capacity, Some(80));
        assert_eq!(config.display.y_floor_ms, 200);
        assert_eq!(config.source.user_agent.as_deref(), Some("probe/1.0"));
        assert_eq!(config.source.connect_timeout_secs, 10);
    }

    #[test]
    fn test_rejects_zero_queue_capacity() {
        let file = write_config("[session]\nqueue_capacity = 0\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("queue capacity"));
    }

    #[test]
    fn test_rejects_zero_idle_timeout() {
        let file = write_config("[session]\nidle_timeout_secs = 0\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_rejects_zero_render_tick() {
        let file = write_config("[session]\nrender_tick_ms = 0\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let file = write_config("[session\nqueue_capacity = 3");
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(load_config_or_default(Some(&missing)).is_err());
    }

    #[test]
    fn test_short_settle_period_is_a_warning() {
        let file = write_config("[session]\nidle_timeout_secs = 8\nsettle_period_secs = 3\n");
        let config = load_config(file.path()).unwrap();

        let warnings = config_warnings(&config);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Settle period (3s)"));
        assert!(warnings[0].contains("idle timeout (8s)"));

        assert!(config_warnings(&Config::default()).is_empty());
    }
}
