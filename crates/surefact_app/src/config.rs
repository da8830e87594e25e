use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use surefact_engine::StreamSettings;
use surefact_logging::sf_info;

use crate::cli::Args;

const DEFAULT_OUTPUT_DIR: &str = "reports";

/// Optional file-based settings; every field falls back to the engine default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub url: Option<String>,
    pub reconnect_delay_ms: Option<u64>,
    pub max_reconnect_attempts: Option<u32>,
    pub connect_timeout_ms: Option<u64>,
    pub idle_timeout_ms: Option<u64>,
    pub output_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: AppConfig = ron::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        sf_info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Engine settings with command-line flags taking precedence.
    pub fn stream_settings(&self, args: &Args) -> StreamSettings {
        let mut settings = StreamSettings::default();
        if let Some(url) = args.url.clone().or_else(|| self.url.clone()) {
            settings.url = url;
        }
        settings.bearer_token = args.token.clone();
        if let Some(ms) = self.reconnect_delay_ms {
            settings.reconnect.delay = Duration::from_millis(ms);
        }
        if let Some(attempts) = self.max_reconnect_attempts {
            settings.reconnect.max_attempts = attempts;
        }
        if let Some(ms) = self.connect_timeout_ms {
            settings.connect_timeout = Duration::from_millis(ms);
        }
        settings.idle_timeout = self.idle_timeout_ms.map(Duration::from_millis);
        settings
    }

    pub fn output_dir(&self, args: &Args) -> PathBuf {
        args.output
            .clone()
            .or_else(|| self.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn partial_ron_file_keeps_defaults() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("surefact.ron");
        fs::write(
            &path,
            "(url: Some(\"wss://research.example/ws\"), reconnect_delay_ms: Some(500))",
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        let args = Args::parse_from(["surefact", "topic"]);
        let settings = config.stream_settings(&args);

        assert_eq!(settings.url, "wss://research.example/ws");
        assert_eq!(settings.reconnect.delay, Duration::from_millis(500));
        assert_eq!(
            settings.reconnect.max_attempts,
            StreamSettings::default().reconnect.max_attempts
        );
        assert_eq!(settings.idle_timeout, None);
        assert_eq!(config.output_dir(&args), PathBuf::from(DEFAULT_OUTPUT_DIR));
    }

    #[test]
    fn flags_override_file_values() {
        let config = AppConfig {
            url: Some("ws://from-file/ws".to_string()),
            output_dir: Some(PathBuf::from("file-reports")),
            idle_timeout_ms: Some(60_000),
            ..AppConfig::default()
        };
        let args = Args::parse_from([
            "surefact",
            "topic",
            "--url",
            "ws://from-flag/ws",
            "--output",
            "flag-reports",
            "--token",
            "abc",
        ]);

        let settings = config.stream_settings(&args);
        assert_eq!(settings.url, "ws://from-flag/ws");
        assert_eq!(settings.bearer_token.as_deref(), Some("abc"));
        assert_eq!(settings.idle_timeout, Some(Duration::from_secs(60)));
        assert_eq!(config.output_dir(&args), PathBuf::from("flag-reports"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("broken.ron");
        fs::write(&path, "(url: 42").unwrap();
        assert!(AppConfig::load(&path).is_err());
        assert!(AppConfig::load(&temp.path().join("missing.ron")).is_err());
    }
}
