//! Wirebuf Configuration
//!
//! Handles parsing and management of wirebuf.toml configuration files.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::buffer::Buffer;
use crate::diagnostics::{LogChannel, SilentSink, DEFAULT_CHANNEL};
use crate::error::{BufferError, BufferResult};

/// Name of the configuration file searched for by [`WirebufConfig::find_and_load`].
pub const CONFIG_FILE: &str = "wirebuf.toml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Root configuration structure matching wirebuf.toml.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WirebufConfig {
    /// Buffer limits
    #[serde(default)]
    pub buffer: BufferConfig,

    /// Where failures are reported
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

impl WirebufConfig {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let config: WirebufConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the current directory or parents.
    pub fn load_from_cwd() -> ConfigResult<Self> {
        let cwd = std::env::current_dir().map_err(ConfigError::Io)?;
        Self::find_and_load(&cwd)
    }

    /// Find and load configuration by searching up from the given directory.
    pub fn find_and_load(start_dir: &Path) -> ConfigResult<Self> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                return Self::load(&config_path);
            }
            if !dir.pop() {
                return Ok(Self::default());
            }
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.buffer.max_capacity == 0 {
            return Err(ConfigError::Invalid(
                "buffer.max_capacity must be greater than zero".to_string(),
            ));
        }
        if u32::try_from(self.buffer.max_capacity).is_err() {
            return Err(ConfigError::Invalid(format!(
                "buffer.max_capacity {} exceeds the 32-bit range",
                self.buffer.max_capacity
            )));
        }
        if self.diagnostics.channel.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "diagnostics.channel must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Create a buffer within the configured limit, reporting to the configured channel.
    pub fn create_buffer(&self, capacity: u32) -> BufferResult<Buffer> {
        self.create_buffer_with(capacity, self.diagnostics.channel())
    }

    /// Create a buffer within the configured limit, reporting to `log`.
    pub fn create_buffer_with(&self, capacity: u32, log: LogChannel) -> BufferResult<Buffer> {
        if u64::from(capacity) > self.buffer.max_capacity {
            log.error(&format!(
                "refusing to allocate {} bytes (limit is {})",
                capacity, self.buffer.max_capacity
            ));
            return Err(BufferError::AllocationFailure {
                requested: capacity as usize,
            });
        }
        Buffer::create_with(capacity, log)
    }
}

/// Buffer limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BufferConfig {
    /// Largest capacity `create_buffer` will allocate
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
}

fn default_max_capacity() -> u64 {
    16 * 1024 * 1024
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            max_capacity: default_max_capacity(),
        }
    }
}

/// Which sink a channel writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    #[default]
    Tracing,
    Stderr,
    Silent,
}

/// Diagnostics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Log channel name
    #[serde(default = "default_channel")]
    pub channel: String,

    /// Sink backing the channel
    #[serde(default)]
    pub sink: SinkKind,
}

fn default_channel() -> String {
    DEFAULT_CHANNEL.to_string()
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            channel: default_channel(),
            sink: SinkKind::default(),
        }
    }
}

impl DiagnosticsConfig {
    /// Build the configured channel.
    pub fn channel(&self) -> LogChannel {
        let name = self.channel.as_str();
        match self.sink {
            SinkKind::Tracing => LogChannel::tracing(name),
            SinkKind::Stderr => LogChannel::stderr(name),
            SinkKind::Silent => LogChannel::new(name, Arc::new(SilentSink)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{MemorySink, Severity};
    use std::env::temp_dir;

    #[test]
    fn test_default_config() {
        let config = WirebufConfig::default();
        assert_eq!(config.buffer.max_capacity, 16 * 1024 * 1024);
        assert_eq!(config.diagnostics.channel, "wirebuf");
        assert_eq!(config.diagnostics.sink, SinkKind::Tracing);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
[buffer]
max_capacity = 1024

[diagnostics]
channel = "ipc"
sink = "silent"
"#;
        let config: WirebufConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.buffer.max_capacity, 1024);
        assert_eq!(config.diagnostics.channel, "ipc");
        assert_eq!(config.diagnostics.sink, SinkKind::Silent);
        assert_eq!(config.diagnostics.channel().name(), "ipc");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: WirebufConfig = toml::from_str("[diagnostics]\nsink = \"stderr\"\n").unwrap();
        assert_eq!(config.buffer.max_capacity, default_max_capacity());
        assert_eq!(config.diagnostics.channel, "wirebuf");
        assert_eq!(config.diagnostics.sink, SinkKind::Stderr);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = WirebufConfig::default();
        config.buffer.max_capacity = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = WirebufConfig::default();
        config.buffer.max_capacity = u64::from(u32::MAX) + 1;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = WirebufConfig::default();
        config.diagnostics.channel = "  ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_create_buffer_enforces_limit() {
        let mut config = WirebufConfig::default();
        config.buffer.max_capacity = 8;
        config.diagnostics.sink = SinkKind::Silent;

        let buf = config.create_buffer(8).unwrap();
        assert_eq!(buf.capacity(), 8);
        assert_eq!(buf.log_channel().name(), "wirebuf");

        assert_eq!(
            config.create_buffer(9).unwrap_err(),
            BufferError::AllocationFailure { requested: 9 }
        );

        let sink = Arc::new(MemorySink::new());
        let log = LogChannel::new("limit", sink.clone());
        assert!(config.create_buffer_with(9, log.clone()).is_err());
        assert_eq!(sink.count(Severity::Error), 1);
        assert_eq!(sink.len(), 1);

        config.create_buffer_with(8, log).unwrap();
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_save_and_find() {
        let root = temp_dir().join("wirebuf_test_config");
        let nested = root.join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let mut config = WirebufConfig::default();
        config.buffer.max_capacity = 512;
        config.diagnostics.channel = "saved".to_string();
        config.save(&root.join(CONFIG_FILE)).unwrap();

        let found = WirebufConfig::find_and_load(&nested).unwrap();
        assert_eq!(found.buffer.max_capacity, 512);
        assert_eq!(found.diagnostics.channel, "saved");

        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_load_missing_file() {
        let path = temp_dir().join("wirebuf_definitely_missing.toml");
        assert!(matches!(
            WirebufConfig::load(&path),
            Err(ConfigError::NotFound(_))
        ));
    }
}
