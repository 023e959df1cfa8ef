use std::env;

/// Configuration for the logging system
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Custom log directory path (overrides auto-detection)
    pub custom_log_dir: Option<String>,

    /// Log level for console output (default: "info")
    pub console_log_level: String,

    /// Log level for file output (default: "debug")
    pub file_log_level: String,

    /// Log format: "json", "pretty", or "compact" (default: "json")
    pub format: LogFormat,

    /// Maximum log file size in MB before rotation (default: 50)
    pub max_size_mb: u64,

    /// Log retention in days (default: 30)
    pub retention_days: u32,

    /// Maximum total log directory size in MB (default: 1000)
    pub max_total_size_mb: u64,

    /// Enable log compression (default: true)
    pub compression_enabled: bool,

    /// Enable background cleanup task (default: true)
    pub enable_cleanup: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            custom_log_dir: None,
            console_log_level: "info".to_string(),
            file_log_level: "debug".to_string(),
            format: LogFormat::Compact,
            max_size_mb: 50,
            retention_days: 30,
            max_total_size_mb: 1000,
            compression_enabled: true,
            enable_cleanup: true,
        }
    }
}

impl LogConfig {
    /// Load logging configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("TTS_BATCH_LOG_DIR") {
            config.custom_log_dir = Some(dir);
        }

        config.console_log_level =
            env::var("RUST_LOG").unwrap_or_else(|_| "tts_batch=info".to_string());

        if let Ok(level) = env::var("TTS_BATCH_FILE_LOG_LEVEL") {
            config.file_log_level = level;
        }

        if let Ok(format_str) = env::var("TTS_BATCH_LOG_FORMAT") {
            config.format = match format_str.to_lowercase().as_str() {
                "pretty" => LogFormat::Pretty,
                "json" => LogFormat::Json,
                _ => LogFormat::Compact,
            };
        }

        if let Ok(val) = env::var("TTS_BATCH_LOG_MAX_SIZE_MB") {
            if let Ok(size) = val.parse() {
                config.max_size_mb = size;
            }
        }

        if let Ok(val) = env::var("TTS_BATCH_LOG_RETENTION_DAYS") {
            if let Ok(days) = val.parse() {
                config.retention_days = days;
            }
        }

        if let Ok(val) = env::var("TTS_BATCH_LOG_MAX_TOTAL_SIZE_MB") {
            if let Ok(size) = val.parse() {
                config.max_total_size_mb = size;
            }
        }

        if let Ok(val) = env::var("TTS_BATCH_LOG_COMPRESSION") {
            config.compression_enabled = val.to_lowercase() == "true";
        }

        if let Ok(val) = env::var("TTS_BATCH_LOG_ENABLE_CLEANUP") {
            config.enable_cleanup = val.to_lowercase() == "true";
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.console_log_level, "info");
        assert_eq!(config.file_log_level, "debug");
        assert_eq!(config.max_size_mb, 50);
        assert_eq!(config.retention_days, 30);
        assert_eq!(config.max_total_size_mb, 1000);
        assert!(config.compression_enabled);
        assert!(config.enable_cleanup);
    }

    #[test]
    fn test_from_env_defaults() {
        env::remove_var("TTS_BATCH_LOG_DIR");
        env::remove_var("RUST_LOG");
        env::remove_var("TTS_BATCH_LOG_MAX_SIZE_MB");

        let config = LogConfig::from_env();
        assert_eq!(config.max_size_mb, 50);
        assert_eq!(config.retention_days, 30);
    }

    #[test]
    fn test_from_env_custom_values() {
        env::set_var("TTS_BATCH_LOG_MAX_SIZE_MB", "100");
        env::set_var("TTS_BATCH_LOG_RETENTION_DAYS", "60");
        env::set_var("TTS_BATCH_LOG_COMPRESSION", "false");

        let config = LogConfig::from_env();
        assert_eq!(config.max_size_mb, 100);
        assert_eq!(config.retention_days, 60);
        assert!(!config.compression_enabled);

        env::remove_var("TTS_BATCH_LOG_MAX_SIZE_MB");
        env::remove_var("TTS_BATCH_LOG_RETENTION_DAYS");
        env::remove_var("TTS_BATCH_LOG_COMPRESSION");
    }
}
