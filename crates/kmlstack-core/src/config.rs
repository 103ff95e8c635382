use crate::error::{Result, StackerError};
use crate::timestamp::DateOnlyPolicy;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered session configuration for kmlstack
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Time of day substituted into date-only timestamps.
    pub date_only_time: ConfigValue<NaiveTime>,
    /// Whether date-only timestamps count as timestamped in statistics.
    pub date_only_policy: ConfigValue<DateOnlyPolicy>,
    /// File name written by the merge command when no output is given.
    pub merge_output: ConfigValue<String>,
}

impl SessionConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            date_only_time: ConfigValue::new(NaiveTime::MIN, ConfigSource::Default),
            date_only_policy: ConfigValue::new(DateOnlyPolicy::default(), ConfigSource::Default),
            merge_output: ConfigValue::new("merged_colored.kml".to_string(), ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    ///
    /// Times must be quoted strings ("12:00:00"), not bare TOML time
    /// literals.
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| StackerError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| StackerError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        // Update values from file
        if let Some(date_only_time) = file_config.date_only_time {
            self.date_only_time.update(date_only_time, ConfigSource::File);
        }

        if let Some(date_only_policy) = file_config.date_only_policy {
            self.date_only_policy.update(date_only_policy, ConfigSource::File);
        }

        if let Some(merge_output) = file_config.merge_output {
            self.merge_output.update(merge_output, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // KMLSTACK_DATE_ONLY_TIME
        if let Ok(time_str) = env::var("KMLSTACK_DATE_ONLY_TIME") {
            match parse_time_of_day(&time_str) {
                Ok(time) => self.date_only_time.update(time, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid KMLSTACK_DATE_ONLY_TIME value '{}': expected HH:MM or HH:MM:SS",
                    time_str
                ),
            }
        }

        // KMLSTACK_DATE_ONLY_POLICY
        if let Ok(policy_str) = env::var("KMLSTACK_DATE_ONLY_POLICY") {
            match parse_date_only_policy(&policy_str) {
                Ok(policy) => self.date_only_policy.update(policy, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid KMLSTACK_DATE_ONLY_POLICY value '{}': expected timestamped or missing",
                    policy_str
                ),
            }
        }

        // KMLSTACK_MERGE_OUTPUT
        if let Ok(merge_output) = env::var("KMLSTACK_MERGE_OUTPUT") {
            self.merge_output.update(merge_output, ConfigSource::Environment);
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(date_only_time) = overrides.date_only_time {
            self.date_only_time.update(date_only_time, ConfigSource::Cli);
        }

        if let Some(date_only_policy) = overrides.date_only_policy {
            self.date_only_policy.update(date_only_policy, ConfigSource::Cli);
        }

        if let Some(merge_output) = overrides.merge_output {
            self.merge_output.update(merge_output, ConfigSource::Cli);
        }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "date_only_time".to_string(),
            (
                self.date_only_time.value.format("%H:%M:%S").to_string(),
                self.date_only_time.source,
            ),
        );

        map.insert(
            "date_only_policy".to_string(),
            (
                format!("{:?}", self.date_only_policy.value),
                self.date_only_policy.source,
            ),
        );

        map.insert(
            "merge_output".to_string(),
            (self.merge_output.value.clone(), self.merge_output.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    date_only_time: Option<NaiveTime>,
    date_only_policy: Option<DateOnlyPolicy>,
    merge_output: Option<String>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub date_only_time: Option<NaiveTime>,
    pub date_only_policy: Option<DateOnlyPolicy>,
    pub merge_output: Option<String>,
}

/// Parse a time of day from string
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|_| StackerError::ConfigInvalid {
            key: "date_only_time".to_string(),
            reason: format!("Invalid time of day: {}. Use HH:MM or HH:MM:SS", s),
        })
}

/// Parse a date-only policy from string
pub fn parse_date_only_policy(s: &str) -> Result<DateOnlyPolicy> {
    match s.to_lowercase().as_str() {
        "timestamped" | "with" | "count-as-timestamped" => Ok(DateOnlyPolicy::CountAsTimestamped),
        "missing" | "without" | "count-as-missing" => Ok(DateOnlyPolicy::CountAsMissing),
        _ => Err(StackerError::ConfigInvalid {
            key: "date_only_policy".to_string(),
            reason: format!("Invalid date-only policy: {}. Use timestamped or missing", s),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::with_defaults();
        assert_eq!(config.date_only_time.value, NaiveTime::MIN);
        assert_eq!(config.date_only_time.source, ConfigSource::Default);
        assert_eq!(
            config.date_only_policy.value,
            DateOnlyPolicy::CountAsTimestamped
        );
        assert_eq!(config.merge_output.value, "merged_colored.kml");
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(100, ConfigSource::Default);

        // File should override default
        value.update(200, ConfigSource::File);
        assert_eq!(value.value, 200);
        assert_eq!(value.source, ConfigSource::File);

        // Environment should override file
        value.update(300, ConfigSource::Environment);
        assert_eq!(value.value, 300);
        assert_eq!(value.source, ConfigSource::Environment);

        // CLI should override environment
        value.update(400, ConfigSource::Cli);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);

        // Lower precedence should not override
        value.update(500, ConfigSource::File);
        assert_eq!(value.value, 400); // Still CLI value
        assert_eq!(value.source, ConfigSource::Cli);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
date_only_time = "12:00:00"
date_only_policy = "CountAsMissing"
merge_output = "session.kml"
"#
        )
        .unwrap();

        let config = SessionConfig::with_defaults()
            .load_from_file(file.path())
            .unwrap();

        assert_eq!(
            config.date_only_time.value,
            NaiveTime::from_hms_opt(12, 0, 0).unwrap()
        );
        assert_eq!(config.date_only_time.source, ConfigSource::File);
        assert_eq!(config.date_only_policy.value, DateOnlyPolicy::CountAsMissing);
        assert_eq!(config.merge_output.value, "session.kml");
    }

    #[test]
    fn test_load_from_missing_file() {
        let result = SessionConfig::with_defaults().load_from_file("/nonexistent/kmlstack.toml");
        assert!(matches!(
            result,
            Err(StackerError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = SessionConfig::with_defaults();

        let overrides = CliConfigOverrides {
            date_only_time: Some(NaiveTime::from_hms_opt(8, 30, 0).unwrap()),
            date_only_policy: Some(DateOnlyPolicy::CountAsMissing),
            merge_output: None,
        };

        config.update_from_cli(overrides);

        assert_eq!(
            config.date_only_time.value,
            NaiveTime::from_hms_opt(8, 30, 0).unwrap()
        );
        assert_eq!(config.date_only_time.source, ConfigSource::Cli);
        assert_eq!(config.date_only_policy.value, DateOnlyPolicy::CountAsMissing);
        assert_eq!(config.date_only_policy.source, ConfigSource::Cli);
        // This should still be a default
        assert_eq!(config.merge_output.source, ConfigSource::Default);
    }

    #[test]
    fn test_parse_time_of_day() {
        assert_eq!(
            parse_time_of_day("12:00:00").unwrap(),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap()
        );
        assert_eq!(
            parse_time_of_day("08:15").unwrap(),
            NaiveTime::from_hms_opt(8, 15, 0).unwrap()
        );
        assert!(parse_time_of_day("noon").is_err());
        assert!(parse_time_of_day("25:00").is_err());
    }

    #[test]
    fn test_parse_date_only_policy() {
        assert_eq!(
            parse_date_only_policy("timestamped").unwrap(),
            DateOnlyPolicy::CountAsTimestamped
        );
        assert_eq!(
            parse_date_only_policy("MISSING").unwrap(),
            DateOnlyPolicy::CountAsMissing
        );
        assert_eq!(
            parse_date_only_policy("count-as-timestamped").unwrap(),
            DateOnlyPolicy::CountAsTimestamped
        );
        assert!(parse_date_only_policy("invalid").is_err());
    }

    #[test]
    fn test_inspection_map() {
        let config = SessionConfig::with_defaults();
        let map = config.to_inspection_map();

        assert!(map.contains_key("date_only_time"));
        assert!(map.contains_key("date_only_policy"));
        assert!(map.contains_key("merge_output"));

        let (time_value, time_source) = &map["date_only_time"];
        assert_eq!(time_value, "00:00:00");
        assert_eq!(*time_source, ConfigSource::Default);
    }
}
