//! Configuration loading and validation

mod schema;

pub use schema::*;

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the file
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse YAML
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A value is out of range or inconsistent
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: String, reason: String },
}

/// Load configuration from a YAML file
pub fn load_config(path: &Path) -> Result<SynthConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&contents)
}

/// Parse and validate configuration from YAML text
pub fn parse_config(contents: &str) -> Result<SynthConfig, ConfigError> {
    // An empty file deserializes as unit, not as an empty mapping.
    let config: SynthConfig = if contents.trim().is_empty() {
        SynthConfig::default()
    } else {
        serde_yaml::from_str(contents)?
    };
    config.validate()?;
    Ok(config)
}

/// Example configuration written by `vectorchord init`
pub const EXAMPLE_CONFIG: &str = include_str!("../../vectorchord.example.yaml");

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_minimal_config() {
        let yaml = r#"
audio:
  sample_rate: 48000

bus:
  filter_cutoff: 2500
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.audio.sample_rate, 48000);
        assert_eq!(config.bus.filter_cutoff, 2500.0);
        assert_eq!(config.bus.output_gain, 0.4);
    }

    #[test]
    fn test_load_empty_file() {
        let file = NamedTempFile::new().unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config, SynthConfig::default());
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/vectorchord.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("audio: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_example_config_is_valid() {
        let config = parse_config(EXAMPLE_CONFIG).unwrap();
        assert_eq!(config.chords.len(), 7);
        assert_eq!(config, SynthConfig::default());
    }
}
