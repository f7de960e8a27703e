//! One-call logging setup for command line programs.
//!
//! Every event carries a UTC timestamp, its level, target, source file and line,
//! and the name of the emitting thread. Events are rendered either as console
//! text (optionally coloured) or as one JSON object per line.

use crate::utils::error::{NpgError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_path, Validate};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Logging settings, usually taken from command line flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogOptions {
    /// A logging configuration file. When set, `debug` and `verbose` are ignored.
    pub config_file: Option<PathBuf>,
    /// DEBUG level logging. Overrides `verbose`.
    pub debug: bool,
    /// INFO level logging.
    pub verbose: bool,
    /// ANSI colour in console output.
    pub colour: bool,
    /// JSON output. Overrides `colour`.
    pub json: bool,
}

impl LogOptions {
    pub fn level(&self) -> LevelFilter {
        if self.debug {
            LevelFilter::DEBUG
        } else if self.verbose {
            LevelFilter::INFO
        } else {
            LevelFilter::ERROR
        }
    }
}

/// Where log output goes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stderr,
    Stdout,
    /// Appended to, created if absent.
    File(PathBuf),
}

/// Contents of a logging configuration file (JSON, or TOML by extension).
///
/// ```json
/// {
///   "level": "info",
///   "directives": ["npg=debug"],
///   "output": {"file": "/var/log/app.log"}
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogFileConfig {
    pub level: String,
    /// Extra `EnvFilter` directives, e.g. `my_crate::db=trace`.
    pub directives: Vec<String>,
    pub output: LogOutput,
    /// Overrides the `colour` flag for console output.
    pub ansi: Option<bool>,
    pub with_target: bool,
    pub with_file: bool,
    pub with_line_number: bool,
    pub with_thread_names: bool,
}

impl Default for LogFileConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::ERROR.to_string(),
            directives: Vec::new(),
            output: LogOutput::default(),
            ansi: None,
            with_target: true,
            with_file: true,
            with_line_number: true,
            with_thread_names: true,
        }
    }
}

impl LogFileConfig {
    pub fn from_level(level: LevelFilter) -> Self {
        Self {
            level: level.to_string(),
            ..Self::default()
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&content)?,
            _ => serde_json::from_str(&content)?,
        };
        config.validate()?;

        Ok(config)
    }

    /// The level followed by any extra directives, in `EnvFilter` syntax.
    pub fn filter_spec(&self) -> String {
        std::iter::once(self.level.trim())
            .chain(self.directives.iter().map(|d| d.trim()))
            .filter(|d| !d.is_empty())
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn env_filter(&self) -> Result<EnvFilter> {
        EnvFilter::try_new(self.filter_spec()).map_err(|e| NpgError::LoggingError {
            message: format!("invalid filter '{}': {}", self.filter_spec(), e),
        })
    }

    pub fn make_writer(&self) -> Result<BoxMakeWriter> {
        let writer = match &self.output {
            LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
            LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
            LogOutput::File(path) => {
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                BoxMakeWriter::new(Mutex::new(file))
            }
        };
        Ok(writer)
    }
}

impl Validate for LogFileConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("level", &self.level)?;
        if let LogOutput::File(path) = &self.output {
            validate_path("output.file", &path.to_string_lossy())?;
        }
        self.env_filter().map(|_| ())
    }
}

/// Installs the global `tracing` subscriber.
///
/// Fails with [`NpgError::LoggingError`] if a global subscriber is already set.
pub fn configure_logging(options: &LogOptions) -> Result<()> {
    let file_config = match &options.config_file {
        Some(path) => LogFileConfig::from_file(path)?,
        None => LogFileConfig::from_level(options.level()),
    };

    let filter = file_config.env_filter()?;
    let writer = file_config.make_writer()?;
    let ansi = !options.json && file_config.ansi.unwrap_or(options.colour);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(file_config.with_target)
        .with_file(file_config.with_file)
        .with_line_number(file_config.with_line_number)
        .with_thread_names(file_config.with_thread_names);

    let fmt_layer = if options.json {
        fmt_layer.json().flatten_event(true).boxed()
    } else {
        fmt_layer.boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| NpgError::LoggingError {
            message: e.to_string(),
        })?;

    tracing::debug!(
        config_file = ?options.config_file,
        filter = %file_config.filter_spec(),
        json = options.json,
        "Logging configured"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{Builder, TempDir};

    #[test]
    fn test_level_from_flags() {
        assert_eq!(LogOptions::default().level(), LevelFilter::ERROR);

        let verbose = LogOptions {
            verbose: true,
            ..LogOptions::default()
        };
        assert_eq!(verbose.level(), LevelFilter::INFO);

        let both = LogOptions {
            debug: true,
            verbose: true,
            ..LogOptions::default()
        };
        assert_eq!(both.level(), LevelFilter::DEBUG);
    }

    #[test]
    fn test_filter_spec() {
        let config = LogFileConfig {
            level: "info".to_string(),
            directives: vec!["npg=debug".to_string(), " ".to_string()],
            ..LogFileConfig::default()
        };
        assert_eq!(config.filter_spec(), "info,npg=debug");
        assert!(config.env_filter().is_ok());

        assert_eq!(
            LogFileConfig::from_level(LevelFilter::DEBUG)
                .filter_spec()
                .to_lowercase(),
            "debug"
        );
    }

    #[test]
    fn test_invalid_filter() {
        let config = LogFileConfig {
            directives: vec!["npg=loud".to_string()],
            ..LogFileConfig::default()
        };
        assert!(matches!(
            config.env_filter(),
            Err(NpgError::LoggingError { .. })
        ));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json_file() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        let content = r#"{
            "level": "warn",
            "directives": ["npg=trace"],
            "output": "stdout",
            "with_file": false
        }"#;
        file.write_all(content.as_bytes()).unwrap();

        let config = LogFileConfig::from_file(file.path()).unwrap();
        assert_eq!(config.level, "warn");
        assert_eq!(config.directives, vec!["npg=trace".to_string()]);
        assert_eq!(config.output, LogOutput::Stdout);
        assert!(!config.with_file);
        assert!(config.with_line_number);
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(b"level = \"info\"\nansi = false\n\n[output]\nfile = \"app.log\"\n")
            .unwrap();

        let config = LogFileConfig::from_file(file.path()).unwrap();
        assert_eq!(config.level, "info");
        assert_eq!(config.ansi, Some(false));
        assert_eq!(config.output, LogOutput::File(PathBuf::from("app.log")));
    }

    #[test]
    fn test_from_file_errors() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            LogFileConfig::from_file(dir.path().join("absent.json")),
            Err(NpgError::IoError(_))
        ));

        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(b"{not json").unwrap();
        assert!(matches!(
            LogFileConfig::from_file(file.path()),
            Err(NpgError::SerializationError(_))
        ));
    }

    #[test]
    fn test_file_writer_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.log");
        let config = LogFileConfig {
            output: LogOutput::File(path.clone()),
            ..LogFileConfig::default()
        };

        assert!(config.make_writer().is_ok());
        assert!(path.exists());
    }
}
