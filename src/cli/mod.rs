//! Argument groups shared by NPG command line programs.
//!
//! Each group is a clap `Args` struct to be flattened into a program's own
//! parser:
//!
//! ```
//! use clap::Parser;
//! use npg::cli::{DateRangeArgs, LoggingArgs};
//!
//! #[derive(Parser)]
//! struct Cli {
//!     #[command(flatten)]
//!     dates: DateRangeArgs,
//!     #[command(flatten)]
//!     logging: LoggingArgs,
//! }
//!
//! let cli = Cli::try_parse_from(["app", "--begin-date", "2022-01-30", "-v"]).unwrap();
//! assert!(cli.logging.verbose);
//! assert!(cli.dates.begin_date.is_some());
//! ```

pub mod parsers;

pub use parsers::{integer_in_range, parse_iso_date, readable_file};

use crate::utils::error::Result;
use crate::utils::logger::{configure_logging, LogOptions};
use chrono::{DateTime, Duration, Utc};
use clap::Args;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Default distance of `--begin-date` before the current time.
pub const DEFAULT_BEGIN_DELTA_DAYS: i64 = 14;

/// `--begin-date` and `--end-date`.
#[derive(Debug, Clone, Default, Args)]
pub struct DateRangeArgs {
    /// Limit to after this date. Defaults to 14 days ago. The argument must be an
    /// ISO8601 UTC date or date and time e.g. 2022-01-30, 2022-01-30T11:11:03Z
    #[arg(long, alias = "begin_date", value_parser = parse_iso_date)]
    pub begin_date: Option<DateTime<Utc>>,

    /// Limit to before this date. Defaults to the current time. The argument must
    /// be an ISO8601 UTC date or date and time e.g. 2022-01-30, 2022-01-30T11:11:03Z
    #[arg(long, alias = "end_date", value_parser = parse_iso_date)]
    pub end_date: Option<DateTime<Utc>>,
}

impl DateRangeArgs {
    /// The begin date given, or `begin_delta` before now.
    pub fn begin(&self, begin_delta: Duration) -> DateTime<Utc> {
        self.begin_date.unwrap_or_else(|| Utc::now() - begin_delta)
    }

    /// The end date given, or now.
    pub fn end(&self) -> DateTime<Utc> {
        self.end_date.unwrap_or_else(Utc::now)
    }

    pub fn resolve(&self, begin_delta: Duration) -> DateRange {
        DateRange {
            begin: self.begin(begin_delta),
            end: self.end(),
        }
    }

    /// The range with the default begin delta of 14 days.
    pub fn range(&self) -> DateRange {
        self.resolve(Duration::days(DEFAULT_BEGIN_DELTA_DAYS))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub begin: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// True if `begin <= t < end`.
    pub fn contains(&self, t: &DateTime<Utc>) -> bool {
        self.begin <= *t && *t < self.end
    }
}

/// `--db-config`, a required database configuration file.
#[derive(Debug, Clone, Args)]
pub struct DbConfigArgs {
    /// Configuration file for database connection
    #[arg(
        long,
        aliases = ["db_config", "database-config", "database_config"],
        value_parser = readable_file
    )]
    pub db_config: PathBuf,
}

impl DbConfigArgs {
    pub fn read_to_string(&self) -> Result<String> {
        Ok(fs::read_to_string(&self.db_config)?)
    }
}

/// `--input` and `--output`, defaulting to STDIN and STDOUT.
#[derive(Debug, Clone, Default, Args)]
pub struct IoArgs {
    /// Input file
    #[arg(long, value_parser = input_file)]
    pub input: Option<PathBuf>,

    /// Output file
    #[arg(long)]
    pub output: Option<PathBuf>,
}

fn input_file(value: &str) -> Result<PathBuf> {
    if value == "-" {
        return Ok(PathBuf::from(value));
    }
    readable_file(value)
}

fn file_path(path: &Option<PathBuf>) -> Option<&Path> {
    path.as_deref().filter(|p| p.as_os_str() != "-")
}

impl IoArgs {
    pub fn reader(&self) -> Result<Box<dyn BufRead>> {
        let reader: Box<dyn BufRead> = match file_path(&self.input) {
            Some(path) => Box::new(BufReader::new(File::open(path)?)),
            None => Box::new(BufReader::new(io::stdin())),
        };
        Ok(reader)
    }

    /// Creates (or truncates) the output file.
    pub fn writer(&self) -> Result<Box<dyn Write>> {
        let writer: Box<dyn Write> = match file_path(&self.output) {
            Some(path) => Box::new(BufWriter::new(File::create(path)?)),
            None => Box::new(BufWriter::new(io::stdout())),
        };
        Ok(writer)
    }
}

/// Logging flags. `--log-config`, `--debug` and `--verbose` are mutually
/// exclusive, as are `--colour` and `--log-json`.
#[derive(Debug, Clone, Default, Args)]
pub struct LoggingArgs {
    /// A logging configuration file.
    #[arg(long, alias = "log_config", conflicts_with_all = ["debug", "verbose"])]
    pub log_config: Option<PathBuf>,

    /// Enable DEBUG level logging to STDERR.
    #[arg(short, long, conflicts_with = "verbose")]
    pub debug: bool,

    /// Enable INFO level logging to STDERR.
    #[arg(short, long)]
    pub verbose: bool,

    /// Use coloured log rendering to the console.
    #[arg(long, conflicts_with = "log_json")]
    pub colour: bool,

    /// Use JSON log rendering.
    #[arg(long, alias = "log_json")]
    pub log_json: bool,
}

impl LoggingArgs {
    pub fn options(&self) -> LogOptions {
        LogOptions {
            config_file: self.log_config.clone(),
            debug: self.debug,
            verbose: self.verbose,
            colour: self.colour,
            json: self.log_json,
        }
    }

    /// Installs the global subscriber from these flags.
    pub fn configure(&self) -> Result<()> {
        configure_logging(&self.options())
    }
}
