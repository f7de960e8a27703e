//! Functions and types common to NPG applications.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod iter;
pub mod utils;

#[cfg(feature = "cli")]
pub use cli::{DateRangeArgs, DbConfigArgs, IoArgs, LoggingArgs};

pub use config::{IniData, Redacted};
pub use iter::with_previous;
pub use utils::error::{NpgError, Result};
pub use utils::logger::{configure_logging, LogOptions};

/// The package version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// The version derived from the most recent git tag at build time, falling
/// back to the package version when built outside a git checkout.
pub fn git_version() -> &'static str {
    env!("NPG_GIT_VERSION")
}
