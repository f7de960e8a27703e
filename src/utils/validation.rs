use crate::utils::error::{NpgError, Result};
use std::fs::File;
use std::path::Path;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(NpgError::InvalidArgument {
            value: path.to_string(),
            reason: format!("{}: path cannot be empty", field_name),
        });
    }

    if path.contains('\0') {
        return Err(NpgError::InvalidArgument {
            value: path.to_string(),
            reason: format!("{}: path contains null bytes", field_name),
        });
    }

    Ok(())
}

/// Checks that `path` names a file which can be opened for reading.
pub fn validate_readable_file(field_name: &str, path: &str) -> Result<()> {
    validate_path(field_name, path)?;

    let p = Path::new(path);
    if p.is_dir() {
        return Err(NpgError::InvalidArgument {
            value: path.to_string(),
            reason: format!("{}: '{}' is a directory", field_name, path),
        });
    }

    File::open(p).map_err(|e| NpgError::InvalidArgument {
        value: path.to_string(),
        reason: format!("{}: can't open '{}': {}", field_name, path, e),
    })?;

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(NpgError::InvalidArgument {
            value: value.to_string(),
            reason: format!("{}: value cannot be empty or whitespace-only", field_name),
        });
    }
    Ok(())
}

/// Inclusive range check, reporting the failure the way command line users expect.
pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(NpgError::InvalidArgument {
            value: value.to_string(),
            reason: format!("Value {} is not in range {} to {}", value, min, max),
        });
    }
    Ok(())
}
