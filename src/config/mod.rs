//! Typed configuration read from INI files.
//!
//! [`IniData`] fills any `Deserialize` struct from one section of an INI file.
//! Declaring configuration as a struct keeps every field explicit, documented
//! and type checked, rather than passing around a bag of strings.
//!
//! Given `config.ini`:
//!
//! ```ini
//! [server]
//! host = localhost
//! port = 9000
//! ```
//!
//! the `server` section loads into a struct like this:
//!
//! ```no_run
//! use npg::config::IniData;
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct ServerConfig {
//!     host: String,
//!     port: u16,
//! }
//!
//! # fn main() -> npg::Result<()> {
//! let server: ServerConfig = IniData::new()?.from_file("config.ini", "server")?;
//! # Ok(())
//! # }
//! ```
//!
//! With environment fallback enabled, a field absent from the section is read
//! from the environment variable named after the field in upper case, with an
//! optional prefix (`SERVER_PORT` for `.with_env("server_")`).
//!
//! Loading is logged at INFO and DEBUG level. Field values are never logged;
//! wrap secrets in [`Redacted`] so they stay out of `Debug` output too.

pub mod de;
pub mod ini;

pub use de::Redacted;
pub use ini::Ini;

use crate::utils::error::{NpgError, Result};
use crate::utils::validation::validate_non_empty_string;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::path::Path;

/// Builds instances of the configuration struct `D` from INI sections.
pub struct IniData<D> {
    type_name: &'static str,
    fields: &'static [&'static str],
    use_env: bool,
    env_prefix: String,
    _marker: PhantomData<fn() -> D>,
}

impl<D> std::fmt::Debug for IniData<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IniData")
            .field("type_name", &self.type_name)
            .field("fields", &self.fields)
            .field("use_env", &self.use_env)
            .field("env_prefix", &self.env_prefix)
            .finish()
    }
}

impl<D> Clone for IniData<D> {
    fn clone(&self) -> Self {
        Self {
            type_name: self.type_name,
            fields: self.fields,
            use_env: self.use_env,
            env_prefix: self.env_prefix.clone(),
            _marker: PhantomData,
        }
    }
}

impl<D: DeserializeOwned> IniData<D> {
    /// Binds a configuration struct, without environment variable fallback.
    ///
    /// Fails if `D` does not deserialize as a struct with named fields.
    pub fn new() -> Result<Self> {
        let type_name = std::any::type_name::<D>();
        let shape = de::struct_shape::<D>().ok_or_else(|| NpgError::InvalidDataType {
            type_name: type_name.to_string(),
            reason: "not a struct with named fields".to_string(),
        })?;

        Ok(Self {
            type_name,
            fields: shape.fields,
            use_env: false,
            env_prefix: String::new(),
            _marker: PhantomData,
        })
    }

    /// Enables environment variable fallback with the given name prefix.
    pub fn with_env(self, prefix: impl Into<String>) -> Self {
        self.use_env(true).env_prefix(prefix)
    }

    pub fn use_env(mut self, use_env: bool) -> Self {
        self.use_env = use_env;
        self
    }

    /// Sets the environment variable prefix. It is folded to upper case.
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into().to_uppercase();
        self
    }

    /// The serialized field names of `D`.
    pub fn fields(&self) -> &'static [&'static str] {
        self.fields
    }

    pub fn env_var_name(&self, field: &str) -> String {
        format!("{}{}", self.env_prefix, field.to_uppercase())
    }

    /// Creates a new `D` from a section of an INI file.
    pub fn from_file<P: AsRef<Path>>(&self, ini_file: P, section: &str) -> Result<D> {
        let path = ini_file.as_ref();
        let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        let origin = path.display().to_string();

        tracing::info!(
            path = %origin,
            section,
            dataclass = self.type_name,
            "Reading configuration from file"
        );

        let ini = Ini::load(&path)?;
        self.from_ini(&ini, &origin, section)
    }

    /// Creates a new `D` from a section of an INI document held in memory.
    pub fn from_str(&self, content: &str, section: &str) -> Result<D> {
        let ini = Ini::parse(content)?;
        self.from_ini(&ini, "<string>", section)
    }

    /// Creates a new `D` from a section of an already parsed document.
    pub fn from_ini(&self, ini: &Ini, origin: &str, section: &str) -> Result<D> {
        validate_non_empty_string("section", section)?;

        let mut pairs = Vec::with_capacity(self.fields.len());

        for &field in self.fields {
            if let Some(value) = ini.get(section, field)? {
                pairs.push((field.to_string(), value));
            } else if self.use_env {
                let env_var = self.env_var_name(field);
                tracing::debug!(
                    path = origin,
                    section,
                    field,
                    env_var = %env_var,
                    "Absent INI field; using an environment variable"
                );

                if let Ok(value) = std::env::var(&env_var) {
                    pairs.push((field.to_string(), value));
                }
            }
        }

        let populated: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        tracing::debug!(
            dataclass = self.type_name,
            fields = ?populated,
            "Reading complete"
        );

        de::from_pairs(pairs).map_err(|e| NpgError::DeserializeError {
            type_name: self.type_name.to_string(),
            section: section.to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serial_test::serial;

    #[derive(Debug, Deserialize, PartialEq)]
    struct ExampleConfig {
        secret: Redacted<String>,
        key1: String,
        key2: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    struct NotAStruct(#[allow(dead_code)] String);

    #[test]
    fn test_new_rejects_non_structs() {
        assert!(matches!(
            IniData::<NotAStruct>::new(),
            Err(NpgError::InvalidDataType { .. })
        ));
        assert!(IniData::<String>::new().is_err());
    }

    #[test]
    fn test_fields() {
        let parser = IniData::<ExampleConfig>::new().unwrap();
        assert_eq!(parser.fields(), &["secret", "key1", "key2"]);
    }

    #[test]
    fn test_env_var_name() {
        let parser = IniData::<ExampleConfig>::new().unwrap().with_env("example_");
        assert_eq!(parser.env_var_name("key2"), "EXAMPLE_KEY2");

        let plain = IniData::<ExampleConfig>::new().unwrap();
        assert_eq!(plain.env_var_name("key2"), "KEY2");
    }

    #[test]
    fn test_from_str() {
        let parser = IniData::<ExampleConfig>::new().unwrap();
        let config = parser
            .from_str("[test]\nsecret=SECRET_VALUE\nkey1=value1\n", "test")
            .unwrap();

        assert_eq!(
            config,
            ExampleConfig {
                secret: Redacted::new("SECRET_VALUE".to_string()),
                key1: "value1".to_string(),
                key2: None,
            }
        );
    }

    #[test]
    fn test_from_str_uses_defaults_and_interpolation() {
        let parser = IniData::<ExampleConfig>::new().unwrap();
        let config = parser
            .from_str(
                "[DEFAULT]\nsecret=s\nbase=v\n\n[test]\nkey1=%(base)s1\n",
                "test",
            )
            .unwrap();

        assert_eq!(config.key1, "v1");
        assert_eq!(config.secret.expose(), "s");
    }

    #[test]
    fn test_missing_section_is_missing_fields() {
        let parser = IniData::<ExampleConfig>::new().unwrap();
        let result = parser.from_str("[other]\nkey1=value1\n", "test");
        assert!(matches!(result, Err(NpgError::DeserializeError { .. })));
    }

    #[test]
    fn test_empty_section_name() {
        let parser = IniData::<ExampleConfig>::new().unwrap();
        assert!(parser.from_str("[test]\n", " ").is_err());
    }

    #[test]
    #[serial]
    fn test_missing_section_with_env_fallback() {
        std::env::set_var("UNIT_SECRET", "s");
        std::env::set_var("UNIT_KEY1", "k1");

        let parser = IniData::<ExampleConfig>::new().unwrap().with_env("unit_");
        let config = parser.from_str("[other]\n", "test").unwrap();

        assert_eq!(config.key1, "k1");
        assert_eq!(config.key2, None);

        std::env::remove_var("UNIT_SECRET");
        std::env::remove_var("UNIT_KEY1");
    }

    #[test]
    fn test_debug_does_not_show_secret() {
        let config = ExampleConfig {
            secret: Redacted::new("SECRET_VALUE".to_string()),
            key1: "value1".to_string(),
            key2: None,
        };
        assert_eq!(
            format!("{:?}", config),
            "ExampleConfig { secret: Redacted(..), key1: \"value1\", key2: None }"
        );
    }
}
