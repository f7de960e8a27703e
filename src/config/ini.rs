//! A small INI document reader.
//!
//! Sections are introduced by `[name]` headers and hold `key = value` (or
//! `key: value`) options. Option names are case-insensitive and are stored in
//! lower case; section names are case-sensitive. Options in the `DEFAULT`
//! section are visible from every other section.
//!
//! Values may continue over several lines when the continuation lines are
//! indented more deeply than the line holding the option name. Values are
//! interpolated when read with [`Ini::get`]: `%(name)s` is replaced with the
//! value of option `name` from the same section (or `DEFAULT`) and `%%` stands
//! for a literal `%`.

use crate::utils::error::{NpgError, Result};
use std::fs;
use std::path::Path;

pub const DEFAULT_SECTION: &str = "DEFAULT";

const MAX_INTERPOLATION_DEPTH: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Section {
    name: String,
    options: Vec<(String, String)>,
}

impl Section {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            options: Vec::new(),
        }
    }

    fn get(&self, option: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|(k, _)| k == option)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
enum Target {
    Defaults,
    Section(usize),
}

/// A parsed INI document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ini {
    defaults: Section,
    sections: Vec<Section>,
}

impl Default for Ini {
    fn default() -> Self {
        Self {
            defaults: Section::new(DEFAULT_SECTION),
            sections: Vec::new(),
        }
    }
}

impl Ini {
    /// Reads and parses an INI file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let origin = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|e| NpgError::ParseError {
            path: origin.clone(),
            message: format!("Could not read '{}': {}", origin, e),
        })?;

        Self::parse_from(&content, &origin)
    }

    /// Parses an INI document held in memory.
    pub fn parse(content: &str) -> Result<Self> {
        Self::parse_from(content, "<string>")
    }

    fn parse_from(content: &str, origin: &str) -> Result<Self> {
        let mut ini = Ini::default();
        let mut target: Option<Target> = None;
        // Indent and index of the option that continuation lines extend
        let mut continuing: Option<(usize, usize)> = None;

        let error = |lineno: usize, message: String| NpgError::ParseError {
            path: origin.to_string(),
            message: format!("line {}: {}", lineno, message),
        };

        for (idx, raw) in content.lines().enumerate() {
            let lineno = idx + 1;
            let line = raw.trim();

            if line.is_empty() {
                continuing = None;
                continue;
            }
            if line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            let indent = raw.len() - raw.trim_start().len();

            if let (Some((opt_indent, opt_idx)), Some(t)) = (continuing, target) {
                if indent > opt_indent {
                    let value = &mut ini.section_mut(t).options[opt_idx].1;
                    if !value.is_empty() {
                        value.push('\n');
                    }
                    value.push_str(line);
                    continue;
                }
            }
            continuing = None;

            if let Some(header) = line.strip_prefix('[') {
                let name = header
                    .strip_suffix(']')
                    .ok_or_else(|| error(lineno, format!("malformed section header '{}'", line)))?
                    .trim();
                if name.is_empty() {
                    return Err(error(lineno, "empty section name".to_string()));
                }

                if name == DEFAULT_SECTION {
                    target = Some(Target::Defaults);
                } else {
                    if ini.has_section(name) {
                        return Err(error(lineno, format!("section '{}' already exists", name)));
                    }
                    ini.sections.push(Section::new(name));
                    target = Some(Target::Section(ini.sections.len() - 1));
                }
                continue;
            }

            let t = target.ok_or_else(|| {
                error(
                    lineno,
                    "option found before any section header".to_string(),
                )
            })?;

            let delimiter = line
                .find(|c: char| c == '=' || c == ':')
                .ok_or_else(|| error(lineno, format!("expected 'key = value', found '{}'", line)))?;
            let key = line[..delimiter].trim().to_lowercase();
            let value = line[delimiter + 1..].trim().to_string();

            if key.is_empty() {
                return Err(error(lineno, "option name is empty".to_string()));
            }

            let section = ini.section_mut(t);
            if section.get(&key).is_some() {
                return Err(error(
                    lineno,
                    format!("option '{}' in section '{}' already exists", key, section.name),
                ));
            }
            section.options.push((key, value));
            continuing = Some((indent, section.options.len() - 1));
        }

        Ok(ini)
    }

    fn section_mut(&mut self, target: Target) -> &mut Section {
        match target {
            Target::Defaults => &mut self.defaults,
            Target::Section(i) => &mut self.sections[i],
        }
    }

    fn section(&self, name: &str) -> Option<&Section> {
        if name == DEFAULT_SECTION {
            return Some(&self.defaults);
        }
        self.sections.iter().find(|s| s.name == name)
    }

    /// Names of all sections except `DEFAULT`, in file order.
    pub fn sections(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.iter().any(|s| s.name == section)
    }

    /// Option names visible in `section`, including those inherited from `DEFAULT`.
    pub fn options(&self, section: &str) -> Option<Vec<&str>> {
        let s = self.section(section)?;
        let mut names: Vec<&str> = s.options.iter().map(|(k, _)| k.as_str()).collect();
        for (k, _) in &self.defaults.options {
            if !names.contains(&k.as_str()) {
                names.push(k.as_str());
            }
        }
        Some(names)
    }

    pub fn has_option(&self, section: &str, option: &str) -> bool {
        self.get_raw(section, option).is_some()
    }

    /// The uninterpolated value of an option, falling back to `DEFAULT`.
    ///
    /// A missing section yields `None` rather than borrowing from `DEFAULT`.
    pub fn get_raw(&self, section: &str, option: &str) -> Option<&str> {
        let option = option.to_lowercase();
        let s = self.section(section)?;
        s.get(&option).or_else(|| self.defaults.get(&option))
    }

    /// The interpolated value of an option, falling back to `DEFAULT`.
    pub fn get(&self, section: &str, option: &str) -> Result<Option<String>> {
        match self.get_raw(section, option) {
            Some(raw) => self.interpolate(section, option, raw, 1).map(Some),
            None => Ok(None),
        }
    }

    fn interpolate(
        &self,
        section: &str,
        option: &str,
        value: &str,
        depth: usize,
    ) -> Result<String> {
        let error = |message: String| NpgError::ConfigError {
            message: format!(
                "bad interpolation of option '{}' in section '{}': {}",
                option, section, message
            ),
        };

        if depth > MAX_INTERPOLATION_DEPTH {
            return Err(error(format!(
                "recursion limit of {} exceeded",
                MAX_INTERPOLATION_DEPTH
            )));
        }

        let mut out = String::with_capacity(value.len());
        let mut rest = value;

        while let Some(pos) = rest.find('%') {
            out.push_str(&rest[..pos]);
            rest = &rest[pos..];

            if let Some(after) = rest.strip_prefix("%%") {
                out.push('%');
                rest = after;
            } else if let Some(after) = rest.strip_prefix("%(") {
                let end = after
                    .find(")s")
                    .ok_or_else(|| error(format!("unterminated reference in '{}'", value)))?;
                let name = after[..end].to_lowercase();
                let referenced = self
                    .get_raw(section, &name)
                    .ok_or_else(|| error(format!("no option named '{}'", name)))?;

                out.push_str(&self.interpolate(section, &name, referenced, depth + 1)?);
                rest = &after[end + 2..];
            } else {
                return Err(error(format!(
                    "'%' must be followed by '%' or '(' in '{}'",
                    value
                )));
            }
        }
        out.push_str(rest);

        Ok(out)
    }
}
