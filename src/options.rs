//! Options parsing for the protoc plugin parameter
//!
//! protoc hands plugin options over as a single string, e.g.
//! `--kdata_opt=package_suffix=model,parsers=true`, which arrives as
//! `package_suffix=model,parsers=true` in `CodeGeneratorRequest.parameter`.

use crate::GeneratorError;

/// Default sub-package appended to the Java package
pub const DEFAULT_PACKAGE_SUFFIX: &str = "kdata";

/// Default package of the runtime support library
pub const DEFAULT_RUNTIME_PACKAGE: &str = "kdata.runtime";

/// Settings for one generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Sub-package for generated Kotlin code; empty means "same as Java"
    pub package_suffix: String,
    /// Package that hosts the runtime conversion helpers
    pub runtime_package: String,
    /// Emit server base, client stub and partial server per service
    pub services: bool,
    /// Emit a companion `parser` on every value type
    pub parsers: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            package_suffix: DEFAULT_PACKAGE_SUFFIX.to_string(),
            runtime_package: DEFAULT_RUNTIME_PACKAGE.to_string(),
            services: true,
            parsers: false,
        }
    }
}

impl GeneratorOptions {
    /// Parse the protoc parameter string
    pub fn parse(parameter: Option<&str>) -> Result<Self, GeneratorError> {
        let mut opts = Self::default();
        let Some(parameter) = parameter else {
            return Ok(opts);
        };

        for part in split_parameter_parts(parameter) {
            let (key, value) = part.split_once('=').ok_or_else(|| {
                GeneratorError::InvalidConfig(format!("expected key=value, got {:?}", part))
            })?;
            let value = parse_quoted_string(value);

            match key.trim() {
                "package_suffix" => {
                    if !value.is_empty() && !is_dotted_identifier(&value) {
                        return Err(GeneratorError::InvalidConfig(format!(
                            "package_suffix must be a package name, got {:?}",
                            value
                        )));
                    }
                    opts.package_suffix = value;
                }
                "runtime_package" => {
                    if !is_dotted_identifier(&value) {
                        return Err(GeneratorError::InvalidConfig(format!(
                            "runtime_package must be a package name, got {:?}",
                            value
                        )));
                    }
                    opts.runtime_package = value;
                }
                "services" => opts.services = parse_bool_option(key, &value)?,
                "parsers" => opts.parsers = parse_bool_option(key, &value)?,
                other => {
                    return Err(GeneratorError::InvalidConfig(format!(
                        "unknown option {:?}",
                        other
                    )))
                }
            }
        }

        Ok(opts)
    }

    /// Kotlin package for a given Java package
    pub fn kotlin_package(&self, java_package: &str) -> String {
        match (java_package.is_empty(), self.package_suffix.is_empty()) {
            (true, _) => self.package_suffix.clone(),
            (false, true) => java_package.to_string(),
            (false, false) => format!("{}.{}", java_package, self.package_suffix),
        }
    }
}

/// Split the parameter into non-empty, trimmed `key=value` parts
fn split_parameter_parts(parameter: &str) -> impl Iterator<Item = &str> {
    parameter.split(',').map(str::trim).filter(|p| !p.is_empty())
}

fn parse_bool_option(key: &str, value: &str) -> Result<bool, GeneratorError> {
    match value {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(GeneratorError::InvalidConfig(format!(
            "{} expects a boolean, got {:?}",
            key.trim(),
            value
        ))),
    }
}

fn is_dotted_identifier(s: &str) -> bool {
    !s.is_empty()
        && s.split('.').all(|segment| {
            let mut chars = segment.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

/// Parse a quoted string value, removing quotes
fn parse_quoted_string(s: &str) -> String {
    let s = s.trim();
    if s.len() >= 2
        && ((s.starts_with('"') && s.ends_with('"')) || (s.starts_with('\'') && s.ends_with('\'')))
    {
        s[1..s.len() - 1].to_string()
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quoted_string() {
        assert_eq!(parse_quoted_string("\"hello\""), "hello");
        assert_eq!(parse_quoted_string("'world'"), "world");
        assert_eq!(parse_quoted_string("unquoted"), "unquoted");
        assert_eq!(parse_quoted_string("\""), "\"");
    }

    #[test]
    fn test_defaults_without_parameter() {
        let opts = GeneratorOptions::parse(None).unwrap();
        assert_eq!(opts, GeneratorOptions::default());
        assert_eq!(opts.package_suffix, "kdata");
        assert!(opts.services);
        assert!(!opts.parsers);
    }

    #[test]
    fn test_parse_all_options() {
        let opts = GeneratorOptions::parse(Some(
            "package_suffix=model, runtime_package=com.acme.rt,services=false,parsers=true",
        ))
        .unwrap();
        assert_eq!(opts.package_suffix, "model");
        assert_eq!(opts.runtime_package, "com.acme.rt");
        assert!(!opts.services);
        assert!(opts.parsers);
    }

    #[test]
    fn test_empty_suffix_allowed() {
        let opts = GeneratorOptions::parse(Some("package_suffix=")).unwrap();
        assert_eq!(opts.kotlin_package("com.example"), "com.example");
    }

    #[test]
    fn test_kotlin_package() {
        let opts = GeneratorOptions::default();
        assert_eq!(opts.kotlin_package("com.example"), "com.example.kdata");
        assert_eq!(opts.kotlin_package(""), "kdata");
    }

    #[test]
    fn test_rejects_unknown_key() {
        let err = GeneratorOptions::parse(Some("colour=blue")).unwrap_err();
        assert!(matches!(err, GeneratorError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(GeneratorOptions::parse(Some("parsers=maybe")).is_err());
        assert!(GeneratorOptions::parse(Some("services")).is_err());
        assert!(GeneratorOptions::parse(Some("runtime_package=1bad")).is_err());
        assert!(GeneratorOptions::parse(Some("package_suffix=a-b")).is_err());
    }
}
