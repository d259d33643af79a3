use std::sync::OnceLock;

use regex::{Captures, Regex};
use thiserror::Error;

/// Failure to expand a `{{ ... }}` placeholder
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExpandError {
    /// Referenced variable is unset and no default was given
    #[error("environment variable not found: `{0}`")]
    MissingVariable(String),

    /// Placeholder is not scoped with `env.`
    #[error("only variables scoped with 'env.' are supported: `{0}`")]
    UnsupportedScope(String),
}

/// Placeholder syntax: `{{ env.VAR }}` or `{{ env.VAR | default("fallback") }}`
fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\{\{\s*([A-Za-z0-9_.]+)\s*(?:\|\s*default\("([^"]*)"\))?\s*\}\}"#).expect("must be valid regex")
    })
}

/// Expand environment placeholders in raw TOML text
///
/// Comment lines are copied verbatim so documentation examples in a config
/// file never require their variables to be set.
pub fn expand_env(input: &str) -> Result<String, ExpandError> {
    let mut expanded = input
        .lines()
        .map(|line| {
            if line.trim_start().starts_with('#') {
                Ok(line.to_owned())
            } else {
                expand_line(line)
            }
        })
        .collect::<Result<Vec<_>, _>>()?
        .join("\n");

    if input.ends_with('\n') {
        expanded.push('\n');
    }

    Ok(expanded)
}

fn expand_line(line: &str) -> Result<String, ExpandError> {
    let mut failure = None;

    let replaced = placeholder().replace_all(line, |captures: &Captures<'_>| {
        let key = &captures[1];
        let default = captures.get(2).map(|m| m.as_str());

        match resolve(key, default) {
            Ok(value) => value,
            Err(e) => {
                failure.get_or_insert(e);
                String::new()
            }
        }
    });

    match failure {
        Some(e) => Err(e),
        None => Ok(replaced.into_owned()),
    }
}

fn resolve(key: &str, default: Option<&str>) -> Result<String, ExpandError> {
    let Some(name) = key.strip_prefix("env.").filter(|name| !name.contains('.')) else {
        return Err(ExpandError::UnsupportedScope(key.to_owned()));
    };

    match (std::env::var(name), default) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(fallback)) => Ok(fallback.to_owned()),
        (Err(_), None) => Err(ExpandError::MissingVariable(name.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_without_placeholders_is_unchanged() {
        let input = "[inference]\nmax_new_tokens = 256\n";
        assert_eq!(expand_env(input).unwrap(), input);
    }

    #[test]
    fn substitutes_set_variables() {
        temp_env::with_vars([("PL_DEVICE", Some("cuda:1")), ("PL_TEMP", Some("0.2"))], || {
            let result = expand_env("device = \"{{ env.PL_DEVICE }}\"\ntemperature = {{env.PL_TEMP}}").unwrap();
            assert_eq!(result, "device = \"cuda:1\"\ntemperature = 0.2");
        });
    }

    #[test]
    fn missing_variable_is_reported_by_name() {
        temp_env::with_var_unset("PL_MISSING", || {
            let err = expand_env("device = \"{{ env.PL_MISSING }}\"").unwrap_err();
            assert_eq!(err, ExpandError::MissingVariable("PL_MISSING".to_owned()));
        });
    }

    #[test]
    fn default_applies_only_when_unset() {
        let line = "device = \"{{ env.PL_DEVICE | default(\"cpu\") }}\"";

        temp_env::with_var_unset("PL_DEVICE", || {
            assert_eq!(expand_env(line).unwrap(), "device = \"cpu\"");
        });
        temp_env::with_var("PL_DEVICE", Some("metal"), || {
            assert_eq!(expand_env(line).unwrap(), "device = \"metal\"");
        });
    }

    #[test]
    fn other_scopes_are_rejected() {
        let err = expand_env("x = \"{{ vault.SECRET }}\"").unwrap_err();
        assert!(matches!(err, ExpandError::UnsupportedScope(ref key) if key == "vault.SECRET"));

        let err = expand_env("x = \"{{ env.A.B }}\"").unwrap_err();
        assert!(matches!(err, ExpandError::UnsupportedScope(_)));
    }

    #[test]
    fn comments_are_left_alone() {
        temp_env::with_var_unset("PL_MISSING", || {
            let input = "  # device = \"{{ env.PL_MISSING }}\"\nstop = []";
            assert_eq!(expand_env(input).unwrap(), input);
        });
    }
}
