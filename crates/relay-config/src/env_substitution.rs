use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use relay_core::{RelayError, Result};
use serde_json::Value;
use std::env;

// ${VAR} and ${VAR:-default}
static ENV_VAR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}").expect("Invalid regex pattern")
});

/// Recursively substitute environment variables in every string of `value`.
///
/// Fails with the names of all variables that are unset and have no default.
pub fn substitute_env_vars(value: &mut Value) -> Result<()> {
    substitute_with(value, &process_env)
}

fn process_env(name: &str) -> Option<String> {
    env::var(name).ok()
}

pub(crate) fn substitute_with(value: &mut Value, lookup: &dyn Fn(&str) -> Option<String>) -> Result<()> {
    let mut missing = Vec::new();
    visit(value, lookup, &mut missing);

    if missing.is_empty() {
        Ok(())
    } else {
        missing.sort();
        missing.dedup();
        Err(RelayError::Config(format!(
            "Missing required environment variables: {}",
            missing.join(", ")
        )))
    }
}

fn visit(value: &mut Value, lookup: &dyn Fn(&str) -> Option<String>, missing: &mut Vec<String>) {
    match value {
        Value::String(s) => {
            if ENV_VAR_REGEX.is_match(s) {
                *s = substitute_in_string(s, lookup, missing);
            }
        }
        Value::Object(map) => map.values_mut().for_each(|v| visit(v, lookup, missing)),
        Value::Array(items) => items.iter_mut().for_each(|v| visit(v, lookup, missing)),
        _ => {}
    }
}

fn substitute_in_string(
    input: &str,
    lookup: &dyn Fn(&str) -> Option<String>,
    missing: &mut Vec<String>,
) -> String {
    ENV_VAR_REGEX
        .replace_all(input, |cap: &Captures<'_>| {
            let name = &cap[1];
            match (lookup(name), cap.get(2)) {
                (Some(value), _) => value,
                (None, Some(default)) => default.as_str().to_string(),
                (None, None) => {
                    missing.push(name.to_string());
                    String::new()
                }
            }
        })
        .into_owned()
}
