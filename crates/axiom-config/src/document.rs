//! Raw document operations: deep merge and environment interpolation.

use regex::{Captures, Regex};
use serde_yaml::Value;
use std::sync::OnceLock;

fn env_token() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap())
}

/// Deep-merges `overlay` into `base`.
///
/// Mappings merge key by key, recursively. Any other value in the overlay,
/// including lists and `null`, replaces the base value wholesale.
///
/// # Example
///
/// ```rust
/// use axiom_config::deep_merge;
///
/// let mut base: serde_yaml::Value = serde_yaml::from_str("a: {x: 1, y: 2}").unwrap();
/// let overlay: serde_yaml::Value = serde_yaml::from_str("a: {y: 3}").unwrap();
/// deep_merge(&mut base, overlay);
///
/// assert_eq!(base["a"]["x"], serde_yaml::Value::from(1));
/// assert_eq!(base["a"]["y"], serde_yaml::Value::from(3));
/// ```
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match overlay {
        Value::Mapping(overlay_map) if base.is_mapping() => {
            if let Value::Mapping(base_map) = base {
                for (key, value) in overlay_map {
                    match base_map.get_mut(&key) {
                        Some(existing) if existing.is_mapping() && value.is_mapping() => {
                            deep_merge(existing, value)
                        }
                        _ => {
                            base_map.insert(key, value);
                        }
                    }
                }
            }
        }
        other => *base = other,
    }
}

/// Replaces `${NAME}` tokens in every string of the document.
///
/// `lookup` resolves a variable name; tokens it cannot resolve are left
/// verbatim. Map keys are not interpolated.
pub fn interpolate<F>(value: Value, lookup: &F) -> Value
where
    F: Fn(&str) -> Option<String>,
{
    match value {
        Value::String(text) => Value::String(interpolate_str(&text, lookup)),
        Value::Sequence(items) => {
            Value::Sequence(items.into_iter().map(|v| interpolate(v, lookup)).collect())
        }
        Value::Mapping(map) => Value::Mapping(
            map.into_iter()
                .map(|(k, v)| (k, interpolate(v, lookup)))
                .collect(),
        ),
        Value::Tagged(mut tagged) => {
            tagged.value = interpolate(tagged.value, lookup);
            Value::Tagged(tagged)
        }
        scalar => scalar,
    }
}

fn interpolate_str<F>(text: &str, lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    env_token()
        .replace_all(text, |caps: &Captures| {
            lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
