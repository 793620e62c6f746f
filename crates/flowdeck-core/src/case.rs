//! Key-case conversion for JSON documents.
//!
//! The workflow service speaks `snake_case`, the editor model is `camelCase`.
//! Conversion happens once, at the client boundary, by rewriting every mapping
//! key of a document. Values are never touched.
//!
//! Round-trips are lossy for keys that already mix cases or carry underscores
//! before non-lowercase characters: `to_snake_case(to_camel_case("a_1"))` is
//! `"a_1"`, but `to_camel_case(to_snake_case("aB_c"))` is `"aBC"`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumString};

/// Rewrites `_x` into `X` for every lowercase ASCII letter following an underscore.
///
/// Underscores not followed by a lowercase letter are kept as-is.
pub fn to_camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars().peekable();

    while let Some(c) = chars.next() {
        match chars.peek() {
            Some(&next) if c == '_' && next.is_ascii_lowercase() => {
                out.push(next.to_ascii_uppercase());
                chars.next();
            }
            _ => out.push(c),
        }
    }

    out
}

/// Rewrites every uppercase ASCII letter `X` into `_x`.
pub fn to_snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);

    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}

/// Produces a deep copy of `value` with every mapping key passed through `converter`.
///
/// Arrays are mapped element-wise in order; scalars pass through unchanged. When two
/// keys collide after conversion the later one wins, keeping the first one's position.
pub fn convert_key_case<F>(value: &Value, converter: F) -> Value
where
    F: Fn(&str) -> String,
{
    convert_with(value, &converter)
}

fn convert_with(value: &Value, converter: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| convert_with(item, converter))
                .collect(),
        ),
        Value::Object(map) => {
            let mut converted = Map::with_capacity(map.len());
            for (key, item) in map {
                converted.insert(converter(key), convert_with(item, converter));
            }
            Value::Object(converted)
        }
        scalar => scalar.clone(),
    }
}

/// Key casing applied to a whole JSON document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(Serialize, Deserialize, AsRefStr, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum KeyCase {
    /// `camelCase` keys, used by the editor model.
    #[default]
    Camel,
    /// `snake_case` keys, used by the workflow service.
    Snake,
}

impl KeyCase {
    /// Converts a single key.
    pub fn apply(&self, key: &str) -> String {
        match self {
            Self::Camel => to_camel_case(key),
            Self::Snake => to_snake_case(key),
        }
    }

    /// Converts every key of a document.
    pub fn convert(&self, value: &Value) -> Value {
        match self {
            Self::Camel => convert_key_case(value, to_camel_case),
            Self::Snake => convert_key_case(value, to_snake_case),
        }
    }
}
