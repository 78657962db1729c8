//! Request-shaping data: the options argument, merging, and query encoding.
//!
//! # Design
//! The options argument of `get`/`delete` can be a bare numeric id, an
//! id-bearing map, or a plain options map; `Params` makes those three
//! shapes an explicit tagged union instead of a runtime check. Merging and
//! query encoding reproduce the wire behavior the service expects:
//! recursive merge with array concatenation, and `k[0]=a&k[1]=b` /
//! `k[sub]=v` bracket syntax for nested values.

use serde_json::Value;
use url::form_urlencoded;

/// A query-parameter map, as sent on every resource request.
pub type Options = serde_json::Map<String, Value>;

/// The options argument of `get` and `delete`.
#[derive(Debug, Clone, Default)]
pub enum Params {
    /// No options at all.
    #[default]
    None,
    /// A bare resource id, mapped onto the URL path when auto-mapping is on.
    Id(u64),
    /// A structured options map; an `id` key is mapped onto the URL path
    /// when auto-mapping is on.
    Options(Options),
}

impl Params {
    /// Split into an optional id path segment and the leftover options.
    ///
    /// With `auto_map` off, ids stay where they are: a bare `Id` carries no
    /// usable options and an id-bearing map is passed through untouched.
    pub(crate) fn split_id(self, auto_map: bool) -> (Option<String>, Options) {
        match self {
            Params::None => (None, Options::new()),
            Params::Id(id) if auto_map => (Some(id.to_string()), Options::new()),
            Params::Id(_) => (None, Options::new()),
            Params::Options(mut options) => {
                if auto_map {
                    if let Some(id) = options.remove("id") {
                        return (Some(value_segment(&id)), options);
                    }
                }
                (None, options)
            }
        }
    }
}

/// Render a JSON value as a URL path segment (used for id mapping).
pub(crate) fn value_segment(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Recursively merge `overlay` into `base`.
///
/// Objects merge key by key, arrays concatenate, an array meeting a scalar
/// absorbs it as one more element, and scalar pairs resolve to the overlay
/// value. Used to fold the session parameters into caller options without
/// silently dropping multi-valued keys.
pub fn merge_options(mut base: Options, overlay: Options) -> Options {
    for (key, incoming) in overlay {
        let merged = match base.remove(&key) {
            None => incoming,
            Some(existing) => match (existing, incoming) {
                (Value::Object(a), Value::Object(b)) => Value::Object(merge_options(a, b)),
                (Value::Array(mut a), Value::Array(b)) => {
                    a.extend(b);
                    Value::Array(a)
                }
                (Value::Array(mut a), b) => {
                    a.push(b);
                    Value::Array(a)
                }
                (a, Value::Array(mut b)) => {
                    b.insert(0, a);
                    Value::Array(b)
                }
                (_, b) => b,
            },
        };
        base.insert(key, merged);
    }
    base
}

/// Encode an options map as a query string.
///
/// Nested arrays and objects use bracket syntax (`tags[0]=a&tags[1]=b`,
/// `filter[status]=live`), matching what the service parses.
pub fn encode_query(options: &Options) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in options {
        append_pair(&mut serializer, key, value);
    }
    serializer.finish()
}

fn append_pair(serializer: &mut form_urlencoded::Serializer<String>, key: &str, value: &Value) {
    match value {
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                append_pair(serializer, &format!("{key}[{index}]"), item);
            }
        }
        Value::Object(map) => {
            for (sub_key, sub_value) in map {
                append_pair(serializer, &format!("{key}[{sub_key}]"), sub_value);
            }
        }
        Value::String(s) => {
            serializer.append_pair(key, s);
        }
        Value::Null => {
            serializer.append_pair(key, "");
        }
        other => {
            serializer.append_pair(key, &other.to_string());
        }
    }
}
