#![forbid(unsafe_code)]

//! URL/query codec.
//!
//! Pure functions that build the request URL and body for a visit: hrefs
//! resolve against the live location, visit data is split between the query
//! string and the request body by method semantics, and fragments are
//! stripped for location comparisons (the fragment never goes on the wire).
//!
//! # Query merge
//!
//! For read-only methods the structured visit data is merged into the URL's
//! existing query string: existing parameters are parsed by top-level key
//! (repeated keys collapse, last one wins), data keys override them, and
//! nested values serialize bracket-style (`filter[status]=open`,
//! `ids[0]=1&ids[1]=2`). For every other method the data is left untouched
//! as the request body.

use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;
use url::form_urlencoded::{Serializer, Target};

use crate::request::Method;

/// Error resolving a caller-supplied href.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not resolve href {href:?}: {source}")]
pub struct LocationError {
    /// The href as given.
    pub href: String,
    /// The underlying parse failure.
    pub source: url::ParseError,
}

/// Resolve an href (absolute or relative) against a base location.
pub fn href_to_url(href: &str, base: &Url) -> Result<Url, LocationError> {
    base.join(href).map_err(|source| LocationError {
        href: href.to_string(),
        source,
    })
}

/// A copy of the URL with the fragment removed.
#[must_use]
pub fn url_without_hash(url: &Url) -> Url {
    let mut stripped = url.clone();
    stripped.set_fragment(None);
    stripped
}

/// Whether two URLs are identical ignoring their fragments.
#[must_use]
pub fn same_without_hash(a: &Url, b: &Url) -> bool {
    url_without_hash(a) == url_without_hash(b)
}

/// Split visit data between the query string and the request body.
///
/// Returns the (possibly rewritten) URL and whatever data remains for the
/// body. For [`Method::Get`] the data is folded into the query string and
/// the returned body map is empty; other methods pass both through
/// unchanged.
#[must_use]
pub fn merge_data_into_query(
    method: Method,
    mut url: Url,
    data: Map<String, Value>,
) -> (Url, Map<String, Value>) {
    if method.carries_body() || data.is_empty() {
        return (url, data);
    }

    let mut merged: Map<String, Value> = Map::new();
    for (key, value) in url.query_pairs() {
        merged.insert(key.into_owned(), Value::String(value.into_owned()));
    }
    for (key, value) in data {
        merged.insert(key, value);
    }

    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (key, value) in &merged {
            append_value(&mut pairs, key, value);
        }
    }
    if url.query() == Some("") {
        url.set_query(None);
    }

    (url, Map::new())
}

fn append_value<T: Target>(pairs: &mut Serializer<'_, T>, key: &str, value: &Value) {
    match value {
        Value::Null => {
            pairs.append_pair(key, "");
        }
        Value::Bool(flag) => {
            pairs.append_pair(key, if *flag { "true" } else { "false" });
        }
        Value::Number(number) => {
            pairs.append_pair(key, &number.to_string());
        }
        Value::String(text) => {
            pairs.append_pair(key, text);
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                append_value(pairs, &format!("{key}[{index}]"), item);
            }
        }
        Value::Object(entries) => {
            for (nested_key, nested_value) in entries {
                append_value(pairs, &format!("{key}[{nested_key}]"), nested_value);
            }
        }
    }
}
