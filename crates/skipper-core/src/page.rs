#![forbid(unsafe_code)]

//! The unit of navigable state.
//!
//! A [`Page`] is what the server hands back for a navigation request and
//! what the engine keeps in sync with the top of the host's session-history
//! stack. Its wire format is camelCase JSON; the optional collections
//! (`scrollRegions`, `rememberedState`) default to empty when the server
//! omits them, so a freshly deserialized page is always fully populated.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A scroll offset pair for one scroll region, index-aligned with the
/// document-order list of regions at capture time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollPosition {
    /// Vertical offset in pixels.
    pub top: f64,
    /// Horizontal offset in pixels.
    pub left: f64,
}

impl ScrollPosition {
    /// Create a scroll position from top/left offsets.
    #[must_use]
    pub const fn new(top: f64, left: f64) -> Self {
        Self { top, left }
    }

    /// The origin position.
    #[must_use]
    pub const fn zero() -> Self {
        Self { top: 0.0, left: 0.0 }
    }
}

/// The versioned state describing what is currently displayed.
///
/// Exactly one page is "current" at any time; the engine mirrors every
/// mutation of the current page into the host history entry it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Opaque identifier resolved by the component adapter.
    pub component: String,

    /// Props handed to the rendered unit.
    #[serde(default)]
    pub props: Map<String, Value>,

    /// Canonical location of this page. Absolute or relative; resolved
    /// against the live location when compared.
    pub url: String,

    /// Cache-busting/compatibility token, echoed back on every subsequent
    /// request. Servers send a string or a number; both normalize to a
    /// string here.
    #[serde(default, deserialize_with = "deserialize_version")]
    pub version: Option<String>,

    /// Captured scroll offsets, index-aligned with the document-order list
    /// of scroll regions.
    #[serde(default)]
    pub scroll_regions: Vec<ScrollPosition>,

    /// Per-key UI-owned state surviving across navigations within the same
    /// history entry.
    #[serde(default)]
    pub remembered_state: Map<String, Value>,
}

impl Page {
    /// Create a page with empty props and no version.
    #[must_use]
    pub fn new(component: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            props: Map::new(),
            url: url.into(),
            version: None,
            scroll_regions: Vec::new(),
            remembered_state: Map::new(),
        }
    }

    /// Set a prop.
    #[must_use]
    pub fn with_prop(mut self, key: impl Into<String>, value: Value) -> Self {
        self.props.insert(key.into(), value);
        self
    }

    /// Set the version token.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// Accept a string, a number, or null for the version field.
fn deserialize_version<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "version must be a string or number, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn deserializes_wire_format() {
        let page: Page = serde_json::from_value(json!({
            "component": "Posts",
            "props": { "items": [] },
            "url": "/posts",
            "version": "v1",
            "scrollRegions": [{ "top": 10.0, "left": 0.0 }],
            "rememberedState": { "filter": "open" },
        }))
        .unwrap();

        assert_eq!(page.component, "Posts");
        assert_eq!(page.url, "/posts");
        assert_eq!(page.version.as_deref(), Some("v1"));
        assert_eq!(page.scroll_regions, vec![ScrollPosition::new(10.0, 0.0)]);
        assert_eq!(page.remembered_state["filter"], json!("open"));
    }

    #[test]
    fn absent_collections_default_to_empty() {
        let page: Page = serde_json::from_value(json!({
            "component": "Home",
            "url": "/",
        }))
        .unwrap();

        assert!(page.props.is_empty());
        assert!(page.scroll_regions.is_empty());
        assert!(page.remembered_state.is_empty());
        assert_eq!(page.version, None);
    }

    #[test]
    fn numeric_version_normalizes_to_string() {
        let page: Page = serde_json::from_value(json!({
            "component": "Home",
            "url": "/",
            "version": 7,
        }))
        .unwrap();
        assert_eq!(page.version.as_deref(), Some("7"));
    }

    #[test]
    fn version_rejects_non_scalar() {
        let result: Result<Page, _> = serde_json::from_value(json!({
            "component": "Home",
            "url": "/",
            "version": ["v1"],
        }));
        assert!(result.is_err());
    }

    #[test]
    fn serializes_camel_case_keys() {
        let page = Page::new("Posts", "/posts").with_version("v1");
        let value = serde_json::to_value(&page).unwrap();
        assert!(value.get("scrollRegions").is_some());
        assert!(value.get("rememberedState").is_some());
        assert!(value.get("scroll_regions").is_none());
    }
}
