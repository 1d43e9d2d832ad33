//! Host document/location access used by page-view reporting.

use std::sync::Arc;

use url::Url;

use crate::analytics::error::{invalid_argument, AnalyticsResult};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageSnapshot {
    pub title: String,
    pub location: Url,
}

/// Source of the current document title and location.
///
/// Returning `None` means no document is available; page views are then skipped.
pub trait DocumentContext: Send + Sync {
    fn snapshot(&self) -> Option<PageSnapshot>;
}

/// A fixed page, for hosts that render their own views outside a browser.
#[derive(Clone, Debug)]
pub struct StaticDocument {
    snapshot: PageSnapshot,
}

impl StaticDocument {
    pub fn new(title: impl Into<String>, location: &str) -> AnalyticsResult<Self> {
        let location = Url::parse(location)
            .map_err(|err| invalid_argument(format!("invalid page location `{location}`: {err}")))?;
        Ok(Self {
            snapshot: PageSnapshot {
                title: title.into(),
                location,
            },
        })
    }
}

impl DocumentContext for StaticDocument {
    fn snapshot(&self) -> Option<PageSnapshot> {
        Some(self.snapshot.clone())
    }
}

/// Reads `window.document.title` and `window.location.href`.
#[cfg(all(target_arch = "wasm32", feature = "wasm-web"))]
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserDocument;

#[cfg(all(target_arch = "wasm32", feature = "wasm-web"))]
impl DocumentContext for BrowserDocument {
    fn snapshot(&self) -> Option<PageSnapshot> {
        let window = web_sys::window()?;
        let title = window.document()?.title();
        let href = window.location().href().ok()?;
        let location = Url::parse(&href).ok()?;
        Some(PageSnapshot { title, location })
    }
}

/// The document of the hosting browser page, if there is one.
pub fn default_document_context() -> Option<Arc<dyn DocumentContext>> {
    #[cfg(all(target_arch = "wasm32", feature = "wasm-web"))]
    {
        if web_sys::window().is_some() {
            return Some(Arc::new(BrowserDocument));
        }
        None
    }

    #[cfg(not(all(target_arch = "wasm32", feature = "wasm-web")))]
    {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_document_parses_location() {
        let doc = StaticDocument::new("Home", "https://example.com/home?x=1").unwrap();
        let snapshot = doc.snapshot().unwrap();
        assert_eq!(snapshot.title, "Home");
        assert_eq!(snapshot.location.path(), "/home");
    }

    #[test]
    fn static_document_rejects_relative_location() {
        let err = StaticDocument::new("Home", "/home").unwrap_err();
        assert_eq!(err.code_str(), "analytics/invalid-argument");
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn native_targets_have_no_document() {
        assert!(default_document_context().is_none());
    }
}
