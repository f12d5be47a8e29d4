use serde::{Deserialize, Serialize};
use url::Url;

/// One crawl target: where to start and how to find the comic image and the
/// next-page link on every page. Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComicSpec {
    pub name: String,
    pub start_url: Url,
    pub next_page_selector: String,
    pub image_selector: String,
    pub render_dynamic: bool,
}

impl ComicSpec {
    pub fn new(
        name: impl Into<String>,
        start_url: &str,
        next_page_selector: impl Into<String>,
        image_selector: impl Into<String>,
    ) -> crate::error::Result<Self> {
        Ok(Self {
            name: name.into(),
            start_url: Url::parse(start_url)?,
            next_page_selector: next_page_selector.into(),
            image_selector: image_selector.into(),
            render_dynamic: false,
        })
    }

    pub fn with_render_dynamic(mut self, render_dynamic: bool) -> Self {
        self.render_dynamic = render_dynamic;
        self
    }
}

/// Produced once per visited page. Page numbers are 1-based and strictly
/// increasing within one traversal. An empty `image_urls` is legitimate:
/// cover pages and one-off layouts sometimes carry no comic image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    pub page: u32,
    pub url: Url,
    pub image_urls: Vec<Url>,
}

/// Why a traversal stopped without failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The next-page selector matched nothing, or matched the literal "#".
    ExhaustedLinks,
    /// The caller-imposed page limit was hit first.
    PageLimitReached,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::ExhaustedLinks => write!(f, "exhausted links"),
            StopReason::PageLimitReached => write!(f, "page limit reached"),
        }
    }
}

/// Terminal result of a successful traversal. Failures are reported as
/// typed errors instead (fetch errors carry the page they occurred on).
#[derive(Debug, Clone)]
pub struct TraversalOutcome {
    pub pages: Vec<PageResult>,
    pub reason: StopReason,
}
