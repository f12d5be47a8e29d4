use crate::error::{ComicDlError, Result};
use crate::fetch::PageFetcher;
use crate::models::{ComicSpec, PageResult, StopReason, TraversalOutcome};
use crate::selector::CompiledSelector;
use crate::storage::{save_image_location, DownloadRecord};
use scraper::Html;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use url::Url;

/// Consumer of pages as the traversal emits them. Verification uses the
/// no-op sink and reads the collected outcome; downloads use the
/// materializing sink, which fetches and persists image bytes as it goes.
#[async_trait::async_trait]
pub trait PageSink: Send {
    async fn consume(&mut self, page: &PageResult) -> Result<()>;
}

/// Collect-only mode: the traversal outcome already carries every
/// PageResult, so there is nothing to do per page.
pub struct NullSink;

#[async_trait::async_trait]
impl PageSink for NullSink {
    async fn consume(&mut self, _page: &PageResult) -> Result<()> {
        Ok(())
    }
}

/// Download mode: fetches each image and writes it under a deterministic
/// name, skipping anything the download record already knows about. A
/// failed image fetch is logged and skipped without aborting the crawl.
pub struct MaterializeSink<'a> {
    fetcher: &'a PageFetcher,
    record: DownloadRecord,
    directory: PathBuf,
}

impl<'a> MaterializeSink<'a> {
    pub fn new(fetcher: &'a PageFetcher, record: DownloadRecord, directory: PathBuf) -> Self {
        Self {
            fetcher,
            record,
            directory,
        }
    }

    pub fn record(&self) -> &DownloadRecord {
        &self.record
    }
}

#[async_trait::async_trait]
impl PageSink for MaterializeSink<'_> {
    async fn consume(&mut self, page: &PageResult) -> Result<()> {
        for image_url in &page.image_urls {
            let name = save_image_location(image_url.as_str(), page.page);
            if self.record.contains(&name) {
                debug!("The image was already downloaded. Skipping {}", image_url);
                continue;
            }
            info!("Saving image {}", image_url);
            match self.fetcher.fetch_bytes(image_url).await {
                Ok(bytes) => {
                    tokio::fs::write(self.directory.join(&name), &bytes).await?;
                    self.record.insert(name);
                }
                Err(e) => {
                    warn!("Failed to download image {}: {}", image_url, e);
                }
            }
        }
        Ok(())
    }
}

/// The page-by-page crawl state machine. One instance drives both bounded
/// (verify, discovery trials) and unbounded (download) traversals; the
/// only difference is the page limit and the sink.
pub struct Traverser<'a> {
    fetcher: &'a PageFetcher,
}

impl<'a> Traverser<'a> {
    pub fn new(fetcher: &'a PageFetcher) -> Self {
        Self { fetcher }
    }

    /// Walks forward from the start URL until the next-page selector stops
    /// matching (or matches the literal "#"), the page limit is reached, or
    /// a page fetch fails. Malformed selectors abort before the first fetch.
    pub async fn traverse(
        &self,
        spec: &ComicSpec,
        page_limit: Option<u32>,
        sink: &mut dyn PageSink,
    ) -> Result<TraversalOutcome> {
        let image_selector = CompiledSelector::parse(&spec.image_selector)?;
        let next_selector = CompiledSelector::parse(&spec.next_page_selector)?;

        let mut pages = Vec::new();
        let mut url = spec.start_url.clone();
        let mut page: u32 = 1;

        loop {
            debug!("Fetching page {}: {}", page, url);
            let body = self
                .fetcher
                .fetch_page(&url)
                .await
                .map_err(|e| ComicDlError::fetch(page, e))?;
            let document = Html::parse_document(&body);

            let image_urls = resolve_all(&url, image_selector.evaluate(&document));
            if image_urls.is_empty() {
                debug!("No comic image on page {}", page);
            }
            let next_matches = next_selector.evaluate(&document);

            let result = PageResult {
                page,
                url: url.clone(),
                image_urls,
            };
            sink.consume(&result).await?;
            pages.push(result);

            let next_href = match next_matches.first() {
                None => {
                    info!("Reached the last page after {} pages", page);
                    return Ok(TraversalOutcome {
                        pages,
                        reason: StopReason::ExhaustedLinks,
                    });
                }
                Some(href) if href == "#" => {
                    info!("Reached the last page after {} pages", page);
                    return Ok(TraversalOutcome {
                        pages,
                        reason: StopReason::ExhaustedLinks,
                    });
                }
                Some(href) => href,
            };

            if let Some(limit) = page_limit {
                if page >= limit {
                    return Ok(TraversalOutcome {
                        pages,
                        reason: StopReason::PageLimitReached,
                    });
                }
            }

            url = url.join(next_href)?;
            page += 1;
        }
    }
}

/// Resolves raw selector matches against the page they came from, dropping
/// values that do not form a URL.
fn resolve_all(base: &Url, values: Vec<String>) -> Vec<Url> {
    values
        .iter()
        .filter_map(|value| match base.join(value) {
            Ok(resolved) => Some(resolved),
            Err(e) => {
                warn!("Ignoring unresolvable URL {:?}: {}", value, e);
                None
            }
        })
        .collect()
}
