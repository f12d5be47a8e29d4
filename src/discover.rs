use crate::config::Config;
use crate::engine::EngineRunner;
use crate::error::{ComicDlError, Result};
use crate::fetch::PageFetcher;
use crate::models::ComicSpec;
use crate::traverse::{NullSink, Traverser};
use tracing::{debug, info};
use url::Url;

/// How many pages a candidate selector pair must survive, each with at
/// least one image, before it is accepted.
pub const VALIDATION_PAGES: u32 = 3;

/// The candidate space for selector discovery. Explicit configuration so
/// tests can shrink the pools; pool order is the tie-break between working
/// combinations.
#[derive(Debug, Clone)]
pub struct CandidatePools {
    pub next_keywords: Vec<String>,
    pub image_keywords: Vec<String>,
    pub next_tags: Vec<String>,
    pub image_tags: Vec<String>,
    pub next_attributes: Vec<String>,
    pub image_attributes: Vec<String>,
}

impl Default for CandidatePools {
    fn default() -> Self {
        fn pool(values: &[&str]) -> Vec<String> {
            values.iter().map(|v| v.to_string()).collect()
        }
        Self {
            next_keywords: pool(&["next"]),
            image_keywords: pool(&["comic", "strip", "page"]),
            next_tags: pool(&["a", "div", "span", "*"]),
            image_tags: pool(&["img", "div", "*"]),
            next_attributes: pool(&["rel", "class", "id"]),
            image_attributes: pool(&["src", "class", "id", "alt"]),
        }
    }
}

impl CandidatePools {
    /// Selector expressions for the next-page role, keyword-major order.
    fn next_candidates(&self) -> Vec<String> {
        synthesize(
            &self.next_keywords,
            &self.next_tags,
            &self.next_attributes,
            "href",
        )
    }

    /// Selector expressions for the image role, keyword-major order.
    fn image_candidates(&self) -> Vec<String> {
        synthesize(
            &self.image_keywords,
            &self.image_tags,
            &self.image_attributes,
            "src",
        )
    }
}

/// Builds one candidate selector per keyword x tag x attribute combination.
/// The attribute-contains-keyword match is case-insensitive, so a link
/// whose class is "Next-Button" is found by the keyword "next" regardless
/// of the site's casing conventions.
fn synthesize(keywords: &[String], tags: &[String], attributes: &[String], extract: &str) -> Vec<String> {
    let mut candidates = Vec::new();
    for keyword in keywords {
        for tag in tags {
            for attribute in attributes {
                candidates.push(format!("{tag}[{attribute}*=\"{keyword}\" i]@{extract}"));
            }
        }
    }
    candidates
}

/// Combinatorial search for a (next-page, image) selector pair that
/// correctly describes an unknown site. Each trial runs a short bounded
/// traversal in its own engine context; the first combination whose trial
/// yields `VALIDATION_PAGES` pages, all with images, wins.
pub struct Discoverer {
    config: Config,
    pools: CandidatePools,
}

impl Discoverer {
    pub fn new(config: Config) -> Self {
        Self::with_pools(config, CandidatePools::default())
    }

    pub fn with_pools(config: Config, pools: CandidatePools) -> Self {
        Self { config, pools }
    }

    pub fn discover(&self, name: &str, start_url: &Url) -> Result<Option<ComicSpec>> {
        let next_candidates = self.pools.next_candidates();
        let image_candidates = self.pools.image_candidates();
        let total = next_candidates.len() * image_candidates.len();
        info!("Searching {} selector combinations for {}", total, start_url);

        for next_page_selector in &next_candidates {
            for image_selector in &image_candidates {
                let spec = ComicSpec {
                    name: name.to_string(),
                    start_url: start_url.clone(),
                    next_page_selector: next_page_selector.clone(),
                    image_selector: image_selector.clone(),
                    render_dynamic: false,
                };
                debug!(
                    "Trying candidate next={} image={}",
                    next_page_selector, image_selector
                );
                match self.validate(&spec) {
                    Ok(true) => {
                        info!(
                            "Found working selectors: next={} image={}",
                            next_page_selector, image_selector
                        );
                        return Ok(Some(spec));
                    }
                    Ok(false) => {}
                    // A broken isolation layer is our problem, not the
                    // site's; stop searching instead of burning trials.
                    Err(e @ ComicDlError::Engine(_)) => return Err(e),
                    Err(e) => {
                        debug!("Candidate rejected: {}", e);
                    }
                }
            }
        }

        info!("No working selector combination found for {}", start_url);
        Ok(None)
    }

    /// Runs one bounded trial crawl. True only when the traversal survives
    /// the full validation prefix and every page carries an image.
    fn validate(&self, spec: &ComicSpec) -> Result<bool> {
        let spec = spec.clone();
        let client = self.config.client.clone();
        let outcome = EngineRunner::run(move || async move {
            let fetcher = PageFetcher::new(&client, None)?;
            let mut sink = NullSink;
            Traverser::new(&fetcher)
                .traverse(&spec, Some(VALIDATION_PAGES), &mut sink)
                .await
        })?;

        let accepted = outcome.pages.len() >= VALIDATION_PAGES as usize
            && outcome.pages.iter().all(|p| !p.image_urls.is_empty());
        Ok(accepted)
    }
}
