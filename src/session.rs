use crate::archive::ArchiveWriter;
use crate::config::Config;
use crate::engine::EngineRunner;
use crate::error::Result;
use crate::fetch::PageFetcher;
use crate::models::{ComicSpec, PageResult, TraversalOutcome};
use crate::storage::{sanitize_name, DownloadRecord};
use crate::traverse::{MaterializeSink, NullSink, Traverser};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Facade tying one comic to one destination. Exposes the three outward
/// operations: download, verify and archive conversion. Download and verify
/// each run inside their own engine context; conversion is local file work
/// and runs in the host context.
pub struct ComicSession {
    spec: ComicSpec,
    config: Config,
}

impl ComicSession {
    pub fn new(spec: ComicSpec, config: Config) -> Self {
        Self { spec, config }
    }

    pub fn spec(&self) -> &ComicSpec {
        &self.spec
    }

    /// The directory loose images are materialized into.
    pub fn destination(&self) -> PathBuf {
        Path::new(&self.config.storage.base_path).join(sanitize_name(&self.spec.name))
    }

    /// The finalized archive for this comic, next to the destination dir.
    pub fn archive_path(&self) -> PathBuf {
        let mut file_name = sanitize_name(&self.spec.name);
        file_name.push_str(".cbz");
        Path::new(&self.config.storage.base_path).join(file_name)
    }

    fn render_config(&self) -> Option<crate::config::RenderConfig> {
        self.spec
            .render_dynamic
            .then(|| self.config.render.clone())
    }

    /// Downloads the whole comic, page by page, into the destination
    /// directory. Idempotent: images already on disk or inside a previously
    /// finalized archive are skipped without refetching, so re-running
    /// after any failure simply resumes.
    pub fn download(&self) -> Result<TraversalOutcome> {
        let destination = self.destination();
        fs::create_dir_all(&destination)?;

        let spec = self.spec.clone();
        let client = self.config.client.clone();
        let render = self.render_config();
        let archive_path = self.archive_path();

        let outcome = EngineRunner::run(move || async move {
            let fetcher = PageFetcher::new(&client, render)?;
            let record = DownloadRecord::open(&destination, &archive_path)?;
            let mut sink = MaterializeSink::new(&fetcher, record, destination.clone());
            Traverser::new(&fetcher).traverse(&spec, None, &mut sink).await
        })?;

        info!(
            "Finished downloading {}: {} pages ({})",
            self.spec.name,
            outcome.pages.len(),
            outcome.reason
        );
        Ok(outcome)
    }

    /// Walks a short prefix of the comic without writing anything, so the
    /// selectors can be inspected before a full download is committed.
    /// `single_page` collapses the limit to 1 for comics that put every
    /// image on one page. A limit of 0 is clamped to 1: verification
    /// always looks at least at the first page.
    pub fn verify(&self, page_limit: u32, single_page: bool) -> Result<Vec<PageResult>> {
        let limit = if single_page { 1 } else { page_limit.max(1) };

        let spec = self.spec.clone();
        let client = self.config.client.clone();
        let render = self.render_config();

        let outcome = EngineRunner::run(move || async move {
            let fetcher = PageFetcher::new(&client, render)?;
            let mut sink = NullSink;
            Traverser::new(&fetcher).traverse(&spec, Some(limit), &mut sink).await
        })?;
        Ok(outcome.pages)
    }

    /// Bundles every materialized image into a single .cbz archive. Each
    /// loose file is removed once it has been appended; after the last one
    /// the archive is integrity-tested. The archive is assembled in a
    /// staging file and renamed into place only once fully written, so an
    /// interrupted conversion never clobbers a previously finalized
    /// archive. On a failed integrity test the archive is reported corrupt
    /// and left on disk for inspection.
    pub fn convert_to_archive(&self) -> Result<PathBuf> {
        let destination = self.destination();
        let archive_path = self.archive_path();
        let staging_path = archive_path.with_extension("cbz.part");

        let mut images: Vec<PathBuf> = fs::read_dir(&destination)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|entry| entry.path())
            .collect();
        images.sort();

        let mut writer = ArchiveWriter::create(&staging_path)?;
        for path in &images {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let bytes = fs::read(path)?;
            if writer.append(&name, &bytes)? {
                fs::remove_file(path)?;
            }
        }
        writer.finish()?;

        // The directory should be empty now; if something else crept in,
        // leave it alone.
        let _ = fs::remove_dir(&destination);

        fs::rename(&staging_path, &archive_path)?;

        ArchiveWriter::test_integrity(&archive_path)?;
        info!("Created archive {:?}", archive_path);
        Ok(archive_path)
    }
}
