use crate::error::{ComicDlError, Result};
use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

/// Write-side adapter over the zip crate. Entries are write-once: appending
/// a logical name that is already present is a no-op skip.
pub struct ArchiveWriter {
    zip: ZipWriter<File>,
    path: PathBuf,
    names: HashSet<String>,
}

impl ArchiveWriter {
    pub fn create(path: &Path) -> Result<Self> {
        info!("Creating archive: {:?}", path);
        let file = File::create(path)?;
        Ok(Self {
            zip: ZipWriter::new(file),
            path: path.to_path_buf(),
            names: HashSet::new(),
        })
    }

    /// Appends one entry. Returns false when the name was already written.
    pub fn append(&mut self, name: &str, bytes: &[u8]) -> Result<bool> {
        if self.names.contains(name) {
            debug!("Entry {} already in archive, skipping", name);
            return Ok(false);
        }
        self.zip.start_file(name, FileOptions::default())?;
        self.zip.write_all(bytes)?;
        self.names.insert(name.to_string());
        Ok(true)
    }

    pub fn finish(mut self) -> Result<PathBuf> {
        self.zip.finish()?;
        info!("Finished archive: {:?}", self.path);
        Ok(self.path)
    }

    /// The logical names present in an existing archive.
    pub fn list_entries(path: &Path) -> Result<HashSet<String>> {
        let archive = ZipArchive::new(File::open(path)?)?;
        Ok(archive.file_names().map(|n| n.to_string()).collect())
    }

    /// Reads every entry back in full, letting the CRC checks run. Any
    /// failure is reported as a corrupted archive; the file is left on disk
    /// for inspection.
    pub fn test_integrity(path: &Path) -> Result<()> {
        let corrupt = |detail: String| {
            ComicDlError::archive_corrupt(format!("{}: {}", path.display(), detail))
        };
        let file = File::open(path).map_err(|e| corrupt(e.to_string()))?;
        let mut archive = ZipArchive::new(file).map_err(|e| corrupt(e.to_string()))?;
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index).map_err(|e| corrupt(e.to_string()))?;
            let name = entry.name().to_string();
            std::io::copy(&mut entry, &mut std::io::sink())
                .map_err(|e| corrupt(format!("entry {name}: {e}")))?;
        }
        Ok(())
    }
}
