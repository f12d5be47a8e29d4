use crate::archive::ArchiveWriter;
use crate::error::Result;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Returns the artifact name for an image URL on a given page. If the only
/// dot in the URL is the domain's, the URL has no usable extension and the
/// page number alone is used.
pub fn save_image_location(url: &str, page: u32) -> String {
    match url.rfind('.') {
        Some(index) if url.matches('.').count() > 1 => {
            format!("{}{}", page, &url[index..])
        }
        _ => page.to_string(),
    }
}

/// Strips characters that are unsafe in file and directory names.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == ' ')
        .to_string()
}

/// The set of already-materialized artifact names for one comic, seeded
/// from the destination directory listing and from the namelist of a
/// previously finalized archive. Names are bare file names with no
/// directory prefix, uniformly for both sources.
#[derive(Debug, Default)]
pub struct DownloadRecord {
    names: HashSet<String>,
}

impl DownloadRecord {
    pub fn open(directory: &Path, archive: &Path) -> Result<Self> {
        let mut names = HashSet::new();
        if directory.is_dir() {
            for entry in fs::read_dir(directory)? {
                let entry = entry?;
                if entry.file_type()?.is_file() {
                    names.insert(entry.file_name().to_string_lossy().into_owned());
                }
            }
        }
        if archive.is_file() {
            names.extend(ArchiveWriter::list_entries(archive)?);
        }
        Ok(Self { names })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Records a materialized artifact. Returns false if the name was
    /// already present; callers treat that as a no-op skip, never an
    /// overwrite.
    pub fn insert(&mut self, name: String) -> bool {
        self.names.insert(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_name_keeps_the_url_extension() {
        assert_eq!(
            save_image_location("http://x.com/comics/barrel_cropped_(1).jpg", 1),
            "1.jpg"
        );
        assert_eq!(save_image_location("http://imgs.xkcd.com/a/tree.png", 12), "12.png");
    }

    #[test]
    fn image_name_without_extension_is_the_page_number() {
        assert_eq!(save_image_location("http://x.com", 1), "1");
        assert_eq!(save_image_location("", 3), "3");
    }

    #[test]
    fn sanitize_replaces_path_separators() {
        assert_eq!(sanitize_name("a/b\\c:d"), "a_b_c_d");
        assert_eq!(sanitize_name(" trimmed. "), "trimmed");
    }

    #[test]
    fn record_starts_empty_for_fresh_destination() {
        let dir = tempfile::tempdir().unwrap();
        let record = DownloadRecord::open(
            &dir.path().join("missing"),
            &dir.path().join("missing.cbz"),
        )
        .unwrap();
        assert!(record.is_empty());
    }

    #[test]
    fn record_lists_loose_files_and_dedups_inserts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("1.jpg"), b"img").unwrap();
        fs::write(dir.path().join("2.jpg"), b"img").unwrap();

        let mut record =
            DownloadRecord::open(dir.path(), &dir.path().join("none.cbz")).unwrap();
        assert_eq!(record.len(), 2);
        assert!(record.contains("1.jpg"));
        assert!(!record.insert("1.jpg".to_string()));
        assert!(record.insert("3.jpg".to_string()));
    }
}
