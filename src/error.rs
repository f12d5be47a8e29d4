use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComicDlError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    #[error("ZIP archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Failed to fetch page {page}: {source}")]
    Fetch {
        page: u32,
        #[source]
        source: Box<ComicDlError>,
    },

    #[error("Crawl engine failure: {0}")]
    Engine(String),

    #[error("Corrupted archive: {0}")]
    ArchiveCorrupt(String),

    #[error("Comic not found: {0}")]
    ComicNotFound(String),
}

impl ComicDlError {
    pub fn selector(msg: impl Into<String>) -> Self {
        Self::Selector(msg.into())
    }

    pub fn fetch(page: u32, source: ComicDlError) -> Self {
        Self::Fetch {
            page,
            source: Box::new(source),
        }
    }

    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }

    pub fn archive_corrupt(msg: impl Into<String>) -> Self {
        Self::ArchiveCorrupt(msg.into())
    }

    pub fn comic_not_found(name: impl Into<String>) -> Self {
        Self::ComicNotFound(name.into())
    }
}

pub type Result<T> = std::result::Result<T, ComicDlError>;
