use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ARCHIVE_URL: &str = "https://ijapr.in/index.php/ijapr/issue/archive";
pub const DEFAULT_ISSUE_CLASS: &str = "obj_issue_summary";
pub const DEFAULT_PDF_CLASS: &str = "obj_galley_link pdf";
pub const DEFAULT_LINK_ATTRIBUTE: &str = "href";
/// Visible text separating the PDF galley from its EPUB/HTML siblings.
pub const DEFAULT_PDF_LINK_TEXT: &str = "PDF FULL TEXT";
pub const DEFAULT_DOWNLOAD_DIR: &str = "./data/downloads";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// Which elements to look for and which of their attributes to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionSpec {
    /// Whitespace separated class names, all of which an element must carry.
    pub class_filter: String,
    pub attribute: String,
}

impl ExtractionSpec {
    pub fn new(class_filter: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            class_filter: class_filter.into(),
            attribute: attribute.into(),
        }
    }
}

/// What to do when a single issue page or file fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OnError {
    /// Stop the whole run at the first failure.
    #[default]
    Abort,
    /// Record the failure and carry on with the next item.
    Skip,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub archive_url: String,
    pub issues: ExtractionSpec,
    pub pdfs: ExtractionSpec,
    pub pdf_link_text: String,
    pub download_dir: PathBuf,
    /// Pause between two consecutive downloads.
    pub delay: Duration,
    pub chunk_size: usize,
    pub on_error: OnError,
}

impl Config {
    pub fn download_options(&self) -> DownloadOptions {
        DownloadOptions {
            delay: self.delay,
            chunk_size: self.chunk_size,
            on_error: self.on_error,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            archive_url: DEFAULT_ARCHIVE_URL.into(),
            issues: ExtractionSpec::new(DEFAULT_ISSUE_CLASS, DEFAULT_LINK_ATTRIBUTE),
            pdfs: ExtractionSpec::new(DEFAULT_PDF_CLASS, DEFAULT_LINK_ATTRIBUTE),
            pdf_link_text: DEFAULT_PDF_LINK_TEXT.into(),
            download_dir: DEFAULT_DOWNLOAD_DIR.into(),
            delay: DEFAULT_DELAY,
            chunk_size: DEFAULT_CHUNK_SIZE,
            on_error: OnError::default(),
        }
    }
}

/// Knobs of the batch downloader.
#[derive(Debug, Clone, Copy)]
pub struct DownloadOptions {
    pub delay: Duration,
    pub chunk_size: usize,
    pub on_error: OnError,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Config::default().download_options()
    }
}
