//! Journal archive scraper.
//! Finds every issue on an archive page, every full-text PDF on those issues, and downloads them.

pub mod config;
pub mod discover;
pub mod download;
mod error;
pub mod logging;
mod macros;
pub mod parse;
pub mod process;
pub mod request;

pub use config::{Config, DownloadOptions, ExtractionSpec, OnError};
pub use error::{Error, Result};
pub use process::{process_site, Pipeline, RunReport, Stage};
