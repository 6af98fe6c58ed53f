use std::path::{Path, PathBuf};

use reqwest::Client;
use tokio::{fs, fs::File, io::AsyncWriteExt};
use url::Url;

use crate::config::{DownloadOptions, OnError};
use crate::discover::ItemFailure;
use crate::request::send_get;
use crate::{Error, Result};

/// A remote file and where it ends up on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub url: String,
    pub path: PathBuf,
}

impl DownloadTarget {
    /// Turns an article link into its download link and local path under `dir`.
    pub fn from_link(link: &str, dir: &Path) -> Result<Self> {
        let url = rewrite_view_url(link);
        let name = file_name(&url).ok_or_else(|| Error::NoFileName(url.clone()))?;
        Ok(Self {
            path: dir.join(format!("{name}.pdf")),
            url,
        })
    }
}

#[derive(Debug, Default)]
pub struct DownloadReport {
    /// Completed files, in download order.
    pub files: Vec<PathBuf>,
    /// How many times the batch paused between downloads.
    pub pauses: usize,
    pub failures: Vec<ItemFailure>,
}

/// Article pages live under `/view/`, the raw files under `/download/`.
#[inline]
pub fn rewrite_view_url(link: &str) -> String {
    link.replace("/view/", "/download/")
}

/// Last non-empty path segment, ignoring query and fragment.
fn file_name(url: &str) -> Option<String> {
    let last_segment = |path: &str| {
        path.split('/')
            .filter(|s| !s.is_empty())
            .last()
            .map(str::to_owned)
    };
    match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last().map(str::to_owned)),
        Err(_) => last_segment(url.split(['?', '#']).next().unwrap_or_default()),
    }
}

/// Streams the body of `url` into `path`, `chunk_size` bytes per write.
/// The data goes to a `.part` sibling first and is renamed once complete, so a file at `path`
/// is never a truncated transfer.
pub async fn download(client: &Client, url: &str, path: &Path, chunk_size: usize) -> Result<()> {
    tracing::info!("Downloading file from {url}");
    let part = part_path(path);

    let res = match stream_to_file(client, url, &part, chunk_size.max(1)).await {
        Ok(()) => fs::rename(&part, path).await.map_err(|e| Error::fs(path, e)),
        Err(e) => Err(e),
    };
    if let Err(e) = res {
        // Nothing to clean up if the request failed before the file was created.
        let _ = fs::remove_file(&part).await;
        return Err(e);
    }

    tracing::info!("Downloaded file saved as {}", path.display());
    println!("Downloaded file saved as {}", path.display());
    Ok(())
}

async fn stream_to_file(client: &Client, url: &str, part: &Path, chunk_size: usize) -> Result<()> {
    let mut res = send_get(client, url).await?;
    let mut file = File::create(part).await.map_err(|e| Error::fs(part, e))?;

    while let Some(chunk) = res.chunk().await.map_err(|e| Error::transport(url, e))? {
        for piece in chunk.chunks(chunk_size) {
            file.write_all(piece).await.map_err(|e| Error::fs(part, e))?;
        }
    }
    file.flush().await.map_err(|e| Error::fs(part, e))?;
    Ok(())
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}

/// Downloads every link into `dir`, one at a time, pausing `opts.delay` between two downloads.
pub async fn download_all(
    client: &Client,
    pdf_links: &[String],
    dir: &Path,
    opts: &DownloadOptions,
) -> Result<DownloadReport> {
    tracing::info!("Downloading {} PDF files into {}", pdf_links.len(), dir.display());
    fs::create_dir_all(dir).await.map_err(|e| Error::fs(dir, e))?;

    let mut report = DownloadReport::default();
    for (idx, link) in pdf_links.iter().enumerate() {
        if idx > 0 {
            tokio::time::sleep(opts.delay).await;
            report.pauses += 1;
        }

        let res = match DownloadTarget::from_link(link, dir) {
            Ok(target) => download(client, &target.url, &target.path, opts.chunk_size)
                .await
                .map(|_| target.path),
            Err(e) => Err(e),
        };
        match res {
            Ok(path) => report.files.push(path),
            Err(error) if opts.on_error == OnError::Skip => {
                tracing::warn!(kind = error.kind(), "Skipping {link}: {error}");
                report.failures.push(ItemFailure {
                    url: link.clone(),
                    error,
                });
            }
            Err(error) => return Err(error),
        }
    }

    tracing::info!("All files downloaded");
    Ok(report)
}
