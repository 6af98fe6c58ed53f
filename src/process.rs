use std::fmt;

use chrono::Local;
use reqwest::Client;
use tracing::Instrument;

use crate::config::Config;
use crate::discover::{discover_issues, discover_pdfs, PdfDiscovery};
use crate::download::{download_all, DownloadReport};
use crate::{info_time, Result};

/// Where a run currently is. `Failed` and `Done` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    IssuesDiscovered,
    PdfsDiscovered,
    Downloading,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub issues: Vec<String>,
    pub pdfs: PdfDiscovery,
    /// `None` on a dry run.
    pub downloads: Option<DownloadReport>,
}

impl RunReport {
    /// Number of issue pages and files that were skipped.
    pub fn failure_count(&self) -> usize {
        self.pdfs.failures.len() + self.downloads.as_ref().map_or(0, |d| d.failures.len())
    }
}

/// Drives archive → issue pages → PDF files.
pub struct Pipeline {
    client: Client,
    config: Config,
    stage: Stage,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self::with_client(Client::new(), config)
    }

    /// `reqwest::Client` is an `Arc` internally, pass in a clone to share its pool.
    pub fn with_client(client: Client, config: Config) -> Self {
        Self {
            client,
            config,
            stage: Stage::Init,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Runs all stages. Without `download` it stops once the PDF links are known.
    pub async fn run(&mut self, download: bool) -> Result<RunReport> {
        let span = tracing::info_span!("run", archive = %self.config.archive_url);
        let res = self.run_stages(download).instrument(span).await;
        if let Err(e) = &res {
            self.stage = Stage::Failed;
            tracing::error!(
                kind = e.kind(),
                url = e.url().unwrap_or("-"),
                "Run failed: {e}"
            );
        }
        res
    }

    async fn run_stages(&mut self, download: bool) -> Result<RunReport> {
        let start_time = Local::now();
        info_time!("Started scraping {}", self.config.archive_url);
        let mut report = RunReport::default();

        report.issues = discover_issues(&self.client, &self.config.archive_url, &self.config.issues)
            .instrument(tracing::info_span!("issues"))
            .await?;
        self.advance(Stage::IssuesDiscovered);

        report.pdfs = discover_pdfs(
            &self.client,
            &report.issues,
            &self.config.pdfs,
            &self.config.pdf_link_text,
            self.config.on_error,
        )
        .instrument(tracing::info_span!("pdfs"))
        .await?;
        self.advance(Stage::PdfsDiscovered);
        for link in &report.pdfs.links {
            println!("{link}");
        }

        if download {
            self.advance(Stage::Downloading);
            let downloads = download_all(
                &self.client,
                &report.pdfs.links,
                &self.config.download_dir,
                &self.config.download_options(),
            )
            .instrument(tracing::info_span!("download"))
            .await?;
            report.downloads = Some(downloads);
        }

        self.advance(Stage::Done);
        info_time!(
            start_time,
            "Finished: {} issues, {} PDF links, {} skipped",
            report.issues.len(),
            report.pdfs.links.len(),
            report.failure_count()
        );
        Ok(report)
    }

    fn advance(&mut self, next: Stage) {
        tracing::info!("Stage {} -> {}", self.stage, next);
        self.stage = next;
    }
}

/// Runs the whole pipeline with `config`, downloading every discovered file.
pub async fn process_site(config: Config) -> Result<RunReport> {
    Pipeline::new(config).run(true).await
}
