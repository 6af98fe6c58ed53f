use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use galley::config::{self, Config, ExtractionSpec, OnError};
use galley::{logging, Pipeline};

/// Downloads every full-text PDF linked from a journal issue archive.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Archive page listing the issues.
    #[arg(long, default_value = config::DEFAULT_ARCHIVE_URL)]
    archive_url: String,

    #[arg(long, default_value = config::DEFAULT_ISSUE_CLASS)]
    issue_class: String,
    #[arg(long, default_value = config::DEFAULT_LINK_ATTRIBUTE)]
    issue_attr: String,

    #[arg(long, default_value = config::DEFAULT_PDF_CLASS)]
    pdf_class: String,
    #[arg(long, default_value = config::DEFAULT_LINK_ATTRIBUTE)]
    pdf_attr: String,
    /// Text a PDF anchor must contain.
    #[arg(long, default_value = config::DEFAULT_PDF_LINK_TEXT)]
    pdf_text: String,

    #[arg(short = 'o', long, default_value = config::DEFAULT_DOWNLOAD_DIR)]
    download_dir: PathBuf,
    #[arg(long, default_value = config::DEFAULT_LOG_DIR)]
    log_dir: PathBuf,

    /// Pause between downloads, in milliseconds.
    #[arg(long, default_value_t = config::DEFAULT_DELAY.as_millis() as u64)]
    delay_ms: u64,
    /// Bytes written per chunk while downloading.
    #[arg(long, default_value_t = config::DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Skip failing issue pages and files instead of stopping.
    #[arg(long)]
    keep_going: bool,
    /// Only list the PDF links.
    #[arg(long)]
    dry_run: bool,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Config {
            archive_url: args.archive_url,
            issues: ExtractionSpec::new(args.issue_class, args.issue_attr),
            pdfs: ExtractionSpec::new(args.pdf_class, args.pdf_attr),
            pdf_link_text: args.pdf_text,
            download_dir: args.download_dir,
            delay: Duration::from_millis(args.delay_ms),
            chunk_size: args.chunk_size,
            on_error: if args.keep_going { OnError::Skip } else { OnError::Abort },
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let _guard = match logging::init_run_log(&args.log_dir) {
        Ok((path, guard)) => {
            tracing::info!("Logging to {}", path.display());
            guard
        }
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let download = !args.dry_run;
    let mut pipeline = Pipeline::new(args.into());
    match pipeline.run(download).await {
        Ok(report) if report.failure_count() > 0 => {
            eprintln!(
                "finished with {} skipped items, see the log for details",
                report.failure_count()
            );
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
