//! Cover Spread CLI tool
//!
//! Serves the web front end, or runs the same pipeline from the command line
//! against a Google Drive folder or local files.

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use cover_spread::archive::{Archive, ArchiveBuilder};
use cover_spread::batch::{normalize_name, BatchProcessor};
use cover_spread::config::{BatchConfig, DriveConfig, SpreadConfig, API_KEY_ENV};
use cover_spread::drive::GoogleDriveClient;
use cover_spread::local::LocalFolder;
use cover_spread::pdf::{extract_metadata, load_document, PageCompositor, PageCountValidator, Template};
use cover_spread::service::CoverSpreadService;
use cover_spread::source::{DocumentFetcher, FolderLister};

/// Cover Spread - Place two pages of each PDF side by side on a cover template
#[derive(Parser)]
#[command(name = "cover-spread")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Run the web front end on port 3000
    GOOGLE_DRIVE_API_KEY=... cover-spread serve

    # Process a shared Drive folder and write the zip to ./out
    cover-spread fetch -o out \"https://drive.google.com/drive/folders/<id>\"

    # Process local files
    cover-spread batch -o out decks/*.pdf

    # Compose one file, using pages 1 and 8 of an 8-page deck
    cover-spread compose deck.pdf --expected-pages 8 --left-page 8 --right-page 1")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Template and page selection shared by every processing command
#[derive(Args, Debug, Clone)]
struct SpreadArgs {
    /// Template PDF whose first page is the canvas
    #[arg(long, env = "COVER_TEMPLATE", default_value = "public/pdfs/cover_image.pdf")]
    template: PathBuf,

    /// Exact page count a document must have to be processed
    #[arg(long, default_value_t = 17)]
    expected_pages: usize,

    /// One-based page drawn on the left half
    #[arg(long, default_value_t = 17)]
    left_page: usize,

    /// One-based page drawn on the right half
    #[arg(long, default_value_t = 1)]
    right_page: usize,
}

impl SpreadArgs {
    fn config(&self) -> anyhow::Result<SpreadConfig> {
        if self.left_page == 0 || self.right_page == 0 {
            bail!("page numbers start at 1");
        }
        let config = SpreadConfig {
            expected_page_count: self.expected_pages,
            left_page_index: self.left_page - 1,
            right_page_index: self.right_page - 1,
            ..SpreadConfig::default()
        };
        config.validate()?;
        Ok(config)
    }

    fn compositor(&self) -> anyhow::Result<Arc<PageCompositor>> {
        let template = Template::load(&self.template)
            .with_context(|| format!("loading template {}", self.template.display()))?;
        Ok(Arc::new(PageCompositor::new(template, self.config()?)?))
    }
}

/// Download retry policy
#[derive(Args, Debug, Clone)]
struct RetryArgs {
    /// Attempts per document download (1 disables retry)
    #[arg(long, default_value_t = 1)]
    fetch_attempts: u32,

    /// Pause between download attempts in milliseconds
    #[arg(long, default_value_t = 500)]
    retry_delay_ms: u64,
}

impl RetryArgs {
    fn config(&self) -> BatchConfig {
        BatchConfig {
            fetch_attempts: self.fetch_attempts,
            retry_delay_ms: self.retry_delay_ms,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the web front end
    Serve {
        /// Address to listen on
        #[arg(long, env = "COVER_SPREAD_BIND", default_value = "127.0.0.1:3000")]
        bind: String,

        /// Google Drive API key
        #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
        api_key: Option<String>,

        #[command(flatten)]
        spread: SpreadArgs,

        #[command(flatten)]
        retry: RetryArgs,
    },

    /// Process a Google Drive folder and write the zip locally
    Fetch {
        /// Shared folder link
        link: String,

        /// Directory the zip is written to
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Google Drive API key
        #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
        api_key: Option<String>,

        #[command(flatten)]
        spread: SpreadArgs,

        #[command(flatten)]
        retry: RetryArgs,
    },

    /// Process local PDF files and write the zip
    Batch {
        /// Input PDF files or directories. Supports glob patterns like "*.pdf"
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Directory the zip is written to
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        #[command(flatten)]
        spread: SpreadArgs,
    },

    /// Compose the cover spread for a single PDF
    Compose {
        /// Source PDF file
        input: PathBuf,

        /// Output PDF file path (defaults to cover_page_<input> beside the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        spread: SpreadArgs,
    },

    /// Show information about a PDF file
    Info {
        /// PDF file to inspect
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { bind, api_key, spread, retry } => {
            cmd_serve(bind, api_key, spread, retry).await
        }
        Commands::Fetch { link, output, api_key, spread, retry } => {
            cmd_fetch(link, output, api_key, spread, retry).await
        }
        Commands::Batch { inputs, output, spread } => {
            cmd_batch(inputs, output, spread).await
        }
        Commands::Compose { input, output, spread } => {
            cmd_compose(input, output, spread)
        }
        Commands::Info { input } => {
            cmd_info(input)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn drive_client(api_key: Option<String>) -> anyhow::Result<GoogleDriveClient> {
    let config = match api_key {
        Some(key) => DriveConfig::new(key)?,
        None => DriveConfig::from_env()?,
    };
    Ok(GoogleDriveClient::new(config))
}

fn build_service<S>(source: S, spread: &SpreadArgs, batch: BatchConfig) -> anyhow::Result<CoverSpreadService<S>>
where
    S: FolderLister + DocumentFetcher,
{
    let processor = BatchProcessor::new(spread.compositor()?, batch)?;
    Ok(CoverSpreadService::new(Arc::new(source), processor, ArchiveBuilder::default()))
}

fn write_archive(archive: &Archive, dir: &Path) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;
    let path = dir.join(&archive.name);
    std::fs::write(&path, &archive.bytes)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

/// Run the HTTP front end
async fn cmd_serve(
    bind: String,
    api_key: Option<String>,
    spread: SpreadArgs,
    retry: RetryArgs,
) -> anyhow::Result<()> {
    let service = build_service(drive_client(api_key)?, &spread, retry.config())?;
    cover_spread::server::serve(&bind, Arc::new(service)).await?;
    Ok(())
}

/// Process one Drive folder from the command line
async fn cmd_fetch(
    link: String,
    output: PathBuf,
    api_key: Option<String>,
    spread: SpreadArgs,
    retry: RetryArgs,
) -> anyhow::Result<()> {
    let service = build_service(drive_client(api_key)?, &spread, retry.config())?;
    let archive = service.process_folder(&link).await?;
    let path = write_archive(&archive, &output)?;
    println!("Archive: {}", path.display());
    Ok(())
}

/// Process local files
async fn cmd_batch(inputs: Vec<String>, output: PathBuf, spread: SpreadArgs) -> anyhow::Result<()> {
    let folder = LocalFolder::from_patterns(&inputs)?;
    info!("Resolved {} input files", folder.paths().len());

    let service = build_service(folder, &spread, BatchConfig::default())?;
    let archive = service.process_folder_id("local").await?;
    let path = write_archive(&archive, &output)?;
    println!("Archive: {}", path.display());
    Ok(())
}

/// Compose a single document
fn cmd_compose(input: PathBuf, output: Option<PathBuf>, spread: SpreadArgs) -> anyhow::Result<()> {
    if !input.exists() {
        bail!("Input file not found: {}", input.display());
    }

    let compositor = spread.compositor()?;
    let bytes = std::fs::read(&input)?;
    let doc = load_document(&bytes)?;

    let validator = PageCountValidator::new(compositor.config().expected_page_count);
    if !validator.validate(&doc) {
        bail!(
            "{} does not have exactly {} pages",
            input.display(),
            validator.expected()
        );
    }

    let output = match output {
        Some(path) => path,
        None => {
            let name = input
                .file_name()
                .map(|n| normalize_name(&n.to_string_lossy()))
                .unwrap_or_else(|| "output.pdf".to_string());
            input.with_file_name(format!("{}{}", compositor.config().output_prefix, name))
        }
    };

    let composed = compositor.compose(&doc)?;
    std::fs::write(&output, composed)?;

    println!("Output: {}", output.display());
    Ok(())
}

/// Show information about a PDF
fn cmd_info(input: PathBuf) -> anyhow::Result<()> {
    if !input.exists() {
        bail!("Input file not found: {}", input.display());
    }

    let metadata = extract_metadata(&input)?;

    println!("File: {}", input.display());
    println!("Pages: {}", metadata.page_count);

    if let Some(declared) = metadata.declared_page_count.filter(|&n| n != metadata.page_count) {
        println!("Declared page count: {} (does not match page tree)", declared);
    }

    if let Some(title) = metadata.title {
        println!("Title: {}", title);
    }
    if let Some(author) = metadata.author {
        println!("Author: {}", author);
    }

    Ok(())
}
