//! PageLock main entry point
//!
//! This is the command-line interface for cloning pages and sites.

use anyhow::Context;
use clap::{Parser, Subcommand};
use pagelock::archive::archive_name_for;
use pagelock::config::{load_config_or_default, Config};
use pagelock::{clone_single_page, clone_site, CloneOptions, HttpFetcher};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// PageLock: offline copies of web pages
///
/// PageLock fetches a page, inlines its stylesheets, embeds its images,
/// inlines same-host scripts and rewrites every other reference to an
/// absolute URL, producing one self-contained HTML file.
#[derive(Parser, Debug)]
#[command(name = "pagelock")]
#[command(version = "1.0.0")]
#[command(about = "Clone web pages into self-contained HTML", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clone a single page
    Clone {
        /// Page to clone; `https://` is assumed when no scheme is given
        url: String,

        /// Keep image URLs instead of embedding images as data URIs
        #[arg(long)]
        no_embed_images: bool,

        /// Write the HTML here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Crawl a site and package its pages as a zip archive
    Site {
        /// Root page of the crawl
        url: String,

        /// Maximum number of pages, root included
        #[arg(long)]
        max_pages: Option<usize>,

        /// Maximum link depth from the root page
        #[arg(long)]
        max_depth: Option<u32>,

        /// Keep image URLs instead of embedding images as data URIs
        #[arg(long)]
        no_embed_images: bool,

        /// Archive path (defaults to `<host>.zip`)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Run the HTTP API
    Serve {
        /// Listen address, overrides `[server] bind`
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_config_or_default(cli.config.as_deref()).with_context(|| match &cli.config
    {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Invalid default configuration".to_string(),
    })?;

    match cli.command {
        Command::Clone {
            url,
            no_embed_images,
            output,
        } => handle_clone(&config, url, !no_embed_images, output).await,
        Command::Site {
            url,
            max_pages,
            max_depth,
            no_embed_images,
            output,
        } => {
            let options = CloneOptions::new(url)
                .with_embed_images(!no_embed_images)
                .with_limits(
                    max_pages.unwrap_or(config.crawl.max_pages),
                    max_depth.unwrap_or(config.crawl.max_depth),
                );
            handle_site(&config, options, output).await
        }
        Command::Serve { bind } => {
            let mut config = config;
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            pagelock::server::serve(config)
                .await
                .context("Server stopped with an error")
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pagelock=info,warn"),
            1 => EnvFilter::new("pagelock=debug,info"),
            2 => EnvFilter::new("pagelock=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Handles `pagelock clone`
async fn handle_clone(
    config: &Config,
    url: String,
    embed_images: bool,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let fetcher = HttpFetcher::new(&config.fetcher)?;
    let options = CloneOptions::new(url).with_embed_images(embed_images);

    let result = match clone_single_page(&options, &fetcher, &config.fetcher).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("Clone failed: {}", e);
            return Err(e.into());
        }
    };

    match output {
        Some(path) => {
            std::fs::write(&path, &result.html)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "✓ Saved \"{}\" ({} bytes) to {}",
                result.title,
                result.byte_size,
                path.display()
            );
        }
        None => println!("{}", result.html),
    }

    Ok(())
}

/// Handles `pagelock site`
async fn handle_site(
    config: &Config,
    options: CloneOptions,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let fetcher = HttpFetcher::new(&config.fetcher)?;

    let result = match clone_site(&options, &fetcher, config).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("Site clone failed: {}", e);
            return Err(e.into());
        }
    };

    let path = output.unwrap_or_else(|| PathBuf::from(archive_name_for(&options.target_url)));
    std::fs::write(&path, &result.archive)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    eprintln!("=== Site Clone Summary ===\n");
    for page in &result.pages {
        eprintln!("  ✓ {} ({} bytes)", page.source_url, page.byte_size);
    }
    for failure in &result.failures {
        eprintln!("  ✗ {}: {}", failure.url, failure.error);
    }
    eprintln!(
        "\n✓ {} pages archived to {} ({} failed)",
        result.pages.len(),
        path.display(),
        result.failures.len()
    );

    Ok(())
}
