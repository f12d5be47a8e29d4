use anyhow::Result;
use clap::{Parser, Subcommand};
use comicdl::config::Config;
use comicdl::discover::Discoverer;
use comicdl::models::{ComicSpec, PageResult};
use comicdl::session::ComicSession;
use comicdl::{comics, ComicDlError};
use std::io::{self, BufRead, Write};
use tracing::info;
use url::Url;

#[derive(Parser)]
#[command(name = "comicdl")]
#[command(about = "Webcomic crawling, downloading and archiving system")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the comics this tool knows how to download
    Comics,
    /// Download a known comic from the first page onwards
    Download {
        /// Comic name (see `comics`)
        name: String,
        /// Bundle the downloaded images into a .cbz archive
        #[arg(long)]
        cbz: bool,
    },
    /// Crawl the first pages of a known comic without downloading anything
    Verify {
        /// Comic name (see `comics`)
        name: String,
        /// How many pages to walk
        #[arg(long, default_value = "3")]
        pages: u32,
        /// Treat the comic as a single page holding every image
        #[arg(long)]
        single_page: bool,
    },
    /// Download a comic that is not in the known-comics table
    Custom {
        /// Name for the output directory/archive
        name: String,
        /// URL of the first page
        start_url: String,
        /// Next-page selector, e.g. 'a[rel="next"]@href'
        next_page_selector: String,
        /// Comic image selector, e.g. 'div#comic img@src'
        image_selector: String,
        /// Fetch pages through the headless-rendering proxy
        #[arg(long)]
        render: bool,
        /// Treat the comic as a single page holding every image
        #[arg(long)]
        single_page: bool,
        /// Bundle the downloaded images into a .cbz archive
        #[arg(long)]
        cbz: bool,
        /// Skip the interactive verification gate
        #[arg(short, long)]
        yes: bool,
    },
    /// Guess working selectors for an unknown site, then download
    Search {
        /// Name for the output directory/archive
        name: String,
        /// URL of the first page
        start_url: String,
        /// Bundle the downloaded images into a .cbz archive
        #[arg(long)]
        cbz: bool,
        /// Skip the interactive verification gate
        #[arg(short, long)]
        yes: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Comics => {
            for name in comics::names() {
                println!("{name}");
            }
        }
        Commands::Download { name, cbz } => {
            let spec = comics::find(&name)?
                .ok_or_else(|| ComicDlError::comic_not_found(&name))?;
            download(spec, config, cbz)?;
        }
        Commands::Verify {
            name,
            pages,
            single_page,
        } => {
            let spec = comics::find(&name)?
                .ok_or_else(|| ComicDlError::comic_not_found(&name))?;
            let session = ComicSession::new(spec, config);
            let results = session.verify(pages, single_page)?;
            print_verification(&results);
        }
        Commands::Custom {
            name,
            start_url,
            next_page_selector,
            image_selector,
            render,
            single_page,
            cbz,
            yes,
        } => {
            let spec = ComicSpec::new(name, &start_url, next_page_selector, image_selector)?
                .with_render_dynamic(render);
            verify_then_download(spec, config, single_page, cbz, yes)?;
        }
        Commands::Search {
            name,
            start_url,
            cbz,
            yes,
        } => {
            let seed = Url::parse(&start_url)?;
            let discoverer = Discoverer::new(config.clone());
            match discoverer.discover(&name, &seed)? {
                Some(spec) => {
                    println!(
                        "Found selectors: next-page `{}`, image `{}`",
                        spec.next_page_selector, spec.image_selector
                    );
                    verify_then_download(spec, config, false, cbz, yes)?;
                }
                None => {
                    println!("Could not find working selectors for {start_url}.");
                }
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(format!("comicdl={level}"))
        .with_target(false)
        .init();
}

fn download(spec: ComicSpec, config: Config, cbz: bool) -> Result<()> {
    let session = ComicSession::new(spec, config);
    let outcome = session.download()?;
    println!(
        "Finished downloading the images: {} pages.",
        outcome.pages.len()
    );
    if cbz {
        let archive = session.convert_to_archive()?;
        println!("Created archive {}.", archive.display());
    }
    Ok(())
}

/// Shows the first pages so the selectors can be eyeballed, then asks for
/// confirmation before committing to the full download.
fn verify_then_download(
    spec: ComicSpec,
    config: Config,
    single_page: bool,
    cbz: bool,
    yes: bool,
) -> Result<()> {
    let session = ComicSession::new(spec, config.clone());
    let results = session.verify(3, single_page)?;
    print_verification(&results);

    if !yes {
        println!("Verify that the links above are correct.");
        if !confirm("Are you sure you want to proceed?")? {
            info!("Download cancelled");
            return Ok(());
        }
    }

    download(session.spec().clone(), config, cbz)
}

fn print_verification(results: &[PageResult]) {
    for result in results {
        println!("Page {}:", result.page);
        println!("Page URL: {}", result.url);
        println!("Image URLs:");
        for image_url in &result.image_urls {
            println!("{image_url}");
        }
        println!();
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N]: ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}
