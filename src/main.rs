//! CLI entry point for spacetraveling

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "spacetraveling")]
#[command(version)]
#[command(about = "A blog generated from a headless CMS, with on-demand article pages", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Read documents from a JSON dump instead of the content API
    #[arg(short, long, global = true, value_name = "FILE")]
    fixtures: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Precompute the listing page and every article page
    #[command(alias = "g")]
    Generate,

    /// Start a local server that renders new articles on demand
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Serve without precomputing first
        #[arg(long)]
        no_generate: bool,
    },

    /// List every published post
    List {
        /// Also estimate each post's reading time
        #[arg(short, long)]
        reading_time: bool,
    },

    /// Show a single post
    Post {
        /// Post uid
        uid: String,
    },

    /// Clean the public folder
    Clean,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "spacetraveling=debug,info"
    } else {
        "spacetraveling=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let fixtures = cli.fixtures.as_deref();

    match cli.command {
        Commands::Generate => {
            let blog = spacetraveling::Blog::new(&base_dir)?;
            let source = blog.content_source(fixtures)?;
            tracing::info!("Generating static files...");

            let report = blog.generate(source).await?;
            println!(
                "Generated {} of {} posts successfully!",
                report.articles, report.listed
            );
            if !report.skipped.is_empty() {
                println!("Skipped: {}", report.skipped.join(", "));
            }
        }

        Commands::Server {
            port,
            ip,
            open,
            no_generate,
        } => {
            let blog = spacetraveling::Blog::new(&base_dir)?;
            let source = blog.content_source(fixtures)?;

            if !no_generate {
                tracing::info!("Generating static files...");
                blog.generate(source.clone()).await?;
            }

            tracing::info!("Starting server at http://{}:{}", ip, port);
            spacetraveling::server::start(&blog, source, &ip, port, open).await?;
        }

        Commands::List { reading_time } => {
            let blog = spacetraveling::Blog::new(&base_dir)?;
            let source = blog.content_source(fixtures)?;
            spacetraveling::commands::list::run(&blog, source.as_ref(), reading_time).await?;
        }

        Commands::Post { uid } => {
            let blog = spacetraveling::Blog::new(&base_dir)?;
            let source = blog.content_source(fixtures)?;
            spacetraveling::commands::post::run(&blog, source.as_ref(), &uid).await?;
        }

        Commands::Clean => {
            let blog = spacetraveling::Blog::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            blog.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::Version => {
            println!("spacetraveling version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
