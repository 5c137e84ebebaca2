use clap::{Parser, Subcommand};
use quran_json::{config, download, output, pipeline, tajweed};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "quran-json")]
#[command(about = "Generates the quran-json dataset")]
#[command(long_about = "\
Generates the quran-json dataset

Two stages, connected only through the local data directory:

  quran-json download          # Fetch sources into data/ (once)
  quran-json build             # Generate the dataset into dist/

The download stage fetches chapter metadata and text editions and caches
each to a file; existing files are never re-fetched (use --clean to force
a refresh). The build stage reads those files, fetches tajweed-annotated
text chapter by chapter from the alquran.cloud API, and materializes:

  dist/
  ├── quran.json               # Consolidated documents, one per language
  ├── quran_transliteration.json
  ├── quran_<lang>.json
  ├── chapters/                # One file per chapter (+ linked index),
  │   ├── 1.json … index.json  # per language
  │   └── <lang>/...
  └── verses/                  # Globally numbered verse files embedding
      └── 1.json … 6236.json   # all translations

Languages, endpoints, and pacing live in config.toml. Run
'quran-json gen-config' to print a documented stock config.")]
#[command(version = version_string())]
struct Cli {
    /// Directory of downloaded source data
    #[arg(long, default_value = "data", global = true)]
    data_dir: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download chapter metadata and editions into the data directory
    Download {
        /// Empty the data directory first, forcing a full re-download
        #[arg(long)]
        clean: bool,
    },
    /// Generate the full dataset from the downloaded data
    Build {
        /// Pretty-print (indent) the generated JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();

    let cli = Cli::parse();
    let config = config::load_config(Path::new("."))?;
    config.validate()?;

    match cli.command {
        Command::Download { clean } => {
            if clean {
                download::clean(&cli.data_dir).await?;
            }
            println!("==> Downloading sources into {}", cli.data_dir.display());
            let downloader = download::Downloader::new(&config, &cli.data_dir)?;
            let reports = downloader.run().await?;
            output::print_download_output(&reports);
        }
        Command::Build { pretty } => {
            println!(
                "==> Building dataset: {} → {}",
                cli.data_dir.display(),
                cli.output.display()
            );
            let source = tajweed::AlQuranCloud::new(config.tajweed.endpoint.as_str())?;
            let report =
                pipeline::run(&config, &cli.data_dir, &cli.output, &source, pretty).await?;
            output::print_build_output(&report);
            println!("==> Build complete: {}", cli.output.display());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
