//! HangAI command line
//!
//! Without a subcommand the interactive menu starts. Diagnostics go to
//! stderr through `tracing`; set `RUST_LOG` or pass `-v` to see them.

use clap::{Parser, Subcommand};
use hangai::{
    console, print_history, Config, Geocoder, OverpassClient, PlaceCache, Recommender, Session,
    StdinPrompt,
};
use hangai_core::Radius;
use hangai_db::Store;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hangai", version, about = "Mood-based hangout recommender")]
struct Cli {
    /// RON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file (overrides the configuration)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Output path of the HTML map (overrides the configuration)
    #[arg(long, global = true)]
    map: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the interactive menu (default)
    Interactive {
        /// Starting location; asked for when missing or not found
        #[arg(long)]
        location: Option<String>,
    },
    /// Run a single search and exit
    Recommend {
        #[arg(long)]
        location: String,
        /// Free-text mood description
        #[arg(long)]
        mood: String,
        /// Search radius in kilometers
        #[arg(long)]
        radius_km: Option<f64>,
    },
    /// Print the search history
    History,
    /// Print the saved profile as JSON
    Export,
    /// Drop all cached place searches
    ClearCache,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("hangai=debug,hangai_db=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

type Interactive = Session<Geocoder, OverpassClient, StdinPrompt, io::Stdout>;

fn build_session(config: &Config, store: Arc<Store>) -> Result<Interactive, Box<dyn std::error::Error>> {
    let geocoder = Geocoder::new(&config.geocoder)?;
    let overpass = OverpassClient::new(&config.overpass, &config.geocoder.user_agent)?;
    let cache = PlaceCache::with_store(&config.cache, store.clone());
    let session = Session::new(
        geocoder,
        Recommender::new(overpass, cache),
        store,
        config.search.clone(),
        config.storage.map_path.clone(),
        StdinPrompt::new(),
        io::stdout(),
    )?;
    Ok(session)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load_or_default(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.storage.db_path = db;
    }
    if let Some(map) = cli.map {
        config.storage.map_path = map;
    }
    debug!(?config, "configuration loaded");

    let store = Arc::new(Store::open(&config.storage.db_path)?);
    let mut stdout = io::stdout();

    match cli.command.unwrap_or(Command::Interactive { location: None }) {
        Command::Interactive { location } => {
            let mut session = build_session(&config, store)?;
            session.recommender().cache().warm().await;
            session.run(location.as_deref()).await?;
        }
        Command::Recommend {
            location,
            mood,
            radius_km,
        } => {
            let default = config.search.default_radius();
            let radius = radius_km.map(|km| Radius::from_km_input(&km.to_string(), default));
            let mut session = build_session(&config, store)?;
            let places = session.recommend_once(&location, &mood, radius).await?;
            info!(count = places.len(), "search finished");
        }
        Command::History => {
            print_history(&mut stdout, &store.load_profile()?)?;
        }
        Command::Export => {
            println!("{}", store.export_profile_json()?);
        }
        Command::ClearCache => {
            let removed = PlaceCache::with_store(&config.cache, store).clear().await;
            console::success(&mut stdout, &format!("Removed {removed} cached searches"))?;
        }
    }

    Ok(())
}
