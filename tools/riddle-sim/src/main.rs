use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use eyre::{Result, WrapErr};
use geo_riddle_core::{
    Coordinate, FixedQuestion, GameConfig, GameSession, RemoteWaypointSource, SampleOrigin,
    SessionController, WaypointGenerator, WaypointSupply,
};
use tracing_subscriber::EnvFilter;

mod board;
mod map;
mod prompt;
mod walker;

use board::Board;
use map::LoggingMap;
use prompt::TerminalPrompt;
use walker::SimulatedWalker;

#[derive(Parser, Debug)]
#[command(
    name = "riddle-sim",
    version,
    about = "Play a geo-riddle session in the terminal",
    long_about = "Scatters waypoints around a starting point and sends a simulated walker \
                  toward the nearest one. Reaching a waypoint asks its question on the \
                  terminal; answer by number, or send an empty line to dismiss."
)]
struct Args {
    /// Starting latitude
    #[arg(long, default_value_t = 52.3676, allow_hyphen_values = true)]
    latitude: f64,

    /// Starting longitude
    #[arg(long, default_value_t = 4.9041, allow_hyphen_values = true)]
    longitude: f64,

    /// JSON file with game settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fetch waypoints from this server instead of generating them
    #[arg(long)]
    api_url: Option<String>,

    /// Seed for waypoint placement
    #[arg(long)]
    seed: Option<u64>,

    /// Meters the walker covers per tick
    #[arg(long, default_value_t = 50.0)]
    step_m: f64,

    /// Milliseconds between position samples
    #[arg(long, default_value_t = 250)]
    tick_ms: u64,

    /// Report positions as GPS fixes instead of marker drags. Manual mode
    /// ignores GPS, so the walker will never trigger anything there.
    #[arg(long)]
    gps: bool,

    /// Verbose output (show debug messages)
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(args: &Args) -> Result<GameConfig> {
    let mut config: GameConfig = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&text)
                .wrap_err_with(|| format!("failed to parse {}", path.display()))?
        }
        None => GameConfig::default(),
    };

    if let Some(url) = &args.api_url {
        config.remote_base_url = Some(url.clone());
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(if args.verbose { "debug" } else { "info" })),
        )
        .without_time()
        .init();

    let config = load_config(&args)?;
    let start = Coordinate::new(args.latitude, args.longitude).wrap_err("invalid start position")?;

    let generator = match args.seed {
        Some(seed) => WaypointGenerator::seeded(config.spawn_radius_m, seed),
        None => WaypointGenerator::from_config(&config),
    };
    let session = GameSession::with_parts(&config, generator, Box::new(FixedQuestion::demo()));

    let board = Board::shared(start);
    let origin = if args.gps {
        SampleOrigin::Gps
    } else {
        SampleOrigin::Drag
    };
    let walker = SimulatedWalker::new(
        board.clone(),
        args.step_m,
        Duration::from_millis(args.tick_ms),
        origin,
    );

    let supply = match &config.remote_base_url {
        Some(url) => {
            tracing::info!(%url, "using waypoint server");
            WaypointSupply::Remote(RemoteWaypointSource::new(url.clone()))
        }
        None => WaypointSupply::Local,
    };

    let mut controller = SessionController::new(
        session,
        walker,
        TerminalPrompt::new(),
        LoggingMap::new(board),
        config,
    )
    .with_supply(supply);

    let result = controller.run().await;
    controller.stop();

    result.wrap_err("game ended with an error")?;
    tracing::info!("bye");

    Ok(())
}
