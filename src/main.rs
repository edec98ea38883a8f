use clap::Parser;
use log::{Level, LevelFilter, Log, Metadata, Record};

use level_generator::config::{LevelConfig, StrategyKind};
use level_generator::export;
use level_generator::generation::Strategy;
use level_generator::pacing::CancelToken;
use level_generator::rng::seeded_rng;
use level_generator::seeds::LevelSeeds;
use level_generator::surface::{Cell, LevelMap, TerrainKind};
use level_generator::GenerationError;

#[derive(Parser, Debug)]
#[command(name = "level_generator")]
#[command(about = "Generate 2D dungeon, cave and terrain levels")]
struct Args {
    /// Generation algorithm (defaults to the config file's, or bsp)
    #[arg(long, value_enum)]
    strategy: Option<StrategyKind>,

    /// Width of the level in cells
    #[arg(short = 'W', long)]
    width: Option<usize>,

    /// Height of the level in cells
    #[arg(short = 'H', long)]
    height: Option<usize>,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// JSON level configuration
    #[arg(long)]
    config: Option<String>,

    /// Export the level to a PNG file
    #[arg(long)]
    png: Option<String>,

    /// Pixels per cell in the PNG export
    #[arg(long, default_value = "4")]
    scale: u32,

    /// Print the level as ASCII
    #[arg(long)]
    ascii: bool,

    /// Cancel generation after this many units of work
    #[arg(long)]
    cancel_after: Option<usize>,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    dump_config: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{:<5}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logging(verbose: u8, quiet: bool) {
    let filter = match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Warn,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(filter);
    }
}

fn resolve_config(args: &Args) -> Result<LevelConfig, level_generator::ConfigError> {
    let mut config = match &args.config {
        Some(path) => LevelConfig::load(path)?,
        None => LevelConfig::default(),
    };

    if let Some(kind) = args.strategy {
        if config.strategy.kind() != kind {
            config.strategy = Strategy::default_for(kind);
        }
    }
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    Ok(config)
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let config = match resolve_config(&args) {
        Ok(config) => config,
        Err(err) => {
            log::error!("{}", err);
            std::process::exit(1);
        }
    };

    if args.dump_config {
        match config.to_json() {
            Ok(json) => println!("{}", json),
            Err(err) => {
                log::error!("{}", err);
                std::process::exit(1);
            }
        }
        return;
    }

    for issue in config.check() {
        log::warn!("config: {}", issue);
    }

    let Some(total) = config.cell_count() else {
        log::error!("a {}x{} level cannot be allocated", config.width, config.height);
        std::process::exit(1);
    };

    let seeds = config.seed.map(LevelSeeds::from_master).unwrap_or_default();
    let kind = config.strategy.kind();
    let mut rng = seeded_rng(seeds.for_strategy(kind));
    log::debug!("{}", seeds);

    println!("Generating {} level with seed: {}", kind, seeds.master);
    println!("Map size: {}x{}", config.width, config.height);

    let mut map = LevelMap::new(config.width, config.height);
    let cancel = CancelToken::new();
    let result = config.strategy.generate_with(&mut map, &mut rng, &cancel, |unit, _| {
        log::trace!("unit {} ({})", unit.index, unit.label);
        if args.cancel_after.is_some_and(|limit| unit.index >= limit) {
            cancel.cancel();
        }
    });

    match result {
        Ok(report) => {
            println!("Generation complete in {} units:", report.units_completed);
            if matches!(kind, StrategyKind::Bsp | StrategyKind::Scatter) {
                println!("  Rooms: {}", report.rooms.len());
                println!("  Corridors: {}", report.corridors);
            }
            if !report.warnings.is_empty() {
                println!("  Warnings: {}", report.warnings.len());
                for warning in &report.warnings {
                    println!("    {}", warning);
                }
            }
        }
        Err(GenerationError::Cancelled { units_completed }) => {
            println!("Generation cancelled after {} units, keeping the partial level", units_completed);
        }
    }

    if total > 0 {
        let open = total - map.count(Cell::Wall);
        println!("Open cells: {} ({:.1}%)", open, 100.0 * open as f64 / total as f64);
        if kind == StrategyKind::Terrain {
            for terrain in TerrainKind::ALL {
                let count = map.count(Cell::Terrain(terrain));
                println!("  {}: {:.1}%", terrain.display_name(), 100.0 * count as f64 / total as f64);
            }
        }
    }

    if args.ascii {
        print!("{}", export::render_ascii(&map));
    }

    if let Some(path) = &args.png {
        println!("Exporting level to {}...", path);
        if let Err(err) = export::export_png(&map, path, args.scale) {
            log::error!("failed to write {}: {}", path, err);
            std::process::exit(1);
        }
    }
}
