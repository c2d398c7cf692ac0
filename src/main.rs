use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use attire_decider::cache::FileCacheStore;
use attire_decider::config::Config;
use attire_decider::ingest::replay::ReplaySource;
use attire_decider::ingest::wunderground::WundergroundSource;
use attire_decider::ingest::WeatherSource;
use attire_decider::locations::{find_sample, DEFAULT_ZIP, SAMPLE_LOCATIONS};
use attire_decider::logging::{self, Component};
use attire_decider::policy::clothing::ClothingThresholds;
use attire_decider::{report, verify, AttireError, AttirePipeline, LocationKey};

/// Decide what to wear from the current weather at a U.S. zip code.
#[derive(Debug, Parser)]
#[command(name = "attire", version, about)]
struct Cli {
    /// 5-digit zip code (ZIP+4 accepted)
    #[arg(default_value = DEFAULT_ZIP)]
    zip: String,

    /// Temperature (F) you consider cold; requires --warm
    #[arg(long, requires = "warm", allow_negative_numbers = true)]
    cold: Option<f64>,

    /// Temperature (F) you consider warm; requires --cold
    #[arg(long, requires = "cold", allow_negative_numbers = true)]
    warm: Option<f64>,

    /// Ignore cached weather and fetch now
    #[arg(long)]
    refresh: bool,

    /// Config file (default: $ATTIRE_CONFIG or attire.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Cache directory, overriding config and $ATTIRE_CACHE_DIR
    #[arg(long, value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    /// Serve saved `<zip>.html` pages from DIR instead of the network
    #[arg(long, value_name = "DIR")]
    replay_dir: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// List sample zip codes and exit
    #[arg(long, conflicts_with = "verify")]
    samples: bool,

    /// Check every sample location against the source and exit
    #[arg(long)]
    verify: bool,
}

fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, AttireError> {
    if cli.samples {
        for sample in SAMPLE_LOCATIONS {
            println!("{}  {:<16} {}", sample.zip, sample.name, sample.purpose);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(&config_path)?;
    config.apply_env();
    if let Some(dir) = &cli.cache_dir {
        config.cache.dir = dir.clone();
    }

    let preferences = match (cli.cold, cli.warm) {
        (Some(cold), Some(warm)) => Some(ClothingThresholds::from_preferences(cold, warm)?),
        _ => None,
    };
    if let Some(thresholds) = preferences {
        config.thresholds = thresholds;
    }

    let (config, validation) = config.validated()?;

    logging::init_logger(
        config.log_level(),
        config.logging.file.as_deref(),
        config.logging.timestamps,
    )?;
    for warning in &validation.warnings {
        tracing::warn!(component = %Component::System, "config: {}", warning);
    }

    let source: Box<dyn WeatherSource> = match &cli.replay_dir {
        Some(dir) => {
            tracing::info!(component = %Component::System, dir = %dir.display(), "replaying saved pages");
            Box::new(ReplaySource::new(dir))
        }
        None => Box::new(WundergroundSource::new(
            &config.source.base_url,
            config.source_timeout(),
            &config.source.user_agent,
        )?),
    };

    if cli.verify {
        let report = verify::run_verification(&source, SAMPLE_LOCATIONS);
        verify::print_summary(&report);
        return Ok(if report.summary.failed == 0 {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    let key = LocationKey::parse(&cli.zip)?;
    if let Some(sample) = find_sample(key.as_str()) {
        tracing::debug!(component = %Component::System, zip = %key, "sample location: {} ({})", sample.name, sample.purpose);
    }
    let pipeline = AttirePipeline::new(FileCacheStore::new(&config.cache.dir), source)
        .with_thresholds(config.thresholds)
        .with_max_age(config.max_age());

    let now = chrono::Utc::now();
    let outcome = if cli.refresh {
        pipeline.refresh_at(&key, now)?
    } else {
        pipeline.run_at(&key, now)?
    };

    if cli.json {
        println!("{}", report::render_json(&outcome)?);
    } else {
        print!("{}", report::render_text(&outcome, preferences.as_ref()));
    }

    Ok(ExitCode::SUCCESS)
}
