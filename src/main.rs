use std::process::ExitCode;

use clap::Parser;
use log::{error, info, warn};

use foliage_raytrace::random::ChaChaSampler;
use foliage_raytrace::recorder::CsvRecorder;
use foliage_raytrace::{ConfigFile, Result, Simulation};

mod cli;
mod logger;

use cli::Args;
use logger::init_logger;

/// Merge command line overrides into the loaded configuration
fn load_config(args: &Args) -> Result<ConfigFile> {
    let mut config = ConfigFile::load(&args.config, args.config_is_default())?;

    if let Some(rays) = args.rays {
        config.simulation.number_of_rays = rays;
    }
    if let Some(bounces) = args.bounces {
        config.simulation.number_of_reflections = bounces;
    }
    if args.seed.is_some() {
        config.simulation.seed = args.seed;
    }
    if let Some(output) = &args.output {
        config.output = output.clone();
    }
    if args.sequential {
        config.simulation.parallel = false;
    }
    if args.no_progress {
        config.simulation.show_progress = false;
    }

    config.simulation.validate()?;
    Ok(config)
}

fn run(args: &Args) -> Result<()> {
    let config = load_config(args)?;
    if !config.scene.has_receiver() {
        warn!("Scene has no receiver; no path can be recorded");
    }

    let scene = config.scene.build(config.simulation.min_hit_distance)?;
    let mut sampler = ChaChaSampler::new(config.simulation.seed);
    let mut recorder = CsvRecorder::create(&config.output)?;

    let result = Simulation::new(&scene, &config.simulation).run(
        config.transmitter(),
        &mut sampler,
        &mut recorder,
    )?;

    info!(
        "{} of {} rays reached the receiver ({:.2}%)",
        result.hit_count,
        result.rays_traced,
        100.0 * result.hit_count as f64 / result.rays_traced.max(1) as f64
    );
    info!(
        "Absorbed: {} at receiver, {} by ground; escaped: {}; out of bounces: {}",
        result.outcomes.absorbed_at_receiver,
        result.outcomes.absorbed_by_ground,
        result.outcomes.escaped,
        result.outcomes.exhausted
    );
    info!("Ray paths saved to {}", config.output.display());
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    init_logger(args.debug_level.clone().into());

    // Log application startup with version information
    info!("foliage-raytrace - Git Version {} ({})", env!("GIT_HASH"), env!("GIT_DATE"));

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
