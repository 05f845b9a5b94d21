use std::process::ExitCode;
use std::sync::atomic::Ordering;

use log::{error, info, LevelFilter};
use rand::rngs::StdRng;
use rand::{thread_rng, RngCore, SeedableRng};

use orbit_diorama::{
    app, create_clap_command, handle_clap_matches,
    host::{TerminalHost, WindowHost},
    init_logging,
    loader::TextureLoader,
    Diorama, DioramaConfig, DisplayTarget, Result, DEBUG_PIPELINE,
};

fn main() -> ExitCode {
    let matches = create_clap_command().get_matches();
    let config = handle_clap_matches(&matches);

    if let Err(e) = init_logging(config.host.target, config.host.log_level) {
        eprintln!("Failed to initialise logging: {}", e);
    }
    DEBUG_PIPELINE.store(
        config.host.log_level >= LevelFilter::Trace,
        Ordering::Relaxed,
    );

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("orbit_diorama: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: &DioramaConfig) -> Result<()> {
    let mut rng: Box<dyn RngCore> = match config.host.seed {
        Some(seed) => {
            info!("Seeding star field with {}", seed);
            Box::new(StdRng::seed_from_u64(seed))
        }
        None => Box::new(thread_rng()),
    };

    let mut loader = TextureLoader::with_base_path(&config.host.assets);
    let diorama = Diorama::build(config, &mut loader, &mut *rng);

    match config.host.target {
        DisplayTarget::Window => {
            let host = WindowHost::open(
                &config.host.title,
                config.renderer.width,
                config.renderer.height,
                config.host.target_fps,
            )?;
            app::run(host, diorama, loader, config);
        }
        DisplayTarget::Terminal => {
            let host = TerminalHost::open(config.host.target_fps)?;
            app::run(host, diorama, loader, config);
        }
    }
    Ok(())
}
