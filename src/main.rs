//! RCS CLI - desktop entry point
//!
//! Lists profiles, prints settings, and runs the engine against the
//! simulated demo backends without needing a display or input device.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use rcs::clock::{ManualClock, MonotonicClock, SharedClock};
use rcs::config::Settings;
use rcs::platform::{SimulatedBackend, SimulatedSensor};
use rcs::stealth::Humanizer;
use rcs::{RecoilControl, TickOutcome};

#[derive(Parser)]
#[command(name = "rcs", version, about = "Reactive recoil compensation engine")]
struct Cli {
    /// Settings file (JSON); defaults are used when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List weapon profiles
    Profiles,
    /// Print the effective settings as JSON
    Config {
        /// Write the settings to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run the engine against the simulated demo backends
    Simulate {
        /// Simulated run length in seconds
        #[arg(long, default_value_t = 60)]
        seconds: u64,
        /// Time between ticks in milliseconds
        #[arg(long, default_value_t = 16)]
        tick_ms: u64,
        /// Weapon profile to select by name
        #[arg(long)]
        weapon: Option<String>,
        /// Time between simulated flashes in milliseconds
        #[arg(long, default_value_t = 5000)]
        flash_period_ms: u64,
        /// Run against the wall clock instead of a simulated one
        #[arg(long)]
        realtime: bool,
        /// Seed for the jitter generator
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    match cli.command {
        Command::Profiles => list_profiles(&settings),
        Command::Config { output } => match output {
            Some(path) => settings.save(path)?,
            None => println!("{}", settings.to_json()?),
        },
        Command::Simulate {
            seconds,
            tick_ms,
            weapon,
            flash_period_ms,
            realtime,
            seed,
        } => simulate(
            &settings,
            SimulateOptions {
                duration: Duration::from_secs(seconds),
                tick: Duration::from_millis(tick_ms.max(1)),
                weapon,
                flash_period: Duration::from_millis(flash_period_ms),
                realtime,
                seed,
            },
        )?,
    }

    Ok(())
}

fn list_profiles(settings: &Settings) {
    let engine = RecoilControl::from_settings(
        settings,
        rcs::vision::NullSensor,
        rcs::platform::NullBackend,
        MonotonicClock::shared(),
    );
    let profiles = engine.profiles();

    for (i, profile) in profiles.profiles().iter().enumerate() {
        let marker = if i == profiles.current_index() { "*" } else { " " };
        println!(
            "{} {}: {:<16} {:>2} points  vertical {:.2}  horizontal {:.2}  interval {} ms",
            marker,
            i,
            profile.name,
            profile.len(),
            profile.vertical_control,
            profile.horizontal_sway,
            profile.shot_interval
        );
    }
}

struct SimulateOptions {
    duration: Duration,
    tick: Duration,
    weapon: Option<String>,
    flash_period: Duration,
    realtime: bool,
    seed: Option<u64>,
}

fn simulate(settings: &Settings, options: SimulateOptions) -> Result<(), serde_json::Error> {
    let manual = (!options.realtime).then(ManualClock::new);
    let clock: SharedClock = match &manual {
        Some(clock) => clock.shared(),
        None => MonotonicClock::shared(),
    };

    let sensor = SimulatedSensor::new(clock.clone(), settings.detector.reference_color)
        .with_period(options.flash_period);
    let backend = SimulatedBackend::new(clock.clone(), settings.toggle_key);
    let humanizer = options.seed.map_or_else(Humanizer::new, Humanizer::with_seed);

    let mut engine =
        RecoilControl::with_humanizer(settings, sensor, backend, clock.clone(), humanizer);

    if let Some(name) = &options.weapon {
        if !engine.profiles_mut().select_by_name(name) {
            log::warn!("No profile named '{}', keeping the default", name);
        }
    }

    log::info!(
        "Simulating {:?} ({}), toggle key {} flips every 10 s",
        options.duration,
        if options.realtime { "realtime" } else { "simulated clock" },
        settings.toggle_key
    );
    log::info!("{}", engine.detector().status_text());

    let mut corrections = 0u64;
    let mut gated = 0u64;
    while clock.now() < options.duration {
        match engine.update() {
            TickOutcome::Corrected { .. } => corrections += 1,
            TickOutcome::Gated { .. } => gated += 1,
            _ => {}
        }

        match &manual {
            Some(manual) => manual.advance(options.tick),
            None => clock.sleep(options.tick),
        }
    }

    let backend = engine.input().backend();
    log::info!(
        "Done: {} corrections, {} gated flashes, {} pointer moves, net displacement {:?}",
        corrections,
        gated,
        backend.move_count(),
        backend.displacement()
    );
    println!("{}", serde_json::to_string_pretty(&engine.status())?);

    Ok(())
}
