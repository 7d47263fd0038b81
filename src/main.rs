use clap::{Parser, Subcommand};
use radio_dial::clock::SystemClock;
use radio_dial::config::EngineConfig;
use radio_dial::engine::RadioEngine;
use radio_dial::error::ConfigurationError;
use radio_dial::output::{AudioOutput, RecordingOutput, RodioOutput};
use radio_dial::station::{ProgramType, Roster, WEEK};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "radio-dial", about = "In-world radio receiver CLI")]
struct Cli {
    /// Log debug detail (content picks, empty pools)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the stations in a roster, in dial order of the file
    Stations {
        /// Roster JSON file
        roster: PathBuf,
    },
    /// Print a station's weekly schedule
    Schedule {
        /// Roster JSON file
        roster: PathBuf,
        /// Station name (case-insensitive)
        station: String,
        /// Only list programmes of this type (music, news, talk-show, ...)
        #[arg(long = "type", value_parser = ProgramType::from_str_loose)]
        program_type: Option<ProgramType>,
    },
    /// Write a default engine config, to the user config dir unless a path is given
    InitConfig {
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Tune the receiver and run it in real time
    Run {
        /// Roster JSON file
        roster: PathBuf,
        /// Dial frequency to tune to
        #[arg(short, long)]
        frequency: f32,
        /// Engine config JSON (defaults to the user config dir)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Tick interval in milliseconds
        #[arg(long, default_value_t = 100)]
        tick_ms: u64,
        /// Stop after this many seconds (runs until interrupted if omitted)
        #[arg(short, long)]
        duration: Option<f64>,
        /// Seconds between status lines
        #[arg(long, default_value_t = 5.0)]
        status_every: f64,
        /// Write a now-playing snapshot here on every status line (.xml or .json)
        #[arg(long)]
        status_file: Option<PathBuf>,
        /// Seed for content picks and interference (overrides config)
        #[arg(long)]
        seed: Option<u64>,
        /// Run without an audio device
        #[arg(long)]
        silent: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = dispatch(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn dispatch(command: Commands) -> Result<(), String> {
    match command {
        Commands::Stations { roster } => {
            let roster = Roster::load(&roster).map_err(|e| e.to_string())?;
            if roster.stations.is_empty() {
                println!("(no stations)");
            }
            for (i, station) in roster.stations.iter().enumerate() {
                let langs = if station.languages.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", station.languages.join(", "))
                };
                println!(
                    "{:>3}. {:>6}  {}{}  ({} songs)",
                    i + 1,
                    station.frequency_display(),
                    station.name,
                    langs,
                    station.pools.music.len()
                );
            }
        }
        Commands::Schedule {
            roster,
            station,
            program_type,
        } => {
            let roster = Roster::load(&roster).map_err(|e| e.to_string())?;
            let st = roster
                .stations
                .iter()
                .find(|s| s.name.eq_ignore_ascii_case(&station))
                .ok_or_else(|| format!("Station '{}' not found", station))?;
            println!("{} ({})", st.name, st.frequency_display());
            for day in WEEK {
                match st.schedule.day(day) {
                    None => println!("  {}: (no schedule)", day),
                    Some(slots) => {
                        println!("  {}:", day);
                        let matching = slots
                            .iter()
                            .filter(|slot| program_type.is_none_or(|t| slot.program_type == t));
                        for slot in matching {
                            println!(
                                "    {}  {} [{}]",
                                slot.time_display(),
                                slot.name,
                                slot.program_type
                            );
                        }
                    }
                }
            }
        }
        Commands::InitConfig { path, force } => {
            let path = path
                .or_else(EngineConfig::default_path)
                .ok_or("No config directory on this platform; pass a path")?;
            if path.exists() && !force {
                return Err(format!(
                    "'{}' already exists (use --force to overwrite)",
                    path.display()
                ));
            }
            EngineConfig::default()
                .save(&path)
                .map_err(|e| e.to_string())?;
            println!("Wrote {}", path.display());
        }
        Commands::Run {
            roster,
            frequency,
            config,
            tick_ms,
            duration,
            status_every,
            status_file,
            seed,
            silent,
        } => {
            let roster = Roster::load(&roster).map_err(|e| e.to_string())?;
            let mut config = load_config(config.as_deref()).map_err(|e| e.to_string())?;
            if seed.is_some() {
                config.seed = seed;
            }
            let opts = RunOptions {
                frequency,
                tick: Duration::from_millis(tick_ms.max(1)),
                duration,
                status_every,
                status_file,
            };
            if silent {
                run(roster, config, RecordingOutput::new(), &opts)?;
            } else {
                run(roster, config, RodioOutput::new()?, &opts)?;
            }
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, ConfigurationError> {
    match path {
        Some(p) => EngineConfig::load(p),
        None => match EngineConfig::default_path() {
            Some(p) => EngineConfig::load_or_default(&p),
            None => Ok(EngineConfig::default()),
        },
    }
}

struct RunOptions {
    frequency: f32,
    tick: Duration,
    duration: Option<f64>,
    status_every: f64,
    status_file: Option<PathBuf>,
}

fn run<O: AudioOutput>(
    roster: Roster,
    config: EngineConfig,
    output: O,
    opts: &RunOptions,
) -> Result<(), String> {
    let mut engine =
        RadioEngine::initialize(roster, &SystemClock, config, output).map_err(|e| e.to_string())?;
    engine.tune(opts.frequency);
    report(&engine, opts.status_file.as_deref());

    let mut last = Instant::now();
    let mut since_status = 0.0;
    loop {
        std::thread::sleep(opts.tick);
        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f64();
        last = now;
        engine.tick(dt);

        since_status += dt;
        if since_status >= opts.status_every {
            since_status = 0.0;
            report(&engine, opts.status_file.as_deref());
        }
        if opts.duration.is_some_and(|limit| engine.elapsed() >= limit) {
            break;
        }
    }
    report(&engine, opts.status_file.as_deref());
    Ok(())
}

fn report<O: AudioOutput>(engine: &RadioEngine<O>, status_file: Option<&Path>) {
    let status = engine.status();
    println!("{}", status);
    if let Some(path) = status_file {
        if let Err(e) = status.write_to(path) {
            tracing::warn!("{}", e);
        }
    }
}
