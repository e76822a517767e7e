mod config;
mod error;
mod export;
mod grid;
mod presets;
mod settings;
mod simulation;
mod walker;

use clap::{Args, Parser, Subcommand};
use config::AppConfig;
use error::ConfigError;
use presets::{Preset, PresetManager};
use rand::rngs::StdRng;
use rand::SeedableRng;
use settings::Adjacency;
use simulation::SimulationDriver;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "dla-model")]
#[command(about = "Diffusion-Limited Aggregation on a lattice, exported as plot coordinates")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Grow a cluster and write its coordinates
    Run(RunArgs),
    /// Render an existing coordinate file to PNG
    Draw {
        /// Coordinate file written by `run`
        csv: PathBuf,
        /// Image to write
        png: PathBuf,
    },
    /// List built-in and user presets
    Presets {
        /// Remove a user preset instead of listing
        #[arg(long)]
        delete: Option<String>,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Start from a named preset (see `presets`)
    #[arg(long)]
    preset: Option<String>,

    /// Load run configuration from a JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid width in cells
    #[arg(long)]
    width: Option<usize>,

    /// Grid height in cells
    #[arg(long)]
    height: Option<usize>,

    /// Number of particles that must stick
    #[arg(short = 'p', long)]
    particles: Option<usize>,

    /// Contact rule for sticking (moore, diagonal, vonneumann)
    #[arg(long)]
    adjacency: Option<String>,

    /// Coordinate file to write
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Also render the cluster to this PNG
    #[arg(long)]
    image: Option<PathBuf>,

    /// Seed the random walk for a repeatable run
    #[arg(long = "rng-seed")]
    rng_seed: Option<u64>,

    /// Write the effective configuration to this JSON file
    #[arg(long = "save-config")]
    save_config: Option<PathBuf>,

    /// Store the effective settings as a user preset
    #[arg(long = "save-preset")]
    save_preset: Option<String>,
}

/// Merge defaults, preset, config file and explicit flags (later wins)
fn resolve_config(args: &RunArgs, presets: &PresetManager) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let mut config = AppConfig::default();

    if let Some(name) = &args.preset {
        let preset = presets
            .find(name)
            .ok_or_else(|| ConfigError::UnknownPreset(name.clone()))?;
        config.settings = preset.settings.clone();
    }
    if let Some(path) = &args.config {
        config = AppConfig::load_from_file(path)?;
    }

    if let Some(width) = args.width {
        config.settings.width = width;
    }
    if let Some(height) = args.height {
        config.settings.height = height;
    }
    if let Some(particles) = args.particles {
        config.settings.target_count = particles;
    }
    if let Some(name) = &args.adjacency {
        config.settings.adjacency =
            Adjacency::parse(name).ok_or_else(|| format!("unknown adjacency: {}", name))?;
    }
    if let Some(output) = &args.output {
        config.csv_output = output.clone();
    }
    if let Some(image) = &args.image {
        config.png_output = Some(image.clone());
    }

    Ok(config)
}

fn run(args: RunArgs, presets: &mut PresetManager) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(&args, presets)?;
    // Settings that cannot finish are never persisted
    let driver = SimulationDriver::new(config.settings.clone())?;

    if let Some(path) = &args.save_config {
        config.save_to_file(path)?;
        info!(path = %path.display(), "Saved configuration");
    }
    if let Some(name) = &args.save_preset {
        let preset = Preset::new(name.clone(), "Saved from the command line", config.settings.clone());
        let path = presets.save_preset(preset)?;
        info!(path = %path.display(), "Saved preset");
    }

    let result = match args.rng_seed {
        Some(seed) => driver.run_with_rng(&mut StdRng::seed_from_u64(seed)),
        None => driver.run(),
    };

    export::write_csv(&result, &config.csv_output)?;
    if let Some(png) = &config.png_output {
        export::render_png(&result, png)?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run(args, &mut PresetManager::new())?,
        Command::Draw { csv, png } => {
            let result = export::read_csv(&csv)?;
            if result.is_empty() {
                warn!(path = %csv.display(), "Coordinate file holds no cells");
            }
            info!(cells = result.len(), width = result.width(), height = result.height(), "Loaded coordinates");
            export::render_png(&result, &png)?;
        }
        Command::Presets { delete: Some(name) } => {
            PresetManager::new().delete_preset(&name)?;
            info!(preset = %name, "Deleted preset");
        }
        Command::Presets { delete: None } => {
            let presets = PresetManager::new();
            for preset in presets.all_presets() {
                let s = &preset.settings;
                println!(
                    "{:<12} {}x{} n={} {:<10} {}",
                    preset.name,
                    s.width,
                    s.height,
                    s.target_count,
                    s.adjacency.name(),
                    preset.description
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, NamedTempFile};

    fn parse_run(argv: &[&str]) -> RunArgs {
        let cli = Cli::try_parse_from(std::iter::once("dla-model").chain(argv.iter().copied())).unwrap();
        match cli.command {
            Command::Run(args) => args,
            other => panic!("expected run, got {:?}", other),
        }
    }

    #[test]
    fn test_defaults_without_flags() {
        let args = parse_run(&["run"]);
        let config = resolve_config(&args, &PresetManager::with_dir(None)).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_flags_override_preset() {
        let args = parse_run(&["run", "--preset", "small", "--particles", "42", "--adjacency", "diag"]);
        let config = resolve_config(&args, &PresetManager::with_dir(None)).unwrap();
        assert_eq!(config.settings.width, 101);
        assert_eq!(config.settings.target_count, 42);
        assert_eq!(config.settings.adjacency, Adjacency::Diagonal);
    }

    #[test]
    fn test_config_file_overrides_preset() {
        let file = NamedTempFile::new().unwrap();
        let saved = AppConfig {
            settings: settings::SimulationSettings::new(30, 20, 10),
            ..AppConfig::default()
        };
        saved.save_to_file(file.path()).unwrap();

        let path = file.path().to_str().unwrap();
        let args = parse_run(&["run", "--preset", "medium", "--config", path, "--height", "25"]);
        let config = resolve_config(&args, &PresetManager::with_dir(None)).unwrap();
        assert_eq!(config.settings.width, 30);
        assert_eq!(config.settings.height, 25);
    }

    #[test]
    fn test_unknown_preset_and_adjacency_rejected() {
        let presets = PresetManager::with_dir(None);
        assert!(resolve_config(&parse_run(&["run", "--preset", "nope"]), &presets).is_err());
        assert!(resolve_config(&parse_run(&["run", "--adjacency", "hex"]), &presets).is_err());
    }

    #[test]
    fn test_seeded_run_writes_outputs() {
        let dir = tempdir().unwrap();
        let csv = dir.path().join("dla.csv");
        let png = dir.path().join("dla.png");
        let args = parse_run(&[
            "run",
            "--width", "31",
            "--height", "25",
            "-p", "40",
            "--rng-seed", "7",
            "-o", csv.to_str().unwrap(),
            "--image", png.to_str().unwrap(),
        ]);
        run(args, &mut PresetManager::with_dir(None)).unwrap();

        let result = export::read_csv(&csv).unwrap();
        assert_eq!(result.len(), 41);
        assert!(result.contains((15, 12)));
        assert!(png.exists());
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let settings = settings::SimulationSettings::new(41, 41, 60);
        let a = SimulationDriver::new(settings.clone())
            .unwrap()
            .run_with_rng(&mut StdRng::seed_from_u64(99));
        let b = SimulationDriver::new(settings)
            .unwrap()
            .run_with_rng(&mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn test_infeasible_run_is_an_error() {
        let dir = tempdir().unwrap();
        let csv = dir.path().join("never.csv");
        let args = parse_run(&["run", "--width", "3", "--height", "3", "-p", "1", "-o", csv.to_str().unwrap()]);
        assert!(run(args, &mut PresetManager::with_dir(None)).is_err());
        assert!(!csv.exists());
    }

    #[test]
    fn test_rejected_settings_are_not_saved() {
        let dir = tempdir().unwrap();
        let preset_dir = dir.path().join("presets");
        let cfg = dir.path().join("cfg.json");
        let csv = dir.path().join("out.csv");
        let args = parse_run(&[
            "run",
            "--width", "2",
            "--height", "9",
            "-p", "1",
            "--save-config", cfg.to_str().unwrap(),
            "--save-preset", "tiny",
            "-o", csv.to_str().unwrap(),
        ]);
        let mut presets = PresetManager::with_dir(Some(preset_dir.clone()));

        assert!(run(args, &mut presets).is_err());
        assert!(!cfg.exists());
        assert!(!preset_dir.join("tiny.json").exists());
        assert!(presets.user.is_empty());
        assert!(!csv.exists());
    }

    #[test]
    fn test_valid_run_saves_config_and_preset() {
        let dir = tempdir().unwrap();
        let preset_dir = dir.path().join("presets");
        let cfg = dir.path().join("cfg.json");
        let csv = dir.path().join("out.csv");
        let args = parse_run(&[
            "run",
            "--width", "15",
            "--height", "15",
            "-p", "5",
            "--rng-seed", "1",
            "--save-config", cfg.to_str().unwrap(),
            "--save-preset", "mine",
            "-o", csv.to_str().unwrap(),
        ]);
        let mut presets = PresetManager::with_dir(Some(preset_dir.clone()));

        run(args, &mut presets).unwrap();
        let saved = AppConfig::load_from_file(&cfg).unwrap();
        assert_eq!(saved.settings, settings::SimulationSettings::new(15, 15, 5));
        assert!(preset_dir.join("mine.json").exists());
        assert!(presets.find("mine").is_some());
    }
}
