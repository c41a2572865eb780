#![deny(unsafe_code)]
//! CLI binary for flowlines.
//!
//! Subcommands:
//! - `render`: run a preset for N frames, write a PNG and its seed record
//! - `replay <seed.json>`: re-render a previously written seed record
//! - `list`: print available presets and the settings schema

mod error;

use clap::{Parser, Subcommand};
use error::CliError;
use flowlines_core::{Seed, Settings, Simulation};
use flowlines_render::mask::load_mask;
use flowlines_render::snapshot::write_png;
use flowlines_render::{Tint, TrailCanvas};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flowlines", about = "Particle flow fields around shapes")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a simulation for N frames and write a PNG of the trails.
    Render {
        /// Canvas width in pixels.
        #[arg(short = 'W', long, default_value_t = 800)]
        width: usize,

        /// Canvas height in pixels.
        #[arg(short = 'H', long, default_value_t = 600)]
        height: usize,

        /// Number of simulation frames.
        #[arg(short, long, default_value_t = 400)]
        frames: usize,

        /// PRNG seed for deterministic output.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Preset to start from (calm, storm, silk, contour).
        #[arg(short, long)]
        preset: Option<String>,

        /// Setting overrides as a JSON object.
        #[arg(long, default_value = "{}")]
        params: String,

        /// Image whose bright pixels form the shape to flow around.
        #[arg(short, long)]
        mask: Option<PathBuf>,

        /// Output file path.
        #[arg(short, long, default_value = "flowlines.png")]
        output: PathBuf,
    },
    /// Re-render a seed record written by `render`.
    Replay {
        /// Path to the `.json` seed record.
        seed: PathBuf,

        /// Output file path.
        #[arg(short, long, default_value = "replay.png")]
        output: PathBuf,
    },
    /// List available presets and the settings schema.
    List,
}

/// `<output>.json`, next to the PNG.
fn seed_path(output: &Path) -> PathBuf {
    let mut path = OsString::from(output.as_os_str());
    path.push(".json");
    PathBuf::from(path)
}

/// Runs the simulation described by `record` and writes the PNG.
fn render_record(record: &Seed, output: &Path) -> Result<(), CliError> {
    let mut sim = Simulation::from_seed(record)?;

    if let Some(mask_path) = &record.mask {
        let (gw, gh) = sim.mask_grid_size();
        let mask = load_mask(Path::new(mask_path), gw, gh).map_err(CliError::mask(mask_path))?;
        sim.load_mask(&mask).map_err(CliError::mask(mask_path))?;
    }

    let mut canvas = TrailCanvas::new(record.width, record.height)?;
    for _ in 0..record.frames {
        sim.step();
        canvas.record(&sim);
    }
    info!(frames = record.frames, output = %output.display(), "rendered");

    write_png(canvas.density(), &Tint::default(), output)?;
    Ok(())
}

fn report(record: &Seed, output: &Path, json: bool) -> Result<(), CliError> {
    if json {
        let info = serde_json::json!({
            "width": record.width,
            "height": record.height,
            "frames": record.frames,
            "seed": record.seed,
            "mask": record.mask,
            "output": output.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        eprintln!(
            "rendered {}x{} ({} frames, seed {}) -> {}",
            record.width,
            record.height,
            record.frames,
            record.seed,
            output.display()
        );
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let presets = Settings::preset_names();
            if cli.json {
                let info = serde_json::json!({
                    "presets": presets,
                    "schema": Settings::schema(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Presets:");
                for name in presets {
                    println!("  {name}");
                }
                println!("Settings:");
                if let Some(schema) = Settings::schema().as_object() {
                    for (key, entry) in schema {
                        let description = entry["description"].as_str().unwrap_or_default();
                        println!("  {key:<16} {description} (default {})", entry["default"]);
                    }
                }
            }
        }
        Command::Render {
            width,
            height,
            frames,
            seed,
            preset,
            params,
            mask,
            output,
        } => {
            let params: serde_json::Value = serde_json::from_str(&params)
                .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;

            let base = match preset {
                Some(name) => Settings::preset(&name)?,
                None => Settings::default(),
            };

            let mut record = Seed::new(width, height, seed);
            record.settings = base.merge_json(&params);
            record.frames = frames;
            record.mask = mask.map(|p| p.display().to_string());

            render_record(&record, &output)?;
            std::fs::write(seed_path(&output), serde_json::to_string_pretty(&record)?)?;
            report(&record, &output, cli.json)?;
        }
        Command::Replay { seed, output } => {
            let text = std::fs::read_to_string(&seed)
                .map_err(|e| CliError::Io(format!("{}: {e}", seed.display())))?;
            let record: Seed = serde_json::from_str(&text)
                .map_err(|e| CliError::Input(format!("invalid seed record: {e}")))?;

            render_record(&record, &output)?;
            report(&record, &output, cli.json)?;
        }
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
