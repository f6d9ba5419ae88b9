//! Trimstack CLI - UV stacking and hotspot mapping.
//!
//! Usage: trimstack <COMMAND> [OPTIONS] <INPUT> [OUTPUT]
//!
//! Run `trimstack --help` for available commands. Set `RUST_LOG=debug` for
//! per-island diagnostics.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;

use trimstack::hotspot::{run_hotspot, FitMode, HotspotOptions, MatchPriority};
use trimstack::io;
use trimstack::island::{Island, Selection};
use trimstack::scene::Scene;
use trimstack::stack::{RotationMode, ScaleMode, StackOptions, StackSystem};
use trimstack::trim::{load_svg, Trimsheet};

#[derive(Parser)]
#[command(name = "trimstack")]
#[command(author, version, about = "UV stacking and trimsheet mapping CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display islands, fingerprints and similarity clusters
    Info {
        /// Input mesh file
        input: PathBuf,

        /// Similarity threshold used for clustering
        #[arg(short, long, default_value = "0.1")]
        threshold: f64,
    },

    /// Stack similar islands onto their masters
    Stack {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Similarity threshold
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Rotation policy
        #[arg(short, long, value_enum)]
        rotation: Option<Rotation>,

        /// Scale policy
        #[arg(short, long, value_enum)]
        scale: Option<Scale>,

        /// JSON file with stack options
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Map every island onto the trims of an SVG trimsheet
    Hotspot {
        /// Input mesh file
        input: PathBuf,

        /// Trimsheet SVG file
        trims: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Which filter runs first
        #[arg(short, long, value_enum)]
        priority: Option<Priority>,

        /// How islands are scaled into trims
        #[arg(short, long, value_enum)]
        fit: Option<Fit>,

        /// Seed for variation (enables all variations)
        #[arg(long)]
        seed: Option<u64>,

        /// JSON file with hotspot options
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List the trims of an SVG trimsheet
    Trims {
        /// Trimsheet SVG file
        input: PathBuf,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Rotation {
    /// Never rotate
    None,
    /// Snap to quarter turns
    Snap90,
    /// Quarter turn matching the master aspect
    Optimal,
    /// Best corner alignment
    OptimalMatch,
}

impl From<Rotation> for RotationMode {
    fn from(rotation: Rotation) -> Self {
        match rotation {
            Rotation::None => RotationMode::None,
            Rotation::Snap90 => RotationMode::Snap90,
            Rotation::Optimal => RotationMode::Optimal,
            Rotation::OptimalMatch => RotationMode::OptimalMatch,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Scale {
    /// Keep replica size
    None,
    /// Average ratio
    Uniform,
    /// Per-axis ratios
    Bounds,
}

impl From<Scale> for ScaleMode {
    fn from(scale: Scale) -> Self {
        match scale {
            Scale::None => ScaleMode::None,
            Scale::Uniform => ScaleMode::Uniform,
            Scale::Bounds => ScaleMode::Bounds,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Priority {
    /// Aspect ratio first
    Aspect,
    /// Area first
    Area,
    /// Real-world size first
    WorldSize,
}

impl From<Priority> for MatchPriority {
    fn from(priority: Priority) -> Self {
        match priority {
            Priority::Aspect => MatchPriority::Aspect,
            Priority::Area => MatchPriority::Area,
            Priority::WorldSize => MatchPriority::WorldSize,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Fit {
    /// Per-axis fill
    Fill,
    /// Fit inside
    Contain,
    /// Cover the trim
    Cover,
    /// Match trim width
    FitWidth,
    /// Match trim height
    FitHeight,
    /// Position only
    None,
    /// Per-trim setting
    FromTrim,
}

impl From<Fit> for FitMode {
    fn from(fit: Fit) -> Self {
        match fit {
            Fit::Fill => FitMode::Fill,
            Fit::Contain => FitMode::Contain,
            Fit::Cover => FitMode::Cover,
            Fit::FitWidth => FitMode::FitWidth,
            Fit::FitHeight => FitMode::FitHeight,
            Fit::None => FitMode::None,
            Fit::FromTrim => FitMode::FromTrim,
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { input, threshold } => {
            cmd_info(&input, threshold)?;
        }

        Commands::Stack {
            input,
            output,
            threshold,
            rotation,
            scale,
            config,
        } => {
            let mut options: StackOptions = load_config(config.as_deref())?;
            if let Some(threshold) = threshold {
                options = options.with_threshold(threshold);
            }
            if let Some(rotation) = rotation {
                options = options.with_rotation_mode(rotation.into());
            }
            if let Some(scale) = scale {
                options = options.with_scale_mode(scale.into());
            }
            cmd_stack(&input, &output, &options)?;
        }

        Commands::Hotspot {
            input,
            trims,
            output,
            priority,
            fit,
            seed,
            config,
        } => {
            let mut options: HotspotOptions = load_config(config.as_deref())?;
            if let Some(priority) = priority {
                options = options.with_priority(priority.into());
            }
            if let Some(fit) = fit {
                options.fit = options.fit.with_fit_mode(fit.into());
            }
            if let Some(seed) = seed {
                let offset = options.loc_var_offset;
                options = options.with_variability(seed, offset);
            }
            cmd_hotspot(&input, &trims, &output, &options)?;
        }

        Commands::Trims { input } => {
            cmd_trims(&input)?;
        }
    }

    Ok(())
}

/// Options from a JSON file, or the defaults when no file is given.
fn load_config<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&text)?)
        }
        None => Ok(T::default()),
    }
}

fn cmd_info(input: &Path, threshold: f64) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = io::load(input)?;

    println!("File: {}", input.display());
    println!("Object: {}", mesh.name());
    println!("Vertices: {}", mesh.num_vertices());
    println!("Faces: {}", mesh.num_faces());
    println!("UVs: {}", if mesh.has_uvs() { "yes" } else { "no" });

    let islands = Island::collect(&mesh);
    println!("Islands: {}", islands.len());
    for (i, island) in islands.iter().enumerate() {
        let fp = island.fingerprint();
        let size = island.size();
        println!(
            "  [{}] faces={} verts={} edges={} area={:.3} perimeter={:.3} sim={} size={:.3}x{:.3}",
            i,
            fp.face_count,
            fp.vert_count,
            fp.edge_count,
            fp.mesh_area,
            fp.perimeter,
            fp.sim_index,
            size.x,
            size.y
        );
    }

    let scene = Scene::from_mesh(mesh);
    let options = StackOptions::default().with_threshold(threshold);
    let system = StackSystem::new(&scene, &options);
    println!("Stacks: {}", system.stacks().len());
    for (i, stack) in system.stacks().iter().enumerate() {
        println!("  [{}] islands {:?}", i, stack);
    }

    Ok(())
}

fn cmd_stack(input: &Path, output: &Path, options: &StackOptions) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = io::load(input)?;
    println!("Loaded: {} faces", mesh.num_faces());

    let mut scene = Scene::from_mesh(mesh);
    let start = Instant::now();
    let system = StackSystem::new(&scene, options);
    let moved = system.stack_all(&mut scene, options, &Selection::new());
    let elapsed = start.elapsed();
    println!(
        "Stacked {} islands in {} stacks ({:.2?})",
        moved,
        system.stacks().len(),
        elapsed
    );

    save_scene(scene, output)
}

fn cmd_hotspot(
    input: &Path,
    trims: &Path,
    output: &Path,
    options: &HotspotOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut mesh = io::load(input)?;
    mesh.select_all(true);
    let sheet = Trimsheet::from_trims(load_svg(trims)?);
    println!("Loaded: {} faces, {} trims", mesh.num_faces(), sheet.len());

    let mut scene = Scene::from_mesh(mesh);
    let start = Instant::now();
    let report = run_hotspot(&mut scene, &sheet, options)?;
    let elapsed = start.elapsed();
    println!(
        "Fitted {}/{} islands ({} radial, {:.0}%) ({:.2?})",
        report.islands_fitted,
        report.islands_processed,
        report.radial_islands,
        report.success_rate() * 100.0,
        elapsed
    );

    save_scene(scene, output)
}

fn save_scene(scene: Scene, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(mesh) = scene.into_meshes().into_iter().next() {
        io::save(&mesh, output)?;
    }
    println!("Saved: {}", output.display());
    Ok(())
}

fn cmd_trims(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let trims = load_svg(input)?;
    println!("File: {}", input.display());
    println!("Trims: {}", trims.len());
    for trim in &trims {
        println!(
            "  {:<20} [{:.3}, {:.3}] - [{:.3}, {:.3}]  {:.3}x{:.3}",
            trim.name,
            trim.left,
            trim.bottom,
            trim.right,
            trim.top,
            trim.width(),
            trim.height()
        );
    }
    Ok(())
}
