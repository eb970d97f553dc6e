use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use eb_map_sprites::rom::{EXPANDED_SIZE, EX_EXPANDED_SIZE};
use eb_map_sprites::{LogProgress, MapSpriteLayout, MapSpriteModule, Project, Result, Rom};

#[derive(Parser)]
#[command(name = "map-sprites")]
#[command(version, about = "Decompile and compile the EarthBound map sprite table")]
struct Cli {
    /// JSON file overriding the table layout
    #[arg(long, global = true)]
    layout: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the map sprite table from a ROM into a project directory
    Decompile {
        rom: PathBuf,
        project: PathBuf,
    },

    /// Write a project's map sprites into a clean base ROM
    Compile {
        project: PathBuf,
        rom: PathBuf,

        /// Output ROM (defaults to overwriting the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Expand a ROM to 32 Mbit (or 48 Mbit with --ex)
    Expand {
        rom: PathBuf,

        #[arg(long)]
        ex: bool,
    },

    /// Prepend a copier header to a ROM
    AddHeader {
        rom: PathBuf,
    },

    /// Remove a ROM's copier header
    StripHeader {
        rom: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_layout(path: Option<&PathBuf>) -> Result<MapSpriteLayout> {
    match path {
        Some(path) => MapSpriteLayout::load(path),
        None => Ok(MapSpriteLayout::default()),
    }
}

fn decompile(layout: MapSpriteLayout, rom: PathBuf, project: PathBuf) -> Result<()> {
    let rom = Rom::load(&rom)?;
    let project = Project::new(project);
    let mut progress = LogProgress::new(MapSpriteModule::NAME);

    let mut module = MapSpriteModule::new(layout)?;
    module.read_from_rom(&rom, &mut progress)?;
    module.write_to_project(&project, &mut progress)?;
    Ok(())
}

fn compile(layout: MapSpriteLayout, project: PathBuf, rom_path: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let mut rom = Rom::load(&rom_path)?;
    if rom.len() < EXPANDED_SIZE {
        rom.expand(EXPANDED_SIZE)?;
    } else {
        warn!("{} is already expanded; assuming its expansion area is unused", rom_path.display());
        rom.release_expansion_area();
    }

    let project = Project::new(project);
    let mut progress = LogProgress::new(MapSpriteModule::NAME);

    let mut module = MapSpriteModule::new(layout)?;
    module.read_from_project(&project, &mut progress)?;
    module.write_to_rom(&mut rom, &mut progress)?;

    rom.save(output.as_ref().unwrap_or(&rom_path))?;
    Ok(())
}

fn expand(path: PathBuf, ex: bool) -> Result<()> {
    let mut rom = Rom::load(&path)?;
    rom.expand(if ex { EX_EXPANDED_SIZE } else { EXPANDED_SIZE })?;
    rom.save(&path)?;
    info!("expanded {}", path.display());
    Ok(())
}

fn set_header(path: PathBuf, header: bool) -> Result<()> {
    let mut rom = Rom::load(&path)?;
    if header {
        rom.add_header();
    } else {
        rom.strip_header();
    }
    rom.save(&path)
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = load_layout(cli.layout.as_ref()).and_then(|layout| match cli.command {
        Commands::Decompile { rom, project } => decompile(layout, rom, project),
        Commands::Compile { project, rom, output } => compile(layout, project, rom, output),
        Commands::Expand { rom, ex } => expand(rom, ex),
        Commands::AddHeader { rom } => set_header(rom, true),
        Commands::StripHeader { rom } => set_header(rom, false),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
