//! moodtrack - compose and render lofi tracks from a parameter vector
//!
//! Run with: cargo run -- render params.json -o track.wav

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, WrapErr};
use moodtrack::{Catalog, Composer, Composition, EngineConfig, Parameters, RenderEngine, Seed};
use tracing::warn;

#[derive(Parser)]
#[command(name = "moodtrack")]
#[command(about = "Deterministic lofi track composer", long_about = None)]
struct Cli {
    /// Engine configuration file (TOML). Falls back to $MOODTRACK_CONFIG.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the mood-derived seed
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the composed Track as JSON
    Compose {
        /// Parameter file (JSON), or `-` for stdin
        input: PathBuf,
    },

    /// Render a Track to a WAV file
    Render {
        /// Parameter file (JSON), or `-` for stdin
        input: PathBuf,

        /// Output WAV file path
        #[arg(short, long, default_value = "track.wav")]
        output: PathBuf,

        /// Also write the Track metadata next to the WAV
        #[arg(long)]
        metadata: bool,
    },

    /// Render a Track and play it on the default output device
    #[cfg(feature = "playback")]
    Play {
        /// Parameter file (JSON), or `-` for stdin
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = EngineConfig::load(cli.config.as_deref()).wrap_err("failed to load configuration")?;
    let catalog = match &config.catalog_path {
        Some(path) => Catalog::load(path).wrap_err("failed to load catalog")?,
        None => Catalog::builtin(),
    };
    let catalog = Arc::new(catalog);
    let composer = Composer::new(Arc::clone(&catalog));
    let seed = cli.seed.map(Seed);

    match cli.command {
        Commands::Compose { input } => {
            let composition = compose(&composer, &input, seed)?;
            println!("{}", composition.track.to_json_pretty()?);
        }
        Commands::Render {
            input,
            output,
            metadata,
        } => {
            let composition = compose(&composer, &input, seed)?;
            let mut engine = RenderEngine::new(config, catalog);
            let audio = engine.render(&composition.track).await?;
            moodtrack::io::write_wav(&audio, &output)?;
            if metadata {
                let path = output.with_extension("json");
                fs::write(&path, composition.track.to_json_pretty()?)
                    .wrap_err_with(|| format!("failed to write {}", path.display()))?;
            }
            println!(
                "{} ({} bpm, {} {}, {}) -> {} [{:.1}s]",
                composition.track.title,
                composition.track.bpm,
                composition.track.tonic,
                composition.track.mode,
                composition.track.color,
                output.display(),
                audio.duration_seconds
            );
        }
        #[cfg(feature = "playback")]
        Commands::Play { input } => {
            let composition = compose(&composer, &input, seed)?;
            let mut engine = RenderEngine::new(config, catalog);
            let audio = engine.render(&composition.track).await?;
            println!("playing {} [{:.1}s]", composition.track.title, audio.duration_seconds);
            tokio::task::spawn_blocking(move || moodtrack::io::playback::play(&audio))
                .await
                .wrap_err("playback task panicked")??;
        }
    }
    Ok(())
}

fn compose(composer: &Composer, input: &Path, seed: Option<Seed>) -> color_eyre::Result<Composition> {
    let source = read_input(input)?;
    let parameters = Parameters::from_json(&source)?;
    let composition = match seed {
        Some(seed) => composer.compose_with_seed(&parameters, seed)?,
        None => composer.compose(&parameters)?,
    };
    for warning in &composition.warnings {
        warn!(%warning, "layer omitted");
    }
    Ok(composition)
}

fn read_input(input: &Path) -> color_eyre::Result<String> {
    if input.as_os_str() == "-" {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .wrap_err("failed to read parameters from stdin")?;
        return Ok(source);
    }
    fs::read_to_string(input).map_err(|err| eyre!("failed to read {}: {err}", input.display()))
}
