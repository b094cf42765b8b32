//! Set a Pokémon as the terminal background and adapt the palette to it.
//!
//! # Usage
//!
//! - `pokemon-kitty set <IMAGE>` - show the image and apply a matching palette
//! - `pokemon-kitty clear` - remove the background and reset colors
//! - `pokemon-kitty classify <IMAGE>` - print the brightness and palette
//!   that `set` would use, without touching the terminal
//!
//! Exit codes:
//! - 0: Success
//! - 1: The image could not be prepared (e.g. the cache directory is unusable)
//! - 2: No supported terminal detected
//!
//! # Environment Variables
//!
//! - `KITTY_WINDOW_ID`: set by Kitty, used to detect it
//! - `POKEMON_TERMINAL_KITTY_TEXT_MODE`: `light`, `dark` or `auto`
//! - `KITTY_RC_PASSWORD`: Kitty remote control password
//! - `POKEMON_TERMINAL_DATA`: brightness dataset location
//! - `POKEMON_TERMINAL_CACHE`: converted image cache directory
//! - `DEBUG`: When set, enables debug output to stderr

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use pokemon_kitty::config::Settings;
use pokemon_kitty::palette::{Palette, TextMode};
use pokemon_kitty::thresholds::BrightnessClassifier;
use pokemon_kitty::{adapters, change_terminal, clear_terminal, logs, terminal};

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Text color: light, dark or auto (from the image brightness)
    #[arg(long, global = true)]
    text_mode: Option<String>,

    /// Brightness dataset to classify images with
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Set an image as background and adapt the palette
    Set {
        /// Image to display
        image: PathBuf,
    },
    /// Remove the background image and reset colors
    Clear,
    /// Print the brightness and palette chosen for an image
    Classify {
        /// Image to classify
        image: PathBuf,
    },
}

/// Settings from the environment, with command line flags on top.
fn settings(cli: &Cli) -> Settings {
    let mut settings = Settings::from_env();
    if let Some(mode) = &cli.text_mode {
        settings.text_mode = TextMode::parse(mode);
    }
    if let Some(data) = &cli.data {
        settings.data_path.clone_from(data);
    }
    settings
}

fn main() -> ExitCode {
    logs::init();
    let cli = Cli::parse();
    let settings = settings(&cli);
    tracing::debug!(
        "text_mode={} data={} cache={}",
        settings.text_mode,
        settings.data_path.display(),
        settings.cache_dir.display()
    );

    if !matches!(cli.command, Command::Classify { .. })
        && terminal::detect(&adapters(&settings)).is_none()
    {
        tracing::debug!("unable to detect a supported terminal");
        println!("No supported terminal detected.");
        return ExitCode::from(2);
    }

    let result = match &cli.command {
        Command::Set { image } => change_terminal(&settings, image),
        Command::Clear => clear_terminal(&settings),
        Command::Classify { image } => {
            let brightness = BrightnessClassifier::new(&settings.data_path).classify(image);
            let palette = Palette::select(brightness, settings.text_mode);
            println!("{brightness:.2} {palette}");
            return ExitCode::SUCCESS;
        }
    };

    match result {
        Ok(name) => {
            tracing::debug!("done with {name}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
