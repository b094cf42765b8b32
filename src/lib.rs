//! Pokémon backgrounds for the Kitty terminal, with a palette that stays
//! readable on top of the image.

pub mod config;
pub mod convert;
pub mod logs;
pub mod palette;
pub mod process;
pub mod terminal;
pub mod thresholds;

use std::path::Path;

use anyhow::{Context, Result};

use config::Settings;
use terminal::TerminalAdapter;
use terminal::kitty::KittyAdapter;

/// Every adapter this build knows about, in detection order.
#[must_use]
pub fn adapters(settings: &Settings) -> Vec<Box<dyn TerminalAdapter>> {
    vec![Box::new(KittyAdapter::new(settings))]
}

/// Set the image at `path` as the background of the detected terminal.
///
/// This function:
/// 1. Picks the first adapter compatible with the current session
/// 2. Converts the image to PNG if needed and sets it as the background
/// 3. Applies the palette matching the image brightness
///
/// # Errors
///
/// Returns an error if no supported terminal is detected, or if the image
/// cache cannot be set up. Terminal command failures are reported on stdout
/// and are not errors.
///
/// # Returns
///
/// The name of the terminal that was changed.
pub fn change_terminal(settings: &Settings, path: &Path) -> Result<&'static str> {
    let adapters = adapters(settings);
    let adapter = terminal::detect(&adapters).context("No supported terminal detected")?;
    debug_adapter(adapter);

    adapter
        .change_terminal(path)
        .with_context(|| format!("Failed to apply {}", path.display()))?;
    Ok(adapter.name())
}

/// Remove the background and reset colors in the detected terminal.
///
/// # Errors
///
/// Returns an error if no supported terminal is detected.
pub fn clear_terminal(settings: &Settings) -> Result<&'static str> {
    let adapters = adapters(settings);
    let adapter = terminal::detect(&adapters).context("No supported terminal detected")?;
    debug_adapter(adapter);

    adapter.clear();
    Ok(adapter.name())
}

fn debug_adapter(adapter: &dyn TerminalAdapter) {
    tracing::debug!("adapter={}", adapter.name());
}
