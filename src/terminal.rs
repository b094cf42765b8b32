//! Terminal adapters.
//!
//! Each supported terminal family implements [`TerminalAdapter`]; the first
//! adapter reporting itself compatible with the current session is used.

pub mod kitty;

use std::path::Path;

use anyhow::Result;

/// What a terminal must support to show a Pokémon.
pub trait TerminalAdapter {
    /// Human readable terminal name.
    fn name(&self) -> &'static str;

    /// Whether the current session runs inside this terminal.
    fn is_compatible(&self) -> bool;

    /// Show the image at `path` as the background and adapt the colors to it.
    ///
    /// Control channel failures are reported and do not abort the call.
    ///
    /// # Errors
    ///
    /// Returns an error only when local setup, such as the image cache,
    /// fails.
    fn change_terminal(&self, path: &Path) -> Result<()>;

    /// Remove the background and restore the default colors.
    fn clear(&self);
}

/// The first compatible adapter, if any.
#[must_use]
pub fn detect<'a>(
    adapters: &'a [Box<dyn TerminalAdapter + 'a>],
) -> Option<&'a dyn TerminalAdapter> {
    adapters
        .iter()
        .map(|adapter| &**adapter)
        .find(|adapter| adapter.is_compatible())
}
