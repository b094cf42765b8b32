//! Kitty, driven through its remote control channel (`kitty @`).
//!
//! Remote control has to be enabled in `kitty.conf` (`allow_remote_control`);
//! when it is not, every command fails and a hint is printed instead.

use std::path::Path;

use anyhow::Result;
use tracing::debug;

use super::TerminalAdapter;
use crate::config::{RC_PASSWORD_VAR, Settings};
use crate::convert::ImageConverter;
use crate::palette::{Palette, TextMode};
use crate::process::{CommandRunner, Invocation, ProcessError, SystemRunner};
use crate::thresholds::BrightnessClassifier;

/// Why a `kitty @` command failed, with Kitty's own message if any.
fn kitty_error_message(err: &ProcessError, action: &str) -> String {
    let mut message = format!(
        "Failed to {action} in kitty. \
         Did you configure kitty remote control correctly? (See Readme)."
    );
    let output = err.stderr();
    if !output.is_empty() {
        message.push_str(&format!("\nOutput from kitty: \"{output}\"."));
    }
    message
}

fn print_kitty_error(err: &ProcessError, action: &str) {
    println!("{}", kitty_error_message(err, action));
    debug!("{err}");
}

/// Adapter for the Kitty terminal emulator.
#[derive(Debug)]
pub struct KittyAdapter<R = SystemRunner> {
    runner: R,
    session_id: Option<String>,
    text_mode: TextMode,
    rc_password: Option<String>,
    converter: ImageConverter,
    classifier: BrightnessClassifier,
}

impl KittyAdapter<SystemRunner> {
    /// Adapter running real `kitty` and image tool processes.
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        Self::with_runner(settings, SystemRunner)
    }
}

impl<R: CommandRunner> KittyAdapter<R> {
    /// Adapter sending its commands through `runner`.
    pub fn with_runner(settings: &Settings, runner: R) -> Self {
        Self {
            runner,
            session_id: settings.session_id.clone(),
            text_mode: settings.text_mode,
            rc_password: settings.rc_password.clone(),
            converter: ImageConverter::new(&settings.cache_dir),
            classifier: BrightnessClassifier::new(&settings.data_path),
        }
    }

    /// Replace the brightness classifier.
    #[must_use]
    pub fn with_classifier(mut self, classifier: BrightnessClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Brightness of the image at `path`.
    pub fn brightness(&self, path: &Path) -> f64 {
        self.classifier.classify(path)
    }

    /// Palette for the image at `path`, honoring the configured text mode.
    pub fn palette_for(&self, path: &Path) -> Palette {
        let palette = match self.text_mode {
            TextMode::Auto => Palette::select(self.brightness(path), TextMode::Auto),
            mode => Palette::select(0.0, mode),
        };
        debug!(text_mode = %self.text_mode, %palette, "selected palette");
        palette
    }

    fn remote<I, S>(&self, args: I) -> Invocation
    where
        I: IntoIterator<Item = S>,
        S: Into<std::ffi::OsString>,
    {
        let invocation = Invocation::new("kitty").arg("@").args(args);
        match &self.rc_password {
            Some(password) => invocation.env(RC_PASSWORD_VAR, password),
            None => invocation,
        }
    }

    /// Run a remote control command, reporting failure. Returns whether it
    /// succeeded.
    fn send(&self, action: &str, invocation: &Invocation) -> bool {
        match self.runner.run(invocation) {
            Ok(()) => true,
            Err(err) => {
                print_kitty_error(&err, action);
                false
            }
        }
    }
}

impl<R: CommandRunner> TerminalAdapter for KittyAdapter<R> {
    fn name(&self) -> &'static str {
        "Kitty"
    }

    fn is_compatible(&self) -> bool {
        self.session_id.is_some()
    }

    fn change_terminal(&self, path: &Path) -> Result<()> {
        let image = self.converter.convert(path, &self.runner)?;
        let image = image.into_os_string();
        let background = self.remote(["set-background-image".into(), image]);
        self.send("set background image", &background);

        // Classify the original name: the cached PNG is named by its hash.
        let palette = self.palette_for(path);
        let mut args = vec!["set-colors".to_string()];
        args.extend(palette.to_kitty_args());
        self.send("set adaptive colors", &self.remote(args));
        Ok(())
    }

    fn clear(&self) {
        let background = self.remote(["set-background-image", "none"]);
        self.send("clear background image", &background);
        self.send("reset colors", &self.remote(["set-colors", "--reset"]));
    }
}
