//! Terminal progress helpers.
//!
//! Spinners draw on stderr and are hidden automatically when it is not a
//! terminal, so piped output stays clean.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Braille spinner frames.
const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Create an animated spinner with the given message.
///
/// Finish it with [`finish_success`] or [`finish_error`].
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars(TICK_CHARS)
        .template("{spinner:.cyan} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn finish(pb: &ProgressBar, icon: &str, msg: &str) {
    if let Ok(style) = ProgressStyle::default_spinner().template("  {msg}") {
        pb.set_style(style);
    }
    pb.finish_with_message(format!("{} {}", icon, msg));
}

pub fn finish_success(pb: &ProgressBar, msg: &str) {
    finish(pb, "✓", msg);
}

pub fn finish_error(pb: &ProgressBar, msg: &str) {
    finish(pb, "✗", msg);
}

/// Spinner cleared from the screen without a closing line.
pub fn finish_quiet(pb: &ProgressBar) {
    pb.finish_and_clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spinner_finishes() {
        let pb = spinner("Loading products...");
        finish_success(&pb, "done");
        assert!(pb.is_finished());

        let pb = spinner("Loading comments...");
        finish_error(&pb, "no connection");
        assert!(pb.is_finished());
    }
}
