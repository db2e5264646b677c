// SPDX-License-Identifier: MIT

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Spinner on stderr for a blocking step of unknown length. Hidden when
/// `quiet`.
pub fn spinner(message: &str, quiet: bool) -> anyhow::Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed}] {msg}")?);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}
