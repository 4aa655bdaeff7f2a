//! Progress indicators for uptimectl.

use indicatif::{ProgressBar, ProgressStyle};

/// A bar counting finished instances, hidden in quiet mode.
pub fn bar(len: u64, prefix: &str, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let style = ProgressStyle::with_template("  {prefix:.cyan} [{bar:30}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    let pb = ProgressBar::new(len).with_style(style);
    pb.set_prefix(prefix.to_string());
    pb
}
