//! Progress reporting for batch runs
//!
//! On a terminal the batch shows an indicatif bar. Otherwise (redirected
//! stderr, `nohup`, `--no-progress`) every finished file gets one plain
//! `[i/N] <outcome> <archive>` line on stderr instead.

use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, IsTerminal};
use std::path::Path;

const BATCH_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}";

/// Progress bar counting files in a batch; hidden when `visible` is false
pub fn create_batch_progress(total: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(BATCH_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb
}

/// `"i/N"` counter used in progress lines
pub fn counter(done: usize, total: usize) -> String {
    format!("{}/{}", done, total)
}

/// One line-mode progress entry, e.g. `[3/10] uploaded GCP/tasmax/2050.nc`
pub fn progress_line(done: usize, total: usize, outcome: &str, subject: &str) -> String {
    format!("[{}] {} {}", counter(done, total), outcome, subject)
}

/// Per-file progress for one batch
pub struct BatchProgress {
    bar: ProgressBar,
    lines: bool,
    total: usize,
}

impl BatchProgress {
    /// Bar when `show_bar` is set and stderr is a terminal, lines otherwise
    pub fn new(total: usize, show_bar: bool) -> Self {
        Self::with_bar(total, show_bar && io::stderr().is_terminal())
    }

    fn with_bar(total: usize, bar: bool) -> Self {
        Self {
            bar: create_batch_progress(total as u64, bar),
            lines: !bar,
            total,
        }
    }

    pub fn start_file(&self, path: &Path) {
        self.bar.set_message(path.display().to_string());
    }

    /// Run `f` with the bar cleared so log output is not overdrawn
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.bar.suspend(f)
    }

    /// Record the `done`-th finished file
    pub fn file_done(&self, done: usize, outcome: &str, subject: &str) {
        self.bar.inc(1);
        if self.lines {
            eprintln!("{}", progress_line(done, self.total, outcome, subject));
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter() {
        assert_eq!(counter(3, 10), "3/10");
        assert_eq!(counter(0, 0), "0/0");
    }

    #[test]
    fn test_progress_line() {
        assert_eq!(
            progress_line(2, 5, "uploaded", "GCP/tasmax/2050.nc"),
            "[2/5] uploaded GCP/tasmax/2050.nc"
        );
    }

    #[test]
    fn test_create_batch_progress() {
        let pb = create_batch_progress(100, true);
        assert_eq!(pb.length(), Some(100));
        pb.finish_and_clear();
    }

    #[test]
    fn test_hidden_progress() {
        let pb = create_batch_progress(5, false);
        assert!(pb.is_hidden());
        pb.inc(1);
        assert_eq!(pb.position(), 1);
    }

    #[test]
    fn test_no_bar_falls_back_to_lines() {
        let progress = BatchProgress::new(2, false);
        assert!(progress.lines);
        assert!(progress.bar.is_hidden());

        progress.file_done(1, "parsed", "GCP/a.nc");
        assert_eq!(progress.bar.position(), 1);
        progress.finish();
    }

    #[test]
    fn test_bar_mode_prints_no_lines() {
        let progress = BatchProgress::with_bar(3, true);
        assert!(!progress.lines);
        progress.file_done(1, "uploaded", "GCP/a.nc");
        assert_eq!(progress.bar.position(), 1);
        progress.finish();
    }
}
