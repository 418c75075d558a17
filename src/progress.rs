//! Progress reporting for folder projection.
//!
//! The projection builder reports through [`ProgressCallback`]; the CLI
//! implements it with an indicatif bar in [`Progress`]. Callbacks are
//! fire-and-forget: nothing they do feeds back into the build.

use std::sync::{Mutex, MutexGuard, PoisonError};

use indicatif::{ProgressBar, ProgressStyle};

/// Phase name used by the projection builder.
pub const PROJECT_PHASE: &str = "project";

/// Progress callback for long-running scans.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase (e.g., "project")
    /// * `total` - Total number of items to process
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called periodically while items are processed.
    ///
    /// # Arguments
    ///
    /// * `current` - Number of items completed so far
    /// * `item` - Name of the item just completed
    fn on_progress(&self, current: usize, item: &str);

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);
}

/// Progress reporter using an indicatif bar.
pub struct Progress {
    bar: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, no progress bar will be displayed.
    ///
    /// # Examples
    ///
    /// ```
    /// use ao2vis::progress::Progress;
    ///
    /// let progress = Progress::new(false);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            quiet,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<ProgressBar>> {
        self.bar.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }
        let pb = ProgressBar::new(total as u64);
        pb.set_style(Self::style());
        pb.set_message(if phase == PROJECT_PHASE {
            "Scanning character folders".to_string()
        } else {
            phase.to_string()
        });
        *self.lock() = Some(pb);
    }

    fn on_progress(&self, current: usize, item: &str) {
        if let Some(ref pb) = *self.lock() {
            pb.set_position(current as u64);
            pb.set_message(truncate_name(item, 30));
        }
    }

    fn on_phase_end(&self, _phase: &str) {
        if let Some(pb) = self.lock().take() {
            pb.finish_and_clear();
        }
    }
}

/// Truncate an item name for display in the progress bar.
fn truncate_name(name: &str, max_chars: usize) -> String {
    let count = name.chars().count();
    if count <= max_chars {
        return name.to_string();
    }
    let tail: String = name.chars().skip(count - (max_chars - 3)).collect();
    format!("...{tail}")
}
