//! Completion gauge for the wizard.
//!
//! A single indicatif bar that fills as tracked fields are answered. Output
//! from the session goes through [`CompletionGauge::println`] so it does not
//! tear the bar.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use rainwise::wizard::{WizardState, TOTAL_STEPS};

pub struct CompletionGauge {
    bar: ProgressBar,
}

impl CompletionGauge {
    pub fn new() -> Self {
        let bar = ProgressBar::with_draw_target(Some(100), ProgressDrawTarget::stderr());
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{prefix:.bold} [{bar:30.cyan/blue}] {pos}% complete")
        {
            bar.set_style(style.progress_chars("█▓░"));
        }
        bar.set_prefix("Tank");
        Self { bar }
    }

    /// Reflect the latest state.
    pub fn update(&self, state: &WizardState) {
        self.bar.set_position(state.completion.round() as u64);
    }

    pub fn println(&self, message: impl AsRef<str>) {
        self.bar.println(message);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// "Step N of 4 (P%)" header line.
pub fn step_header(state: &WizardState) -> String {
    format!(
        "Step {} of {} ({:.0}%) · {}",
        state.step.number(),
        TOTAL_STEPS,
        state.step_progress(),
        state.step.title()
    )
}
