// Terminal UI utilities
// Status lines and spinners for long-running steps.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

use crate::domain::ports::ProgressReporter;

pub fn print_success(message: &str) {
    println!("{}", format!("✅ {}", message).bright_green().bold());
}

pub fn print_error(message: &str) {
    eprintln!("{}", format!("❌ {}", message).bright_red().bold());
}

pub fn print_info(message: &str) {
    println!("{}", format!("ℹ️  {}", message).bright_cyan());
}

/// Highlight a resource name (project, environment, directory)
pub fn highlight(value: &str) -> String {
    value.bright_white().bold().to_string()
}

/// Highlight a command the user can run
pub fn highlight_code(value: &str) -> String {
    format!("`{}`", value).bright_blue().to_string()
}

/// Spinner that resolves into a success or error line
#[derive(Default)]
pub struct SpinnerProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl SpinnerProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn finish(&self) {
        if let Ok(mut bar) = self.bar.lock() {
            if let Some(bar) = bar.take() {
                bar.finish_and_clear();
            }
        }
    }
}

impl ProgressReporter for SpinnerProgress {
    fn start(&self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut bar) = self.bar.lock() {
            if let Some(previous) = bar.replace(spinner) {
                previous.finish_and_clear();
            }
        }
    }

    fn success(&self, message: &str) {
        self.finish();
        print_success(message);
    }

    fn failure(&self, message: &str) {
        self.finish();
        print_error(message);
    }
}
