//! Console output and progress reporting

use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use vizprobe::{RunReport, ScenarioReport, ScenarioStatus};

/// Progress reporter for a scenario run
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            progress_bar: None,
            use_color,
            quiet,
        }
    }

    /// Start a progress bar over `total` scenarios
    pub fn start_progress(&mut self, total: u64, message: &str) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
        self.progress_bar = Some(pb);
    }

    /// Finish progress bar
    pub fn finish(&self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_and_clear();
        }
    }

    fn write_line(&self, line: &str) {
        match self.progress_bar {
            Some(ref pb) => pb.println(line),
            None => {
                let _ = self.term.write_line(line);
            }
        }
    }

    /// Report one finished scenario and advance the bar
    pub fn scenario(&self, report: &ScenarioReport) {
        if let Some(ref pb) = self.progress_bar {
            pb.inc(1);
            pb.set_message(report.name.clone());
        }
        if self.quiet && !report.status.is_failed() {
            return;
        }
        self.write_line(&scenario_line(report, self.use_color));
        if let Some(path) = &report.screenshot {
            self.write_line(&format!("    screenshot: {}", path.display()));
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("ℹ").blue().bold().to_string()
        } else {
            "INFO".to_string()
        };

        self.write_line(&format!("{prefix} {message}"));
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("⚠").yellow().bold().to_string()
        } else {
            "WARN".to_string()
        };

        self.write_line(&format!("{prefix} {message}"));
    }

    /// Print the run summary
    pub fn summary(&self, run: &RunReport) {
        let failed = run.failed_count();
        if self.quiet && failed == 0 {
            return;
        }

        let _ = self.term.write_line("");
        let status = if failed > 0 { "FAILED" } else { "PASSED" };
        let line = if self.use_color {
            let styled = if failed > 0 {
                Style::new().red().bold().apply_to(status)
            } else {
                Style::new().green().bold().apply_to(status)
            };
            format!("{styled} {}", run.summary())
        } else {
            format!("{status} {}", run.summary())
        };
        let _ = self.term.write_line(&line);
    }
}

/// `PASS name (12ms)`, or `FAIL name (12ms): [kind] message`
#[must_use]
pub fn scenario_line(report: &ScenarioReport, use_color: bool) -> String {
    let (label, paint) = match report.status {
        ScenarioStatus::Passed => ("PASS", Style::new().green().bold()),
        ScenarioStatus::Failed => ("FAIL", Style::new().red().bold()),
        ScenarioStatus::Skipped => ("SKIP", Style::new().yellow()),
    };
    let label = if use_color {
        paint.apply_to(label).to_string()
    } else {
        label.to_string()
    };
    let mut line = format!("{label} {} ({}ms)", report.name, report.duration_ms);
    if let Some(error) = &report.error {
        let kind = report
            .error_kind
            .map(|k| format!("[{k}] "))
            .unwrap_or_default();
        line.push_str(&format!(": {kind}{error}"));
    }
    line
}
