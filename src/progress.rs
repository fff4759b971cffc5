use std::sync::atomic::{AtomicUsize, Ordering};

use console::{Term, style};
use indicatif::{ProgressBar, ProgressStyle};

use crate::constants::progress::{SPINNER_FRAMES, TICK_INTERVAL};
use crate::utils::string::pluralize;

const SPINNER_TEMPLATE: &str = "{spinner:.cyan} {msg} [{elapsed}]";

/// Status lines and a spinner on stderr
///
/// Only created when stderr is a terminal, so piped output stays clean.
pub struct ProgressReporter {
    term: Term,
    scanned: AtomicUsize,
    current_bar: Option<ProgressBar>,
}

impl ProgressReporter {
    /// A reporter for stderr, or `None` when stderr is not a terminal
    pub fn for_terminal() -> Option<Self> {
        let term = Term::stderr();
        term.is_term().then(|| Self {
            term,
            scanned: AtomicUsize::new(0),
            current_bar: None,
        })
    }

    pub fn create_spinner(&self, message: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        let spinner_style = ProgressStyle::default_spinner()
            .template(SPINNER_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(spinner_style.tick_strings(SPINNER_FRAMES));
        pb.set_message(message.to_string());
        pb.enable_steady_tick(TICK_INTERVAL);
        pb
    }

    pub fn start_graph_building(&mut self) {
        let _ = self.term.clear_line();
        eprintln!("{} Building module graph...", style("🔍").cyan());
        self.scanned.store(0, Ordering::Relaxed);
        self.current_bar = Some(self.create_spinner("Resolving entry points..."));
    }

    /// Called from the merge loop after each scanned module
    pub fn module_scanned(&self, done: usize, name: String) {
        self.scanned.store(done, Ordering::Relaxed);
        if let Some(ref pb) = self.current_bar {
            pb.set_message(format!("Scanned {done}: {}", style(name).dim()));
        }
    }

    pub fn finish_graph_building(&mut self, modules: usize) {
        if let Some(pb) = self.current_bar.take() {
            pb.finish_and_clear();
        }
        let _ = self.term.clear_line();
        let scanned = self.scanned.load(Ordering::Relaxed);
        eprintln!(
            "{} Graph complete: {} {}, {} scanned",
            style("✓").green(),
            style(modules).yellow().bold(),
            pluralize("module", modules),
            scanned
        );
    }

    pub fn abandon(&mut self) {
        if let Some(pb) = self.current_bar.take() {
            pb.abandon();
        }
    }

    pub fn start_cycle_detection(&self) {
        eprintln!("{} Detecting import cycles...", style("🔄").yellow());
    }

    pub fn finish_cycle_detection(&self, cycles_found: usize) {
        if cycles_found == 0 {
            eprintln!(
                "{} No circular imports detected! {}",
                style("✓").green().bold(),
                style("🎉").dim()
            );
        } else {
            eprintln!(
                "{} Found {} {}",
                style("⚠").yellow().bold(),
                style(cycles_found).red().bold(),
                pluralize("cycle", cycles_found)
            );
        }
    }
}
