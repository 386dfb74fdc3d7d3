//! `index`: a full (re)build of the symbol index.

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};

use crate::analyzer::Analyzer;
use crate::config::Settings;
use crate::project::FsProject;

pub fn run(path: PathBuf, force: bool, settings: &Settings) {
    let state_path = path.join(&settings.state_path);
    let project: Arc<FsProject> = Arc::new(
        FsProject::new(path.clone(), state_path.parent().unwrap_or(&path))
            .with_ignore_patterns(settings.indexing.ignore_patterns.clone()),
    );

    let analyzer = if !force && state_path.exists() {
        match Analyzer::open(project.clone(), state_path.clone()) {
            Ok(analyzer) => analyzer,
            Err(err) => {
                eprintln!("Warning: could not load existing index ({err}), rebuilding");
                Analyzer::new(project.clone())
            }
        }
    } else {
        Analyzer::new(project.clone())
    };

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap());
    spinner.set_message(format!("indexing {}", path.display()));
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let report = analyzer.update(None, &AtomicBool::new(false));

    spinner.finish_and_clear();
    match report {
        Some(report) => {
            println!(
                "indexed {}: {} added, {} modified, {} removed, {} unchanged",
                path.display(),
                report.added,
                report.modified,
                report.removed,
                report.unchanged
            );
        }
        None => println!("indexing cancelled"),
    }

    if let Err(err) = analyzer.save(state_path) {
        eprintln!("Error: failed to persist index: {err}");
        std::process::exit(1);
    }
}
